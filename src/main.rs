use std::path::PathBuf;
use std::time::Instant;

use anyhow::Context;
use clap::{Parser, Subcommand};

use eclipse_clues::backfill;
use eclipse_clues::clues::{
    extract_clues_from_html, format_clues_for_storage, parse_clues_from_storage, Clue,
};
use eclipse_clues::db;
use eclipse_clues::settings::Settings;

#[derive(Parser)]
#[command(name = "eclipse_clues", about = "Extract clue data from legacy crossword HTML exports")]
struct Cli {
    /// SQLite database path (overrides CLUES_DB_PATH / clues.toml)
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create the puzzle table
    Init,
    /// Load every .htm/.html file in a directory into the store
    Import { dir: PathBuf },
    /// Extract clues for puzzles that have none stored yet
    Extract {
        /// Max puzzles to extract (default: all pending)
        #[arg(short = 'n', long)]
        limit: Option<usize>,
        /// Re-extract puzzles that already have clues
        #[arg(long)]
        force: bool,
    },
    /// Import a directory, then extract everything pending
    Run {
        dir: PathBuf,
        #[arg(short = 'n', long)]
        limit: Option<usize>,
    },
    /// Extract a single file and print the stored JSON
    Parse {
        file: PathBuf,
        #[arg(long)]
        pretty: bool,
    },
    /// Print the stored clues of one puzzle
    Show { slug: String },
    /// Puzzle overview table
    List {
        /// Only puzzles extracted without cell positions
        #[arg(long)]
        missing_cells: bool,
        #[arg(short = 'n', long, default_value = "50")]
        limit: usize,
    },
    /// Show extraction statistics
    Stats,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let t0 = Instant::now();
    let cli = Cli::parse();
    let mut settings = Settings::load()?;
    if let Some(db) = cli.db {
        settings.db_path = db;
    }

    let open = || -> anyhow::Result<rusqlite::Connection> {
        let conn = db::connect(&settings.db_path)?;
        db::init_schema(&conn)?;
        Ok(conn)
    };

    let result = match cli.command {
        Commands::Init => {
            open()?;
            println!("Schema ready at {}", settings.db_path.display());
            Ok(())
        }
        Commands::Import { dir } => {
            let conn = open()?;
            let counts = backfill::import_dir(&conn, &dir)?;
            println!(
                "Inserted {} new puzzles ({} files found, {} unreadable)",
                counts.inserted, counts.found, counts.unreadable
            );
            Ok(())
        }
        Commands::Extract { limit, force } => {
            let conn = open()?;
            let pending = db::fetch_unextracted(&conn, limit, force)?;
            if pending.is_empty() {
                println!("No pending puzzles. Run 'import' first or pass --force.");
                return Ok(());
            }
            println!("Extracting clues from {} puzzles...", pending.len());
            let counts = backfill::extract_pending(&conn, &pending, settings.chunk_size, true)?;
            counts.print();
            Ok(())
        }
        Commands::Run { dir, limit } => {
            let conn = open()?;

            let t_import = Instant::now();
            let imported = backfill::import_dir(&conn, &dir)?;
            println!(
                "Imported {} new puzzles ({} files) in {:.1}s",
                imported.inserted,
                imported.found,
                t_import.elapsed().as_secs_f64()
            );

            let t_extract = Instant::now();
            let pending = db::fetch_unextracted(&conn, limit, false)?;
            if pending.is_empty() {
                println!("Nothing to extract.");
                return Ok(());
            }
            println!("Extracting clues from {} puzzles...", pending.len());
            let counts = backfill::extract_pending(&conn, &pending, settings.chunk_size, true)?;
            println!("Extracted in {:.1}s", t_extract.elapsed().as_secs_f64());
            counts.print();
            Ok(())
        }
        Commands::Parse { file, pretty } => {
            let bytes =
                std::fs::read(&file).with_context(|| format!("Failed to read {}", file.display()))?;
            let clues = extract_clues_from_html(&String::from_utf8_lossy(&bytes));
            let json = format_clues_for_storage(&clues);
            if pretty {
                let value: serde_json::Value = serde_json::from_str(&json)?;
                println!("{}", serde_json::to_string_pretty(&value)?);
            } else {
                println!("{}", json);
            }
            Ok(())
        }
        Commands::Show { slug } => {
            let conn = open()?;
            let Some(puzzle) = db::fetch_clues(&conn, &slug)? else {
                println!("No puzzle named '{}'.", slug);
                return Ok(());
            };
            println!("{} ({})", puzzle.slug, puzzle.source_path);
            let Some(extracted_at) = puzzle.extracted_at else {
                println!("Clues not extracted yet. Run 'extract'.");
                return Ok(());
            };
            println!("Extracted {}", extracted_at);

            let clues = parse_clues_from_storage(puzzle.clues.as_deref());
            print_clue_list("Across", &clues.across);
            print_clue_list("Down", &clues.down);
            Ok(())
        }
        Commands::List { missing_cells, limit } => {
            let conn = open()?;
            let rows = db::fetch_overview(&conn, limit, missing_cells)?;
            if rows.is_empty() {
                println!("No puzzles found.");
                return Ok(());
            }

            println!(
                "{:>3} | {:<32} | {:>6} | {:>4} | {:<5} | {:<25}",
                "#", "Puzzle", "Across", "Down", "Cells", "Extracted"
            );
            println!("{}", "-".repeat(90));

            for (i, r) in rows.iter().enumerate() {
                let count = |n: Option<i64>| n.map(|v| v.to_string()).unwrap_or_else(|| "-".into());
                let cells = match r.has_cells {
                    Some(true) => "yes",
                    Some(false) => "no",
                    None => "-",
                };
                println!(
                    "{:>3} | {:<32} | {:>6} | {:>4} | {:<5} | {:<25}",
                    i + 1,
                    truncate(&r.slug, 32),
                    count(r.across),
                    count(r.down),
                    cells,
                    r.extracted_at.as_deref().unwrap_or("pending"),
                );
            }

            println!("\n{} puzzles", rows.len());
            Ok(())
        }
        Commands::Stats => {
            let conn = open()?;
            let s = db::get_stats(&conn)?;
            println!("Total:      {}", s.total);
            println!("Extracted:  {}", s.extracted);
            println!("Pending:    {}", s.pending);
            println!("With cells: {}", s.with_cells);
            println!("Empty:      {}", s.empty);
            Ok(())
        }
    };

    let elapsed = t0.elapsed();
    if elapsed.as_secs() >= 1 {
        println!("\nDone in {}", format_duration(elapsed));
    }

    result
}

fn print_clue_list(heading: &str, clues: &[Clue]) {
    println!("\n{} ({})", heading, clues.len());
    for c in clues {
        let length = c.length.map(|n| format!(" ({})", n)).unwrap_or_default();
        let start = c
            .cells
            .as_ref()
            .and_then(|cells| cells.first())
            .map(|cell| format!("  @r{}c{}", cell.row, cell.col))
            .unwrap_or_default();
        println!("{:>4}. {}{}{}", c.number, c.text, length, start);
    }
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let truncated: String = s.chars().take(max).collect();
        format!("{}...", truncated)
    }
}

fn format_duration(d: std::time::Duration) -> String {
    let secs = d.as_secs();
    if secs < 60 {
        format!("{:.1}s", d.as_secs_f64())
    } else if secs < 3600 {
        format!("{}m {}s", secs / 60, secs % 60)
    } else {
        format!("{}h {}m {}s", secs / 3600, (secs % 3600) / 60, secs % 60)
    }
}
