use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use rayon::prelude::*;
use rusqlite::Connection;
use tracing::{info, warn};

use crate::clues::{extract_clues_from_html, format_clues_for_storage, has_cell_data};
use crate::db::{self, ClueRow, PendingPuzzle, PuzzleFile};

const HTML_EXTENSIONS: &[&str] = &["htm", "html"];

pub struct ImportCounts {
    pub found: usize,
    pub inserted: usize,
    pub unreadable: usize,
}

/// Load every `.htm`/`.html` file directly inside `dir` into the store.
/// Files that cannot be read are logged and skipped.
pub fn import_dir(conn: &Connection, dir: &Path) -> Result<ImportCounts> {
    let paths = html_files(dir)?;
    let mut unreadable = 0;
    let mut puzzles = Vec::with_capacity(paths.len());

    for path in &paths {
        let Some(slug) = path.file_stem().and_then(|s| s.to_str()) else {
            warn!(path = %path.display(), "Skipping file with non UTF-8 name");
            unreadable += 1;
            continue;
        };
        match fs::read(path) {
            // Legacy exports are often Windows-1252; keep what decodes.
            Ok(bytes) => puzzles.push(PuzzleFile {
                slug: slug.to_string(),
                source_path: path.display().to_string(),
                html: String::from_utf8_lossy(&bytes).into_owned(),
            }),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Failed to read puzzle file");
                unreadable += 1;
            }
        }
    }

    let inserted = db::insert_puzzles(conn, &puzzles)?;
    info!(dir = %dir.display(), found = paths.len(), inserted, "Imported puzzle files");
    Ok(ImportCounts {
        found: paths.len(),
        inserted,
        unreadable,
    })
}

fn html_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut paths: Vec<PathBuf> = fs::read_dir(dir)
        .with_context(|| format!("Failed to list {}", dir.display()))?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|p| p.is_file())
        .filter(|p| {
            p.extension()
                .and_then(|e| e.to_str())
                .is_some_and(|e| HTML_EXTENSIONS.contains(&e.to_ascii_lowercase().as_str()))
        })
        .collect();
    paths.sort();
    Ok(paths)
}

#[derive(Debug, Default, PartialEq, Eq)]
pub struct BackfillCounts {
    pub puzzles: usize,
    pub across: usize,
    pub down: usize,
    pub with_cells: usize,
    pub empty: usize,
}

impl BackfillCounts {
    pub fn print(&self) {
        println!(
            "Saved clues for {} puzzles ({} across, {} down); {} with cell data, {} empty.",
            self.puzzles, self.across, self.down, self.with_cells, self.empty,
        );
    }

    fn add(&mut self, row: &ClueRow) {
        self.puzzles += 1;
        self.across += row.across_count;
        self.down += row.down_count;
        if row.has_cells {
            self.with_cells += 1;
        }
        if row.across_count + row.down_count == 0 {
            self.empty += 1;
        }
    }
}

/// Run the extractor over one stored puzzle.
pub fn extract_puzzle(puzzle: &PendingPuzzle) -> ClueRow {
    let clues = extract_clues_from_html(&puzzle.html);
    if clues.is_empty() {
        warn!(slug = %puzzle.slug, "No clues recovered; storing empty clue lists");
    }
    ClueRow {
        puzzle_id: puzzle.id,
        clues_json: format_clues_for_storage(&clues),
        across_count: clues.across.len(),
        down_count: clues.down.len(),
        has_cells: has_cell_data(&clues),
        extracted_at: chrono::Utc::now().to_rfc3339(),
    }
}

/// Extract in parallel chunks, writing each chunk in one transaction.
pub fn extract_pending(
    conn: &Connection,
    puzzles: &[PendingPuzzle],
    chunk_size: usize,
    show_progress: bool,
) -> Result<BackfillCounts> {
    let pb = if show_progress {
        ProgressBar::new(puzzles.len() as u64)
    } else {
        ProgressBar::hidden()
    };
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({per_sec})")?
            .progress_chars("#>-"),
    );

    let mut counts = BackfillCounts::default();
    for chunk in puzzles.chunks(chunk_size.max(1)) {
        let rows: Vec<ClueRow> = chunk.par_iter().map(extract_puzzle).collect();
        for row in &rows {
            counts.add(row);
        }
        db::save_clues(conn, &rows)?;
        pb.inc(chunk.len() as u64);
    }

    pb.finish_and_clear();
    info!(
        puzzles = counts.puzzles,
        with_cells = counts.with_cells,
        empty = counts.empty,
        "Backfill finished"
    );
    Ok(counts)
}
