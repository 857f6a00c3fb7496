use std::path::Path;

use anyhow::{Context, Result};
use rusqlite::{params, Connection};

pub fn connect(path: &Path) -> Result<Connection> {
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create {}", dir.display()))?;
    }
    let conn =
        Connection::open(path).with_context(|| format!("Failed to open {}", path.display()))?;
    conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA foreign_keys=ON;")?;
    Ok(conn)
}

pub fn init_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS puzzles (
            id            INTEGER PRIMARY KEY,
            slug          TEXT UNIQUE NOT NULL,
            source_path   TEXT NOT NULL,
            html          TEXT NOT NULL,
            clues         TEXT,
            across_count  INTEGER,
            down_count    INTEGER,
            has_cells     BOOLEAN,
            imported_at   TEXT NOT NULL DEFAULT (datetime('now')),
            extracted_at  TEXT
        );
        CREATE INDEX IF NOT EXISTS idx_puzzles_extracted ON puzzles(extracted_at);
        ",
    )?;
    Ok(())
}

// ── Import ──

pub struct PuzzleFile {
    pub slug: String,
    pub source_path: String,
    pub html: String,
}

pub fn insert_puzzles(conn: &Connection, puzzles: &[PuzzleFile]) -> Result<usize> {
    let tx = conn.unchecked_transaction()?;
    let mut count = 0;
    {
        let mut stmt = tx.prepare(
            "INSERT OR IGNORE INTO puzzles (slug, source_path, html) VALUES (?1, ?2, ?3)",
        )?;
        for p in puzzles {
            count += stmt.execute(params![p.slug, p.source_path, p.html])?;
        }
    }
    tx.commit()?;
    Ok(count)
}

// ── Extraction ──

pub struct PendingPuzzle {
    pub id: i64,
    pub slug: String,
    pub html: String,
}

/// Puzzles whose clue column has never been filled, or every puzzle when
/// `force` is set.
pub fn fetch_unextracted(
    conn: &Connection,
    limit: Option<usize>,
    force: bool,
) -> Result<Vec<PendingPuzzle>> {
    let sql = format!(
        "SELECT id, slug, html FROM puzzles{} ORDER BY id{}",
        if force { "" } else { " WHERE extracted_at IS NULL" },
        match limit {
            Some(n) => format!(" LIMIT {}", n),
            None => String::new(),
        }
    );
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt
        .query_map([], |row| {
            Ok(PendingPuzzle {
                id: row.get(0)?,
                slug: row.get(1)?,
                html: row.get(2)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}

pub struct ClueRow {
    pub puzzle_id: i64,
    pub clues_json: String,
    pub across_count: usize,
    pub down_count: usize,
    pub has_cells: bool,
    pub extracted_at: String,
}

pub fn save_clues(conn: &Connection, rows: &[ClueRow]) -> Result<()> {
    let tx = conn.unchecked_transaction()?;
    {
        let mut stmt = tx.prepare(
            "UPDATE puzzles
             SET clues = ?2, across_count = ?3, down_count = ?4, has_cells = ?5, extracted_at = ?6
             WHERE id = ?1",
        )?;
        for r in rows {
            stmt.execute(params![
                r.puzzle_id,
                r.clues_json,
                r.across_count as i64,
                r.down_count as i64,
                r.has_cells,
                r.extracted_at,
            ])?;
        }
    }
    tx.commit()?;
    Ok(())
}

// ── Reading back ──

pub struct StoredPuzzle {
    pub slug: String,
    pub source_path: String,
    pub clues: Option<String>,
    pub extracted_at: Option<String>,
}

pub fn fetch_clues(conn: &Connection, slug: &str) -> Result<Option<StoredPuzzle>> {
    let mut stmt = conn.prepare(
        "SELECT slug, source_path, clues, extracted_at FROM puzzles WHERE slug = ?1",
    )?;
    let mut rows = stmt.query_map([slug], |row| {
        Ok(StoredPuzzle {
            slug: row.get(0)?,
            source_path: row.get(1)?,
            clues: row.get(2)?,
            extracted_at: row.get(3)?,
        })
    })?;
    let puzzle = rows.next().transpose()?;
    Ok(puzzle)
}

pub struct OverviewRow {
    pub slug: String,
    pub across: Option<i64>,
    pub down: Option<i64>,
    pub has_cells: Option<bool>,
    pub extracted_at: Option<String>,
}

pub fn fetch_overview(
    conn: &Connection,
    limit: usize,
    missing_cells_only: bool,
) -> Result<Vec<OverviewRow>> {
    let sql = format!(
        "SELECT slug, across_count, down_count, has_cells, extracted_at
         FROM puzzles{}
         ORDER BY slug
         LIMIT {}",
        if missing_cells_only {
            " WHERE extracted_at IS NOT NULL AND has_cells = 0"
        } else {
            ""
        },
        limit
    );
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt
        .query_map([], |row| {
            Ok(OverviewRow {
                slug: row.get(0)?,
                across: row.get(1)?,
                down: row.get(2)?,
                has_cells: row.get(3)?,
                extracted_at: row.get(4)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}

// ── Stats ──

pub struct Stats {
    pub total: usize,
    pub extracted: usize,
    pub pending: usize,
    pub with_cells: usize,
    pub empty: usize,
}

pub fn get_stats(conn: &Connection) -> Result<Stats> {
    let total: usize = conn.query_row("SELECT COUNT(*) FROM puzzles", [], |r| r.get(0))?;
    let extracted: usize = conn.query_row(
        "SELECT COUNT(*) FROM puzzles WHERE extracted_at IS NOT NULL",
        [],
        |r| r.get(0),
    )?;
    let with_cells: usize =
        conn.query_row("SELECT COUNT(*) FROM puzzles WHERE has_cells = 1", [], |r| r.get(0))?;
    let empty: usize = conn.query_row(
        "SELECT COUNT(*) FROM puzzles
         WHERE extracted_at IS NOT NULL AND across_count = 0 AND down_count = 0",
        [],
        |r| r.get(0),
    )?;
    Ok(Stats {
        total,
        extracted,
        pending: total - extracted,
        with_cells,
        empty,
    })
}
