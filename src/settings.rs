use std::path::PathBuf;

use anyhow::{Context, Result};
use config::{Config, Environment, File};
use serde::Deserialize;
use tracing::debug;

const DEFAULT_DB_PATH: &str = "data/puzzles.sqlite";
const DEFAULT_CHUNK_SIZE: i64 = 500;

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    /// SQLite file holding imported puzzles and their clue column.
    pub db_path: PathBuf,
    /// Puzzles extracted in parallel before each database write.
    pub chunk_size: usize,
}

impl Settings {
    /// Defaults, then `clues.toml` if present, then `CLUES_*` env vars.
    pub fn load() -> Result<Self> {
        let settings: Settings = Config::builder()
            .set_default("db_path", DEFAULT_DB_PATH)?
            .set_default("chunk_size", DEFAULT_CHUNK_SIZE)?
            .add_source(File::with_name("clues").required(false))
            .add_source(Environment::with_prefix("CLUES").try_parsing(true))
            .build()
            .context("Failed to load settings")?
            .try_deserialize()
            .context("Invalid settings")?;

        debug!(?settings, "Settings loaded");
        Ok(settings)
    }
}
