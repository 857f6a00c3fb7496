pub mod backfill;
pub mod clues;
pub mod db;
pub mod error;
pub mod settings;

pub use clues::{
    extract_clues_from_html, format_clues_for_storage, has_cell_data, parse_clues_from_storage,
    Cell, Clue, CluesByDirection, Direction,
};
pub use error::ExtractError;
