use serde::{Deserialize, Serialize};
use tracing::warn;

use super::{Cell, Clue, CluesByDirection, Direction};

/// Persisted clue shape: direction comes from the enclosing list and the
/// answer is never stored.
#[derive(Debug, Serialize, Deserialize)]
struct StoredClue {
    number: u32,
    text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    length: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    cells: Option<Vec<Cell>>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct StoredClues {
    #[serde(default)]
    across: Vec<StoredClue>,
    #[serde(default)]
    down: Vec<StoredClue>,
}

impl From<&Clue> for StoredClue {
    fn from(c: &Clue) -> Self {
        StoredClue {
            number: c.number,
            text: c.text.clone(),
            length: c.length,
            cells: c.cells.clone(),
        }
    }
}

impl StoredClue {
    fn into_clue(self, direction: Direction) -> Clue {
        Clue {
            number: self.number,
            text: self.text,
            direction,
            length: self.length,
            answer: None,
            cells: self.cells,
        }
    }
}

/// Serialize clues to the JSON stored in the puzzle's clue column.
pub fn format_clues_for_storage(clues: &CluesByDirection) -> String {
    let stored = StoredClues {
        across: clues.across.iter().map(StoredClue::from).collect(),
        down: clues.down.iter().map(StoredClue::from).collect(),
    };
    serde_json::to_string(&stored).unwrap_or_default()
}

/// Read back a stored clue column. A missing column or corrupt JSON gives
/// empty lists.
pub fn parse_clues_from_storage(json: Option<&str>) -> CluesByDirection {
    let Some(json) = json else {
        return CluesByDirection::default();
    };

    match serde_json::from_str::<StoredClues>(json) {
        Ok(stored) => CluesByDirection {
            across: stored
                .across
                .into_iter()
                .map(|c| c.into_clue(Direction::Across))
                .collect(),
            down: stored
                .down
                .into_iter()
                .map(|c| c.into_clue(Direction::Down))
                .collect(),
        },
        Err(e) => {
            warn!(error = %e, "Stored clue JSON is corrupt, treating as empty");
            CluesByDirection::default()
        }
    }
}

/// Whether any clue carries grid positions. Puzzles imported before cell
/// data existed have none.
pub fn has_cell_data(clues: &CluesByDirection) -> bool {
    clues
        .across
        .iter()
        .chain(&clues.down)
        .any(|c| c.cells.as_ref().is_some_and(|cells| !cells.is_empty()))
}
