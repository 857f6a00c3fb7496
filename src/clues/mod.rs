pub mod extract;
pub mod geometry;
pub mod html;
pub mod storage;

use std::panic::{self, AssertUnwindSafe};

use serde::{Deserialize, Serialize};
use tracing::{debug, error, warn};

pub use storage::{format_clues_for_storage, has_cell_data, parse_clues_from_storage};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Across,
    Down,
}

/// One grid square, zero-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Cell {
    pub row: i32,
    pub col: i32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Clue {
    pub number: u32,
    pub text: String,
    pub direction: Direction,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub length: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub answer: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cells: Option<Vec<Cell>>,
}

impl Clue {
    /// A clue with only a number and prompt, as recovered from plain markup.
    pub fn bare(number: u32, text: impl Into<String>, direction: Direction) -> Self {
        Self {
            number,
            text: text.into(),
            direction,
            length: None,
            answer: None,
            cells: None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CluesByDirection {
    #[serde(default)]
    pub across: Vec<Clue>,
    #[serde(default)]
    pub down: Vec<Clue>,
}

impl CluesByDirection {
    pub fn total(&self) -> usize {
        self.across.len() + self.down.len()
    }

    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }

    /// Push a clue onto the sequence matching its direction.
    pub fn push(&mut self, clue: Clue) {
        match clue.direction {
            Direction::Across => self.across.push(clue),
            Direction::Down => self.down.push(clue),
        }
    }

    pub fn extend(&mut self, other: CluesByDirection) {
        self.across.extend(other.across);
        self.down.extend(other.down);
    }
}

/// Extract across/down clues from a legacy puzzle export.
///
/// Strategies run in priority order (legacy script arrays, class/id markup,
/// raw `acrossClues`/`downClues` JSON) and the first one yielding at least
/// one clue wins. Never fails: a panic inside any strategy is caught and
/// logged, and a document nothing can be recovered from yields empty sequences.
pub fn extract_clues_from_html(html: &str) -> CluesByDirection {
    let result = panic::catch_unwind(AssertUnwindSafe(|| run_strategies(html)));

    match result {
        Ok(Some(clues)) => clues,
        Ok(None) => {
            warn!(bytes = html.len(), "No clues extracted from puzzle HTML");
            CluesByDirection::default()
        }
        Err(_) => {
            error!(bytes = html.len(), "Clue extraction panicked, returning empty result");
            CluesByDirection::default()
        }
    }
}

fn run_strategies(html: &str) -> Option<CluesByDirection> {
    for (name, strategy) in extract::STRATEGIES {
        match strategy(html) {
            Some(clues) if !clues.is_empty() => {
                debug!(
                    strategy = *name,
                    across = clues.across.len(),
                    down = clues.down.len(),
                    "Clues extracted"
                );
                return Some(clues);
            }
            _ => debug!(strategy = *name, "Strategy yielded nothing"),
        }
    }
    None
}

// ── Tests ──

#[cfg(test)]
mod tests {
    use super::*;

    const LEGACY_AND_MARKUP: &str = r#"<html><body>
<div class="across"><ul><li>9. Markup clue</li></ul></div>
<script language="JavaScript">
Word = new Array("CAT", "DOG");
Clue = new Array("Feline", "Canine");
WordX = new Array(0, 2);
WordY = new Array(0, 0);
LastHorizontalWord = 1;
</script>
</body></html>"#;

    #[test]
    fn legacy_arrays_take_priority_over_markup() {
        let clues = extract_clues_from_html(LEGACY_AND_MARKUP);
        assert_eq!(clues.across.len(), 2);
        assert!(clues.down.is_empty());
        assert_eq!(clues.across[0].text, "Feline");
        assert!(clues.across.iter().all(|c| c.text != "Markup clue"));
    }

    #[test]
    fn markup_fallback() {
        let html = r#"<div class="across"><li>1. Capital of France</li></div>"#;
        let clues = extract_clues_from_html(html);
        assert_eq!(clues.across, vec![Clue::bare(1, "Capital of France", Direction::Across)]);
        assert!(clues.down.is_empty());
        assert!(clues.across[0].cells.is_none());
    }

    #[test]
    fn script_json_is_last_resort() {
        let html = r#"<script>var acrossClues = [{"number": 4, "text": "Opposite of out", "answer": "IN", "length": 2}];</script>"#;
        let clues = extract_clues_from_html(html);
        assert_eq!(clues.across.len(), 1);
        assert_eq!(clues.across[0].answer.as_deref(), Some("IN"));
        assert_eq!(clues.across[0].length, Some(2));
    }

    #[test]
    fn empty_input() {
        let clues = extract_clues_from_html("");
        assert_eq!(clues, CluesByDirection::default());
    }

    #[test]
    fn garbage_never_fails() {
        let inputs = [
            "<script>",
            "<script>Word = new Array(\"A\"",
            "</script><script>Clue = new Array(",
            "\u{0}\u{1}\u{fffd}<<<>>>",
            "<div class=\"across\"><li>",
            "acrossClues = [",
            "downClues = [{\"number\": }]",
            "WordX = new Array(1,2,3); LastHorizontalWord = x;",
        ];
        for input in inputs {
            let clues = extract_clues_from_html(input);
            assert!(clues.is_empty(), "unexpected clues for {:?}: {:?}", input, clues);
        }

        let huge = "<script>Word = new Array(\"".repeat(5_000);
        assert!(extract_clues_from_html(&huge).is_empty());
    }

    #[test]
    fn push_routes_by_direction() {
        let mut clues = CluesByDirection::default();
        clues.push(Clue::bare(1, "a", Direction::Down));
        clues.push(Clue::bare(2, "b", Direction::Across));
        assert_eq!(clues.across[0].number, 2);
        assert_eq!(clues.down[0].number, 1);
        assert_eq!(clues.total(), 2);
    }
}
