use thiserror::Error;

/// Why a legacy script block could not be turned into clues.
///
/// These never reach callers of `extract_clues_from_html`; they only decide
/// whether the next strategy gets a turn.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ExtractError {
    #[error("malformed string literal in {array} array: {fragment}")]
    MalformedLiteral { array: &'static str, fragment: String },

    #[error("{words} words but {clues} clues")]
    MismatchedCounts { words: usize, clues: usize },

    #[error("invalid integer {value:?} in {array} array")]
    InvalidInteger { array: &'static str, value: String },
}
