//! EclipseCrossword exports: the puzzle lives in inline script blocks as
//! parallel arrays.
//!
//! ```text
//! Word = new Array("CAT", "DOG");
//! Clue = new Array("Feline", "Canine");
//! WordX = new Array(0, 2);
//! WordY = new Array(0, 0);
//! LastHorizontalWord = 1;
//! ```

use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;

use crate::clues::geometry::{number_starts, word_cells};
use crate::clues::html::inline_scripts;
use crate::clues::{Clue, CluesByDirection, Direction};
use crate::error::ExtractError;

static WORD_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?s)\bWord\s*=\s*(?:new\s+Array\s*\(\s*"(.*?)"\s*\)|\[\s*"(.*?)"\s*\])"#).unwrap()
});
static CLUE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?s)\bClue\s*=\s*(?:new\s+Array\s*\(\s*"(.*?)"\s*\)|\[\s*"(.*?)"\s*\])"#).unwrap()
});
static WORD_X_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\bWordX\s*=\s*(?:new\s+Array\s*\(([^)]*)\)|\[([^\]]*)\])").unwrap()
});
static WORD_Y_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\bWordY\s*=\s*(?:new\s+Array\s*\(([^)]*)\)|\[([^\]]*)\])").unwrap()
});
static LAST_ACROSS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\bLastHorizontalWord\s*=\s*(-?\d+)").unwrap());
static QUOTE_COMMA_QUOTE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#""\s*,\s*""#).unwrap());

pub fn extract(html: &str) -> Option<CluesByDirection> {
    match extract_scripts(html) {
        Ok(found) => found,
        Err(e) => {
            debug!(error = %e, "Legacy clue arrays present but unparseable");
            None
        }
    }
}

/// Accumulate clues from every script block that defines both a word and
/// a clue array. `Ok(None)` when no block does.
fn extract_scripts(html: &str) -> Result<Option<CluesByDirection>, ExtractError> {
    let mut result: Option<CluesByDirection> = None;

    for script in inline_scripts(html) {
        if let Some(clues) = parse_block(script)? {
            result.get_or_insert_with(CluesByDirection::default).extend(clues);
        }
    }

    Ok(result)
}

fn parse_block(script: &str) -> Result<Option<CluesByDirection>, ExtractError> {
    let (Some(words_raw), Some(clues_raw)) = (capture(&WORD_RE, script), capture(&CLUE_RE, script))
    else {
        return Ok(None);
    };

    let words = parse_words(words_raw)?;
    let clue_texts = parse_clue_texts(clues_raw)?;
    if words.len() != clue_texts.len() {
        return Err(ExtractError::MismatchedCounts {
            words: words.len(),
            clues: clue_texts.len(),
        });
    }

    let xs = capture(&WORD_X_RE, script)
        .map(|raw| parse_ints(raw, "WordX"))
        .transpose()?;
    let ys = capture(&WORD_Y_RE, script)
        .map(|raw| parse_ints(raw, "WordY"))
        .transpose()?;
    let positions = match (xs, ys) {
        (Some(xs), Some(ys)) if xs.len() == words.len() && ys.len() == words.len() => {
            Some((xs, ys))
        }
        _ => None,
    };

    let last_across = LAST_ACROSS_RE
        .captures(script)
        .and_then(|caps| caps[1].parse::<i64>().ok())
        .unwrap_or(words.len() as i64 - 1);

    let numbers = match &positions {
        Some((xs, ys)) => number_starts(xs, ys),
        None => (1..=words.len() as u32).collect(),
    };

    let mut clues = CluesByDirection::default();
    for (i, (word, text)) in words.iter().zip(clue_texts).enumerate() {
        // blank prompts still occupy a grid slot, so numbering is unaffected
        if text.trim().is_empty() {
            continue;
        }
        let direction = if (i as i64) <= last_across {
            Direction::Across
        } else {
            Direction::Down
        };
        let len = word.chars().count() as u32;
        let length = (len > 0).then_some(len);
        let cells = match (&positions, length) {
            (Some((xs, ys)), Some(n)) => Some(word_cells(xs[i], ys[i], n, direction)),
            _ => None,
        };

        clues.push(Clue {
            number: numbers[i],
            text,
            direction,
            length,
            answer: None,
            cells,
        });
    }

    Ok(Some(clues))
}

/// First non-empty alternative captured by `re`.
fn capture<'a>(re: &Regex, script: &'a str) -> Option<&'a str> {
    let caps = re.captures(script)?;
    caps.iter().skip(1).flatten().next().map(|m| m.as_str())
}

/// Words carry no commas, so a plain comma split is enough; the outer
/// quotes were consumed by the capture.
fn parse_words(raw: &str) -> Result<Vec<String>, ExtractError> {
    raw.split(',')
        .map(|piece| {
            let word = piece.trim().trim_matches('"');
            if word.contains('"') {
                return Err(ExtractError::MalformedLiteral {
                    array: "Word",
                    fragment: piece.to_string(),
                });
            }
            Ok(unescape(word.trim()))
        })
        .collect()
}

/// Clue text may contain commas, so entries are split on the `","`
/// delimiter between literals instead.
fn parse_clue_texts(raw: &str) -> Result<Vec<String>, ExtractError> {
    QUOTE_COMMA_QUOTE_RE
        .split(raw)
        .map(|piece| {
            if has_bare_quote(piece) {
                return Err(ExtractError::MalformedLiteral {
                    array: "Clue",
                    fragment: piece.to_string(),
                });
            }
            Ok(unescape(piece).trim().to_string())
        })
        .collect()
}

fn parse_ints(raw: &str, array: &'static str) -> Result<Vec<i32>, ExtractError> {
    if raw.trim().is_empty() {
        return Ok(Vec::new());
    }
    raw.split(',')
        .map(|v| {
            let v = v.trim();
            v.parse::<i32>().map_err(|_| ExtractError::InvalidInteger {
                array,
                value: v.to_string(),
            })
        })
        .collect()
}

fn has_bare_quote(s: &str) -> bool {
    let mut escaped = false;
    for c in s.chars() {
        match c {
            '\\' if !escaped => escaped = true,
            '"' if !escaped => return true,
            _ => escaped = false,
        }
    }
    false
}

fn unescape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push(' '),
            Some(next) => out.push(next),
            None => out.push('\\'),
        }
    }
    out
}

// ── Tests ──
