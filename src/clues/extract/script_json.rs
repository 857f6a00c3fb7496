use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;
use tracing::debug;

use crate::clues::{Cell, Clue, CluesByDirection, Direction};

static ASSIGN_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"\b(acrossClues|downClues)["']?\s*[=:]\s*\["#).unwrap()
});

/// Pages that embed clue data as JSON: `acrossClues = [{"number": 1,
/// "text": "..."}]`. Scans the raw text, not just script blocks.
pub fn extract(html: &str) -> Option<CluesByDirection> {
    let mut clues = CluesByDirection::default();

    for caps in ASSIGN_RE.captures_iter(html) {
        let (Some(whole), Some(name)) = (caps.get(0), caps.get(1)) else {
            continue;
        };
        let direction = if name.as_str() == "acrossClues" {
            Direction::Across
        } else {
            Direction::Down
        };

        // the match ends on the opening bracket
        let array_start = whole.end() - 1;
        let entries = match first_json_array(&html[array_start..]) {
            Ok(entries) => entries,
            Err(e) => {
                debug!(variable = name.as_str(), offset = array_start, error = %e, "Skipping unparseable clue array");
                continue;
            }
        };

        for entry in &entries {
            if let Some(clue) = entry_to_clue(entry, direction) {
                clues.push(clue);
            }
        }
    }

    if clues.is_empty() {
        None
    } else {
        Some(clues)
    }
}

/// Parse exactly one JSON array from the front of `text`, ignoring whatever
/// script follows it.
fn first_json_array(text: &str) -> serde_json::Result<Vec<Value>> {
    let mut stream = serde_json::Deserializer::from_str(text).into_iter::<Vec<Value>>();
    match stream.next() {
        Some(result) => result,
        None => Err(serde::de::Error::custom("empty input")),
    }
}

fn entry_to_clue(entry: &Value, direction: Direction) -> Option<Clue> {
    let number = match entry.get("number")? {
        Value::Number(n) => u32::try_from(n.as_u64()?).ok()?,
        Value::String(s) => s.trim().parse().ok()?,
        _ => return None,
    };
    if number == 0 {
        return None;
    }
    let text = entry.get("text")?.as_str()?.trim();
    if text.is_empty() {
        return None;
    }

    let length = entry
        .get("length")
        .and_then(Value::as_u64)
        .and_then(|n| u32::try_from(n).ok());
    let answer = entry
        .get("answer")
        .and_then(Value::as_str)
        .map(str::to_string);
    let cells = entry
        .get("cells")
        .and_then(|v| serde_json::from_value::<Vec<Cell>>(v.clone()).ok());

    Some(Clue {
        number,
        text: text.to_string(),
        direction,
        length,
        answer,
        cells,
    })
}
