use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;

use crate::clues::html::{text_content, Markup};
use crate::clues::{Clue, CluesByDirection, Direction};

static CLUE_LINE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^(\d+)\.\s*(.+)$").unwrap());

/// Pages that render clues as ordinary markup: a container whose class or
/// id mentions "across" or "down", holding `<li>` items or `.clue`
/// paragraphs that read `12. Clue text`.
pub fn extract(html: &str) -> Option<CluesByDirection> {
    let doc = Markup::parse(html);
    let across = first_section(&doc, "across");
    let down = first_section(&doc, "down");
    if across.is_none() && down.is_none() {
        return None;
    }

    let mut clues = CluesByDirection::default();
    for (direction, section) in [(Direction::Across, across), (Direction::Down, down)] {
        if let Some(inner) = section {
            for clue in section_clues(inner, direction) {
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

fn first_section<'a>(doc: &Markup<'a>, key: &str) -> Option<&'a str> {
    let el = doc.first_with_attr(|v| v.to_lowercase().contains(key))?;
    debug!(tag = %el.tag, attrs = %el.attrs, offset = el.start, "Found {} section", key);
    Some(el.inner)
}

fn section_clues(section: &str, direction: Direction) -> Vec<Clue> {
    let is_clue_class: &dyn Fn(&str) -> bool = &|class: &str| class.to_lowercase().contains("clue");
    let doc = Markup::parse(section);
    let mut items = doc.elements_by_tag("li", None);
    items.extend(doc.elements_by_tag("p", Some(is_clue_class)));
    items.extend(doc.elements_by_tag("div", Some(is_clue_class)));
    items.sort_by_key(|(offset, _)| *offset);

    let mut seen = HashSet::new();
    let mut clues = Vec::new();
    for (_, fragment) in items {
        let text = text_content(fragment);
        let Some(caps) = CLUE_LINE_RE.captures(&text) else {
            continue;
        };
        let number = match caps[1].parse::<u32>() {
            Ok(n) if n > 0 => n,
            _ => continue,
        };
        let prompt = caps[2].trim().to_string();
        // a .clue div inside an <li> reads the same as the item itself
        if !seen.insert((number, prompt.clone())) {
            continue;
        }
        clues.push(Clue::bare(number, prompt, direction));
    }
    clues
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_across_item() {
        let clues = extract(r#"<div class="across"><li>1. Capital of France</li></div>"#).unwrap();
        assert_eq!(clues.across, vec![Clue::bare(1, "Capital of France", Direction::Across)]);
        assert!(clues.down.is_empty());
    }

    #[test]
    fn both_sections_with_ids_and_clue_paragraphs() {
        let html = r#"
<div id="AcrossClues">
  <h3>Across</h3>
  <p class="clue">1. <b>Feline</b> pet</p>
  <p class="clue">4. Opposite of &quot;off&quot;</p>
  <p>Not a clue</p>
</div>
<div id="downClues">
  <div class="clue-item">2. Canine</div>
  <div class="clue-item">3.Barnyard bird</div>
</div>"#;
        let clues = extract(html).unwrap();
        let across: Vec<_> = clues.across.iter().map(|c| (c.number, c.text.as_str())).collect();
        let down: Vec<_> = clues.down.iter().map(|c| (c.number, c.text.as_str())).collect();
        assert_eq!(across, vec![(1, "Feline pet"), (4, "Opposite of \"off\"")]);
        assert_eq!(down, vec![(2, "Canine"), (3, "Barnyard bird")]);
        assert!(clues.down.iter().all(|c| c.direction == Direction::Down));
    }

    #[test]
    fn nested_clue_div_not_duplicated() {
        let html = r#"<ol class="down-list"><li><div class="clue">5. Nested</div></li></ol>"#;
        let clues = extract(html).unwrap();
        assert_eq!(clues.down.len(), 1);
        assert_eq!(clues.down[0].number, 5);
    }

    #[test]
    fn zero_numbered_items_dropped() {
        let html = r#"<ul id="across"><li>0. Title row</li><li>00. Also not a clue</li><li>7. Real</li></ul>"#;
        let clues = extract(html).unwrap();
        assert_eq!(clues.across, vec![Clue::bare(7, "Real", Direction::Across)]);
        assert!(extract(r#"<ul id="down"><li>0. Only zero</li></ul>"#).is_none());
    }

    #[test]
    fn many_sections_and_deep_nesting_stay_fast() {
        let html = format!(
            "{}<div class=\"down\">{}<li>1. Deep</li>{}</div>",
            "<p class=\"across\">x</p>".repeat(20_000),
            "<div>".repeat(20_000),
            "</div>".repeat(20_000)
        );
        let started = std::time::Instant::now();
        let clues = extract(&html).unwrap();
        assert!(started.elapsed() < std::time::Duration::from_secs(5));
        assert!(clues.across.is_empty());
        assert_eq!(clues.down, vec![Clue::bare(1, "Deep", Direction::Down)]);
    }

    #[test]
    fn sections_without_numbered_items() {
        assert!(extract(r#"<div class="across"><li>Capital of France</li></div>"#).is_none());
        assert!(extract("<ul><li>1. Orphan</li></ul>").is_none());
    }
}
