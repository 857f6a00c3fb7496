use std::collections::HashMap;
use std::sync::LazyLock;

use regex::Regex;

static SCRIPT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<script\b([^>]*)>(.*?)</script\s*>").unwrap());
static SRC_ATTR_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)\bsrc\s*=").unwrap());
static TAG_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?s)<[^>]*>").unwrap());
static ENTITY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"&(#[0-9]{1,7}|#[xX][0-9a-fA-F]{1,6}|[a-zA-Z]{2,8});").unwrap());
static WS_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());
static TAG_TOKEN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<(/?)([a-zA-Z][a-zA-Z0-9]*)\b([^>]*)>").unwrap());
// One attribute per match, value included, so quoted values are never re-scanned.
static ATTR_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"([^\s=/>"']+)(?:\s*=\s*(?:"([^"]*)"|'([^']*)'|([^\s"'>]+)))?"#).unwrap()
});

/// Bodies of every inline `<script>` block, in document order.
/// External scripts (`src=...`) and empty blocks are skipped.
pub fn inline_scripts(html: &str) -> Vec<&str> {
    SCRIPT_RE
        .captures_iter(html)
        .filter(|caps| !SRC_ATTR_RE.is_match(&caps[1]))
        .filter_map(|caps| caps.get(2))
        .map(|m| m.as_str())
        .filter(|body| !body.trim().is_empty())
        .collect()
}

/// An element located in raw markup: tag name, `class`/`id` values, its
/// inner content and the offset of its opening tag.
#[derive(Debug, Clone)]
pub struct Element<'a> {
    pub tag: String,
    pub attrs: String,
    pub inner: &'a str,
    pub start: usize,
}

#[derive(Debug)]
struct Tag {
    name: String,
    closing: bool,
    self_closing: bool,
    start: usize,
    end: usize,
    attrs: (usize, usize),
}

/// Tag index of a markup fragment. Every open tag's inner end is resolved
/// up front in one forward pass, so lookups never rescan the input.
#[derive(Debug)]
pub struct Markup<'a> {
    html: &'a str,
    tags: Vec<Tag>,
    /// Offset where each open tag's inner content ends; `None` for close tags.
    inner_end: Vec<Option<usize>>,
}

impl<'a> Markup<'a> {
    pub fn parse(html: &'a str) -> Self {
        let tags: Vec<Tag> = TAG_TOKEN_RE
            .captures_iter(html)
            .filter_map(|caps| {
                let whole = caps.get(0)?;
                let attrs = caps.get(3)?;
                Some(Tag {
                    name: caps[2].to_ascii_lowercase(),
                    closing: !caps[1].is_empty(),
                    self_closing: whole.as_str().ends_with("/>"),
                    start: whole.start(),
                    end: whole.end(),
                    attrs: (attrs.start(), attrs.end()),
                })
            })
            .collect();

        let mut inner_end: Vec<Option<usize>> = vec![None; tags.len()];
        let mut stack: Vec<usize> = Vec::new();
        let mut open_counts: HashMap<&str, usize> = HashMap::new();
        let mut open_li: Option<usize> = None;

        for (i, tag) in tags.iter().enumerate() {
            // Unclosed list items run to the next sibling or the end of the list.
            let ends_li = matches!(
                (tag.closing, tag.name.as_str()),
                (true, "li" | "ul" | "ol") | (false, "li")
            );
            if ends_li {
                if let Some(li) = open_li.take() {
                    inner_end[li] = Some(tag.start);
                }
            }

            if tag.closing {
                // stray close tags with nothing open to match are ignored
                if open_counts.get(tag.name.as_str()).copied().unwrap_or(0) == 0 {
                    continue;
                }
                while let Some(j) = stack.pop() {
                    let name = tags[j].name.as_str();
                    if let Some(n) = open_counts.get_mut(name) {
                        *n -= 1;
                    }
                    if name == tag.name {
                        if name != "li" {
                            inner_end[j] = Some(tag.start);
                        }
                        break;
                    }
                }
            } else if tag.self_closing {
                inner_end[i] = Some(tag.end);
            } else {
                if tag.name == "li" {
                    open_li = Some(i);
                }
                stack.push(i);
                *open_counts.entry(tag.name.as_str()).or_insert(0) += 1;
            }
        }

        Self {
            html,
            tags,
            inner_end,
        }
    }

    /// The first element whose `class` or `id` attribute satisfies `pred`.
    pub fn first_with_attr(&self, pred: impl Fn(&str) -> bool) -> Option<Element<'a>> {
        self.open_tags().find_map(|(i, tag)| {
            let values: Vec<&str> = self
                .attributes(tag)
                .filter(|(name, _)| {
                    name.eq_ignore_ascii_case("class") || name.eq_ignore_ascii_case("id")
                })
                .map(|(_, value)| value)
                .collect();
            if !values.iter().any(|&v| pred(v)) {
                return None;
            }
            Some(Element {
                tag: tag.name.clone(),
                attrs: values.join(" "),
                inner: self.inner(i),
                start: tag.start,
            })
        })
    }

    /// Inner content of elements of `tag`, or of elements of `tag` whose class
    /// satisfies `class_pred`, with their start offsets.
    pub fn elements_by_tag(
        &self,
        tag: &str,
        class_pred: Option<&dyn Fn(&str) -> bool>,
    ) -> Vec<(usize, &'a str)> {
        self.open_tags()
            .filter(|(_, t)| t.name.eq_ignore_ascii_case(tag))
            .filter(|(_, t)| match class_pred {
                Some(pred) => self
                    .attributes(t)
                    .any(|(name, value)| name.eq_ignore_ascii_case("class") && pred(value)),
                None => true,
            })
            .map(|(i, t)| (t.start, self.inner(i)))
            .collect()
    }

    fn open_tags(&self) -> impl Iterator<Item = (usize, &Tag)> {
        self.tags.iter().enumerate().filter(|(_, t)| !t.closing)
    }

    fn attributes(&self, tag: &Tag) -> impl Iterator<Item = (&'a str, &'a str)> {
        let html: &'a str = self.html;
        ATTR_RE.captures_iter(&html[tag.attrs.0..tag.attrs.1]).filter_map(|a| {
            let name = a.get(1)?.as_str();
            let value = a.get(2).or_else(|| a.get(3)).or_else(|| a.get(4))?;
            Some((name, value.as_str()))
        })
    }

    /// Runs to the end of input when the element is never closed.
    fn inner(&self, i: usize) -> &'a str {
        let from = self.tags[i].end;
        let to = self.inner_end[i].unwrap_or(self.html.len());
        &self.html[from..to]
    }
}


/// Visible text of a markup fragment: tags removed, entities decoded,
/// whitespace collapsed and trimmed.
pub fn text_content(fragment: &str) -> String {
    let stripped = TAG_RE.replace_all(fragment, " ");
    let decoded = decode_entities(&stripped);
    WS_RE.replace_all(&decoded, " ").trim().to_string()
}

pub fn decode_entities(s: &str) -> String {
    ENTITY_RE
        .replace_all(s, |caps: &regex::Captures| {
            let name = &caps[1];
            let decoded = if let Some(hex) = name
                .strip_prefix("#x")
                .or_else(|| name.strip_prefix("#X"))
            {
                u32::from_str_radix(hex, 16).ok().and_then(char::from_u32)
            } else if let Some(dec) = name.strip_prefix('#') {
                dec.parse::<u32>().ok().and_then(char::from_u32)
            } else {
                named_entity(name)
            };
            decoded
                .map(|c| c.to_string())
                .unwrap_or_else(|| caps[0].to_string())
        })
        .into_owned()
}

fn named_entity(name: &str) -> Option<char> {
    match name {
        "amp" => Some('&'),
        "lt" => Some('<'),
        "gt" => Some('>'),
        "quot" => Some('"'),
        "apos" => Some('\''),
        "nbsp" => Some(' '),
        "ndash" => Some('–'),
        "mdash" => Some('—'),
        "lsquo" => Some('‘'),
        "rsquo" => Some('’'),
        "ldquo" => Some('“'),
        "rdquo" => Some('”'),
        "hellip" => Some('…'),
        _ => None,
    }
}
