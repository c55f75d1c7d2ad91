//! Splits a filing's text into its `Item` sections.
//!
//! Headings look like `ITEM 1A.` (any case, any whitespace between the word
//! and the label). Each heading opens a section that runs until the next
//! heading of any label, so unrecognized items still act as boundaries.
//! Only the labels in [`SECTION_KEYS`] end up in the output.
//!
//! A label that appears several times, typically once in the table of contents
//! and once in the body, keeps the content of its last occurrence.

use regex::Regex;
use std::collections::BTreeMap;
use std::sync::LazyLock;

/// Canonical section key → normalized text.
pub type Sections = BTreeMap<String, String>;

/// Recognized item labels and their output keys, in document order.
pub const SECTION_KEYS: &[(&str, &str)] = &[
    ("1", "item_1"),
    ("1A", "item_1a"),
    ("2", "item_2"),
    ("3", "item_3"),
    ("4", "item_4"),
    ("7", "item_7"),
    ("7A", "item_7a"),
    ("9A", "item_9a"),
];

static ITEM_HEADING: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)ITEM\s+(\d+[A-Z]?)\.").expect("item heading pattern"));

// Any whitespace except the line break itself.
static HORIZONTAL_SPACE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^\S\n]+").expect("horizontal space pattern"));

/// Output key for an item label (`"1a"` → `item_1a`), if the label is recognized.
pub fn section_key(label: &str) -> Option<&'static str> {
    SECTION_KEYS
        .iter()
        .find(|(known, _)| known.eq_ignore_ascii_case(label))
        .map(|(_, key)| *key)
}

#[derive(Debug)]
struct Heading {
    label: String,
    start: usize,
    end: usize,
}

fn headings(text: &str) -> Vec<Heading> {
    ITEM_HEADING
        .captures_iter(text)
        .filter_map(|caps| {
            let whole = caps.get(0)?;
            let label = caps.get(1)?;
            Some(Heading {
                label: label.as_str().to_ascii_uppercase(),
                start: whole.start(),
                end: whole.end(),
            })
        })
        .collect()
}

/// Segments `text` into recognized sections.
///
/// Returns an empty map when the text has no headings. Sections whose body
/// normalizes to nothing are skipped and do not replace an earlier occurrence.
pub fn segment(text: &str) -> Sections {
    let headings = headings(text);
    let mut sections = Sections::new();

    for (idx, heading) in headings.iter().enumerate() {
        let Some(key) = section_key(&heading.label) else {
            continue;
        };
        let stop = headings
            .get(idx + 1)
            .map_or(text.len(), |next| next.start);

        let content = normalize_block(&text[heading.end..stop]);
        if content.is_empty() {
            continue;
        }
        sections.insert(key.to_string(), content);
    }

    sections
}

/// Normalizes a block of extracted text.
///
/// Line endings become `\n`, runs of horizontal whitespace become one space,
/// every line is trimmed, runs of blank lines shrink to a single blank line,
/// and leading and trailing blank lines are dropped.
pub fn normalize_block(content: &str) -> String {
    let unified = content.replace("\r\n", "\n").replace('\r', "\n");

    let mut lines: Vec<String> = Vec::new();
    let mut pending_blank = false;
    for raw in unified.split('\n') {
        let line = HORIZONTAL_SPACE.replace_all(raw, " ");
        let line = line.trim();
        if line.is_empty() {
            pending_blank = !lines.is_empty();
            continue;
        }
        if pending_blank {
            lines.push(String::new());
            pending_blank = false;
        }
        lines.push(line.to_string());
    }

    lines.join("\n")
}
