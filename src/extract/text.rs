// src/extract/text.rs
//! Text normalization applied to every extraction source before the
//! lexical extractors run.

use once_cell::sync::Lazy;
use regex::Regex;

static RE_SPACES: Lazy<Regex> = Lazy::new(|| Regex::new(r"[ \t]+").expect("spaces regex"));
static RE_NEWLINES: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n{2,}").expect("newlines regex"));

/// Collapse whitespace runs to single spaces, strip non-printable characters
/// except newlines, and collapse repeated newlines to one.
pub fn normalize(raw: &str) -> String {
    let mut cleaned = String::with_capacity(raw.len());
    for ch in raw.chars() {
        match ch {
            '\n' => cleaned.push('\n'),
            '\r' => {}
            c if c.is_control() => cleaned.push(' '),
            c => cleaned.push(c),
        }
    }

    let collapsed = RE_SPACES.replace_all(&cleaned, " ");
    let collapsed = RE_NEWLINES.replace_all(&collapsed, "\n");

    collapsed
        .lines()
        .map(str::trim)
        .collect::<Vec<_>>()
        .join("\n")
        .trim()
        .to_string()
}

pub fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}
