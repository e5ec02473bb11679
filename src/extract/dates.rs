// src/extract/dates.rs
//! Candidate date extraction over a fixed set of formats.

use once_cell::sync::Lazy;
use regex::Regex;

pub const MAX_DATES: usize = 10;

const MONTHS: &str = "january|february|march|april|may|june|july|august|september|october|november|december";

static PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    vec![
        // MM/DD/YYYY
        Regex::new(r"\b\d{1,2}/\d{1,2}/\d{4}\b").expect("slash date regex"),
        // YYYY-MM-DD
        Regex::new(r"\b\d{4}-\d{2}-\d{2}\b").expect("iso date regex"),
        // Month DD, YYYY
        Regex::new(&format!(r"(?i)\b(?:{MONTHS})\s+\d{{1,2}},\s*\d{{4}}\b"))
            .expect("long date regex"),
        // DD Month YYYY
        Regex::new(&format!(r"(?i)\b\d{{1,2}}\s+(?:{MONTHS})\s+\d{{4}}\b"))
            .expect("day-first date regex"),
    ]
});

/// Returns distinct date strings as they appear in the text, capped at
/// [`MAX_DATES`]. Values are not parsed or reformatted; downstream consumers
/// treat them as display strings.
pub fn extract_dates(text: &str) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for re in PATTERNS.iter() {
        for m in re.find_iter(text) {
            let s = m.as_str().to_string();
            if !out.iter().any(|d| d.eq_ignore_ascii_case(&s)) {
                out.push(s);
            }
            if out.len() >= MAX_DATES {
                return out;
            }
        }
    }
    out
}
