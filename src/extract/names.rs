// src/extract/names.rs
//! Candidate name extraction using a capitalized-word heuristic.
//!
//! This deliberately over-matches (court forms capitalize many things), so
//! matches are filtered against a denylist of boilerplate phrases and folded
//! for near-duplicates before being returned.

use once_cell::sync::Lazy;
use regex::Regex;
use strsim::jaro_winkler;

pub const MAX_NAMES: usize = 10;

/// Above this similarity two candidates are considered the same person.
const NEAR_DUP_THRESHOLD: f64 = 0.94;

static PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    vec![
        // Firstname M. Lastname — checked first so the full form wins.
        Regex::new(r"\b[A-Z][a-z]+\s+[A-Z]\.\s+[A-Z][a-z]+\b").expect("middle initial regex"),
        // Firstname Lastname
        Regex::new(r"\b[A-Z][a-z]+\s+[A-Z][a-z]+\b").expect("two-word name regex"),
    ]
});

/// Form-boilerplate phrases the heuristic reliably false-positives on.
const DENYLIST: &[&str] = &[
    "Dear Sir",
    "Dear Madam",
    "Yours Truly",
    "Best Regards",
    "Kind Regards",
    "Thank You",
    "Legal Aid",
    "Family Court",
    "Superior Court",
    "Provincial Court",
    "Supreme Court",
    "Court Order",
    "Child Protection",
    "Notice To",
    "Statement Of",
    "Affidavit Of",
    "Form Number",
    "Page Number",
    "New Brunswick",
    "Nova Scotia",
    "Prince Edward",
    "British Columbia",
];

fn denied(candidate: &str) -> bool {
    DENYLIST.iter().any(|d| candidate.eq_ignore_ascii_case(d))
}

fn contained_in(candidate: &str, kept: &[String]) -> bool {
    kept.iter().any(|k| {
        k == candidate
            || k.contains(candidate)
            || jaro_winkler(k, candidate) >= NEAR_DUP_THRESHOLD
    })
}

/// Returns up to [`MAX_NAMES`] distinct person-name candidates.
pub fn extract_names(text: &str) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for re in PATTERNS.iter() {
        for m in re.find_iter(text) {
            let candidate = m.as_str();
            if candidate.split_whitespace().count() > 3 {
                continue;
            }
            if denied(candidate) || contained_in(candidate, &out) {
                continue;
            }
            out.push(candidate.to_string());
            if out.len() >= MAX_NAMES {
                return out;
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn finds_plain_and_middle_initial_names() {
        let out = extract_names("John Smith filed against Jane A. Doe");
        let got: HashSet<&str> = out.iter().map(String::as_str).collect();
        let want: HashSet<&str> = ["John Smith", "Jane A. Doe"].into_iter().collect();
        assert_eq!(got, want);
    }

    #[test]
    fn drops_boilerplate_phrases() {
        let out = extract_names("Yours Truly, Mary Brown. Superior Court of Ontario.");
        assert_eq!(out, vec!["Mary Brown".to_string()]);
    }

    #[test]
    fn folds_near_duplicates() {
        let out = extract_names("Robert Johnson met Robert Johnsen twice.");
        assert_eq!(out.len(), 1);
    }

    #[test]
    fn dedupes_exact_repeats() {
        let out = extract_names("Anne Clark, then Anne Clark again");
        assert_eq!(out, vec!["Anne Clark".to_string()]);
    }
}
