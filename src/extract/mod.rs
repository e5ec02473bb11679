// src/extract/mod.rs
//! Evidence intake: turns raw extracted text into structured lexical signal
//! (dates, names, legal keywords, a length-banded summary, relevance
//! indicators) and an initial relevance estimate.

pub mod dates;
pub mod keywords;
pub mod names;
pub mod readers;
pub mod text;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::model::ExtractionMeta;

// Re-export the pieces callers normally need.
pub use crate::extract::readers::{
    DisabledOcrEngine, DisabledPdfReader, ExtractError, FixtureOcrEngine, FixturePdfReader,
    OcrEngine, OcrOutput, PdfDocument, PdfReader,
};

/// Structured output of one intake run over a single evidence item.
#[derive(Debug, Clone)]
pub struct ProcessingResult {
    pub text: String,
    pub word_count: usize,
    pub dates: Vec<String>,
    pub names: Vec<String>,
    pub keywords: Vec<String>,
    pub summary: String,
    pub indicators: Vec<String>,
    pub meta: ExtractionMeta,
}

/// Run the uniform post-processing over raw extracted text.
pub fn analyze_text(raw: &str, meta: ExtractionMeta) -> ProcessingResult {
    let normalized = text::normalize(raw);
    let word_count = text::word_count(&normalized);
    let dates = dates::extract_dates(&normalized);
    let names = names::extract_names(&normalized);
    let keywords = keywords::match_keywords(&normalized);
    let summary = summarize(word_count);
    let indicators = relevance_indicators(&normalized, &keywords);

    ProcessingResult {
        text: normalized,
        word_count,
        dates,
        names,
        keywords,
        summary,
        indicators,
        meta,
    }
}

/// Deterministic relevance estimate, additive with per-signal caps.
pub fn relevance_score(result: &ProcessingResult) -> f64 {
    let mut score = 0.0;
    if result.word_count > 0 {
        score += 0.30;
    }
    score += (result.keywords.len() as f64 * 0.10).min(0.40);
    score += (result.dates.len() as f64 * 0.05).min(0.20);
    score += (result.names.len() as f64 * 0.02).min(0.10);
    score.clamp(0.0, 1.0)
}

/// Length classifier with canned phrasing; not semantic summarization.
pub fn summarize(word_count: usize) -> String {
    match word_count {
        0 => "No readable text was extracted from this file.".to_string(),
        1..=99 => format!("Short document, {word_count} words."),
        100..=499 => format!("Medium-length document, {word_count} words."),
        _ => format!("Substantial document, {word_count} words."),
    }
}

static RE_CURRENCY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\$\s?\d[\d,]*(?:\.\d{2})?").expect("currency regex"));

const FAMILY_TERMS: &[&str] = &["child", "children", "parent", "mother", "father", "family"];
const COURT_TERMS: &[&str] = &["court", "judge", "justice", "hearing", "trial"];
const PROTECTION_TERMS: &[&str] = &[
    "children's aid",
    "child protection",
    "apprehension",
    "foster care",
    "society worker",
];

/// Shallow lexical triggers; each appends one fixed-text indicator and may
/// fire independently of the others.
pub fn relevance_indicators(normalized: &str, keywords: &[String]) -> Vec<String> {
    let haystack = normalized.to_lowercase();
    let mut out = Vec::new();

    if !keywords.is_empty() {
        out.push("Contains legal terminology".to_string());
    }
    if FAMILY_TERMS.iter().any(|t| haystack.contains(t)) {
        out.push("References family or children".to_string());
    }
    if COURT_TERMS.iter().any(|t| haystack.contains(t)) {
        out.push("References court proceedings".to_string());
    }
    if PROTECTION_TERMS.iter().any(|t| haystack.contains(t)) {
        out.push("References child protection involvement".to_string());
    }
    if RE_CURRENCY.is_match(normalized) {
        out.push("Mentions monetary amounts".to_string());
    }
    out
}
