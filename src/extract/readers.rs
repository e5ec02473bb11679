// src/extract/readers.rs
//! Collaborator contracts for the file-format readers the pipeline dispatches
//! to: a PDF text-layer reader and an OCR engine. Real engines are wired in
//! by the host deployment; this crate ships a disabled variant (extraction
//! reports an error) and a fixture-backed variant for tests and local runs.

use std::fs;
use std::path::Path;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("no {0} engine configured")]
    EngineUnavailable(&'static str),
    #[error("extraction failed: {0}")]
    Failed(String),
}

/// Per-page output of the PDF text-layer reader. `None` marks a page whose
/// extraction threw; the pipeline skips it and logs, it is not fatal.
#[derive(Debug, Clone)]
pub struct PdfDocument {
    pub pages: Vec<Option<String>>,
    pub title: Option<String>,
    pub author: Option<String>,
}

pub trait PdfReader: Send + Sync {
    fn read(&self, path: &Path) -> Result<PdfDocument, ExtractError>;
    fn name(&self) -> &'static str;
}

#[derive(Debug, Clone)]
pub struct OcrOutput {
    pub text: String,
    /// Average per-token confidence reported by the engine, 0.0–1.0.
    pub mean_confidence: f64,
    pub width: u32,
    pub height: u32,
    pub color_mode: String,
}

pub trait OcrEngine: Send + Sync {
    fn recognize(&self, path: &Path) -> Result<OcrOutput, ExtractError>;
    fn name(&self) -> &'static str;
}

// ---- disabled variants ----

pub struct DisabledPdfReader;

impl PdfReader for DisabledPdfReader {
    fn read(&self, _path: &Path) -> Result<PdfDocument, ExtractError> {
        Err(ExtractError::EngineUnavailable("pdf"))
    }
    fn name(&self) -> &'static str {
        "disabled"
    }
}

pub struct DisabledOcrEngine;

impl OcrEngine for DisabledOcrEngine {
    fn recognize(&self, _path: &Path) -> Result<OcrOutput, ExtractError> {
        Err(ExtractError::EngineUnavailable("ocr"))
    }
    fn name(&self) -> &'static str {
        "disabled"
    }
}

// ---- fixture variants ----

/// Treats the stored file as a UTF-8 text fixture with form-feed separated
/// pages. A page consisting of the single marker `<unreadable>` simulates a
/// page whose text layer fails to parse.
pub struct FixturePdfReader;

impl PdfReader for FixturePdfReader {
    fn read(&self, path: &Path) -> Result<PdfDocument, ExtractError> {
        let raw = fs::read_to_string(path).map_err(|e| ExtractError::Failed(e.to_string()))?;
        let pages = raw
            .split('\u{0c}')
            .map(|p| {
                if p.trim() == "<unreadable>" {
                    None
                } else {
                    Some(p.to_string())
                }
            })
            .collect();
        Ok(PdfDocument {
            pages,
            title: None,
            author: None,
        })
    }
    fn name(&self) -> &'static str {
        "fixture"
    }
}

/// Treats the stored file as a UTF-8 transcript of the image's text.
pub struct FixtureOcrEngine;

impl OcrEngine for FixtureOcrEngine {
    fn recognize(&self, path: &Path) -> Result<OcrOutput, ExtractError> {
        let text = fs::read_to_string(path).map_err(|e| ExtractError::Failed(e.to_string()))?;
        Ok(OcrOutput {
            text,
            mean_confidence: 0.9,
            width: 0,
            height: 0,
            color_mode: "unknown".to_string(),
        })
    }
    fn name(&self) -> &'static str {
        "fixture"
    }
}

/// Pick readers from the environment: `EXTRACT_TEST_MODE=fixture` selects the
/// fixture-backed pair, anything else the disabled pair.
pub fn readers_from_env() -> (Box<dyn PdfReader>, Box<dyn OcrEngine>) {
    if std::env::var("EXTRACT_TEST_MODE")
        .map(|v| v == "fixture")
        .unwrap_or(false)
    {
        (Box::new(FixturePdfReader), Box::new(FixtureOcrEngine))
    } else {
        (Box::new(DisabledPdfReader), Box::new(DisabledOcrEngine))
    }
}
