// src/model.rs
//! Core domain types: cases, evidence items, and merit analysis snapshots.
//!
//! Status and category fields are proper sum types so illegal states are
//! unrepresentable; `EvidenceStatus` transitions are forward-only (the only
//! allowed regression is into `Error`).

use std::path::PathBuf;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

pub type UserId = u64;
pub type CaseId = u64;
pub type EvidenceId = u64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CaseCategory {
    ChildProtection,
    FamilyCourt,
    ParentalRights,
    Tribunal,
    Other,
}

impl CaseCategory {
    /// Multiplier applied to the combined merit score. Harder categories
    /// discount the raw weighted sum more aggressively.
    pub fn complexity_multiplier(self) -> f64 {
        match self {
            CaseCategory::Tribunal => 0.95,
            CaseCategory::ChildProtection => 0.90,
            CaseCategory::ParentalRights => 0.85,
            CaseCategory::FamilyCourt => 0.80,
            CaseCategory::Other => 0.70,
        }
    }

    /// Fixed adjustment used by the rule-based legal-strength fallback.
    pub fn legal_strength_adjustment(self) -> f64 {
        match self {
            CaseCategory::Tribunal => 10.0,
            CaseCategory::FamilyCourt => 5.0,
            CaseCategory::ChildProtection => 0.0,
            CaseCategory::ParentalRights => -5.0,
            CaseCategory::Other => -10.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EvidenceKind {
    Document,
    Image,
    Audio,
    Video,
    Email,
    Text,
    Other,
}

impl EvidenceKind {
    /// Per-kind importance multiplier for the evidence-quality sub-score.
    pub fn quality_weight(self) -> f64 {
        match self {
            EvidenceKind::Document => 1.0,
            EvidenceKind::Video => 0.95,
            EvidenceKind::Audio | EvidenceKind::Email => 0.90,
            EvidenceKind::Image => 0.80,
            EvidenceKind::Text => 0.60,
            EvidenceKind::Other => 0.50,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EvidenceStatus {
    Pending,
    Processing,
    Processed,
    Analyzed,
    Error,
}

impl EvidenceStatus {
    fn rank(self) -> u8 {
        match self {
            EvidenceStatus::Pending => 0,
            EvidenceStatus::Processing => 1,
            EvidenceStatus::Processed => 2,
            EvidenceStatus::Analyzed => 3,
            EvidenceStatus::Error => 4,
        }
    }

    /// Forward-only transitions. Any non-error status may fall into `Error`;
    /// `Error` is terminal (a reprocess request resets the item instead).
    pub fn can_advance_to(self, next: EvidenceStatus) -> bool {
        if self == EvidenceStatus::Error {
            return false;
        }
        if next == EvidenceStatus::Error {
            return true;
        }
        next.rank() > self.rank()
    }

    pub fn message(self) -> &'static str {
        match self {
            EvidenceStatus::Pending => "File uploaded, waiting for processing",
            EvidenceStatus::Processing => "Processing file content",
            EvidenceStatus::Processed => "File content extracted",
            EvidenceStatus::Analyzed => "Advisory analysis completed",
            EvidenceStatus::Error => "Error processing file",
        }
    }
}

/// Format-specific metadata captured during extraction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "method", rename_all = "snake_case")]
pub enum ExtractionMeta {
    Pdf {
        page_count: usize,
        pages_skipped: usize,
        title: Option<String>,
        author: Option<String>,
    },
    Ocr {
        width: u32,
        height: u32,
        color_mode: String,
        mean_confidence: f64,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Case {
    pub id: CaseId,
    pub owner: UserId,
    pub title: String,
    pub description: String,
    pub category: CaseCategory,
    pub province: String,
    pub jurisdiction: Option<String>,
    pub court_name: Option<String>,
    pub incident_date: Option<NaiveDate>,
    pub filing_deadline: Option<NaiveDate>,
    pub hearing_date: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
    /// Latest merit snapshot summary; `None` until first scored.
    pub merit: Option<MeritSummary>,
}

/// Summary fields of the last merit run stored on the case record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MeritSummary {
    pub overall_score: f64,
    pub breakdown: ScoreBreakdown,
    pub strengths: Vec<String>,
    pub weaknesses: Vec<String>,
    pub scored_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    pub evidence_quality: f64,
    pub evidence_quantity: f64,
    pub case_completeness: f64,
    pub legal_strength: f64,
    pub procedural: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvidenceItem {
    pub id: EvidenceId,
    pub case_id: CaseId,
    pub owner: UserId,
    pub file_path: PathBuf,
    pub original_filename: String,
    /// SHA-256 of the stored file, computed when the pipeline first reads it.
    pub file_hash: Option<String>,
    pub kind: EvidenceKind,
    pub status: EvidenceStatus,
    pub extracted_text: Option<String>,
    pub word_count: usize,
    pub identified_dates: Vec<String>,
    pub identified_names: Vec<String>,
    pub legal_keywords: Vec<String>,
    pub relevance_score: f64,
    pub summary: Option<String>,
    pub relevance_indicators: Vec<String>,
    pub extraction: Option<ExtractionMeta>,
    pub uploaded_at: DateTime<Utc>,
    pub processed_at: Option<DateTime<Utc>>,
    pub analyzed_at: Option<DateTime<Utc>>,
}

impl EvidenceItem {
    pub fn is_analyzed(&self) -> bool {
        self.status == EvidenceStatus::Analyzed
    }
}

/// Full result of one merit scoring run. Derived fresh on each invocation;
/// only `MeritSummary` fields are written back onto the case.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MeritAnalysis {
    pub overall_score: f64,
    pub breakdown: ScoreBreakdown,
    pub complexity_multiplier: f64,
    pub strengths: Vec<String>,
    pub weaknesses: Vec<String>,
    /// 1..=5, starts from 3 and moves with evidence volume and case detail.
    pub confidence_level: u8,
    pub recommendations: Vec<String>,
    pub generated_at: DateTime<Utc>,
}

impl MeritAnalysis {
    pub fn summary(&self) -> MeritSummary {
        MeritSummary {
            overall_score: self.overall_score,
            breakdown: self.breakdown,
            strengths: self.strengths.clone(),
            weaknesses: self.weaknesses.clone(),
            scored_at: self.generated_at,
        }
    }
}
