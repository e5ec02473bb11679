// src/store.rs
//! In-memory record store for cases, evidence, and in-app notifications.
//!
//! This is the crate's persistence seam; the surrounding product keeps these
//! records in a relational database, which is out of scope here. The store
//! enforces the evidence status invariant: transitions only move forward,
//! and extraction fields are written exactly once per processing run.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::RwLock;

use chrono::{NaiveDate, Utc};
use thiserror::Error;

use crate::extract::ProcessingResult;
use crate::model::{
    Case, CaseCategory, CaseId, EvidenceId, EvidenceItem, EvidenceKind, EvidenceStatus,
    MeritAnalysis, UserId,
};
use crate::notify::NotificationEvent;

#[derive(Debug, Error, PartialEq)]
pub enum StoreError {
    #[error("case {0} not found")]
    CaseNotFound(CaseId),
    #[error("evidence {0} not found")]
    EvidenceNotFound(EvidenceId),
    #[error("illegal status transition {from:?} -> {to:?}")]
    IllegalTransition {
        from: EvidenceStatus,
        to: EvidenceStatus,
    },
}

/// Fields supplied by the caller when opening a case.
#[derive(Debug, Clone)]
pub struct NewCase {
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
}

/// Fields supplied when registering an uploaded artifact.
#[derive(Debug, Clone)]
pub struct NewEvidence {
    pub case_id: CaseId,
    pub owner: UserId,
    pub file_path: PathBuf,
    pub original_filename: String,
    pub kind: EvidenceKind,
}

#[derive(Debug, Default)]
pub struct CaseStore {
    cases: RwLock<HashMap<CaseId, Case>>,
    evidence: RwLock<HashMap<EvidenceId, EvidenceItem>>,
    notifications: RwLock<HashMap<UserId, Vec<NotificationEvent>>>,
    next_case_id: AtomicU64,
    next_evidence_id: AtomicU64,
}

impl CaseStore {
    pub fn new() -> Self {
        Self {
            next_case_id: AtomicU64::new(1),
            next_evidence_id: AtomicU64::new(1),
            ..Self::default()
        }
    }

    // ---- cases ----

    pub fn insert_case(&self, new: NewCase) -> Case {
        let id = self.next_case_id.fetch_add(1, Ordering::Relaxed);
        let case = Case {
            id,
            owner: new.owner,
            title: new.title,
            description: new.description,
            category: new.category,
            province: new.province,
            jurisdiction: new.jurisdiction,
            court_name: new.court_name,
            incident_date: new.incident_date,
            filing_deadline: new.filing_deadline,
            hearing_date: new.hearing_date,
            created_at: Utc::now(),
            merit: None,
        };
        self.cases
            .write()
            .expect("cases lock poisoned")
            .insert(id, case.clone());
        case
    }

    pub fn case(&self, id: CaseId) -> Option<Case> {
        self.cases
            .read()
            .expect("cases lock poisoned")
            .get(&id)
            .cloned()
    }

    /// Write the latest merit snapshot's summary fields onto the case.
    /// Last writer wins; concurrent scoring runs are not serialized.
    pub fn apply_merit(&self, id: CaseId, analysis: &MeritAnalysis) -> Result<(), StoreError> {
        let mut cases = self.cases.write().expect("cases lock poisoned");
        let case = cases.get_mut(&id).ok_or(StoreError::CaseNotFound(id))?;
        case.merit = Some(analysis.summary());
        Ok(())
    }

    // ---- evidence ----

    pub fn insert_evidence(&self, new: NewEvidence) -> Result<EvidenceItem, StoreError> {
        if self.case(new.case_id).is_none() {
            return Err(StoreError::CaseNotFound(new.case_id));
        }
        let id = self.next_evidence_id.fetch_add(1, Ordering::Relaxed);
        let item = EvidenceItem {
            id,
            case_id: new.case_id,
            owner: new.owner,
            file_path: new.file_path,
            original_filename: new.original_filename,
            file_hash: None,
            kind: new.kind,
            status: EvidenceStatus::Pending,
            extracted_text: None,
            word_count: 0,
            identified_dates: Vec::new(),
            identified_names: Vec::new(),
            legal_keywords: Vec::new(),
            relevance_score: 0.0,
            summary: None,
            relevance_indicators: Vec::new(),
            extraction: None,
            uploaded_at: Utc::now(),
            processed_at: None,
            analyzed_at: None,
        };
        self.evidence
            .write()
            .expect("evidence lock poisoned")
            .insert(id, item.clone());
        Ok(item)
    }

    pub fn evidence(&self, id: EvidenceId) -> Option<EvidenceItem> {
        self.evidence
            .read()
            .expect("evidence lock poisoned")
            .get(&id)
            .cloned()
    }

    pub fn evidence_for_case(&self, case_id: CaseId) -> Vec<EvidenceItem> {
        let mut items: Vec<EvidenceItem> = self
            .evidence
            .read()
            .expect("evidence lock poisoned")
            .values()
            .filter(|e| e.case_id == case_id)
            .cloned()
            .collect();
        items.sort_by_key(|e| e.id);
        items
    }

    pub fn advance_status(
        &self,
        id: EvidenceId,
        next: EvidenceStatus,
    ) -> Result<(), StoreError> {
        let mut evidence = self.evidence.write().expect("evidence lock poisoned");
        let item = evidence
            .get_mut(&id)
            .ok_or(StoreError::EvidenceNotFound(id))?;
        if !item.status.can_advance_to(next) {
            return Err(StoreError::IllegalTransition {
                from: item.status,
                to: next,
            });
        }
        item.status = next;
        Ok(())
    }

    /// Populate extraction fields and advance to `Processed` in one step.
    pub fn record_processed(
        &self,
        id: EvidenceId,
        result: &ProcessingResult,
        relevance: f64,
        file_hash: String,
    ) -> Result<(), StoreError> {
        let mut evidence = self.evidence.write().expect("evidence lock poisoned");
        let item = evidence
            .get_mut(&id)
            .ok_or(StoreError::EvidenceNotFound(id))?;
        if !item.status.can_advance_to(EvidenceStatus::Processed) {
            return Err(StoreError::IllegalTransition {
                from: item.status,
                to: EvidenceStatus::Processed,
            });
        }
        item.extracted_text = Some(result.text.clone());
        item.word_count = result.word_count;
        item.identified_dates = result.dates.clone();
        item.identified_names = result.names.clone();
        item.legal_keywords = result.keywords.clone();
        item.summary = Some(result.summary.clone());
        item.relevance_indicators = result.indicators.clone();
        item.extraction = Some(result.meta.clone());
        item.relevance_score = relevance;
        item.file_hash = Some(file_hash);
        item.status = EvidenceStatus::Processed;
        item.processed_at = Some(Utc::now());
        Ok(())
    }

    /// Apply the optional advisory enhancement and advance to `Analyzed`.
    pub fn record_enhanced(
        &self,
        id: EvidenceId,
        summary: String,
        relevance: Option<f64>,
    ) -> Result<(), StoreError> {
        let mut evidence = self.evidence.write().expect("evidence lock poisoned");
        let item = evidence
            .get_mut(&id)
            .ok_or(StoreError::EvidenceNotFound(id))?;
        if !item.status.can_advance_to(EvidenceStatus::Analyzed) {
            return Err(StoreError::IllegalTransition {
                from: item.status,
                to: EvidenceStatus::Analyzed,
            });
        }
        item.summary = Some(summary);
        if let Some(r) = relevance {
            item.relevance_score = r.clamp(0.0, 1.0);
        }
        item.status = EvidenceStatus::Analyzed;
        item.analyzed_at = Some(Utc::now());
        Ok(())
    }

    /// Mark a processing run as failed. Fields written before the failure
    /// point are left as-is.
    pub fn record_error(&self, id: EvidenceId) -> Result<(), StoreError> {
        self.advance_status(id, EvidenceStatus::Error)
    }

    /// Explicit reprocess request: reset the item back to `Pending` and clear
    /// prior extraction output so the run writes fresh fields.
    pub fn reset_for_reprocess(&self, id: EvidenceId) -> Result<(), StoreError> {
        let mut evidence = self.evidence.write().expect("evidence lock poisoned");
        let item = evidence
            .get_mut(&id)
            .ok_or(StoreError::EvidenceNotFound(id))?;
        item.status = EvidenceStatus::Pending;
        item.extracted_text = None;
        item.word_count = 0;
        item.identified_dates.clear();
        item.identified_names.clear();
        item.legal_keywords.clear();
        item.relevance_score = 0.0;
        item.summary = None;
        item.relevance_indicators.clear();
        item.extraction = None;
        item.processed_at = None;
        item.analyzed_at = None;
        Ok(())
    }

    /// Owner-initiated deletion; the caller is responsible for removing the
    /// underlying file.
    pub fn delete_evidence(&self, id: EvidenceId) -> Option<EvidenceItem> {
        self.evidence
            .write()
            .expect("evidence lock poisoned")
            .remove(&id)
    }

    // ---- notifications ----

    pub fn push_notification(&self, ev: NotificationEvent) {
        self.notifications
            .write()
            .expect("notifications lock poisoned")
            .entry(ev.user)
            .or_default()
            .push(ev);
    }

    pub fn notifications_for(&self, user: UserId) -> Vec<NotificationEvent> {
        self.notifications
            .read()
            .expect("notifications lock poisoned")
            .get(&user)
            .cloned()
            .unwrap_or_default()
    }
}
