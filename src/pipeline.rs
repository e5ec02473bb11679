// src/pipeline.rs
//! Evidence intake pipeline: file check, per-format extraction, lexical
//! analysis, relevance scoring, and the optional advisory enhancement step.
//!
//! Submissions go over an mpsc channel to a background worker; callers never
//! block on extraction and observe completion through the stored status and
//! the emitted notification. There is no cancellation of in-flight work.

use std::path::Path;
use std::sync::Arc;

use metrics::{counter, describe_counter};
use once_cell::sync::OnceCell;
use sha2::{Digest, Sha256};
use thiserror::Error;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::advisory::{AdvisoryOutcome, DynAdvisoryClient};
use crate::extract::{self, ExtractError, OcrEngine, PdfReader, ProcessingResult};
use crate::model::{EvidenceId, EvidenceItem, EvidenceKind, EvidenceStatus, ExtractionMeta};
use crate::notify::{NotificationEvent, NotificationKind, NotifierMux};
use crate::store::{CaseStore, StoreError};

#[derive(Debug, Error)]
pub enum ProcessError {
    #[error("evidence {0} not found")]
    NotFound(EvidenceId),
    #[error("stored file missing: {0}")]
    FileMissing(String),
    #[error("no extraction path for {0:?} evidence")]
    UnsupportedKind(EvidenceKind),
    #[error("evidence {id} is {status:?}; pass reprocess=true to run again")]
    AlreadyProcessed {
        id: EvidenceId,
        status: EvidenceStatus,
    },
    #[error(transparent)]
    Extraction(#[from] ExtractError),
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// One-time metrics registration (so series show up on /metrics).
fn ensure_metrics_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!(
            "evidence_submitted_total",
            "Evidence items submitted to the intake worker."
        );
        describe_counter!(
            "evidence_processed_total",
            "Evidence items successfully processed."
        );
        describe_counter!(
            "evidence_enhanced_total",
            "Evidence items enhanced by the advisory service."
        );
        describe_counter!(
            "evidence_errors_total",
            "Evidence processing runs that ended in error."
        );
    });
}

pub struct EvidencePipeline {
    store: Arc<CaseStore>,
    pdf: Box<dyn PdfReader>,
    ocr: Box<dyn OcrEngine>,
    advisory: DynAdvisoryClient,
    notifier: NotifierMux,
}

impl EvidencePipeline {
    pub fn new(
        store: Arc<CaseStore>,
        pdf: Box<dyn PdfReader>,
        ocr: Box<dyn OcrEngine>,
        advisory: DynAdvisoryClient,
        notifier: NotifierMux,
    ) -> Self {
        ensure_metrics_described();
        Self {
            store,
            pdf,
            ocr,
            advisory,
            notifier,
        }
    }

    /// Run one full intake for an evidence item. Idempotent guard: an item
    /// past `Pending` is rejected unless `reprocess` is set, so repeated
    /// submissions neither duplicate notifications nor overwrite fields.
    pub async fn process(&self, id: EvidenceId, reprocess: bool) -> Result<(), ProcessError> {
        let item = self
            .store
            .evidence(id)
            .ok_or(ProcessError::NotFound(id))?;

        let item = if item.status == EvidenceStatus::Pending {
            item
        } else if reprocess {
            self.store.reset_for_reprocess(id)?;
            self.store.evidence(id).ok_or(ProcessError::NotFound(id))?
        } else {
            return Err(ProcessError::AlreadyProcessed {
                id,
                status: item.status,
            });
        };

        self.store
            .advance_status(id, EvidenceStatus::Processing)?;

        match self.run_extraction(&item).await {
            Ok(()) => Ok(()),
            Err(e) => {
                counter!("evidence_errors_total").increment(1);
                // Best-effort: the item may already be past the point where
                // Error is reachable, which we don't want to mask.
                if let Err(se) = self.store.record_error(id) {
                    tracing::warn!(evidence = id, error = %se, "could not record error status");
                }
                self.notifier
                    .notify(&NotificationEvent::new(
                        item.owner,
                        NotificationKind::EvidenceFailed,
                        format!(
                            "We could not process \"{}\": {e}",
                            item.original_filename
                        ),
                    ))
                    .await;
                Err(e)
            }
        }
    }

    async fn run_extraction(&self, item: &EvidenceItem) -> Result<(), ProcessError> {
        // The file is expected to exist at time of call; absence is fatal,
        // not a retry condition.
        if !item.file_path.exists() {
            return Err(ProcessError::FileMissing(
                item.file_path.display().to_string(),
            ));
        }
        let file_hash = hash_file(&item.file_path)?;

        let (raw, meta) = match item.kind {
            EvidenceKind::Document => self.extract_pdf(&item.file_path)?,
            EvidenceKind::Image => self.extract_image(&item.file_path)?,
            other => return Err(ProcessError::UnsupportedKind(other)),
        };

        let result = extract::analyze_text(&raw, meta);
        let relevance = extract::relevance_score(&result);

        self.store
            .record_processed(item.id, &result, relevance, file_hash)?;
        counter!("evidence_processed_total").increment(1);
        tracing::info!(
            evidence = item.id,
            case = item.case_id,
            words = result.word_count,
            keywords = result.keywords.len(),
            relevance,
            "evidence processed"
        );

        self.notifier
            .notify(&NotificationEvent::new(
                item.owner,
                NotificationKind::EvidenceProcessed,
                format!("\"{}\" processed: {}", item.original_filename, result.summary),
            ))
            .await;

        // Optional enhancement; never fatal, never regresses the status.
        self.enhance(item, &result).await;
        Ok(())
    }

    fn extract_pdf(&self, path: &Path) -> Result<(String, ExtractionMeta), ProcessError> {
        let doc = self.pdf.read(path)?;
        let page_count = doc.pages.len();
        let mut pages_skipped = 0usize;
        let mut text = String::new();
        for (i, page) in doc.pages.iter().enumerate() {
            match page {
                Some(p) => {
                    text.push_str(&format!("--- Page {} ---\n", i + 1));
                    text.push_str(p);
                    text.push('\n');
                }
                None => {
                    pages_skipped += 1;
                    tracing::warn!(page = i + 1, "skipping unreadable PDF page");
                }
            }
        }
        Ok((
            text,
            ExtractionMeta::Pdf {
                page_count,
                pages_skipped,
                title: doc.title,
                author: doc.author,
            },
        ))
    }

    fn extract_image(&self, path: &Path) -> Result<(String, ExtractionMeta), ProcessError> {
        let out = self.ocr.recognize(path)?;
        let meta = ExtractionMeta::Ocr {
            width: out.width,
            height: out.height,
            color_mode: out.color_mode,
            mean_confidence: out.mean_confidence,
        };
        Ok((out.text, meta))
    }

    /// Re-derive the summary from the advisory text service and, when it
    /// returns a numeric relevance, rescale and overwrite the stored score.
    /// Success advances the item to `Analyzed`; any failure leaves it at
    /// `Processed`.
    async fn enhance(&self, item: &EvidenceItem, result: &ProcessingResult) {
        if result.word_count == 0 {
            return;
        }
        let input = format!(
            "Summarize this piece of case evidence and rate its relevance.\n\n{}",
            result.text
        );
        match self.advisory.advise(&input).await {
            AdvisoryOutcome::Advice(advice) => {
                let relevance = Some(advice.score / 100.0);
                match self
                    .store
                    .record_enhanced(item.id, advice.summary, relevance)
                {
                    Ok(()) => {
                        counter!("evidence_enhanced_total").increment(1);
                        tracing::info!(evidence = item.id, "advisory enhancement applied");
                    }
                    Err(e) => {
                        tracing::warn!(evidence = item.id, error = %e, "enhancement not applied");
                    }
                }
            }
            AdvisoryOutcome::Unavailable => {
                tracing::debug!(evidence = item.id, "advisory unavailable; staying processed");
            }
        }
    }
}

fn hash_file(path: &Path) -> Result<String, ProcessError> {
    let bytes = std::fs::read(path)
        .map_err(|e| ProcessError::FileMissing(format!("{}: {e}", path.display())))?;
    let digest = Sha256::digest(&bytes);
    let mut out = String::with_capacity(64);
    for b in digest {
        use std::fmt::Write as _;
        let _ = write!(&mut out, "{b:02x}");
    }
    Ok(out)
}

// ------------------------------------------------------------
// Background worker
// ------------------------------------------------------------

#[derive(Debug, Clone, Copy)]
struct Job {
    evidence: EvidenceId,
    reprocess: bool,
}

/// Cheap cloneable handle for submitting work to the intake worker.
#[derive(Clone)]
pub struct PipelineHandle {
    tx: mpsc::Sender<Job>,
}

impl PipelineHandle {
    /// Fire-and-forget submission. Returns `false` when the worker is gone
    /// or the queue is full; callers surface that as a retryable condition.
    pub fn submit(&self, evidence: EvidenceId, reprocess: bool) -> bool {
        let ok = self
            .tx
            .try_send(Job {
                evidence,
                reprocess,
            })
            .is_ok();
        if ok {
            counter!("evidence_submitted_total").increment(1);
        }
        ok
    }
}

/// Spawn the intake worker; jobs are processed one at a time in submission
/// order.
pub fn spawn_worker(pipeline: EvidencePipeline) -> (PipelineHandle, JoinHandle<()>) {
    let (tx, mut rx) = mpsc::channel::<Job>(256);
    let handle = tokio::spawn(async move {
        while let Some(job) = rx.recv().await {
            if let Err(e) = pipeline.process(job.evidence, job.reprocess).await {
                tracing::warn!(evidence = job.evidence, error = %e, "intake run failed");
            }
        }
    });
    (PipelineHandle { tx }, handle)
}
