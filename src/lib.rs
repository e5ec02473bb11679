// src/lib.rs
// Public library surface for integration tests (and potential reuse).

pub mod advisory;
pub mod api;
pub mod extract;
pub mod metrics;
pub mod model;
pub mod notify;
pub mod pipeline;
pub mod scoring;
pub mod store;

// ---- Re-exports for stable public API ----
pub use crate::api::{create_router, AppState};
pub use crate::model::{
    Case, CaseCategory, EvidenceItem, EvidenceKind, EvidenceStatus, MeritAnalysis,
};
pub use crate::notify::{NotificationEvent, NotificationKind, NotifierMux};
pub use crate::pipeline::{spawn_worker, EvidencePipeline, PipelineHandle, ProcessError};
pub use crate::scoring::{MeritScorer, ScoreWeights};
pub use crate::store::{CaseStore, NewCase, NewEvidence};
