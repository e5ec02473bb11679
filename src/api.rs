// src/api.rs
//! JSON API surface. Thin handlers over the store, pipeline handle, and
//! scorer; no business logic lives here.

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tower_http::cors::CorsLayer;

use crate::model::{
    Case, CaseCategory, CaseId, EvidenceId, EvidenceItem, EvidenceKind, EvidenceStatus, UserId,
};
use crate::notify::{NotificationEvent, NotificationKind};
use crate::pipeline::PipelineHandle;
use crate::scoring::MeritScorer;
use crate::store::{CaseStore, NewCase, NewEvidence};

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<CaseStore>,
    pub pipeline: PipelineHandle,
    pub scorer: Arc<MeritScorer>,
}

impl AppState {
    pub fn new(store: Arc<CaseStore>, pipeline: PipelineHandle, scorer: Arc<MeritScorer>) -> Self {
        Self {
            store,
            pipeline,
            scorer,
        }
    }
}

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(|| async { "ok" }))
        .route("/cases", post(create_case))
        .route("/cases/{id}", get(get_case))
        .route("/cases/{id}/evidence", post(register_evidence))
        .route("/cases/{id}/score", post(score_case))
        .route("/evidence/{id}", get(get_evidence).delete(delete_evidence))
        .route("/evidence/{id}/process", post(submit_process))
        .route("/users/{id}/notifications", get(list_notifications))
        .layer(CorsLayer::very_permissive())
        .with_state(state)
}

#[derive(Deserialize)]
struct CreateCaseReq {
    owner: UserId,
    title: String,
    description: String,
    category: CaseCategory,
    province: String,
    #[serde(default)]
    jurisdiction: Option<String>,
    #[serde(default)]
    court_name: Option<String>,
    #[serde(default)]
    incident_date: Option<NaiveDate>,
    #[serde(default)]
    filing_deadline: Option<NaiveDate>,
    #[serde(default)]
    hearing_date: Option<NaiveDate>,
}

async fn create_case(
    State(state): State<AppState>,
    Json(body): Json<CreateCaseReq>,
) -> (StatusCode, Json<Case>) {
    let case = state.store.insert_case(NewCase {
        owner: body.owner,
        title: body.title,
        description: body.description,
        category: body.category,
        province: body.province,
        jurisdiction: body.jurisdiction,
        court_name: body.court_name,
        incident_date: body.incident_date,
        filing_deadline: body.filing_deadline,
        hearing_date: body.hearing_date,
    });
    (StatusCode::CREATED, Json(case))
}

async fn get_case(State(state): State<AppState>, Path(id): Path<CaseId>) -> Response {
    match state.store.case(id) {
        Some(case) => Json(case).into_response(),
        None => (StatusCode::NOT_FOUND, "case not found").into_response(),
    }
}

#[derive(Deserialize)]
struct RegisterEvidenceReq {
    owner: UserId,
    /// Path of the already-stored upload; upload validation and secure
    /// filename generation happen upstream.
    file_path: String,
    original_filename: String,
    kind: EvidenceKind,
}

#[derive(Serialize)]
struct RegisterEvidenceResp {
    evidence: EvidenceItem,
    /// Whether the item was queued for processing right away.
    submitted: bool,
}

async fn register_evidence(
    State(state): State<AppState>,
    Path(case_id): Path<CaseId>,
    Json(body): Json<RegisterEvidenceReq>,
) -> Response {
    let item = match state.store.insert_evidence(NewEvidence {
        case_id,
        owner: body.owner,
        file_path: body.file_path.into(),
        original_filename: body.original_filename,
        kind: body.kind,
    }) {
        Ok(item) => item,
        Err(e) => return (StatusCode::NOT_FOUND, e.to_string()).into_response(),
    };

    let submitted = state.pipeline.submit(item.id, false);
    (
        StatusCode::ACCEPTED,
        Json(RegisterEvidenceResp {
            evidence: item,
            submitted,
        }),
    )
        .into_response()
}

async fn get_evidence(State(state): State<AppState>, Path(id): Path<EvidenceId>) -> Response {
    match state.store.evidence(id) {
        Some(item) => Json(item).into_response(),
        None => (StatusCode::NOT_FOUND, "evidence not found").into_response(),
    }
}

/// Owner-initiated deletion removes the record and the stored file. A file
/// that is already gone is not an error.
async fn delete_evidence(State(state): State<AppState>, Path(id): Path<EvidenceId>) -> Response {
    match state.store.delete_evidence(id) {
        Some(item) => {
            if let Err(e) = std::fs::remove_file(&item.file_path) {
                tracing::debug!(evidence = id, error = %e, "stored file not removed");
            }
            StatusCode::NO_CONTENT.into_response()
        }
        None => (StatusCode::NOT_FOUND, "evidence not found").into_response(),
    }
}

#[derive(Deserialize)]
struct ProcessQuery {
    #[serde(default)]
    reprocess: bool,
}

#[derive(Serialize)]
struct SubmitResp {
    submitted: bool,
}

async fn submit_process(
    State(state): State<AppState>,
    Path(id): Path<EvidenceId>,
    Query(q): Query<ProcessQuery>,
) -> Response {
    let Some(item) = state.store.evidence(id) else {
        return (StatusCode::NOT_FOUND, "evidence not found").into_response();
    };
    if item.status != EvidenceStatus::Pending && !q.reprocess {
        return (
            StatusCode::CONFLICT,
            format!(
                "evidence {id} is {:?}; pass reprocess=true to run again",
                item.status
            ),
        )
            .into_response();
    }

    let submitted = state.pipeline.submit(id, q.reprocess);
    let code = if submitted {
        StatusCode::ACCEPTED
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    (code, Json(SubmitResp { submitted })).into_response()
}

/// Structured scoring-failure body; the last-known-good score on the case is
/// left untouched when this is returned.
#[derive(Serialize)]
struct ScoreErrorBody {
    overall_score: f64,
    error: String,
}

async fn score_case(State(state): State<AppState>, Path(id): Path<CaseId>) -> Response {
    let Some(case) = state.store.case(id) else {
        return (StatusCode::NOT_FOUND, "case not found").into_response();
    };
    let evidence = state.store.evidence_for_case(id);

    let analysis = state.scorer.score(&case, &evidence).await;

    if let Err(e) = state.store.apply_merit(id, &analysis) {
        tracing::error!(case = id, error = %e, "failed to persist merit snapshot");
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ScoreErrorBody {
                overall_score: 0.0,
                error: e.to_string(),
            }),
        )
            .into_response();
    }

    state.store.push_notification(NotificationEvent::new(
        case.owner,
        NotificationKind::MeritScored,
        format!(
            "Case \"{}\" scored {:.1}/100",
            case.title, analysis.overall_score
        ),
    ));

    Json(analysis).into_response()
}

async fn list_notifications(
    State(state): State<AppState>,
    Path(user): Path<UserId>,
) -> Json<Vec<NotificationEvent>> {
    Json(state.store.notifications_for(user))
}
