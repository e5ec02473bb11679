// tests/pipeline_e2e.rs
//
// Full intake runs against the fixture readers: status transitions, error
// paths, the idempotence guard, and the background worker.

use std::sync::Arc;
use std::time::Duration;

use case_merit_engine::advisory::{
    AdvisoryCache, CachingClient, DisabledClient, DynAdvisoryClient, MockProvider,
};
use case_merit_engine::extract::{FixtureOcrEngine, FixturePdfReader};
use case_merit_engine::model::{
    CaseCategory, EvidenceItem, EvidenceKind, EvidenceStatus, ExtractionMeta,
};
use case_merit_engine::notify::inapp::InAppNotifier;
use case_merit_engine::notify::NotifierMux;
use case_merit_engine::pipeline::{spawn_worker, EvidencePipeline, ProcessError};
use case_merit_engine::store::{CaseStore, NewCase, NewEvidence};
use tempfile::TempDir;

const OWNER: u64 = 7;

fn store_with_case() -> (Arc<CaseStore>, u64) {
    let store = Arc::new(CaseStore::new());
    let case = store.insert_case(NewCase {
        owner: OWNER,
        title: "Access dispute".into(),
        description: "Denied scheduled access on multiple occasions.".into(),
        category: CaseCategory::FamilyCourt,
        province: "Ontario".into(),
        jurisdiction: None,
        court_name: None,
        incident_date: None,
        filing_deadline: None,
        hearing_date: None,
    });
    (store, case.id)
}

fn mock_advisory() -> DynAdvisoryClient {
    Arc::new(CachingClient::new(
        MockProvider::neutral(),
        AdvisoryCache::new(Duration::from_secs(60), 16),
        100,
    ))
}

fn pipeline(store: Arc<CaseStore>, advisory: DynAdvisoryClient) -> EvidencePipeline {
    let notifier = NotifierMux::new().push(Box::new(InAppNotifier::new(store.clone())));
    EvidencePipeline::new(
        store,
        Box::new(FixturePdfReader),
        Box::new(FixtureOcrEngine),
        advisory,
        notifier,
    )
}

fn register(
    store: &CaseStore,
    case_id: u64,
    dir: &TempDir,
    name: &str,
    contents: &str,
    kind: EvidenceKind,
) -> EvidenceItem {
    let path = dir.path().join(name);
    std::fs::write(&path, contents).unwrap();
    store
        .insert_evidence(NewEvidence {
            case_id,
            owner: OWNER,
            file_path: path,
            original_filename: name.into(),
            kind,
        })
        .unwrap()
}

#[tokio::test]
async fn document_run_with_advisory_ends_analyzed() {
    let dir = TempDir::new().unwrap();
    let (store, case_id) = store_with_case();
    let item = register(
        &store,
        case_id,
        &dir,
        "affidavit.pdf",
        "Affidavit of John Smith regarding custody, sworn 2023-04-15.",
        EvidenceKind::Document,
    );

    let p = pipeline(store.clone(), mock_advisory());
    p.process(item.id, false).await.unwrap();

    let after = store.evidence(item.id).unwrap();
    assert_eq!(after.status, EvidenceStatus::Analyzed);
    assert!(after.file_hash.is_some());
    assert!(after.word_count > 0);
    assert!(after.legal_keywords.iter().any(|k| k == "custody"));
    assert!(after.identified_names.iter().any(|n| n == "John Smith"));
    // Advisory enhancement rewrote the summary and rescaled relevance.
    assert_eq!(after.summary.as_deref(), Some("Neutral advisory summary (mock)"));
    assert!((after.relevance_score - 0.55).abs() < 1e-9);
    assert!(after.analyzed_at.is_some());

    let notes = store.notifications_for(OWNER);
    assert!(notes.iter().any(|n| n.message.contains("affidavit.pdf")));
}

#[tokio::test]
async fn document_run_without_advisory_stays_processed() {
    let dir = TempDir::new().unwrap();
    let (store, case_id) = store_with_case();
    let item = register(
        &store,
        case_id,
        &dir,
        "letter.pdf",
        "A short letter about the hearing.",
        EvidenceKind::Document,
    );

    let p = pipeline(store.clone(), Arc::new(DisabledClient));
    p.process(item.id, false).await.unwrap();

    let after = store.evidence(item.id).unwrap();
    assert_eq!(after.status, EvidenceStatus::Processed);
    assert!(after.analyzed_at.is_none());
    // Derived band summary, not an advisory one.
    assert!(after.summary.unwrap().contains("words."));
}

#[tokio::test]
async fn image_run_records_ocr_metadata() {
    let dir = TempDir::new().unwrap();
    let (store, case_id) = store_with_case();
    let item = register(
        &store,
        case_id,
        &dir,
        "photo.png",
        "Text message screenshot about access on 05/02/2023",
        EvidenceKind::Image,
    );

    let p = pipeline(store.clone(), Arc::new(DisabledClient));
    p.process(item.id, false).await.unwrap();

    let after = store.evidence(item.id).unwrap();
    assert_eq!(after.status, EvidenceStatus::Processed);
    match after.extraction {
        Some(ExtractionMeta::Ocr {
            mean_confidence, ..
        }) => assert!((mean_confidence - 0.9).abs() < 1e-9),
        other => panic!("expected OCR metadata, got {other:?}"),
    }
}

#[tokio::test]
async fn unreadable_pdf_pages_are_counted_not_fatal() {
    let dir = TempDir::new().unwrap();
    let (store, case_id) = store_with_case();
    let item = register(
        &store,
        case_id,
        &dir,
        "scan.pdf",
        "page one about custody\u{0c}<unreadable>\u{0c}page three",
        EvidenceKind::Document,
    );

    let p = pipeline(store.clone(), Arc::new(DisabledClient));
    p.process(item.id, false).await.unwrap();

    let after = store.evidence(item.id).unwrap();
    assert_eq!(after.status, EvidenceStatus::Processed);
    match after.extraction {
        Some(ExtractionMeta::Pdf {
            page_count,
            pages_skipped,
            ..
        }) => {
            assert_eq!(page_count, 3);
            assert_eq!(pages_skipped, 1);
        }
        other => panic!("expected PDF metadata, got {other:?}"),
    }
    let text = after.extracted_text.unwrap();
    assert!(text.contains("--- Page 1 ---"));
    assert!(text.contains("--- Page 3 ---"));
    assert!(!text.contains("--- Page 2 ---"));
}

#[tokio::test]
async fn unsupported_kind_errors_and_notifies() {
    let dir = TempDir::new().unwrap();
    let (store, case_id) = store_with_case();
    let item = register(
        &store,
        case_id,
        &dir,
        "clip.mp4",
        "not text",
        EvidenceKind::Video,
    );

    let p = pipeline(store.clone(), Arc::new(DisabledClient));
    let err = p.process(item.id, false).await.unwrap_err();
    assert!(matches!(err, ProcessError::UnsupportedKind(EvidenceKind::Video)));

    let after = store.evidence(item.id).unwrap();
    assert_eq!(after.status, EvidenceStatus::Error);
    let notes = store.notifications_for(OWNER);
    assert!(notes.iter().any(|n| n.message.contains("could not process")));
}

#[tokio::test]
async fn missing_file_errors_out() {
    let (store, case_id) = store_with_case();
    let item = store
        .insert_evidence(NewEvidence {
            case_id,
            owner: OWNER,
            file_path: "/nonexistent/gone.pdf".into(),
            original_filename: "gone.pdf".into(),
            kind: EvidenceKind::Document,
        })
        .unwrap();

    let p = pipeline(store.clone(), Arc::new(DisabledClient));
    let err = p.process(item.id, false).await.unwrap_err();
    assert!(matches!(err, ProcessError::FileMissing(_)));
    assert_eq!(
        store.evidence(item.id).unwrap().status,
        EvidenceStatus::Error
    );
}

#[tokio::test]
async fn second_run_is_rejected_and_does_not_duplicate_notifications() {
    let dir = TempDir::new().unwrap();
    let (store, case_id) = store_with_case();
    let item = register(
        &store,
        case_id,
        &dir,
        "email.pdf",
        "An email chain about the court order.",
        EvidenceKind::Document,
    );

    let p = pipeline(store.clone(), Arc::new(DisabledClient));
    p.process(item.id, false).await.unwrap();
    let before = store.notifications_for(OWNER).len();

    let err = p.process(item.id, false).await.unwrap_err();
    assert!(matches!(err, ProcessError::AlreadyProcessed { .. }));
    assert_eq!(store.notifications_for(OWNER).len(), before);
}

#[tokio::test]
async fn reprocess_resets_and_runs_again() {
    let dir = TempDir::new().unwrap();
    let (store, case_id) = store_with_case();
    let item = register(
        &store,
        case_id,
        &dir,
        "notes.pdf",
        "First version of the notes.",
        EvidenceKind::Document,
    );

    let p = pipeline(store.clone(), Arc::new(DisabledClient));
    p.process(item.id, false).await.unwrap();
    let first_hash = store.evidence(item.id).unwrap().file_hash;

    // Replace the underlying file, then reprocess.
    std::fs::write(
        store.evidence(item.id).unwrap().file_path,
        "Second version mentioning the affidavit and custody arrangements.",
    )
    .unwrap();
    p.process(item.id, true).await.unwrap();

    let after = store.evidence(item.id).unwrap();
    assert_eq!(after.status, EvidenceStatus::Processed);
    assert_ne!(after.file_hash, first_hash);
    assert!(after.legal_keywords.iter().any(|k| k == "custody"));
}

#[tokio::test]
async fn worker_processes_submitted_jobs() {
    let dir = TempDir::new().unwrap();
    let (store, case_id) = store_with_case();
    let item = register(
        &store,
        case_id,
        &dir,
        "queued.pdf",
        "Queued document about the motion.",
        EvidenceKind::Document,
    );

    let p = pipeline(store.clone(), Arc::new(DisabledClient));
    let (handle, worker) = spawn_worker(p);
    assert!(handle.submit(item.id, false));

    let mut status = EvidenceStatus::Pending;
    for _ in 0..100 {
        status = store.evidence(item.id).unwrap().status;
        if status == EvidenceStatus::Processed {
            break;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    assert_eq!(status, EvidenceStatus::Processed);

    drop(handle);
    worker.await.unwrap();
}
