//! Case Merit Engine — Binary Entrypoint
//! Boots the Axum HTTP server, the intake worker, and the metrics exporter.

use std::sync::Arc;

use case_merit_engine::advisory::{build_client_from_config, load_advisory_config};
use case_merit_engine::api::{create_router, AppState};
use case_merit_engine::extract::readers::readers_from_env;
use case_merit_engine::metrics::Metrics;
use case_merit_engine::pipeline::{spawn_worker, EvidencePipeline};
use case_merit_engine::scoring::{weights, MeritScorer};
use case_merit_engine::store::CaseStore;
use case_merit_engine::NotifierMux;

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("case_merit_engine=info,warn"));
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().compact())
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env in local/dev; no-op in prod environments.
    let _ = dotenvy::dotenv();
    init_tracing();

    let metrics = Metrics::init();

    let store = Arc::new(CaseStore::new());
    let advisory = build_client_from_config(&load_advisory_config());
    let (pdf, ocr) = readers_from_env();
    let notifier = NotifierMux::from_env(store.clone());

    let pipeline = EvidencePipeline::new(
        store.clone(),
        pdf,
        ocr,
        advisory.clone(),
        notifier,
    );
    let (handle, _worker) = spawn_worker(pipeline);

    let scorer = Arc::new(MeritScorer::new(weights::load_default(), advisory));

    let state = AppState::new(store, handle, scorer);
    let router = create_router(state).merge(metrics.router());

    let port: u16 = std::env::var("PORT")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(8080);
    let listener = tokio::net::TcpListener::bind(("0.0.0.0", port)).await?;
    tracing::info!(port, "case-merit-engine listening");
    axum::serve(listener, router).await?;
    Ok(())
}
