// src/notify/mod.rs
//! Notification sinks. The pipeline emits one event per completed (or
//! failed) processing run, addressed to the evidence owner.

pub mod email;
pub mod inapp;

use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::model::UserId;
use crate::store::CaseStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    EvidenceProcessed,
    EvidenceFailed,
    MeritScored,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationEvent {
    pub user: UserId,
    pub kind: NotificationKind,
    pub message: String,
    pub ts: DateTime<Utc>,
}

impl NotificationEvent {
    pub fn new(user: UserId, kind: NotificationKind, message: impl Into<String>) -> Self {
        Self {
            user,
            kind,
            message: message.into(),
            ts: Utc::now(),
        }
    }
}

#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send(&self, ev: &NotificationEvent) -> Result<()>;
}

/// Fans an event out to every configured sink. A failing sink is logged and
/// never fails the triggering pipeline run.
pub struct NotifierMux {
    sinks: Vec<Box<dyn Notifier>>,
}

impl NotifierMux {
    pub fn new() -> Self {
        Self { sinks: Vec::new() }
    }

    pub fn push(mut self, sink: Box<dyn Notifier>) -> Self {
        self.sinks.push(sink);
        self
    }

    /// In-app sink always; email only when SMTP env vars are present.
    pub fn from_env(store: Arc<CaseStore>) -> Self {
        let mut mux = Self::new().push(Box::new(inapp::InAppNotifier::new(store)));
        match email::EmailNotifier::from_env() {
            Some(sender) => mux = mux.push(Box::new(sender)),
            None => tracing::debug!("email notifications disabled (SMTP env not set)"),
        }
        mux
    }

    pub async fn notify(&self, ev: &NotificationEvent) {
        for sink in &self.sinks {
            if let Err(e) = sink.send(ev).await {
                tracing::warn!(error = ?e, "notification sink failed");
            }
        }
    }
}

impl Default for NotifierMux {
    fn default() -> Self {
        Self::new()
    }
}
