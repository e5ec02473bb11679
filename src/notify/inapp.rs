// src/notify/inapp.rs
//! In-app sink: appends the event to the owner's notification list in the
//! store, where the API surfaces it.

use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;

use super::{NotificationEvent, Notifier};
use crate::store::CaseStore;

pub struct InAppNotifier {
    store: Arc<CaseStore>,
}

impl InAppNotifier {
    pub fn new(store: Arc<CaseStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl Notifier for InAppNotifier {
    async fn send(&self, ev: &NotificationEvent) -> Result<()> {
        self.store.push_notification(ev.clone());
        Ok(())
    }
}
