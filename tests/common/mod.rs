#![allow(dead_code)]

use async_trait::async_trait;
use std::sync::{Arc, Mutex};

use plex_remote_health::monitor::{ProbeResult, ServiceProbe, Status};
use plex_remote_health::notifications::{Notification, NotificationSender, SenderError};
use plex_remote_health::status_store::{StatusStore, StoreError};

pub const TARGET: &str = "https://plex.example.com/identity";

/// Returns a canned probe result.
pub struct FixedProbe(pub ProbeResult);

#[async_trait]
impl ServiceProbe for FixedProbe {
    async fn probe(&self) -> ProbeResult {
        self.0
    }

    fn target(&self) -> &str {
        TARGET
    }
}

/// In-memory store that records every write.
#[derive(Clone, Default)]
pub struct MemoryStore {
    current: Arc<Mutex<Option<Status>>>,
    writes: Arc<Mutex<Vec<Status>>>,
}

impl MemoryStore {
    pub fn with_status(status: Status) -> Self {
        let store = Self::default();
        *store.current.lock().unwrap() = Some(status);
        store
    }

    pub fn writes(&self) -> Vec<Status> {
        self.writes.lock().unwrap().clone()
    }
}

#[async_trait]
impl StatusStore for MemoryStore {
    async fn get_previous(&self) -> Result<Status, StoreError> {
        Ok(self.current.lock().unwrap().unwrap_or(Status::Unknown))
    }

    async fn put_status(&self, status: Status) -> Result<(), StoreError> {
        *self.current.lock().unwrap() = Some(status);
        self.writes.lock().unwrap().push(status);
        Ok(())
    }
}

/// Captures notifications, optionally failing every send.
#[derive(Clone, Default)]
pub struct RecordingSender {
    sent: Arc<Mutex<Vec<Notification>>>,
    fail: bool,
}

impl RecordingSender {
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn sent(&self) -> Vec<Notification> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl NotificationSender for RecordingSender {
    async fn send(&self, notification: &Notification) -> Result<(), SenderError> {
        if self.fail {
            return Err(SenderError::SendFailed("push service unavailable".to_string()));
        }
        self.sent.lock().unwrap().push(notification.clone());
        Ok(())
    }
}
