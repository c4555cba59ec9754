//! Persistence of the last observed status between invocations.
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;
use tracing::warn;

use crate::monitor::models::Status;

pub mod file;

pub use file::FileStatusStore;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Invalid status parameter name: {0:?}")]
    InvalidName(String),
    #[error("I/O error on {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Corrupt status record at {path:?}: {source}")]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Reads and overwrites the single persisted status value.
#[async_trait]
pub trait StatusStore {
    /// The last persisted status, or `Unknown` when nothing was ever written.
    async fn get_previous(&self) -> Result<Status, StoreError>;

    /// Overwrites the persisted value with `status` stamped with the current time.
    async fn put_status(&self, status: Status) -> Result<(), StoreError>;
}

/// Persisted form of the status: `{"status": "...", "ts": <unix seconds>}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusRecord {
    pub status: Status,
    pub ts: i64,
}

impl StatusRecord {
    pub fn now(status: Status) -> Self {
        Self {
            status,
            ts: chrono::Utc::now().timestamp(),
        }
    }
}

// Tolerant view of a stored record: fields may be missing or hold foreign values.
#[derive(Deserialize)]
struct RawStatusRecord {
    #[serde(default)]
    status: Option<String>,
}

/// Extracts the status from a stored JSON record.
///
/// A missing or unrecognised `status` field reads as `Unknown`; malformed
/// JSON is an error.
pub fn status_from_record(bytes: &[u8]) -> Result<Status, serde_json::Error> {
    let raw: RawStatusRecord = serde_json::from_slice(bytes)?;
    let status = match raw.status {
        Some(value) => value.parse().unwrap_or_else(|e| {
            warn!(error = %e, "Stored status is not recognised, treating as unknown.");
            Status::Unknown
        }),
        None => Status::Unknown,
    };
    Ok(status)
}
