use async_trait::async_trait;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::{debug, info};

use super::{status_from_record, StatusRecord, StatusStore, StoreError};
use crate::monitor::models::Status;

/// Keeps the status record as a JSON file named after the status parameter.
///
/// `/homelab/plex_remote_status` under `data` becomes
/// `data/homelab/plex_remote_status.json`.
#[derive(Debug, Clone)]
pub struct FileStatusStore {
    path: PathBuf,
}

impl FileStatusStore {
    pub fn new(data_dir: impl AsRef<Path>, name: &str) -> Result<Self, StoreError> {
        Ok(Self {
            path: record_path(data_dir.as_ref(), name)?,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Maps a slash-separated parameter name onto a file below `data_dir`.
pub fn record_path(data_dir: &Path, name: &str) -> Result<PathBuf, StoreError> {
    let trimmed = name.trim_start_matches('/');
    let segments: Vec<&str> = trimmed.split('/').collect();
    let invalid = trimmed.is_empty()
        || segments
            .iter()
            .any(|s| s.is_empty() || *s == "." || *s == ".." || s.contains('\\'));
    if invalid {
        return Err(StoreError::InvalidName(name.to_string()));
    }

    let mut path = data_dir.to_path_buf();
    let (file_stem, parents) = segments
        .split_last()
        .ok_or_else(|| StoreError::InvalidName(name.to_string()))?;
    for segment in parents {
        path.push(segment);
    }
    path.push(format!("{file_stem}.json"));
    Ok(path)
}

#[async_trait]
impl StatusStore for FileStatusStore {
    async fn get_previous(&self) -> Result<Status, StoreError> {
        let bytes = match tokio::fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                info!(path = ?self.path, "No stored status yet.");
                return Ok(Status::Unknown);
            }
            Err(source) => {
                return Err(StoreError::Io {
                    path: self.path.clone(),
                    source,
                });
            }
        };

        let status = status_from_record(&bytes).map_err(|source| StoreError::Corrupt {
            path: self.path.clone(),
            source,
        })?;
        debug!(path = ?self.path, status = %status, "Loaded stored status.");
        Ok(status)
    }

    async fn put_status(&self, status: Status) -> Result<(), StoreError> {
        let record = StatusRecord::now(status);
        let bytes = serde_json::to_vec(&record)?;

        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        tokio::fs::create_dir_all(&dir)
            .await
            .map_err(|source| StoreError::Io {
                path: dir.clone(),
                source,
            })?;

        let target = self.path.clone();
        tokio::task::spawn_blocking(move || write_atomically(&dir, &target, &bytes))
            .await
            .map_err(|e| StoreError::Io {
                path: self.path.clone(),
                source: io::Error::other(e),
            })?
            .map_err(|source| StoreError::Io {
                path: self.path.clone(),
                source,
            })?;

        info!(path = ?self.path, status = %record.status, ts = record.ts, "Stored new status.");
        Ok(())
    }
}

// Write to a sibling temp file, then rename over the target.
fn write_atomically(dir: &Path, target: &Path, bytes: &[u8]) -> io::Result<()> {
    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(bytes)?;
    tmp.as_file().sync_all()?;
    tmp.persist(target).map_err(|e| e.error)?;
    Ok(())
}
