//! A [`CursorStore`] that keeps the issue watermark in a small JSON file.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use storage::{CursorStore, StorageError, Timestamp};

#[derive(Debug, Serialize, Deserialize)]
struct CursorRecord {
    since: Timestamp,
}

/// Persists the watermark as `{"since": "<rfc3339>"}`.
///
/// Saves write a sibling `.json.tmp` file and rename it over the target.
#[derive(Debug, Clone)]
pub struct JsonFileCursorStore {
    path: PathBuf,
}

impl JsonFileCursorStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_error(&self, source: std::io::Error) -> StorageError {
        StorageError::Io {
            path: self.path.clone(),
            source,
        }
    }
}

#[async_trait]
impl CursorStore for JsonFileCursorStore {
    async fn load(&self) -> Result<Option<Timestamp>, StorageError> {
        let bytes = match tokio::fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(error) if error.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(error) => return Err(self.io_error(error)),
        };
        let record: CursorRecord =
            serde_json::from_slice(&bytes).map_err(|error| StorageError::CursorStore {
                message: format!("'{}' is not a cursor file: {error}", self.path.display()),
            })?;
        Ok(Some(record.since))
    }

    async fn save(&self, since: Timestamp) -> Result<(), StorageError> {
        let body = serde_json::to_vec_pretty(&CursorRecord { since }).map_err(|error| {
            StorageError::CursorStore {
                message: error.to_string(),
            }
        })?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|error| self.io_error(error))?;
        }
        let staging = self.path.with_extension("json.tmp");
        tokio::fs::write(&staging, body)
            .await
            .map_err(|error| self.io_error(error))?;
        tokio::fs::rename(&staging, &self.path)
            .await
            .map_err(|error| self.io_error(error))?;
        tracing::trace!(path = %self.path.display(), since = %since, "Saved issue cursor");
        Ok(())
    }
}
