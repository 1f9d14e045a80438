//! Single-file storage: the whole history as one pretty-printed JSON array.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::trace;

use super::{ReadOutcome, StorageBackend, StorageMode, atomic_write, ensure_exists};
use crate::error::Result;
use crate::types::Entry;

/// Stores every entry in one JSON array at a single path.
#[derive(Debug, Clone)]
pub struct AggregateFileBackend {
    path: PathBuf,
}

impl AggregateFileBackend {
    /// Creates a backend over an existing file.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl StorageBackend for AggregateFileBackend {
    fn mode(&self) -> StorageMode {
        StorageMode::AggregateFile
    }

    fn location(&self) -> &Path {
        &self.path
    }

    fn read_all(&self) -> Result<ReadOutcome> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) => {
                return Ok(ReadOutcome::Recovered {
                    reason: e.to_string(),
                });
            }
        };

        // A freshly provisioned, empty file is simply no history.
        if raw.trim().is_empty() {
            return Ok(ReadOutcome::Loaded(Vec::new()));
        }

        match serde_json::from_str::<Vec<Entry>>(&raw) {
            Ok(entries) => Ok(ReadOutcome::Loaded(entries)),
            Err(e) => Ok(ReadOutcome::Recovered {
                reason: e.to_string(),
            }),
        }
    }

    fn write_all(&self, entries: &[Entry]) -> Result<()> {
        ensure_exists(&self.path)?;
        let json = serde_json::to_vec_pretty(entries)?;
        atomic_write(&self.path, &json)?;
        trace!(path = %self.path.display(), count = entries.len(), "wrote aggregate log file");
        Ok(())
    }
}
