//! Directory storage: one pretty-printed JSON file per entry.
//!
//! File names are `YYYY-MM-DD-HH-mm-ss-SSS-<key>` in UTC. The zero-padded
//! timestamp sorts lexically; the key keeps two entries from the same
//! millisecond apart. Names that do not follow this pattern (including the
//! dot-prefixed temporaries of an interrupted write) are never read and
//! never removed.
//!
//! Entries are immutable, so a file that already exists is left alone on
//! write. The exception is a file whose stored record carried `null`
//! fields: it is rewritten in its normalized form on the next write.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use parking_lot::Mutex;
use serde_json::Value;
use tracing::trace;

use super::{ReadOutcome, StorageBackend, StorageMode, atomic_write, ensure_exists};
use crate::error::{LogbookError, Result};
use crate::types::{Entry, EntryKey};

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d-%H-%M-%S-%3f";

/// Widths of the dash-separated timestamp fields in an entry file name.
const FIELD_WIDTHS: [usize; 7] = [4, 2, 2, 2, 2, 2, 3];

/// Stores each entry as its own file inside a directory.
#[derive(Debug)]
pub struct DirectoryBackend {
    dir: PathBuf,
    /// Files read with fields that normalization stripped.
    stale: Mutex<HashSet<String>>,
}

impl DirectoryBackend {
    /// Creates a backend over an existing directory.
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            stale: Mutex::new(HashSet::new()),
        }
    }

    /// Returns the file name an entry is stored under.
    #[must_use]
    pub fn file_name(entry: &Entry) -> String {
        format!("{}-{}", entry.date().format(TIMESTAMP_FORMAT), entry.key())
    }

    /// Extracts the key from an entry file name, or `None` if the name is
    /// not an entry file.
    #[must_use]
    pub fn parse_file_name(name: &str) -> Option<EntryKey> {
        let mut parts = name.splitn(FIELD_WIDTHS.len() + 1, '-');
        for width in FIELD_WIDTHS {
            let field = parts.next()?;
            if field.len() != width || !field.bytes().all(|b| b.is_ascii_digit()) {
                return None;
            }
        }
        EntryKey::parse(parts.next()?)
    }

    /// Lists entry files as `(name, key)`, sorted by name.
    fn entry_files(&self) -> std::io::Result<Vec<(String, EntryKey)>> {
        let mut files = Vec::new();
        for dir_entry in fs::read_dir(&self.dir)? {
            let dir_entry = dir_entry?;
            if !dir_entry.file_type()?.is_file() {
                continue;
            }
            let Ok(name) = dir_entry.file_name().into_string() else {
                continue;
            };
            if let Some(key) = Self::parse_file_name(&name) {
                files.push((name, key));
            }
        }
        files.sort();
        Ok(files)
    }

    /// Reads one entry file. The flag is true if the stored record holds
    /// `null` fields that normalization removed.
    fn read_entry(&self, name: &str, key: EntryKey) -> std::result::Result<(Entry, bool), String> {
        let raw = fs::read_to_string(self.dir.join(name)).map_err(|e| format!("{name}: {e}"))?;
        let value: Value = serde_json::from_str(&raw).map_err(|e| format!("{name}: {e}"))?;
        let has_nulls = value
            .as_object()
            .is_some_and(|record| record.values().any(Value::is_null));
        let mut entry: Entry = serde_json::from_value(value).map_err(|e| format!("{name}: {e}"))?;
        entry.normalize();
        entry.set_key(key);
        Ok((entry, has_nulls))
    }
}

impl StorageBackend for DirectoryBackend {
    fn mode(&self) -> StorageMode {
        StorageMode::Directory
    }

    fn location(&self) -> &Path {
        &self.dir
    }

    fn read_all(&self) -> Result<ReadOutcome> {
        let files = match self.entry_files() {
            Ok(files) => files,
            Err(e) => {
                return Ok(ReadOutcome::Recovered {
                    reason: e.to_string(),
                });
            }
        };

        let mut entries = Vec::with_capacity(files.len());
        let mut stale = HashSet::new();
        for (name, key) in files {
            match self.read_entry(&name, key) {
                Ok((entry, has_nulls)) => {
                    if has_nulls {
                        stale.insert(name);
                    }
                    entries.push(entry);
                }
                Err(reason) => return Ok(ReadOutcome::Recovered { reason }),
            }
        }
        *self.stale.lock() = stale;

        // File names only carry millisecond precision; the record's own date
        // is authoritative.
        entries.sort_by_key(Entry::date);
        Ok(ReadOutcome::Loaded(entries))
    }

    fn write_all(&self, entries: &[Entry]) -> Result<()> {
        ensure_exists(&self.dir)?;
        if !self.dir.is_dir() {
            return Err(LogbookError::Configuration(format!(
                "{} is no longer a directory",
                self.dir.display()
            )));
        }

        let mut stale = self.stale.lock();
        let mut expected = HashSet::with_capacity(entries.len());
        for entry in entries {
            let name = Self::file_name(entry);
            let path = self.dir.join(&name);
            if !path.exists() || stale.contains(&name) {
                let json = serde_json::to_vec_pretty(entry)?;
                atomic_write(&path, &json)?;
                stale.remove(&name);
                trace!(file = %name, "wrote log entry file");
            }
            expected.insert(name);
        }

        for (name, _) in self.entry_files()? {
            if !expected.contains(&name) {
                fs::remove_file(self.dir.join(&name))?;
                trace!(file = %name, "removed pruned log entry file");
            }
        }

        Ok(())
    }
}
