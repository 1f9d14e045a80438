//! Persistence backends.
//!
//! This module provides:
//! - [`StorageBackend`] — The read/write contract shared by every layout
//! - [`StorageMode`] — Which layout a location uses, resolved by probing it
//! - [`AggregateFileBackend`] — All entries as one JSON array in one file
//! - [`DirectoryBackend`] — One JSON file per entry
//!
//! Reads fail soft: unreadable or unparsable history comes back as
//! [`ReadOutcome::Recovered`] with no entries. Writes fail hard when the
//! location is gone; the store never creates its own root.

mod aggregate;
mod directory;

use std::fmt;
use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use tracing::trace;
use uuid::Uuid;

use crate::error::{LogbookError, Result};
use crate::types::Entry;

pub use aggregate::AggregateFileBackend;
pub use directory::DirectoryBackend;

/// Storage layout of a log location.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StorageMode {
    /// The whole sequence is one JSON array in a regular file.
    AggregateFile,
    /// Each entry is its own file inside a directory.
    Directory,
}

impl StorageMode {
    /// Resolves the layout of an existing location.
    ///
    /// # Errors
    ///
    /// Returns [`LogbookError::StorageUnavailable`] if nothing exists at
    /// `path`, or [`LogbookError::Configuration`] if it is neither a regular
    /// file nor a directory.
    pub fn detect(path: &Path) -> Result<Self> {
        let metadata = match fs::metadata(path) {
            Ok(m) => m,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(LogbookError::unavailable(path));
            }
            Err(e) => return Err(e.into()),
        };

        if metadata.is_file() {
            Ok(Self::AggregateFile)
        } else if metadata.is_dir() {
            Ok(Self::Directory)
        } else {
            Err(LogbookError::Configuration(format!(
                "{} is neither a regular file nor a directory",
                path.display()
            )))
        }
    }

    /// Returns a short name for this layout.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::AggregateFile => "file",
            Self::Directory => "directory",
        }
    }
}

impl fmt::Display for StorageMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of reading a location.
#[derive(Debug, Clone, PartialEq)]
pub enum ReadOutcome {
    /// The stored history, oldest first.
    Loaded(Vec<Entry>),
    /// The stored bytes could not be read or parsed; treated as no history.
    Recovered {
        /// Why the read was abandoned.
        reason: String,
    },
}

impl ReadOutcome {
    /// Returns the loaded entries, or nothing for a recovered read.
    #[must_use]
    pub fn into_entries(self) -> Vec<Entry> {
        match self {
            Self::Loaded(entries) => entries,
            Self::Recovered { .. } => Vec::new(),
        }
    }
}

/// Persistence contract shared by every storage layout.
///
/// Implementations must not reorder entries, invent fields, or drop fields
/// they do not understand.
pub trait StorageBackend: fmt::Debug + Send + Sync {
    /// The layout this backend writes.
    fn mode(&self) -> StorageMode;

    /// The configured location.
    fn location(&self) -> &Path;

    /// Reads every stored entry, oldest first.
    ///
    /// Missing or malformed bytes yield [`ReadOutcome::Recovered`] rather
    /// than an error.
    fn read_all(&self) -> Result<ReadOutcome>;

    /// Replaces the stored history with `entries`.
    ///
    /// # Errors
    ///
    /// Returns [`LogbookError::StorageUnavailable`] if the location does not
    /// exist, or an I/O or serialization error if the write fails.
    fn write_all(&self, entries: &[Entry]) -> Result<()>;
}

/// Builds the backend matching the layout found at `path`.
///
/// # Errors
///
/// Propagates [`StorageMode::detect`] failures.
pub fn open_backend(path: impl Into<PathBuf>) -> Result<Box<dyn StorageBackend>> {
    let path = path.into();
    let backend: Box<dyn StorageBackend> = match StorageMode::detect(&path)? {
        StorageMode::AggregateFile => Box::new(AggregateFileBackend::new(path)),
        StorageMode::Directory => Box::new(DirectoryBackend::new(path)),
    };
    Ok(backend)
}

/// Writes `data` to a sibling temporary file, fsyncs it, then renames it
/// over `target`.
///
/// A symlinked target is written through to the file it points at, and an
/// existing target keeps its permissions. If the parent directory does not
/// allow creating the temporary file, an existing target is rewritten in
/// place instead.
pub(crate) fn atomic_write(target: &Path, data: &[u8]) -> Result<()> {
    let target = match fs::canonicalize(target) {
        Ok(resolved) => resolved,
        Err(e) if e.kind() == ErrorKind::NotFound => target.to_path_buf(),
        Err(e) => return Err(e.into()),
    };
    let permissions = fs::metadata(&target).ok().map(|m| m.permissions());

    let parent = target
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    let file_name = target
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let temp_path = parent.join(format!(".{file_name}.{}.tmp", Uuid::new_v4().simple()));

    match write_and_rename(&temp_path, &target, data, permissions.as_ref()) {
        Ok(()) => {}
        Err(e) if e.kind() == ErrorKind::PermissionDenied && permissions.is_some() => {
            let _ = fs::remove_file(&temp_path);
            trace!(path = %target.display(), "parent not writable, rewriting in place");
            return write_in_place(&target, data).map_err(Into::into);
        }
        Err(e) => {
            let _ = fs::remove_file(&temp_path);
            return Err(e.into());
        }
    }

    // Fsync the parent so the rename itself is durable.
    if let Ok(dir) = fs::File::open(parent) {
        let _ = dir.sync_all();
    }

    Ok(())
}

fn write_and_rename(
    temp_path: &Path,
    target: &Path,
    data: &[u8],
    permissions: Option<&fs::Permissions>,
) -> std::io::Result<()> {
    let mut temp_file = fs::File::create(temp_path)?;
    temp_file.write_all(data)?;
    temp_file.sync_all()?;
    if let Some(permissions) = permissions {
        temp_file.set_permissions(permissions.clone())?;
    }
    drop(temp_file);
    fs::rename(temp_path, target)
}

fn write_in_place(target: &Path, data: &[u8]) -> std::io::Result<()> {
    let mut file = fs::OpenOptions::new().write(true).truncate(true).open(target)?;
    file.write_all(data)?;
    file.sync_all()
}

/// Fails with [`LogbookError::StorageUnavailable`] unless `path` exists.
pub(crate) fn ensure_exists(path: &Path) -> Result<()> {
    if path.exists() {
        Ok(())
    } else {
        Err(LogbookError::unavailable(path))
    }
}
