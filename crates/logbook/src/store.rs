//! The log store: load, append, save.
//!
//! This module provides:
//! - [`LogStoreConfig`] — Storage location, retention, console mirroring
//! - [`LogStore`] — Ordered in-memory history backed by a storage location
//!
//! Every mutation follows the same path: normalize, prune, write, and only
//! then replace the in-memory sequence. A failed write leaves memory as it
//! was before the call.

use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

use crate::backend::{ReadOutcome, StorageBackend, StorageMode, ensure_exists, open_backend};
use crate::console::ConsoleMirror;
use crate::error::{LogbookError, Result, SubscriberError};
use crate::events::{Channel, EventBus, LogEvent, SubscriptionId};
use crate::retention::RetentionPolicy;
use crate::types::{Entry, EntryType};

const fn default_true() -> bool {
    true
}

/// Configuration for a log store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogStoreConfig {
    /// Existing file (aggregate mode) or directory (one file per entry).
    #[serde(default, alias = "dir")]
    pub path: PathBuf,
    /// Retention applied before every write.
    #[serde(flatten)]
    pub retention: RetentionPolicy,
    /// Whether appended entries are mirrored to standard output.
    #[serde(default = "default_true")]
    pub should_write_to_stdout: bool,
}

impl LogStoreConfig {
    /// Creates a config for `path` with unbounded retention and console
    /// mirroring on.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            retention: RetentionPolicy::unbounded(),
            should_write_to_stdout: true,
        }
    }

    /// Sets the retention policy.
    #[must_use]
    pub const fn with_retention(mut self, retention: RetentionPolicy) -> Self {
        self.retention = retention;
        self
    }

    /// Sets the maximum entry age. Zero means unbounded.
    #[must_use]
    pub const fn with_max_age(mut self, max_age: Duration) -> Self {
        self.retention = self.retention.max_age(max_age);
        self
    }

    /// Sets the maximum number of retained entries. Zero means unbounded.
    #[must_use]
    pub const fn with_max_entries(mut self, max_entries: usize) -> Self {
        self.retention = self.retention.max_entries(max_entries);
        self
    }

    /// Turns console mirroring on or off.
    #[must_use]
    pub const fn with_stdout(mut self, enabled: bool) -> Self {
        self.should_write_to_stdout = enabled;
        self
    }

    /// Checks the config without touching the filesystem.
    ///
    /// # Errors
    ///
    /// Returns [`LogbookError::Configuration`] for an empty path.
    pub fn validate(&self) -> Result<()> {
        if self.path.as_os_str().is_empty() {
            return Err(LogbookError::Configuration(
                "a storage path is required: point it at an existing file to keep all \
                 entries in that file, or at an existing directory to keep one file per entry"
                    .to_string(),
            ));
        }
        Ok(())
    }
}

/// Append-only log store with retention and durable storage.
///
/// The store is single-writer: every mutating operation takes `&mut self`
/// and returns only after the write has completed.
#[derive(Debug)]
pub struct LogStore {
    config: LogStoreConfig,
    entries: Vec<Entry>,
    backend: Option<Box<dyn StorageBackend>>,
    events: EventBus,
    console: Option<ConsoleMirror>,
    last_stamp: Option<DateTime<Utc>>,
}

impl LogStore {
    /// Creates an empty store. Nothing is read until [`load`](Self::load).
    ///
    /// # Errors
    ///
    /// Returns [`LogbookError::Configuration`] if the config is invalid.
    pub fn new(mut config: LogStoreConfig) -> Result<Self> {
        config.validate()?;
        config.retention = config.retention.normalized();
        let console = config.should_write_to_stdout.then(ConsoleMirror::stdout);
        Ok(Self {
            config,
            entries: Vec::new(),
            backend: None,
            events: EventBus::new(),
            console,
            last_stamp: None,
        })
    }

    /// Creates a store and loads its existing history.
    ///
    /// # Errors
    ///
    /// Returns the errors of [`new`](Self::new) and [`load`](Self::load).
    pub fn open(config: LogStoreConfig) -> Result<Self> {
        let mut store = Self::new(config)?;
        store.load()?;
        Ok(store)
    }

    /// Replaces the console sink. Has no effect on whether mirroring is
    /// enabled.
    #[must_use]
    pub fn with_console(mut self, console: ConsoleMirror) -> Self {
        if self.config.should_write_to_stdout {
            self.console = Some(console);
        }
        self
    }

    /// Reads the stored history, replacing the in-memory sequence.
    ///
    /// Unreadable history is logged, published on [`Channel::Recovered`],
    /// and treated as empty.
    ///
    /// # Errors
    ///
    /// Returns [`LogbookError::StorageUnavailable`] if the location does not
    /// exist, or a subscriber error.
    pub fn load(&mut self) -> Result<&mut Self> {
        let backend = self.backend()?;
        let mode = backend.mode();
        let location = backend.location().to_path_buf();

        let mut entries = match backend.read_all()? {
            ReadOutcome::Loaded(entries) => entries,
            ReadOutcome::Recovered { reason } => {
                let recovered = LogbookError::CorruptedReadRecovered {
                    path: location,
                    reason: reason.clone(),
                };
                let next_save = match mode {
                    StorageMode::AggregateFile => "overwrites the unreadable file",
                    StorageMode::Directory => "deletes every existing entry file",
                };
                warn!(
                    error = %recovered,
                    %mode,
                    next_save,
                    "stored history unreadable, starting empty"
                );
                self.events.emit(&LogEvent::Recovered { reason })?;
                Vec::new()
            }
        };
        entries.iter_mut().for_each(Entry::normalize);

        self.entries = entries;
        debug!(count = self.entries.len(), %mode, "loaded log history");
        self.events.emit(&LogEvent::Loaded {
            count: self.entries.len(),
        })?;
        Ok(self)
    }

    /// Appends an entry and persists the pruned history.
    ///
    /// The type-named event is published before anything is written, so
    /// subscribers hear about the entry even if the write then fails.
    ///
    /// # Errors
    ///
    /// Returns [`LogbookError::StorageUnavailable`] if the location does not
    /// exist, an I/O or serialization error from the write, or a subscriber
    /// error. On error the in-memory sequence is unchanged.
    pub fn append(
        &mut self,
        entry_type: EntryType,
        message: Option<Value>,
        payload: Option<Value>,
    ) -> Result<&mut Self> {
        self.events.emit(&LogEvent::Appended {
            entry_type,
            message: message.clone(),
            payload: payload.clone(),
        })?;

        let entry = Entry::new(entry_type, message, payload, self.next_stamp());

        if let Some(console) = self.console.as_mut() {
            if let Err(e) = console.write_entry(&entry) {
                warn!(error = %e, "failed to mirror log entry to console");
            }
        }

        let mut candidate = self.entries.clone();
        candidate.push(entry);
        self.persist(candidate)?;
        Ok(self)
    }

    /// Appends an entry whose type is given by name.
    ///
    /// # Errors
    ///
    /// Returns [`LogbookError::Validation`] for an unknown type name, before
    /// any event is published; otherwise as [`append`](Self::append).
    pub fn append_typed(
        &mut self,
        type_name: &str,
        message: Option<Value>,
        payload: Option<Value>,
    ) -> Result<&mut Self> {
        let entry_type = type_name.parse()?;
        self.append(entry_type, message, payload)
    }

    /// Appends an INFO entry.
    ///
    /// # Errors
    ///
    /// As [`append`](Self::append).
    pub fn log_info(&mut self, message: impl Into<Value>, payload: Option<Value>) -> Result<&mut Self> {
        self.append(EntryType::Info, Some(message.into()), payload)
    }

    /// Appends a SUCCESS entry.
    ///
    /// # Errors
    ///
    /// As [`append`](Self::append).
    pub fn log_success(&mut self, message: impl Into<Value>, payload: Option<Value>) -> Result<&mut Self> {
        self.append(EntryType::Success, Some(message.into()), payload)
    }

    /// Appends a WARNING entry.
    ///
    /// # Errors
    ///
    /// As [`append`](Self::append).
    pub fn log_warning(&mut self, message: impl Into<Value>, payload: Option<Value>) -> Result<&mut Self> {
        self.append(EntryType::Warning, Some(message.into()), payload)
    }

    /// Appends an ERROR entry.
    ///
    /// # Errors
    ///
    /// As [`append`](Self::append).
    pub fn log_error(&mut self, message: impl Into<Value>, payload: Option<Value>) -> Result<&mut Self> {
        self.append(EntryType::Error, Some(message.into()), payload)
    }

    /// Normalizes, prunes and writes the in-memory history.
    ///
    /// # Errors
    ///
    /// Returns [`LogbookError::StorageUnavailable`] if the location does not
    /// exist, an I/O or serialization error from the write, or a subscriber
    /// error.
    pub fn save(&mut self) -> Result<&mut Self> {
        self.persist(self.entries.clone())?;
        Ok(self)
    }

    /// Registers a callback on `channel`.
    pub fn on<F>(&mut self, channel: Channel, callback: F) -> SubscriptionId
    where
        F: FnMut(&LogEvent) -> std::result::Result<(), SubscriberError> + Send + 'static,
    {
        self.events.on(channel, callback)
    }

    /// Removes a callback. Returns false if it was not registered.
    pub fn off(&mut self, channel: Channel, id: SubscriptionId) -> bool {
        self.events.off(channel, id)
    }

    /// Publishes `event` to its channel's subscribers.
    ///
    /// # Errors
    ///
    /// Returns the first subscriber error.
    pub fn emit(&mut self, event: &LogEvent) -> Result<&mut Self> {
        self.events.emit(event)?;
        Ok(self)
    }

    /// The in-memory history, oldest first.
    #[must_use]
    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    /// Iterates over the in-memory history, oldest first.
    pub fn iter(&self) -> std::slice::Iter<'_, Entry> {
        self.entries.iter()
    }

    /// Number of entries in memory.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True if there are no entries in memory.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The store's configuration.
    #[must_use]
    pub const fn config(&self) -> &LogStoreConfig {
        &self.config
    }

    /// The configured storage location.
    #[must_use]
    pub fn location(&self) -> &Path {
        &self.config.path
    }

    /// The storage layout, once the location has been inspected.
    #[must_use]
    pub fn mode(&self) -> Option<StorageMode> {
        self.backend.as_ref().map(|b| b.mode())
    }

    // ========== Internal Methods ==========

    /// Resolves the backend on first use and checks the location still
    /// exists.
    fn backend(&mut self) -> Result<&dyn StorageBackend> {
        ensure_exists(&self.config.path)?;
        let backend = match self.backend.take() {
            Some(backend) => backend,
            None => {
                let backend = open_backend(&self.config.path)?;
                debug!(path = %self.config.path.display(), mode = %backend.mode(), "resolved storage mode");
                backend
            }
        };
        Ok(&**self.backend.insert(backend))
    }

    /// Next creation timestamp. Strictly increasing within this instance so
    /// that chronological order and insertion order always agree.
    fn next_stamp(&mut self) -> DateTime<Utc> {
        let now = Utc::now();
        let floor = self
            .last_stamp
            .into_iter()
            .chain(self.entries.last().map(Entry::date))
            .max();
        let stamp = match floor {
            Some(floor) if now <= floor => floor + chrono::Duration::nanoseconds(1),
            _ => now,
        };
        self.last_stamp = Some(stamp);
        stamp
    }

    fn persist(&mut self, mut candidate: Vec<Entry>) -> Result<()> {
        candidate.iter_mut().for_each(Entry::normalize);
        let candidate = self.config.retention.prune(candidate, Utc::now());

        let backend = self.backend()?;
        backend.write_all(&candidate)?;
        debug!(count = candidate.len(), mode = %backend.mode(), "saved log history");

        self.entries = candidate;
        self.events.emit(&LogEvent::Saved {
            count: self.entries.len(),
        })
    }
}
