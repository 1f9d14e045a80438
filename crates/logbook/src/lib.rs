//! # logbook
//!
//! Durable, retention-managed append-only log store.
//!
//! This crate provides:
//!
//! - [`Entry`] — One record: date, [`EntryType`], optional message and payload
//! - [`RetentionPolicy`] — Age and count pruning applied before every write
//! - [`StorageBackend`] — Read/write contract with two layouts:
//!   [`AggregateFileBackend`] (one JSON array) and [`DirectoryBackend`]
//!   (one file per entry)
//! - [`EventBus`] — Per-store named-channel publish/subscribe
//! - [`ConsoleMirror`] — Optional colorized echo of each append
//! - [`LogStore`] — Load, append, and save with atomic prune-then-persist
//!
//! The storage location must already exist. A regular file selects the
//! aggregate layout; a directory selects one file per entry.
//!
//! ## Example
//!
//! ```rust,no_run
//! use logbook::{Channel, LogStore, LogStoreConfig};
//! use serde_json::json;
//!
//! # fn main() -> logbook::Result<()> {
//! let config = LogStoreConfig::new("/var/log/myapp")
//!     .with_max_entries(1_000)
//!     .with_stdout(false);
//!
//! let mut store = LogStore::open(config)?;
//! store.on(Channel::Error, |event| {
//!     eprintln!("error logged: {event:?}");
//!     Ok(())
//! });
//!
//! store
//!     .log_info("service started", None)?
//!     .log_error("upstream timeout", Some(json!({"after_ms": 3000})))?;
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod backend;
pub mod console;
pub mod error;
pub mod events;
pub mod retention;
pub mod store;
pub mod types;

// Re-export main types
pub use backend::{
    AggregateFileBackend, DirectoryBackend, ReadOutcome, StorageBackend, StorageMode, open_backend,
};
pub use console::ConsoleMirror;
pub use error::{LogbookError, Result, SubscriberError};
pub use events::{Callback, Channel, EventBus, LogEvent, SubscriptionId};
pub use retention::RetentionPolicy;
pub use store::{LogStore, LogStoreConfig};
pub use types::{Entry, EntryKey, EntryType};
