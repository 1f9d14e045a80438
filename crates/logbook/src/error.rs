//! Error types for the log store.

use std::path::PathBuf;

use thiserror::Error;

/// Boxed error returned by event subscribers.
pub type SubscriberError = Box<dyn std::error::Error + Send + Sync>;

/// Errors that can occur in the log store.
#[derive(Debug, Error)]
pub enum LogbookError {
    /// The store was configured without a usable storage location.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// The configured storage location does not exist.
    #[error("storage unavailable: {} does not exist", path.display())]
    StorageUnavailable {
        /// The missing location.
        path: PathBuf,
    },

    /// An entry type outside the closed enumeration.
    #[error("validation error: {0}")]
    Validation(String),

    /// Stored bytes could not be parsed and were replaced by an empty
    /// history.
    ///
    /// Never returned from a public operation; reported through `tracing`
    /// and the `recovered` channel instead.
    #[error("corrupted read recovered at {}: {reason}", path.display())]
    CorruptedReadRecovered {
        /// Location whose contents were discarded.
        path: PathBuf,
        /// Why the read failed.
        reason: String,
    },

    /// Serialization or deserialization failed.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// An I/O error occurred.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// An event subscriber returned an error.
    #[error("subscriber on channel '{channel}' failed: {source}")]
    Subscriber {
        /// Channel the failing callback was registered on.
        channel: &'static str,
        /// The callback's error.
        #[source]
        source: SubscriberError,
    },
}

impl LogbookError {
    /// Shorthand for [`LogbookError::StorageUnavailable`].
    pub fn unavailable(path: impl Into<PathBuf>) -> Self {
        Self::StorageUnavailable { path: path.into() }
    }
}

/// Result type alias for log store operations.
pub type Result<T> = std::result::Result<T, LogbookError>;
