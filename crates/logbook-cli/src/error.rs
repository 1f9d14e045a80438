//! CLI error types.

use std::path::PathBuf;

use logbook::LogbookError;
use thiserror::Error;

/// CLI-specific errors.
#[derive(Debug, Error)]
pub enum CliError {
    /// The configuration file could not be read or parsed.
    #[error("invalid config file {path}: {reason}")]
    ConfigFile {
        /// The file that was given.
        path: PathBuf,
        /// What went wrong.
        reason: String,
    },

    /// The store rejected an operation.
    #[error(transparent)]
    Store(#[from] LogbookError),

    /// Output formatting error.
    #[error("format error: {0}")]
    Format(String),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
