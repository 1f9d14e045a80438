//! # logbook-cli
//!
//! Command-line front end for logbook stores.
//!
//! Provides commands for:
//! - Appending INFO, SUCCESS, WARNING and ERROR entries
//! - Printing the stored history as a table or JSON
//! - Re-applying retention to stored history
//!
//! Store settings come from `--config`, `LOGBOOK_*` environment variables
//! and flags, in increasing precedence.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod output;

pub use cli::{AppendArgs, Cli, Commands, Format};
pub use error::CliError;
pub use output::OutputFormat;
