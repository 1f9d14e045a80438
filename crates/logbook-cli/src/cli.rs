//! Command-line argument parsing with clap.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use serde_json::Value;

/// logbook - append to and inspect retention-managed log stores.
#[derive(Parser, Debug, Clone)]
#[command(name = "logbook")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Storage location: an existing file (one JSON array) or an existing
    /// directory (one file per entry).
    #[arg(short, long, env = "LOGBOOK_PATH")]
    pub path: Option<PathBuf>,

    /// JSON store configuration file. Flags override its values.
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Drop entries older than this many milliseconds.
    #[arg(long, env = "LOGBOOK_MAX_AGE_MS", value_name = "MS")]
    pub max_age_ms: Option<u64>,

    /// Keep at most this many entries.
    #[arg(long, env = "LOGBOOK_MAX_ENTRIES", value_name = "N")]
    pub max_entries: Option<usize>,

    /// Do not mirror appended entries to stdout.
    #[arg(short, long)]
    pub quiet: bool,

    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,
}

/// Output format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum Format {
    /// Human-readable table format.
    #[default]
    Table,
    /// JSON output for scripting.
    Json,
}

/// Top-level subcommands.
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Append an INFO entry.
    Info(AppendArgs),

    /// Append a SUCCESS entry.
    Success(AppendArgs),

    /// Append a WARNING entry.
    Warning(AppendArgs),

    /// Append an ERROR entry.
    Error(AppendArgs),

    /// Print every stored entry, oldest first.
    Show {
        /// Output format.
        #[arg(short, long, value_enum, default_value_t = Format::Table)]
        format: Format,
    },

    /// Apply retention to the stored history and write it back.
    Prune,
}

/// Arguments for the append commands.
#[derive(Args, Debug, Clone, Default)]
pub struct AppendArgs {
    /// Entry message. Omit to log an entry without one.
    pub message: Option<String>,

    /// Entry payload. Parsed as JSON; anything that is not valid JSON is
    /// stored as a string.
    #[arg(long, value_name = "JSON")]
    pub payload: Option<String>,
}

impl AppendArgs {
    /// The message as a JSON value.
    #[must_use]
    pub fn message_value(&self) -> Option<Value> {
        self.message.clone().map(Value::String)
    }

    /// The payload as a JSON value.
    #[must_use]
    pub fn payload_value(&self) -> Option<Value> {
        self.payload.as_deref().map(parse_json_arg)
    }
}

/// Parses `raw` as JSON, falling back to a plain string.
#[must_use]
pub fn parse_json_arg(raw: &str) -> Value {
    serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()))
}
