//! Console mirroring of appended entries.
//!
//! Each mirrored entry prints a separator, a `TYPE (timestamp): message`
//! line with the type colorized, and the payload on its own line if there
//! is one.

use std::fmt;
use std::io::{self, Write};

use chrono::SecondsFormat;
use colored::{ColoredString, Colorize};
use serde_json::Value;

use crate::types::{Entry, EntryType};

const SEPARATOR: &str = "-----";

/// Renders a message or payload for display: strings verbatim, everything
/// else as compact JSON.
#[must_use]
pub fn display_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn colorize(entry_type: EntryType) -> ColoredString {
    let label = entry_type.as_str();
    match entry_type {
        EntryType::Error => label.red(),
        EntryType::Info => label.blue(),
        EntryType::Success => label.green(),
        EntryType::Warning => label.yellow(),
    }
}

/// Formats the headline of an entry: `TYPE (timestamp): message`.
#[must_use]
pub fn format_headline(entry: &Entry, color: bool) -> String {
    let label = if color {
        colorize(entry.entry_type()).to_string()
    } else {
        entry.entry_type().as_str().to_string()
    };
    let timestamp = entry.date().to_rfc3339_opts(SecondsFormat::Millis, true);
    let message = entry.message().map(display_value).unwrap_or_default();
    format!("{label} ({timestamp}): {message}")
}

/// Writes formatted entries to a text sink.
pub struct ConsoleMirror {
    writer: Box<dyn Write + Send>,
    color: bool,
}

impl ConsoleMirror {
    /// Mirrors to standard output with colors.
    #[must_use]
    pub fn stdout() -> Self {
        Self::with_writer(io::stdout())
    }

    /// Mirrors to an arbitrary writer with colors.
    #[must_use]
    pub fn with_writer(writer: impl Write + Send + 'static) -> Self {
        Self {
            writer: Box::new(writer),
            color: true,
        }
    }

    /// Disables ANSI colors.
    #[must_use]
    pub fn plain(mut self) -> Self {
        self.color = false;
        self
    }

    /// Writes one entry.
    ///
    /// # Errors
    ///
    /// Returns any error from the underlying writer.
    pub fn write_entry(&mut self, entry: &Entry) -> io::Result<()> {
        writeln!(self.writer, "{SEPARATOR}")?;
        writeln!(self.writer, "{}", format_headline(entry, self.color))?;
        if let Some(payload) = entry.payload() {
            writeln!(self.writer, "{}", display_value(payload))?;
        }
        self.writer.flush()
    }
}

impl fmt::Debug for ConsoleMirror {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConsoleMirror")
            .field("color", &self.color)
            .finish_non_exhaustive()
    }
}
