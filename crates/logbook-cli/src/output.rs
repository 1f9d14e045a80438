//! Output formatting for CLI commands.
//!
//! Supports table (human-readable) and JSON output formats.

use std::io::Write;

use chrono::SecondsFormat;
use logbook::Entry;
use logbook::console::display_value;
use serde::Serialize;

use crate::cli::Format;
use crate::error::CliError;

/// Output formatter that handles both table and JSON output.
#[derive(Debug, Clone, Default)]
pub struct OutputFormat {
    format: Format,
}

impl OutputFormat {
    /// Create a new output formatter.
    #[must_use]
    pub const fn new(format: Format) -> Self {
        Self { format }
    }

    /// Write a serializable value to the output.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or writing fails.
    pub fn write<W, T>(&self, writer: &mut W, value: &T) -> Result<(), CliError>
    where
        W: Write,
        T: Serialize + TableDisplay,
    {
        match self.format {
            Format::Json => {
                serde_json::to_writer_pretty(&mut *writer, value)
                    .map_err(|e| CliError::Format(format!("JSON serialization failed: {e}")))?;
                writeln!(writer)?;
            }
            Format::Table => value.write_table(writer)?,
        }
        Ok(())
    }

    /// Write a serializable value to a string.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_string<T>(&self, value: &T) -> Result<String, CliError>
    where
        T: Serialize + TableDisplay,
    {
        let mut buf = Vec::new();
        self.write(&mut buf, value)?;
        String::from_utf8(buf).map_err(|e| CliError::Format(format!("UTF-8 error: {e}")))
    }
}

/// Trait for types that can be displayed as a table.
pub trait TableDisplay {
    /// Write the value as a human-readable table.
    ///
    /// # Errors
    ///
    /// Returns an error if writing fails.
    fn write_table<W: Write>(&self, writer: &mut W) -> Result<(), CliError>;
}

/// Stored entries, oldest first. Serializes as the same JSON array the
/// aggregate file holds.
#[derive(Debug, Clone, Copy, Serialize)]
#[serde(transparent)]
pub struct EntryTable<'a>(pub &'a [Entry]);

impl TableDisplay for EntryTable<'_> {
    fn write_table<W: Write>(&self, writer: &mut W) -> Result<(), CliError> {
        if self.0.is_empty() {
            writeln!(writer, "No entries")?;
            return Ok(());
        }

        writeln!(writer, "{:<24}  {:<7}  {:<32}  PAYLOAD", "DATE", "TYPE", "MESSAGE")?;
        writeln!(writer, "{}", "─".repeat(80))?;

        for entry in self.0 {
            let message = entry.message().map(display_value).unwrap_or_default();
            let payload = entry.payload().map(display_value).unwrap_or_default();
            writeln!(
                writer,
                "{:<24}  {:<7}  {:<32}  {}",
                entry.date().to_rfc3339_opts(SecondsFormat::Millis, true),
                entry.entry_type(),
                truncate(&message, 32),
                payload
            )?;
        }

        writeln!(writer)?;
        writeln!(writer, "Total: {} entr{}", self.0.len(), if self.0.len() == 1 { "y" } else { "ies" })?;
        Ok(())
    }
}

/// Outcome of a prune run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PruneSummary {
    /// Entries dropped by retention.
    pub removed: usize,
    /// Entries still stored.
    pub remaining: usize,
}

impl TableDisplay for PruneSummary {
    fn write_table<W: Write>(&self, writer: &mut W) -> Result<(), CliError> {
        writeln!(writer, "Removed:    {}", self.removed)?;
        writeln!(writer, "Remaining:  {}", self.remaining)?;
        Ok(())
    }
}

/// Shortens `s` to at most `max` characters, marking the cut with `…`.
fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max.saturating_sub(1)).collect();
        format!("{kept}…")
    }
}
