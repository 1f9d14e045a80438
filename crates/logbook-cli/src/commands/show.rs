//! Show command implementation.

use std::io::Write;

use logbook::{LogStore, LogStoreConfig};

use crate::error::CliError;
use crate::output::{EntryTable, OutputFormat};

/// Handler for the show command.
pub struct ShowCommand<'a> {
    config: &'a LogStoreConfig,
}

impl<'a> ShowCommand<'a> {
    /// Creates a new show command handler.
    #[must_use]
    pub const fn new(config: &'a LogStoreConfig) -> Self {
        Self { config }
    }

    /// Loads the stored history and writes it to `out`.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be read or output fails.
    pub fn execute<W: Write>(&self, out: &mut W, format: &OutputFormat) -> Result<(), CliError> {
        let store = LogStore::open(self.config.clone())?;
        format.write(out, &EntryTable(store.entries()))
    }
}
