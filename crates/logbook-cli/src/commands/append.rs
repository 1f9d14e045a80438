//! Append command implementation.

use logbook::{EntryType, LogStore, LogStoreConfig};
use tracing::info;

use crate::cli::AppendArgs;
use crate::error::CliError;

/// Handler for the info/success/warning/error commands.
pub struct AppendCommand<'a> {
    config: &'a LogStoreConfig,
}

impl<'a> AppendCommand<'a> {
    /// Creates a new append command handler.
    #[must_use]
    pub const fn new(config: &'a LogStoreConfig) -> Self {
        Self { config }
    }

    /// Loads the existing history, then appends one entry.
    ///
    /// Loading first means retention sees, and the write keeps, everything
    /// already stored. The entry is mirrored to stdout unless the config
    /// turns mirroring off.
    ///
    /// # Errors
    ///
    /// Returns an error if the config is invalid or the store cannot be
    /// read or written.
    pub fn execute(&self, entry_type: EntryType, args: &AppendArgs) -> Result<(), CliError> {
        let mut store = LogStore::open(self.config.clone())?;
        store.append(entry_type, args.message_value(), args.payload_value())?;
        info!(%entry_type, count = store.len(), "appended log entry");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    #[test]
    fn append_keeps_existing_history() {
        let dir = TempDir::new().expect("create temp dir");
        let config = LogStoreConfig::new(dir.path()).with_stdout(false);
        let cmd = AppendCommand::new(&config);

        let args = AppendArgs {
            message: Some("first".into()),
            payload: None,
        };
        cmd.execute(EntryType::Info, &args).expect("append first");
        let args = AppendArgs {
            message: Some("second".into()),
            payload: Some("[1, 2, 3]".into()),
        };
        cmd.execute(EntryType::Success, &args).expect("append second");

        let store = LogStore::open(config).expect("reopen");
        assert_eq!(store.len(), 2);
        assert_eq!(store.entries()[1].entry_type(), EntryType::Success);
        assert_eq!(store.entries()[1].payload(), Some(&json!([1, 2, 3])));
    }

    #[test]
    fn append_to_missing_location_fails() {
        let dir = TempDir::new().expect("create temp dir");
        let config = LogStoreConfig::new(dir.path().join("absent")).with_stdout(false);

        let result = AppendCommand::new(&config).execute(EntryType::Error, &AppendArgs::default());

        assert!(matches!(result, Err(CliError::Store(_))));
    }
}
