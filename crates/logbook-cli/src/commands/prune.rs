//! Prune command implementation.

use std::io::Write;

use logbook::{LogStore, LogStoreConfig};
use tracing::info;

use crate::error::CliError;
use crate::output::{OutputFormat, PruneSummary};

/// Handler for the prune command.
pub struct PruneCommand<'a> {
    config: &'a LogStoreConfig,
}

impl<'a> PruneCommand<'a> {
    /// Creates a new prune command handler.
    #[must_use]
    pub const fn new(config: &'a LogStoreConfig) -> Self {
        Self { config }
    }

    /// Loads the stored history and saves it back through retention.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be read or written.
    pub fn execute<W: Write>(&self, out: &mut W, format: &OutputFormat) -> Result<(), CliError> {
        let mut store = LogStore::open(self.config.clone())?;
        let before = store.len();
        store.save()?;

        let summary = PruneSummary {
            removed: before - store.len(),
            remaining: store.len(),
        };
        info!(removed = summary.removed, remaining = summary.remaining, "pruned log history");
        format.write(out, &summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use logbook::EntryType;
    use tempfile::TempDir;

    #[test]
    fn prune_applies_tighter_retention() {
        let dir = TempDir::new().expect("create temp dir");
        let loose = LogStoreConfig::new(dir.path()).with_stdout(false);
        let mut store = LogStore::new(loose.clone()).expect("create store");
        for i in 0..10 {
            store.append(EntryType::Info, Some(format!("m{i}").into()), None).expect("append");
        }

        let tight = loose.with_max_entries(4);
        let mut out = Vec::new();
        PruneCommand::new(&tight)
            .execute(&mut out, &OutputFormat::default())
            .expect("prune");

        let text = String::from_utf8_lossy(&out);
        assert!(text.contains("Removed:    6"));
        assert!(text.contains("Remaining:  4"));
        assert_eq!(std::fs::read_dir(dir.path()).expect("list dir").count(), 4);
    }
}
