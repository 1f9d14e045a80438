//! Store configuration assembled from a config file, environment and flags.
//!
//! Precedence, lowest first: built-in defaults, the `--config` file, then
//! flags (which clap already merges with their `LOGBOOK_*` variables).

use std::fs;
use std::path::Path;
use std::time::Duration;

use logbook::LogStoreConfig;
use tracing::debug;

use crate::cli::Cli;
use crate::error::CliError;

/// Reads a JSON [`LogStoreConfig`] from `path`.
///
/// # Errors
///
/// Returns [`CliError::ConfigFile`] if the file cannot be read or parsed.
pub fn load_config_file(path: &Path) -> Result<LogStoreConfig, CliError> {
    let raw = fs::read_to_string(path).map_err(|e| CliError::ConfigFile {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;
    serde_json::from_str(&raw).map_err(|e| CliError::ConfigFile {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })
}

/// Builds the store configuration for this invocation.
///
/// The result is not validated here; [`logbook::LogStore::new`] does that.
///
/// # Errors
///
/// Returns [`CliError::ConfigFile`] for an unreadable `--config` file.
pub fn resolve(cli: &Cli) -> Result<LogStoreConfig, CliError> {
    let mut config = match &cli.config {
        Some(file) => load_config_file(file)?,
        None => LogStoreConfig::new(""),
    };

    if let Some(path) = &cli.path {
        config.path.clone_from(path);
    }
    if let Some(ms) = cli.max_age_ms {
        config.retention.max_age = Some(Duration::from_millis(ms));
    }
    if let Some(n) = cli.max_entries {
        config.retention.max_entries = Some(n);
    }
    if cli.quiet {
        config.should_write_to_stdout = false;
    }

    debug!(
        path = %config.path.display(),
        max_age = ?config.retention.max_age,
        max_entries = ?config.retention.max_entries,
        stdout = config.should_write_to_stdout,
        "resolved store configuration"
    );
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use std::path::PathBuf;
    use tempfile::TempDir;

    fn write_config(dir: &TempDir, body: &str) -> PathBuf {
        let path = dir.path().join("logbook.json");
        fs::write(&path, body).expect("write config");
        path
    }

    #[test]
    fn flags_only() {
        let cli = Cli::parse_from(["logbook", "--path", "/srv/logs", "--max-entries", "10", "show"]);
        let config = resolve(&cli).expect("resolve");

        assert_eq!(config.path, PathBuf::from("/srv/logs"));
        assert_eq!(config.retention.max_entries, Some(10));
        assert_eq!(config.retention.max_age, None);
        assert!(config.should_write_to_stdout);
    }

    #[test]
    fn flags_override_config_file() {
        let dir = TempDir::new().expect("create temp dir");
        let file = write_config(
            &dir,
            r#"{"dir": "/from/file", "maxAge": 1000, "maxEntries": 5, "shouldWriteToStdout": true}"#,
        );
        let file_arg = file.to_string_lossy().into_owned();
        let cli = Cli::parse_from(["logbook", "--config", &file_arg, "--max-entries", "50", "--quiet", "prune"]);

        let config = resolve(&cli).expect("resolve");

        assert_eq!(config.path, PathBuf::from("/from/file"));
        assert_eq!(config.retention.max_age, Some(Duration::from_secs(1)));
        assert_eq!(config.retention.max_entries, Some(50));
        assert!(!config.should_write_to_stdout);
    }

    #[test]
    fn missing_path_is_left_for_validation() {
        let cli = Cli::parse_from(["logbook", "show"]);
        let config = resolve(&cli).expect("resolve");
        assert!(config.path.as_os_str().is_empty());
        assert!(config.validate().is_err());
    }

    #[test]
    fn malformed_config_file_is_reported() {
        let dir = TempDir::new().expect("create temp dir");
        let file = write_config(&dir, "{ nope");
        let result = load_config_file(&file);
        assert!(matches!(result, Err(CliError::ConfigFile { .. })));
    }
}
