//! logbook CLI binary entrypoint.

use std::io;
use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use logbook::{EntryType, LogStoreConfig};
use logbook_cli::cli::{AppendArgs, Cli, Commands};
use logbook_cli::commands::{AppendCommand, PruneCommand, ShowCommand};
use logbook_cli::config;
use logbook_cli::output::OutputFormat;

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let config = config::resolve(&cli)?;
    let mut stdout = io::stdout().lock();

    match &cli.command {
        Commands::Info(args) => append(&config, EntryType::Info, args)?,
        Commands::Success(args) => append(&config, EntryType::Success, args)?,
        Commands::Warning(args) => append(&config, EntryType::Warning, args)?,
        Commands::Error(args) => append(&config, EntryType::Error, args)?,
        Commands::Show { format } => {
            ShowCommand::new(&config)
                .execute(&mut stdout, &OutputFormat::new(*format))
                .context("failed to show log history")?;
        }
        Commands::Prune => {
            PruneCommand::new(&config)
                .execute(&mut stdout, &OutputFormat::default())
                .context("failed to prune log history")?;
        }
    }

    Ok(())
}

fn append(config: &LogStoreConfig, entry_type: EntryType, args: &AppendArgs) -> anyhow::Result<()> {
    AppendCommand::new(config)
        .execute(entry_type, args)
        .with_context(|| format!("failed to append {entry_type} entry"))
}
