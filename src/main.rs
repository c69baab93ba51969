use clap::error::ErrorKind;
use clap::Parser;
use fleet_migration::cli::{Cli, MigrationCommand};
use fleet_migration::commands;
use fleet_migration::config;
use fleet_migration::orchestrator::Migration;
use fleet_migration::process::ProcessRunner;

#[tokio::main]
async fn main() {
    // Initialize tracing subscriber with env-filter support.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) if matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => e.exit(),
        Err(e) => {
            // Anything clap rejects falls through to the command listing.
            tracing::debug!("{}", e.kind());
            let first = std::env::args().nth(1);
            commands::help::run(first.as_deref());
            return;
        }
    };

    let command = match cli.command.as_deref().map(MigrationCommand::from_name) {
        Some(Some(command)) => command,
        _ => {
            commands::help::run(cli.command.as_deref());
            return;
        }
    };

    if let Err(e) = run(cli.global.settings_file, command).await {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

async fn run(
    settings_file: Option<std::path::PathBuf>,
    command: MigrationCommand,
) -> anyhow::Result<()> {
    let (settings, workspace) = config::load(settings_file.as_deref())?;
    let migration = Migration::new(settings, workspace, ProcessRunner)?;
    migration.run(command).await
}
