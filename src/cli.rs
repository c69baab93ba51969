use clap::{Args, Parser};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(
    name = "fleet-migration",
    version,
    about = "Prepare and drive a local Fleet migration test environment"
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    /// Command to run (setup, start, fleet-apm, standalone-apm, down)
    pub command: Option<String>,

    /// Anything after the command is ignored
    #[arg(hide = true)]
    pub extra: Vec<String>,
}

#[derive(Debug, Args)]
pub struct GlobalOpts {
    /// Use a specific fleet-migration.toml settings file
    #[arg(short = 'f', long = "file")]
    pub settings_file: Option<PathBuf>,
}

/// The five procedures selectable from the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MigrationCommand {
    Setup,
    Start,
    FleetApm,
    StandaloneApm,
    Down,
}

impl MigrationCommand {
    pub const ALL: [MigrationCommand; 5] = [
        MigrationCommand::Setup,
        MigrationCommand::Start,
        MigrationCommand::FleetApm,
        MigrationCommand::StandaloneApm,
        MigrationCommand::Down,
    ];

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|cmd| cmd.name() == name)
    }

    pub fn name(self) -> &'static str {
        match self {
            MigrationCommand::Setup => "setup",
            MigrationCommand::Start => "start",
            MigrationCommand::FleetApm => "fleet-apm",
            MigrationCommand::StandaloneApm => "standalone-apm",
            MigrationCommand::Down => "down",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            MigrationCommand::Setup => {
                "Creates the docker-compose.yml file and modifies it to work for Fleet migration testing."
            }
            MigrationCommand::Start => {
                "Creates the docker-compose.yml, modifies it, then starts all services in docker. Then, fleet server host and APM Server settings are pushed to kibana."
            }
            MigrationCommand::FleetApm => {
                "Updates all services to use the Fleet-managed APM Server instead of the standalone APM Server."
            }
            MigrationCommand::StandaloneApm => {
                "Updates all services to use the standalone APM Server instead of the Fleet-managed APM Server."
            }
            MigrationCommand::Down => "Stops all services and removes all volumes.",
        }
    }
}
