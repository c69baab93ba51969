pub mod model;
pub mod resolve;

use std::path::Path;
use std::time::Duration;

use anyhow::{bail, Context};
use tracing::debug;

use model::{KibanaSettings, MigrationSettings};
use resolve::Workspace;

pub fn load_settings(path: &Path) -> anyhow::Result<MigrationSettings> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("Failed to read settings file {}: {}", path.display(), e))?;
    let settings: MigrationSettings = toml::from_str(&content)
        .map_err(|e| anyhow::anyhow!("Failed to parse settings file {}: {}", path.display(), e))?;
    validate(&settings)
        .with_context(|| format!("Invalid settings in {}", path.display()))?;
    Ok(settings)
}

/// Resolve and load settings, then anchor them into a [`Workspace`].
///
/// With no settings file anywhere up the tree, the defaults apply and the
/// working directory is the project root.
pub fn load(cli_file: Option<&Path>) -> anyhow::Result<(MigrationSettings, Workspace)> {
    match resolve::resolve_settings(cli_file)? {
        Some(path) => {
            debug!(path = %path.display(), "loading settings");
            let settings = load_settings(&path)?;
            let base_dir = path.parent().unwrap_or(Path::new("."));
            let workspace = Workspace::from_settings(&settings, base_dir);
            Ok((settings, workspace))
        }
        None => {
            debug!("no {} found, using defaults", resolve::SETTINGS_FILE_NAME);
            let settings = MigrationSettings::default();
            let cwd = std::env::current_dir()?;
            let workspace = Workspace::from_settings(&settings, &cwd);
            Ok((settings, workspace))
        }
    }
}

/// Reject settings that would only fail later, halfway through a command.
pub fn validate(settings: &MigrationSettings) -> anyhow::Result<()> {
    if settings.compose_command.first().is_none_or(|p| p.trim().is_empty()) {
        bail!("compose_command must name a program");
    }
    reqwest::Url::parse(&settings.kibana.url)
        .with_context(|| format!("kibana.url '{}' is not a valid URL", settings.kibana.url))?;
    settings.kibana.poll_timeout()?;
    settings.kibana.poll_interval()?;
    settings.kibana.max_wait()?;
    Ok(())
}

fn parse_duration(field: &str, value: &str) -> anyhow::Result<Duration> {
    humantime::parse_duration(value)
        .with_context(|| format!("kibana.{} '{}' is not a valid duration", field, value))
}

impl KibanaSettings {
    pub fn poll_timeout(&self) -> anyhow::Result<Duration> {
        parse_duration("poll_timeout", &self.poll_timeout)
    }

    pub fn poll_interval(&self) -> anyhow::Result<Duration> {
        parse_duration("poll_interval", &self.poll_interval)
    }

    pub fn max_wait(&self) -> anyhow::Result<Option<Duration>> {
        self.max_wait
            .as_deref()
            .map(|v| parse_duration("max_wait", v))
            .transpose()
    }
}
