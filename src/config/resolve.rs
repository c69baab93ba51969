use std::path::{Component, Path, PathBuf};

use crate::config::model::MigrationSettings;

pub const SETTINGS_FILE_NAME: &str = "fleet-migration.toml";

/// Walk up the directory tree from `start`, checking for `filename` at each level.
/// Returns the full path to the file if found, or None if the root is reached
/// without finding it.
pub fn find_settings(start: &Path, filename: &str) -> Option<PathBuf> {
    let mut current = start.to_path_buf();
    loop {
        let candidate = current.join(filename);
        if candidate.is_file() {
            return Some(candidate);
        }
        if !current.pop() {
            return None;
        }
    }
}

/// Resolve the settings file path. An explicit `cli_file` must exist. Without
/// one, search from the current working directory upward; `Ok(None)` means
/// built-in defaults apply.
pub fn resolve_settings(cli_file: Option<&Path>) -> anyhow::Result<Option<PathBuf>> {
    if let Some(path) = cli_file {
        if path.is_file() {
            return Ok(Some(path.canonicalize()?));
        }
        anyhow::bail!("Settings file not found: {}", path.display());
    }

    let cwd = std::env::current_dir()?;
    Ok(find_settings(&cwd, SETTINGS_FILE_NAME))
}

/// Absolute locations of every file the migration touches.
#[derive(Debug, Clone, PartialEq)]
pub struct Workspace {
    pub root: PathBuf,
    pub compose_file: PathBuf,
    pub generator: PathBuf,
    pub kibana_config: PathBuf,
}

impl Workspace {
    /// Anchor `settings` at `base_dir` (the settings file's directory, or the
    /// working directory when running on defaults).
    pub fn from_settings(settings: &MigrationSettings, base_dir: &Path) -> Self {
        let root = normalize(&base_dir.join(&settings.root));
        Self {
            compose_file: normalize(&root.join(&settings.compose_file)),
            generator: normalize(&root.join(&settings.generator)),
            kibana_config: normalize(&root.join(&settings.kibana_config)),
            root,
        }
    }

    /// The kibana.yml path as the compose runtime sees it from the root,
    /// e.g. `./scripts/fleet-migration/kibana.yml`.
    pub fn kibana_config_from_root(&self) -> String {
        match self.kibana_config.strip_prefix(&self.root) {
            Ok(relative) => {
                let parts: Vec<String> = relative
                    .components()
                    .map(|c| c.as_os_str().to_string_lossy().into_owned())
                    .collect();
                format!("./{}", parts.join("/"))
            }
            Err(_) => self.kibana_config.to_string_lossy().into_owned(),
        }
    }
}

/// Lexically collapse `.` and `..` without touching the filesystem.
fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if !out.pop() {
                    out.push("..");
                }
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}
