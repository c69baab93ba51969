use std::fmt;
use std::future::Future;
use std::path::PathBuf;
use std::process::Stdio;

use tokio::process::Command;
use tracing::debug;

/// A program invocation with its arguments and working directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExternalCommand {
    pub program: String,
    pub args: Vec<String>,
    pub cwd: Option<PathBuf>,
}

impl ExternalCommand {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            cwd: None,
        }
    }

    /// Build from a `[program, args...]` prefix such as `["docker", "compose"]`.
    pub fn from_prefix(prefix: &[String]) -> Result<Self, ProcessError> {
        let (program, args) = prefix.split_first().ok_or(ProcessError::Empty)?;
        Ok(Self::new(program.clone()).args(args.iter().cloned()))
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn current_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.cwd = Some(dir.into());
        self
    }
}

impl fmt::Display for ExternalCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.program)?;
        for arg in &self.args {
            write!(f, " {}", arg)?;
        }
        Ok(())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ProcessError {
    #[error("no program given")]
    Empty,
    #[error("failed to spawn `{command}`: {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },
    #[error("`{command}` exited with {}", .code.map_or_else(|| "a signal".to_string(), |c| format!("status {}", c)))]
    Failed { command: String, code: Option<i32> },
}

/// Runs external programs to completion. Output handling is up to the
/// implementation; a non-zero exit must surface as [`ProcessError::Failed`].
pub trait CommandRunner {
    fn run(&self, command: &ExternalCommand) -> impl Future<Output = Result<(), ProcessError>> + Send;
}

/// Spawns real processes that share this process's stdout and stderr.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessRunner;

impl CommandRunner for ProcessRunner {
    async fn run(&self, command: &ExternalCommand) -> Result<(), ProcessError> {
        let mut cmd = Command::new(&command.program);
        cmd.args(&command.args)
            .stdin(Stdio::null())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit());
        if let Some(dir) = &command.cwd {
            cmd.current_dir(dir);
        }

        debug!(command = %command, cwd = ?command.cwd, "spawning");
        let status = cmd.status().await.map_err(|source| ProcessError::Spawn {
            command: command.to_string(),
            source,
        })?;

        if !status.success() {
            return Err(ProcessError::Failed {
                command: command.to_string(),
                code: status.code(),
            });
        }
        Ok(())
    }
}
