use std::path::Path;

use crate::process::{CommandRunner, ExternalCommand, ProcessError};

/// `<compose> up --detach`, run from the project root.
pub fn up_command(compose: &[String], root: &Path) -> Result<ExternalCommand, ProcessError> {
    Ok(ExternalCommand::from_prefix(compose)?
        .args(["up", "--detach"])
        .current_dir(root))
}

/// `<compose> down -v`: stop everything and drop the volumes.
pub fn down_command(compose: &[String], root: &Path) -> Result<ExternalCommand, ProcessError> {
    Ok(ExternalCommand::from_prefix(compose)?
        .args(["down", "-v"])
        .current_dir(root))
}

/// Run the generator script that (re)creates the compose document.
pub async fn generate<R: CommandRunner>(
    runner: &R,
    generator: &Path,
    root: &Path,
) -> Result<(), ProcessError> {
    let cmd = ExternalCommand::new(generator.to_string_lossy()).current_dir(root);
    runner.run(&cmd).await
}

/// Echo the command line the way a shell trace would, then run it.
pub async fn run_traced<R: CommandRunner>(
    runner: &R,
    cmd: &ExternalCommand,
) -> Result<(), ProcessError> {
    println!("+ {}", cmd);
    runner.run(cmd).await
}
