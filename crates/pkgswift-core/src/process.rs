//! External command execution

use std::ffi::OsStr;

use tokio::process::Command;
use tracing::debug;

use crate::error::CommandError;

/// Run `program` with `args` and return its stdout.
///
/// A nonzero exit is an error carrying both output streams.
pub async fn run<I, S>(program: &str, args: I) -> Result<String, CommandError>
where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
{
    debug!("Running {}", program);

    let output = Command::new(program)
        .args(args)
        .output()
        .await
        .map_err(|source| CommandError::Spawn {
            program: program.to_string(),
            source,
        })?;

    if !output.status.success() {
        return Err(CommandError::Failed {
            program: program.to_string(),
            status: output.status,
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        });
    }

    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}
