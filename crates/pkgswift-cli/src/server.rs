//! Language server process

use std::path::Path;
use std::process::{ExitCode, ExitStatus, Stdio};

use anyhow::{Context as _, Result};
use tokio::process::Command;
use tracing::{info, warn};

/// Spawn the server on this process's stdio and wait for it to exit.
///
/// Ctrl-C kills the server.
pub async fn serve(path: &Path) -> Result<ExitStatus> {
    let mut child = Command::new(path)
        .stdin(Stdio::inherit())
        .stdout(Stdio::inherit())
        .stderr(Stdio::inherit())
        .kill_on_drop(true)
        .spawn()
        .with_context(|| format!("failed to start {}", path.display()))?;

    info!("Package.swift LSP server started: {}", path.display());

    tokio::select! {
        status = child.wait() => {
            let status = status.context("waiting for language server")?;
            info!("Language server exited: {}", status);
            Ok(status)
        }
        _ = tokio::signal::ctrl_c() => {
            warn!("Interrupted, stopping language server");
            child.kill().await.context("stopping language server")?;
            child.wait().await.context("waiting for language server")
        }
    }
}

pub fn exit_code(status: ExitStatus) -> ExitCode {
    match status.code() {
        Some(0) => ExitCode::SUCCESS,
        Some(code) => ExitCode::from(u8::try_from(code).unwrap_or(1)),
        None => ExitCode::FAILURE,
    }
}
