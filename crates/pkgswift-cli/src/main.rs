//! pkgswift - launcher for the Package.swift language server

mod activation;
mod server;

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context as _, Result};
use clap::{Parser, Subcommand};
use pkgswift_core::manifest::is_package_manifest;
use pkgswift_core::Settings;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::activation::Activation;

#[derive(Parser, Debug)]
#[command(name = "pkgswift", version, about = "Launcher for the Package.swift language server")]
struct Cli {
    /// Config file (defaults to the platform config directory)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Language server executable, bypassing PATH lookup and download
    #[arg(long, global = true)]
    server_path: Option<String>,

    /// Storage root for downloaded servers
    #[arg(long, global = true)]
    storage_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Locate the language server and run it on this process's stdio
    Serve,
    /// Print the path of the language server executable
    Locate,
    /// Report which files are Swift package manifests
    Check {
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },
    /// Print the effective settings
    Config,
}

impl Cli {
    fn settings(&self) -> Result<Settings> {
        let mut settings = match &self.config {
            Some(path) => Settings::load_from(path),
            None => Settings::load(),
        }
        .context("loading settings")?;

        if let Some(path) = &self.server_path {
            settings.path = Some(path.clone());
        }
        if let Some(dir) = &self.storage_dir {
            settings.storage_dir = Some(dir.clone());
        }
        Ok(settings)
    }
}

fn init_logging() {
    // stdout carries the LSP stream, so logs go to stderr
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("pkgswift=info,pkgswift_core=info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    init_logging();

    let cli = Cli::parse();
    let settings = cli.settings()?;

    match cli.command {
        Command::Serve => {
            info!("Activating Package.swift LSP");
            let Some(activation) = Activation::prepare(settings)? else {
                return Ok(ExitCode::SUCCESS);
            };
            let Some(path) = activation.locate().await else {
                return Ok(ExitCode::FAILURE);
            };
            let status = server::serve(&path).await?;
            Ok(server::exit_code(status))
        }
        Command::Locate => {
            let Some(activation) = Activation::prepare(settings)? else {
                return Ok(ExitCode::FAILURE);
            };
            match activation.locate().await {
                Some(path) => {
                    println!("{}", path.display());
                    Ok(ExitCode::SUCCESS)
                }
                None => Ok(ExitCode::FAILURE),
            }
        }
        Command::Check { files } => {
            let mut all_manifests = true;
            for file in &files {
                let manifest = is_package_manifest(file);
                all_manifests &= manifest;
                println!(
                    "{}\t{}",
                    if manifest { "manifest" } else { "ignored" },
                    file.display()
                );
            }
            Ok(if all_manifests {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            })
        }
        Command::Config => {
            print!("{}", toml::to_string(&settings).context("serializing settings")?);
            Ok(ExitCode::SUCCESS)
        }
    }
}
