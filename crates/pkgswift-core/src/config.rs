//! User settings
//!
//! Read once per activation from `config.toml`. Every key is optional:
//!
//! ```toml
//! enable = true
//! path = "/usr/local/bin/package-swift-lsp"
//! repository = "kattouf/package-swift-lsp"
//! api_url = "https://api.github.com"
//! download_timeout_secs = 30
//! storage_dir = "/var/cache/pkgswift"
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::download::DEFAULT_TIMEOUT;
use crate::error::{Error, Result};
use crate::paths;
use crate::release::GITHUB_API_URL;
use crate::SERVER_REPOSITORY;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Start the language server at all
    pub enable: bool,
    /// Executable to use instead of PATH lookup or download
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    /// GitHub repository publishing server releases
    pub repository: String,
    pub api_url: String,
    pub download_timeout_secs: u64,
    /// Storage root override; defaults to the platform data directory
    #[serde(skip_serializing_if = "Option::is_none")]
    pub storage_dir: Option<PathBuf>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            enable: true,
            path: None,
            repository: SERVER_REPOSITORY.to_string(),
            api_url: GITHUB_API_URL.to_string(),
            download_timeout_secs: DEFAULT_TIMEOUT.as_secs(),
            storage_dir: None,
        }
    }
}

impl Settings {
    /// Load from the standard config location, or defaults if there is none
    pub fn load() -> Result<Self> {
        match paths::config_file() {
            Some(path) => Self::load_from(&path),
            None => Ok(Self::default()),
        }
    }

    /// Load from `path`. A missing file yields defaults; a malformed one is an error.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("No config at {}, using defaults", path.display());
                return Ok(Self::default());
            }
            Err(e) => return Err(Error::io(path, e)),
        };

        toml::from_str(&content).map_err(|source| Error::Config {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Configured executable path, if set and non-empty
    pub fn custom_path(&self) -> Option<&str> {
        self.path.as_deref().filter(|p| !p.trim().is_empty())
    }

    pub fn storage_root(&self) -> Option<PathBuf> {
        self.storage_dir.clone().or_else(paths::data_dir)
    }

    pub fn download_timeout(&self) -> Duration {
        Duration::from_secs(self.download_timeout_secs)
    }
}
