//! Versioned install cache for the language server
//!
//! Layout under the storage root:
//!
//! ```text
//! <root>/server/<component>-<tag>/<component>
//! ```
//!
//! A version directory counts as installed once its executable exists. After
//! a fresh install every other `<component>-*` directory is pruned.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use scopeguard::defer;
use tokio::fs;
use tracing::{debug, info, warn};

use crate::archive::{Extractor, UnzipExtractor};
use crate::context::Context;
use crate::download::Downloader;
use crate::error::{AcquisitionError, Error, Result};
use crate::permissions::make_executable;
use crate::platform::{asset_name, Platform};
use crate::release::ReleaseSource;
use crate::ASSET_SUFFIX;

/// Subdirectory of the storage root holding every installed version
pub const SERVER_DIR: &str = "server";

pub struct ServerCache {
    component: String,
    storage_root: PathBuf,
    source: ReleaseSource,
    platform: Platform,
    downloader: Downloader,
    extractor: Arc<dyn Extractor>,
}

impl ServerCache {
    pub fn new(
        component: impl Into<String>,
        storage_root: impl Into<PathBuf>,
        source: ReleaseSource,
        platform: Platform,
    ) -> Self {
        Self {
            component: component.into(),
            storage_root: storage_root.into(),
            source,
            platform,
            downloader: Downloader::default(),
            extractor: Arc::new(UnzipExtractor),
        }
    }

    pub fn with_downloader(mut self, downloader: Downloader) -> Self {
        self.downloader = downloader;
        self
    }

    pub fn with_extractor(mut self, extractor: Arc<dyn Extractor>) -> Self {
        self.extractor = extractor;
        self
    }

    pub fn component(&self) -> &str {
        &self.component
    }

    pub fn server_dir(&self) -> PathBuf {
        self.storage_root.join(SERVER_DIR)
    }

    pub fn version_dir(&self, tag: &str) -> PathBuf {
        self.server_dir().join(format!("{}-{}", self.component, tag))
    }

    pub fn executable_path(&self, tag: &str) -> PathBuf {
        self.version_dir(tag).join(&self.component)
    }

    /// Produce an executable path for the latest release, downloading it
    /// unless that version is already installed
    pub async fn acquire(&self, ctx: &Context) -> std::result::Result<PathBuf, AcquisitionError> {
        self.install_latest(ctx)
            .await
            .map_err(|source| AcquisitionError {
                component: self.component.clone(),
                source,
            })
    }

    async fn install_latest(&self, ctx: &Context) -> Result<PathBuf> {
        let server_dir = self.server_dir();
        fs::create_dir_all(&server_dir)
            .await
            .map_err(|e| Error::io(&server_dir, e))?;

        info!("Checking latest {} release on GitHub...", self.component);
        let release = self.source.latest(ctx).await?;
        let tag = release.tag_name.as_str();
        info!("Latest version: {}", tag);
        if !is_safe_tag(tag) {
            return Err(Error::InvalidTag(tag.to_string()));
        }

        let version_dir = self.version_dir(tag);
        let executable = self.executable_path(tag);

        if path_exists(&executable).await {
            info!("Using cached version: {}", executable.display());
            return Ok(executable);
        }

        fs::create_dir_all(&version_dir)
            .await
            .map_err(|e| Error::io(&version_dir, e))?;

        let name = asset_name(&self.component, tag, self.platform.arch, ASSET_SUFFIX);
        let asset = release
            .find_asset(&name)
            .ok_or_else(|| Error::AssetNotFound(name))?;

        info!("Downloading {}...", asset.browser_download_url);
        let archive = version_dir.join(&asset.name);
        self.downloader
            .download(ctx, &asset.browser_download_url, &archive)
            .await?;
        defer! { remove_archive(&archive) }

        info!("Extracting {}...", archive.display());
        self.extractor.extract(&archive, &version_dir).await?;

        if !path_exists(&executable).await {
            return Err(Error::MissingExecutable(executable));
        }
        make_executable(&executable).await;

        self.prune(tag).await;

        info!("Language server ready at: {}", executable.display());
        Ok(executable)
    }

    /// Delete every version directory except the one for `current_tag`.
    ///
    /// Matches `<component>-*` entries not containing `current_tag`. Errors are
    /// logged only.
    pub async fn prune(&self, current_tag: &str) {
        let server_dir = self.server_dir();
        let keep = self.version_dir(current_tag);
        let prefix = format!("{}-", self.component);

        let mut entries = match fs::read_dir(&server_dir).await {
            Ok(entries) => entries,
            Err(e) => {
                warn!("Error cleaning up old versions: {}", e);
                return;
            }
        };

        loop {
            let entry = match entries.next_entry().await {
                Ok(Some(entry)) => entry,
                Ok(None) => break,
                Err(e) => {
                    warn!("Error cleaning up old versions: {}", e);
                    break;
                }
            };

            let name = entry.file_name();
            let name = name.to_string_lossy();
            let path = entry.path();
            if !name.starts_with(&prefix) || name.contains(current_tag) || path == keep {
                continue;
            }

            info!("Cleaning up old version: {}", path.display());
            if let Err(e) = remove_entry(&path).await {
                warn!("Failed to remove {}: {}", path.display(), e);
            }
        }
    }
}

/// A tag becomes a single path component, so it must not traverse
fn is_safe_tag(tag: &str) -> bool {
    !tag.is_empty() && !tag.contains(['/', '\\']) && !tag.contains("..")
}

fn remove_archive(archive: &Path) {
    if let Err(e) = std::fs::remove_file(archive) {
        if e.kind() != std::io::ErrorKind::NotFound {
            warn!("Failed to remove archive {}: {}", archive.display(), e);
        }
    }
}

async fn path_exists(path: &Path) -> bool {
    fs::try_exists(path).await.unwrap_or(false)
}

async fn remove_entry(path: &Path) -> std::io::Result<()> {
    let metadata = fs::symlink_metadata(path).await?;
    if metadata.is_dir() {
        fs::remove_dir_all(path).await
    } else {
        debug!("Removing stray file {}", path.display());
        fs::remove_file(path).await
    }
}
