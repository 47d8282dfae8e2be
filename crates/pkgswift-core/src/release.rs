//! GitHub releases API for server binary downloads

use serde::Deserialize;
use tracing::{debug, warn};

use crate::context::Context;
use crate::error::{Error, Result};
use crate::USER_AGENT;

pub const GITHUB_API_URL: &str = "https://api.github.com";

#[derive(Deserialize, Debug, Clone)]
pub struct Release {
    pub tag_name: String,
    pub assets: Vec<ReleaseAsset>,
}

#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ReleaseAsset {
    pub name: String,
    pub browser_download_url: String,
}

impl Release {
    pub fn find_asset(&self, name: &str) -> Option<&ReleaseAsset> {
        self.assets.iter().find(|asset| asset.name == name)
    }
}

/// Where releases of the server are published
#[derive(Debug, Clone)]
pub struct ReleaseSource {
    api_url: String,
    repository: String,
}

impl ReleaseSource {
    pub fn github(repository: impl Into<String>) -> Self {
        Self::new(GITHUB_API_URL, repository)
    }

    pub fn new(api_url: impl Into<String>, repository: impl Into<String>) -> Self {
        Self {
            api_url: api_url.into().trim_end_matches('/').to_string(),
            repository: repository.into(),
        }
    }

    pub fn latest_url(&self) -> String {
        format!("{}/repos/{}/releases/latest", self.api_url, self.repository)
    }

    /// Fetch the latest published release. Single attempt, no retries.
    pub async fn latest(&self, ctx: &Context) -> Result<Release> {
        debug!("GitHub API: fetching latest release for '{}'", self.repository);
        ctx.cancellable(self.fetch_latest(ctx)).await
    }

    async fn fetch_latest(&self, ctx: &Context) -> Result<Release> {
        let url = self.latest_url();
        let mut request = ctx.http().get(&url).header("User-Agent", USER_AGENT);

        // Use GITHUB_TOKEN if available (avoids rate limiting)
        if let Ok(token) = std::env::var("GITHUB_TOKEN") {
            request = request.header("Authorization", format!("Bearer {token}"));
        }

        let response = request.send().await.map_err(|source| Error::Network {
            url: url.clone(),
            source,
        })?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|source| Error::Network { url, source })?;

        if !status.is_success() {
            warn!("GitHub API error for '{}': {}", self.repository, status);
            return Err(Error::Remote {
                status: status.as_u16(),
                body,
            });
        }

        let release: Release = serde_json::from_str(&body)?;
        debug!(
            "GitHub API: latest release of '{}' is {} with {} assets",
            self.repository,
            release.tag_name,
            release.assets.len()
        );
        Ok(release)
    }
}
