//! Release asset download
//!
//! Streams a URL to a file, following redirects up to a hop limit and
//! enforcing a deadline measured from the first request. On any failure the
//! destination file is removed.

use std::path::Path;
use std::time::Duration;

use futures::StreamExt;
use reqwest::header::LOCATION;
use scopeguard::ScopeGuard;
use tokio::io::AsyncWriteExt;
use tokio::time::Instant;
use tracing::{debug, info, warn};
use url::Url;

use crate::context::Context;
use crate::error::{Error, Result};

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);
pub const MAX_REDIRECTS: usize = 5;

#[derive(Debug, Clone)]
pub struct Downloader {
    timeout: Duration,
    max_redirects: usize,
}

impl Default for Downloader {
    fn default() -> Self {
        Self::new(DEFAULT_TIMEOUT)
    }
}

impl Downloader {
    pub fn new(timeout: Duration) -> Self {
        Self {
            timeout,
            max_redirects: MAX_REDIRECTS,
        }
    }

    pub fn with_max_redirects(mut self, max_redirects: usize) -> Self {
        self.max_redirects = max_redirects;
        self
    }

    /// Download `url` to `dest`, creating or overwriting it
    pub async fn download(&self, ctx: &Context, url: &str, dest: &Path) -> Result<()> {
        let partial = scopeguard::guard(dest.to_path_buf(), |path| remove_partial(&path));
        let deadline = Instant::now() + self.timeout;

        let outcome = ctx
            .cancellable(async {
                match tokio::time::timeout_at(deadline, self.fetch(ctx, url, dest)).await {
                    Ok(result) => result,
                    Err(_) => Err(Error::Timeout {
                        url: url.to_string(),
                        after: self.timeout,
                    }),
                }
            })
            .await;

        if outcome.is_ok() {
            // Keep the file
            ScopeGuard::into_inner(partial);
        }
        outcome
    }

    async fn fetch(&self, ctx: &Context, url: &str, dest: &Path) -> Result<()> {
        let mut current = Url::parse(url).map_err(|source| Error::InvalidUrl {
            url: url.to_string(),
            source,
        })?;
        let mut redirects = 0;

        loop {
            debug!("Starting download from {}", current);
            let response = ctx
                .http()
                .get(current.clone())
                .send()
                .await
                .map_err(|source| Error::Network {
                    url: current.to_string(),
                    source,
                })?;

            let status = response.status();
            if status.is_redirection() {
                if let Some(location) = response.headers().get(LOCATION) {
                    if redirects >= self.max_redirects {
                        return Err(Error::TooManyRedirects {
                            url: url.to_string(),
                            limit: self.max_redirects,
                        });
                    }

                    let location = String::from_utf8_lossy(location.as_bytes()).into_owned();
                    current = current.join(&location).map_err(|source| Error::InvalidUrl {
                        url: location,
                        source,
                    })?;
                    redirects += 1;
                    info!("Following redirect to {}", current);
                    continue;
                }
            }

            if !status.is_success() {
                return Err(Error::Download {
                    url: current.to_string(),
                    status: status.as_u16(),
                });
            }

            return write_body(response, &current, dest).await;
        }
    }
}

async fn write_body(response: reqwest::Response, url: &Url, dest: &Path) -> Result<()> {
    let mut file = tokio::fs::File::create(dest)
        .await
        .map_err(|e| Error::io(dest, e))?;

    let mut written = 0u64;
    let mut stream = response.bytes_stream();
    while let Some(chunk) = stream.next().await {
        let chunk = chunk.map_err(|source| Error::Network {
            url: url.to_string(),
            source,
        })?;
        file.write_all(&chunk)
            .await
            .map_err(|e| Error::io(dest, e))?;
        written += chunk.len() as u64;
    }
    file.flush().await.map_err(|e| Error::io(dest, e))?;

    debug!("Downloaded {} bytes to {}", written, dest.display());
    Ok(())
}

/// Remove a partially written download; a failure here never replaces the
/// error that triggered the cleanup
fn remove_partial(path: &Path) {
    match std::fs::remove_file(path) {
        Ok(()) => debug!("Removed partial download {}", path.display()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => warn!("Failed to remove partial download {}: {}", path.display(), e),
    }
}
