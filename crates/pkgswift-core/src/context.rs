//! Per-activation context shared by every provisioning step
//!
//! Carries the HTTP client, a cancellation token and the sink for
//! user-facing notifications. Diagnostics go through `tracing`.

use std::future::Future;
use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::error;

use crate::error::{Error, Result};
use crate::USER_AGENT;

/// Receives the one-shot failure message shown to the user
pub trait Notifier: Send + Sync {
    fn notify_error(&self, message: &str);
}

/// Notifier that only records the message in the log
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify_error(&self, message: &str) {
        error!(target: "pkgswift::notify", "{}", message);
    }
}

#[derive(Clone)]
pub struct Context {
    http: reqwest::Client,
    cancellation: CancellationToken,
    notifier: Arc<dyn Notifier>,
}

impl Context {
    pub fn new(http: reqwest::Client) -> Self {
        Self {
            http,
            cancellation: CancellationToken::new(),
            notifier: Arc::new(LogNotifier),
        }
    }

    pub fn with_notifier(mut self, notifier: Arc<dyn Notifier>) -> Self {
        self.notifier = notifier;
        self
    }

    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = token;
        self
    }

    pub fn http(&self) -> &reqwest::Client {
        &self.http
    }

    pub fn cancellation(&self) -> &CancellationToken {
        &self.cancellation
    }

    pub fn notify_error(&self, message: &str) {
        self.notifier.notify_error(message);
    }

    /// Run `fut` unless the context is cancelled first
    pub(crate) async fn cancellable<T>(&self, fut: impl Future<Output = Result<T>>) -> Result<T> {
        tokio::select! {
            biased;
            _ = self.cancellation.cancelled() => Err(Error::Cancelled),
            result = fut => result,
        }
    }
}

/// Build the HTTP client used for release lookups and downloads.
///
/// Redirects are disabled so the downloader can follow them itself with a hop limit.
pub fn http_client() -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .user_agent(USER_AGENT)
        .redirect(reqwest::redirect::Policy::none())
        .build()
        .map_err(Error::HttpClient)
}
