//! Activation: settings and platform checks, then executable resolution

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context as _, Result};
use pkgswift_core::context::http_client;
use pkgswift_core::download::Downloader;
use pkgswift_core::{
    Context, Locator, Notifier, Platform, ReleaseSource, ServerCache, Settings, EXECUTABLE_NAME,
};
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

/// Shows failures to the user on stderr, separate from the log stream
struct StderrNotifier;

impl Notifier for StderrNotifier {
    fn notify_error(&self, message: &str) {
        eprintln!("pkgswift: {message}");
    }
}

pub struct Activation {
    ctx: Context,
    locator: Locator,
}

impl Activation {
    /// Returns `None` when the server should not be started at all
    pub fn prepare(settings: Settings) -> Result<Option<Self>> {
        if !settings.enable {
            info!("Extension is disabled via configuration");
            return Ok(None);
        }

        let notifier: Arc<dyn Notifier> = Arc::new(StderrNotifier);
        let platform = match Platform::current() {
            Ok(platform) => platform,
            Err(e) => {
                error!("{}", e);
                notifier.notify_error(&format!("Package.swift LSP is not available: {e}"));
                return Ok(None);
            }
        };

        let storage_root = settings
            .storage_root()
            .context("no data directory available for downloaded servers")?;

        let cancellation = CancellationToken::new();
        watch_interrupt(cancellation.clone());

        let ctx = Context::new(http_client()?)
            .with_notifier(notifier)
            .with_cancellation(cancellation);

        let cache = ServerCache::new(
            EXECUTABLE_NAME,
            storage_root,
            ReleaseSource::new(&settings.api_url, &settings.repository),
            platform,
        )
        .with_downloader(Downloader::new(settings.download_timeout()));

        let locator = Locator::new(cache).with_custom_path(settings.custom_path());

        Ok(Some(Self { ctx, locator }))
    }

    pub async fn locate(&self) -> Option<PathBuf> {
        self.locator.locate(&self.ctx).await
    }
}

/// Cancel in-flight acquisition on Ctrl-C
fn watch_interrupt(token: CancellationToken) {
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            token.cancel();
        }
    });
}
