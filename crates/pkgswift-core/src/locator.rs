//! Executable resolution
//!
//! Priority order: configured path, then PATH, then a managed download.

use std::ffi::OsString;
use std::path::PathBuf;

use tracing::{debug, error, info};

use crate::cache::ServerCache;
use crate::context::Context;
use crate::error::LocateError;

/// PATH lookup for a binary name
#[derive(Debug, Clone, Default)]
pub struct PathLookup {
    search_path: Option<OsString>,
}

impl PathLookup {
    /// Search the process `PATH`
    pub fn system() -> Self {
        Self::default()
    }

    /// Search the given `PATH`-style list instead of the process environment
    pub fn with_search_path(search_path: impl Into<OsString>) -> Self {
        Self {
            search_path: Some(search_path.into()),
        }
    }

    pub fn find(&self, binary_name: &str) -> Option<PathBuf> {
        let found = match &self.search_path {
            None => which::which(binary_name),
            Some(paths) => which::which_in(binary_name, Some(paths), "."),
        };
        found.ok().filter(|path| !path.as_os_str().is_empty())
    }
}

pub struct Locator {
    custom_path: Option<PathBuf>,
    lookup: PathLookup,
    cache: ServerCache,
}

impl Locator {
    pub fn new(cache: ServerCache) -> Self {
        Self {
            custom_path: None,
            lookup: PathLookup::system(),
            cache,
        }
    }

    /// Use a user-configured executable; empty strings are ignored
    pub fn with_custom_path(mut self, path: Option<&str>) -> Self {
        self.custom_path = path.filter(|p| !p.is_empty()).map(PathBuf::from);
        self
    }

    pub fn with_lookup(mut self, lookup: PathLookup) -> Self {
        self.lookup = lookup;
        self
    }

    pub fn cache(&self) -> &ServerCache {
        &self.cache
    }

    /// Resolve the server executable, returning the reason on failure
    pub async fn resolve(&self, ctx: &Context) -> Result<PathBuf, LocateError> {
        let component = self.cache.component();

        if let Some(custom) = &self.custom_path {
            info!("Using custom language server path: {}", custom.display());
            if !tokio::fs::try_exists(custom).await.unwrap_or(false) {
                return Err(LocateError::ConfiguredPathNotFound {
                    component: component.to_string(),
                    path: custom.clone(),
                });
            }
            return Ok(custom.clone());
        }

        match self.lookup.find(component) {
            Some(path) => {
                info!("Found language server in PATH: {}", path.display());
                return Ok(path);
            }
            None => debug!("Language server not found in PATH"),
        }

        Ok(self.cache.acquire(ctx).await?)
    }

    /// Resolve the server executable, reporting any failure once to the user.
    ///
    /// Returns `None` when the server is unavailable.
    pub async fn locate(&self, ctx: &Context) -> Option<PathBuf> {
        match self.resolve(ctx).await {
            Ok(path) => Some(path),
            Err(e) => {
                error!("Failed to locate language server: {}", e);
                let message = match &e {
                    LocateError::ConfiguredPathNotFound { .. } => e.to_string(),
                    LocateError::Acquisition(inner) => {
                        format!("Failed to download {}: {}", inner.component, inner.source)
                    }
                };
                ctx.notify_error(&message);
                None
            }
        }
    }
}
