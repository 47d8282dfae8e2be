//! Core library for pkgswift
//!
//! Locates, downloads and caches the `package-swift-lsp` language server:
//! - Release lookup against the GitHub releases API
//! - Asset download with bounded redirects and a request deadline
//! - Versioned install cache with pruning of superseded versions
//! - Executable resolution (configured path, PATH, managed install)

pub mod archive;
pub mod cache;
pub mod config;
pub mod context;
pub mod download;
pub mod error;
pub mod locator;
pub mod manifest;
pub mod paths;
pub mod permissions;
pub mod platform;
pub mod process;
pub mod release;

#[cfg(test)]
pub(crate) mod test_support;

pub use cache::ServerCache;
pub use config::Settings;
pub use context::{Context, LogNotifier, Notifier};
pub use error::{AcquisitionError, CommandError, Error, LocateError, Result};
pub use locator::{Locator, PathLookup};
pub use platform::{Arch, Os, Platform};
pub use release::{Release, ReleaseAsset, ReleaseSource};

/// Name of the language server binary, also used as the cache directory prefix
pub const EXECUTABLE_NAME: &str = "package-swift-lsp";

/// GitHub repository publishing the language server releases
pub const SERVER_REPOSITORY: &str = "kattouf/package-swift-lsp";

/// Platform suffix carried by every published asset name
pub const ASSET_SUFFIX: &str = "apple-macosx";

/// User-Agent sent with every outgoing request
pub const USER_AGENT: &str = "pkgswift";
