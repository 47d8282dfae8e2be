//! Error types for server provisioning

use std::path::PathBuf;
use std::process::ExitStatus;
use std::time::Duration;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Failures raised inside the acquisition pipeline
#[derive(Debug, Error)]
pub enum Error {
    #[error("request to {url} failed: {source}")]
    Network {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("failed to build HTTP client: {0}")]
    HttpClient(#[source] reqwest::Error),

    #[error("invalid URL {url}: {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    #[error("release index responded with status {status}: {body}")]
    Remote { status: u16, body: String },

    #[error("failed to download {url}: server responded with {status}")]
    Download { url: String, status: u16 },

    #[error("failed to parse release metadata: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("request to {url} timed out after {} seconds", .after.as_secs_f32())]
    Timeout { url: String, after: Duration },

    #[error("too many redirects (more than {limit}) while downloading {url}")]
    TooManyRedirects { url: String, limit: usize },

    #[error("operation cancelled")]
    Cancelled,

    #[error("release tag {0:?} is not a valid directory name")]
    InvalidTag(String),

    #[error("no matching asset found for {0}")]
    AssetNotFound(String),

    #[error("unsupported platform: {0}")]
    UnsupportedPlatform(String),

    #[error("failed to extract archive: {0}")]
    Extraction(#[source] CommandError),

    #[error("archive did not contain {}", .0.display())]
    MissingExecutable(PathBuf),

    #[error("invalid config file {}: {source}", .path.display())]
    Config {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("{}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl Error {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// Failures of an external command
#[derive(Debug, Error)]
pub enum CommandError {
    #[error("failed to run {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{program} exited with {status}\nstdout: {stdout}\nstderr: {stderr}")]
    Failed {
        program: String,
        status: ExitStatus,
        stdout: String,
        stderr: String,
    },
}

/// Aggregate failure of a full acquisition, wrapping the step that failed
#[derive(Debug, Error)]
#[error("failed to acquire {component}: {source}")]
pub struct AcquisitionError {
    pub component: String,
    #[source]
    pub source: Error,
}

/// Failures of the executable locator chain
#[derive(Debug, Error)]
pub enum LocateError {
    #[error("custom {component} path not found: {}", .path.display())]
    ConfiguredPathNotFound { component: String, path: PathBuf },

    #[error(transparent)]
    Acquisition(#[from] AcquisitionError),
}
