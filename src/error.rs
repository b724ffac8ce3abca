use std::path::PathBuf;

/// Errors raised while turning command line arguments into a [`crate::config::Config`].
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum ConfigError {
    #[error("Invalid number of requests: \"{0}\"")]
    InvalidRequests(String),

    #[error("Invalid concurrency level: \"{0}\" (must be >= 1)")]
    InvalidConcurrency(String),

    #[error("Invalid number of threads: \"{0}\" (must be >= 1)")]
    InvalidThreads(String),

    #[error("Invalid value for timeout: \"{0}\"")]
    InvalidTimeout(String),

    #[error("Invalid URL \"{url}\": {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("Unsupported URL scheme \"{0}\" (use http or https)")]
    UnsupportedScheme(String),

    #[error("Missing value for {0}")]
    MissingValue(String),

    #[error("Unknown option: {0}")]
    UnknownFlag(String),
}

/// Errors that stop a run before any request is sent.
#[derive(Debug, thiserror::Error)]
pub enum RunnerError {
    #[error("Failed to build HTTP client: {0}")]
    Client(#[from] isahc::Error),
}

/// Failure to persist the per-request export.
#[derive(Debug, thiserror::Error)]
#[error("Failed to write {}: {}", .path.display(), .source)]
pub struct ExportError {
    pub path: PathBuf,
    #[source]
    pub source: std::io::Error,
}

/// Why a single request produced no latency sample.
#[derive(Debug, thiserror::Error)]
pub enum RequestError {
    #[error(transparent)]
    Transport(#[from] isahc::Error),

    #[error("invalid request: {0}")]
    Build(#[from] isahc::http::Error),

    #[error("reading response body: {0}")]
    Drain(#[from] std::io::Error),
}

impl RequestError {
    pub fn is_timeout(&self) -> bool {
        match self {
            RequestError::Transport(err) => matches!(err.kind(), isahc::error::ErrorKind::Timeout),
            RequestError::Drain(err) => err.kind() == std::io::ErrorKind::TimedOut,
            RequestError::Build(_) => false,
        }
    }
}
