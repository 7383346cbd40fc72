use std::time::Duration;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ForkviewError {
    /// The API answered but rejected the query.
    #[error("API error: {0}")]
    Api(String),

    /// The request never got a usable answer (connection, HTTP status, decoding).
    #[error("Network error: {0}")]
    Network(String),

    #[error("Request timed out after {0:?}")]
    Timeout(Duration),

    #[error("Authentication error: {0}")]
    Auth(String),

    #[error("invalid repository identifier: {0}")]
    InvalidRepo(String),

    #[error("could not determine repository: {0}")]
    RepoResolution(String),

    #[error("Failed to open browser: {0}")]
    Browser(String),

    #[error("Failed to copy to clipboard: {0}")]
    Clipboard(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ForkviewError {
    /// Whether retrying the same request could plausibly succeed.
    pub fn is_transient(&self) -> bool {
        matches!(self, ForkviewError::Network(_) | ForkviewError::Timeout(_))
    }
}

pub type Result<T> = std::result::Result<T, ForkviewError>;
