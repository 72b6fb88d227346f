//! GitHub API error types.

use thiserror::Error;

use crate::http::HttpError;

/// Errors that can occur when talking to the GitHub API.
#[derive(Debug, Error)]
pub enum GitHubError {
    /// Transport-level failure after the retry budget was exhausted.
    #[error("GitHub request failed: {0}")]
    Transport(#[from] HttpError),

    /// The server answered with a non-success status code.
    #[error("GitHub API returned status {code}")]
    Status { code: u16 },

    /// The response body could not be decoded.
    #[error("failed to decode GitHub response: {0}")]
    Decode(String),

    /// A repository URL that owner/name could not be derived from.
    #[error("invalid repository URL: {0}")]
    InvalidRepoUrl(String),
}

impl GitHubError {
    /// Whether this error indicates a rejected or missing credential.
    #[must_use]
    pub fn is_auth(&self) -> bool {
        matches!(self, GitHubError::Status { code: 401 | 403 })
    }
}
