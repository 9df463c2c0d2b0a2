//! Errors surfaced by the GitHub source feed.

use thiserror::Error;

/// Failures talking to the GitHub REST API.
///
/// None of these are retried here. The caller decides whether a run is worth
/// repeating.
#[derive(Debug, Error)]
pub enum GitHubError {
    /// The request never produced a response (DNS, TLS, timeout, ...).
    #[error("GitHub request to {endpoint} failed: {source}")]
    Transport {
        endpoint: String,
        #[source]
        source: reqwest::Error,
    },

    /// GitHub rejected the token.
    #[error("GitHub rejected the access token on {endpoint}")]
    Unauthorized { endpoint: String },

    /// GitHub answered with a non-success status.
    #[error("GitHub API error {status} on {endpoint}: {message}")]
    Api {
        status: u16,
        endpoint: String,
        message: String,
    },

    /// The response body did not match the expected shape.
    #[error("Could not decode GitHub response from {endpoint}: {source}")]
    Decode {
        endpoint: String,
        #[source]
        source: reqwest::Error,
    },

    /// The client could not be built from the supplied settings.
    #[error("Invalid GitHub configuration: {message}")]
    Configuration { message: String },

    /// A background review fetch panicked or was cancelled.
    #[error("Review fetch task failed: {message}")]
    Task { message: String },
}

impl GitHubError {
    pub(crate) fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }
}
