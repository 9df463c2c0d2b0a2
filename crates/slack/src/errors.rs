//! Errors surfaced by the Slack notifier.

use thiserror::Error;

/// Failures delivering messages through the Slack Web API.
#[derive(Debug, Error)]
pub enum SlackError {
    /// The request never produced a usable response.
    #[error("Slack request to {method} failed: {source}")]
    Transport {
        method: &'static str,
        #[source]
        source: reqwest::Error,
    },

    /// Slack answered with a non-success HTTP status.
    #[error("Slack returned HTTP {status} for {method}")]
    Status { method: &'static str, status: u16 },

    /// Slack answered `ok: false` (e.g. `channel_not_found`, `invalid_auth`).
    #[error("Slack API error on {method}: {error}")]
    Api { method: &'static str, error: String },

    /// The summary was posted but Slack did not return its timestamp, so
    /// digests cannot be threaded under it.
    #[error("Slack did not return a message timestamp for the summary")]
    MissingTimestamp,

    /// The client could not be built from the supplied settings.
    #[error("Invalid Slack configuration: {message}")]
    Configuration { message: String },
}
