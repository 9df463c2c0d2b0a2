//! Top-level error type for the Reviewbell engine.
//!
//! The engine performs no I/O, so it has no transient failure class. The only
//! way it can fail is being handed input that breaks the data-model contract.
//! Collaborator errors (GitHub, Slack) are defined in their respective crates
//! and never pass through this type.

use thiserror::Error;

use crate::PullRequestKey;

/// Errors produced by the aggregation engine.
///
/// Every variant is a programming-contract violation by the caller. None of
/// them is worth retrying with the same input.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum EngineError {
    /// A review was attached to a pull request other than the one it names.
    #[error("Review by '{reviewer}' names {review_of} but was supplied with {supplied_with}")]
    MisattributedReview {
        /// Login of the reviewer.
        reviewer: String,
        /// The pull request the review itself references.
        review_of: PullRequestKey,
        /// The pull request the review was delivered alongside.
        supplied_with: PullRequestKey,
    },

    /// The same pull request appeared more than once in a snapshot.
    #[error("Pull request {key} appears more than once in the snapshot")]
    DuplicatePullRequest {
        /// The repeated identity.
        key: PullRequestKey,
    },

    /// A configuration value consumed by the engine is out of range.
    #[error("Invalid input: {message}")]
    InvalidInput {
        /// Description of the problem.
        message: String,
    },
}

impl EngineError {
    /// Shorthand for [`EngineError::InvalidInput`].
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput {
            message: message.into(),
        }
    }
}
