//! Reviewbell GitHub source feed.
//!
//! Implements [`engine::SourceFeed`] over the GitHub REST API: lists the open
//! pull requests of each configured repository and the submitted reviews of
//! each pull request, following `Link` pagination until exhausted.
//!
//! ## Architectural Layer
//!
//! **Infrastructure.** This crate must not contain domain rules. Authentication,
//! pagination, fan-out and wire-format mapping live here; the [`engine`] crate
//! never sees them. Failures are reported as [`GitHubError`] and never retried.

mod client;
mod errors;
mod feed;
mod wire;

pub use client::{GitHubClient, GitHubClientConfig, DEFAULT_API_URL};
pub use errors::GitHubError;
pub use feed::{GitHubSourceFeed, DEFAULT_CONCURRENCY};
