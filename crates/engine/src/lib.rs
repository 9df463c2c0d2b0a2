//! Core classification and notification aggregation domain for Reviewbell.
//!
//! This crate decides which open pull requests matter to a team, reduces each
//! one's reviews to a single [`Category`], and groups the results into a channel
//! [`Summary`] plus one [`RecipientDigest`] per person who needs to act.
//! Infrastructure crates implement the port traits defined here; they never add
//! domain rules.
//!
//! ## Architectural Layer
//!
//! **Business logic + port definitions.** This crate has no I/O dependencies.
//! Every stage is a pure function over an already-fetched snapshot, so it is
//! safe to run concurrently for independent teams without shared state.
//!
//! ## Module Layout
//!
//! | Module | Contents |
//! |--------|----------|
//! | [`identifiers`] | Newtype identifiers (`Handle`, `RepositoryId`, `RecipientId`, etc.) |
//! | [`types`] | Pull requests, reviews, timestamps, thresholds |
//! | [`config`] | `TeamRoster` and `ClassificationPolicy` |
//! | [`relevance`] | Which pull requests matter to the team |
//! | [`classify`] | Latest-review reduction and the precedence rule table |
//! | [`digest`] | Summary and per-recipient grouping |
//! | [`aggregate`] | Validation and the end-to-end pipeline |
//! | [`ports`] | `SourceFeed`, `Notifier`, `IdentityResolver` |
//! | [`errors`] | `EngineError` |

pub mod aggregate;
pub mod classify;
pub mod config;
pub mod digest;
pub mod errors;
pub mod identifiers;
pub mod ports;
pub mod relevance;
pub mod types;

#[cfg(test)]
mod testing;

// Re-export everything at the crate root for ergonomic usage by downstream crates.
pub use aggregate::{aggregate, validate};
pub use classify::{
    classify, latest_reviews, Category, ReviewTally, FALLBACK, PRECEDENCE, RULES,
};
pub use config::{ClassificationPolicy, TeamRoster};
pub use digest::{
    build, CategoryGroup, ClassifiedPullRequest, DigestReport, PullRequestRef, RecipientDigest,
    Summary,
};
pub use errors::EngineError;
pub use identifiers::{
    Handle, PullRequestKey, PullRequestNumber, RecipientId, RepositoryId, RunId, TeamName,
};
pub use ports::{IdentityResolver, Notifier, SourceFeed};
pub use relevance::{filter_relevant, is_relevant};
pub use types::{
    AgeThreshold, ApprovalThreshold, FetchedPullRequest, PullRequest, Review, ReviewState,
    Timestamp,
};
