//! Port traits implemented by infrastructure crates.
//!
//! The engine defines *what* it needs from the outside world; the `github` and
//! `slack` crates define *how* to supply it. The composition root in `cli`
//! wires concrete implementations together.

use std::collections::{BTreeMap, HashMap};

use async_trait::async_trait;

use crate::{DigestReport, FetchedPullRequest, Handle, RecipientId};

// ---------------------------------------------------------------------------
// Identity resolution
// ---------------------------------------------------------------------------

/// Maps a GitHub handle to the messaging identity that should be notified.
///
/// Returning `None` is not an error: that handle simply receives no digest.
pub trait IdentityResolver {
    fn resolve(&self, handle: &Handle) -> Option<RecipientId>;
}

impl IdentityResolver for HashMap<Handle, RecipientId> {
    fn resolve(&self, handle: &Handle) -> Option<RecipientId> {
        self.get(handle).cloned()
    }
}

impl IdentityResolver for BTreeMap<Handle, RecipientId> {
    fn resolve(&self, handle: &Handle) -> Option<RecipientId> {
        self.get(handle).cloned()
    }
}

impl<F> IdentityResolver for F
where
    F: Fn(&Handle) -> Option<RecipientId>,
{
    fn resolve(&self, handle: &Handle) -> Option<RecipientId> {
        self(handle)
    }
}

// ---------------------------------------------------------------------------
// Collaborators
// ---------------------------------------------------------------------------

/// Supplies the open pull requests of every configured repository.
///
/// Implementations resolve pagination and fan-out themselves and return one
/// complete batch: repositories in configured order, pull requests in source
/// order within a repository, each with all of its submitted reviews.
#[async_trait]
pub trait SourceFeed: Send + Sync {
    /// Failure type surfaced to the caller unchanged.
    type Error: std::error::Error + Send + Sync + 'static;

    async fn fetch_open_pull_requests(&self) -> Result<Vec<FetchedPullRequest>, Self::Error>;
}

/// Delivers a finished [`DigestReport`].
///
/// The summary must be delivered before any recipient digest.
#[async_trait]
pub trait Notifier: Send + Sync {
    type Error: std::error::Error + Send + Sync + 'static;

    async fn deliver(&self, report: &DigestReport) -> Result<(), Self::Error>;
}
