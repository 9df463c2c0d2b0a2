//! Digest builder: channel summary plus per-recipient digests.
//!
//! Input is the classified relevant pull requests in display order. Output is a
//! [`DigestReport`] built by folding over that sequence, so every list inside it
//! keeps the display order.
//!
//! A single pull request can feed several digests, and several lists of the same
//! digest:
//!
//! - each directly requested reviewer that resolves gets it under
//!   [`RecipientDigest::review_requested`], whatever its category;
//! - a resolvable author gets it under [`RecipientDigest::approved`] or
//!   [`RecipientDigest::changes_requested`] when the category says so.
//!
//! Handles that do not resolve contribute nothing. Requested teams never do.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::{
    Category, Handle, IdentityResolver, PullRequest, PullRequestKey, RecipientId, Timestamp,
    PRECEDENCE,
};

// ---------------------------------------------------------------------------
// Inputs
// ---------------------------------------------------------------------------

/// A relevant pull request paired with its category.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassifiedPullRequest {
    pub pull_request: PullRequest,
    pub category: Category,
}

// ---------------------------------------------------------------------------
// Outputs
// ---------------------------------------------------------------------------

/// What a notifier needs to render one pull request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PullRequestRef {
    /// Repository and number, rendered as `owner/name#number`.
    pub key: PullRequestKey,
    /// Unescaped title; notifiers escape it for their own markup.
    pub title: String,
    /// Browser URL of the pull request.
    pub url: String,
    /// Who opened the pull request.
    pub author: Handle,
    /// When the pull request was opened.
    pub created_at: Timestamp,
    /// The category the pull request was classified under.
    pub category: Category,
}

impl From<&ClassifiedPullRequest> for PullRequestRef {
    fn from(classified: &ClassifiedPullRequest) -> Self {
        let pr = &classified.pull_request;
        Self {
            key: pr.key.clone(),
            title: pr.title.clone(),
            url: pr.url.clone(),
            author: pr.author.clone(),
            created_at: pr.created_at,
            category: classified.category,
        }
    }
}

/// Pull requests of one category, in display order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryGroup {
    pub category: Category,
    /// Ordered by creation time, ties in discovery order. Never empty.
    pub pull_requests: Vec<PullRequestRef>,
}

/// Channel-wide overview: non-empty categories in precedence order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Summary {
    groups: Vec<CategoryGroup>,
}

impl Summary {
    /// Groups `classified` by category. Empty categories are omitted.
    pub fn from_classified(classified: &[ClassifiedPullRequest]) -> Self {
        let groups = PRECEDENCE
            .iter()
            .map(|&category| CategoryGroup {
                category,
                pull_requests: classified
                    .iter()
                    .filter(|c| c.category == category)
                    .map(PullRequestRef::from)
                    .collect(),
            })
            .filter(|group| !group.pull_requests.is_empty())
            .collect();
        Self { groups }
    }

    /// Non-empty groups, highest precedence first.
    pub fn groups(&self) -> &[CategoryGroup] {
        &self.groups
    }

    /// Returns the group for `category`, if it has any pull requests.
    pub fn group(&self, category: Category) -> Option<&CategoryGroup> {
        self.groups.iter().find(|g| g.category == category)
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Total pull requests across all groups.
    pub fn total(&self) -> usize {
        self.groups.iter().map(|g| g.pull_requests.len()).sum()
    }
}

/// The pull requests that need one person's attention.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RecipientDigest {
    /// Authored by the recipient and approved.
    pub approved: Vec<PullRequestRef>,
    /// Authored by the recipient with changes requested.
    pub changes_requested: Vec<PullRequestRef>,
    /// The recipient's review was requested directly.
    pub review_requested: Vec<PullRequestRef>,
}

impl RecipientDigest {
    pub fn is_empty(&self) -> bool {
        self.approved.is_empty()
            && self.changes_requested.is_empty()
            && self.review_requested.is_empty()
    }

    fn push(&mut self, slot: Slot, pr: PullRequestRef) {
        match slot {
            Slot::Approved => self.approved.push(pr),
            Slot::ChangesRequested => self.changes_requested.push(pr),
            Slot::ReviewRequested => self.review_requested.push(pr),
        }
    }
}

/// Everything produced by one aggregation run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DigestReport {
    pub summary: Summary,
    /// Digests keyed by recipient, ordered by recipient id.
    pub digests: BTreeMap<RecipientId, RecipientDigest>,
}

impl DigestReport {
    /// Returns `true` when there is nothing to notify anyone about.
    pub fn is_empty(&self) -> bool {
        self.summary.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Building
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Slot {
    Approved,
    ChangesRequested,
    ReviewRequested,
}

/// Which digest lists `classified` belongs in, one entry per (recipient, list).
fn contributions<R>(classified: &ClassifiedPullRequest, resolver: &R) -> Vec<(RecipientId, Slot)>
where
    R: IdentityResolver + ?Sized,
{
    let pr = &classified.pull_request;

    let reviewers = pr
        .requested_reviewers
        .iter()
        .filter_map(|reviewer| resolver.resolve(reviewer))
        .map(|recipient| (recipient, Slot::ReviewRequested));

    let authored = match classified.category {
        Category::Approved => Some(Slot::Approved),
        Category::ChangesRequested => Some(Slot::ChangesRequested),
        Category::Old | Category::Other => None,
    }
    .and_then(|slot| resolver.resolve(&pr.author).map(|recipient| (recipient, slot)));

    reviewers.chain(authored).collect()
}

/// Builds the summary and every recipient digest from display-ordered input.
pub fn build<R>(classified: &[ClassifiedPullRequest], resolver: &R) -> DigestReport
where
    R: IdentityResolver + ?Sized,
{
    let digests = classified.iter().fold(BTreeMap::new(), |digests, item| {
        contributions(item, resolver)
            .into_iter()
            .fold(digests, |mut digests, (recipient, slot)| {
                digests
                    .entry(recipient)
                    .or_insert_with(RecipientDigest::default)
                    .push(slot, PullRequestRef::from(item));
                digests
            })
    });

    DigestReport {
        summary: Summary::from_classified(classified),
        digests,
    }
}
