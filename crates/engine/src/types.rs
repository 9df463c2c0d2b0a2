//! Shared value types for the Reviewbell domain.
//!
//! Unlike the newtype identifiers in [`crate::identifiers`], these types carry
//! meaningful values with invariants (thresholds are non-negative, a review
//! belongs to exactly one pull request) and participate in domain computations.

use std::collections::BTreeSet;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::{Handle, PullRequestKey, TeamName};

// ---------------------------------------------------------------------------
// Time
// ---------------------------------------------------------------------------

/// A UTC wall-clock timestamp.
///
/// Wraps [`chrono::DateTime<Utc>`] so callers never depend on `chrono` types
/// directly; the underlying representation can change without affecting the
/// domain API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Timestamp(DateTime<Utc>);

impl Timestamp {
    /// Returns the current UTC time as a [`Timestamp`].
    pub fn now() -> Self {
        Self(Utc::now())
    }

    /// Creates a [`Timestamp`] from a [`DateTime<Utc>`].
    pub fn from_utc(dt: DateTime<Utc>) -> Self {
        Self(dt)
    }

    /// Returns the underlying [`DateTime<Utc>`].
    pub fn as_datetime(self) -> DateTime<Utc> {
        self.0
    }

    /// Returns how much time passed between `earlier` and `self`.
    ///
    /// Negative when `earlier` is actually in the future.
    pub fn since(self, earlier: Timestamp) -> Duration {
        self.0.signed_duration_since(earlier.0)
    }
}

impl std::fmt::Display for Timestamp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.to_rfc3339())
    }
}

// ---------------------------------------------------------------------------
// Thresholds
// ---------------------------------------------------------------------------

/// Number of approving reviewers required before a pull request counts as approved.
///
/// Zero is legal: every pull request without requested changes is then approved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ApprovalThreshold(u32);

impl ApprovalThreshold {
    /// Creates a threshold from a raw count.
    pub fn new(count: u32) -> Self {
        Self(count)
    }

    /// Returns the underlying count.
    pub fn as_u32(self) -> u32 {
        self.0
    }

    /// Returns `true` if `approvals` meets this threshold.
    pub fn is_met_by(self, approvals: usize) -> bool {
        approvals >= self.0 as usize
    }
}

impl std::fmt::Display for ApprovalThreshold {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ---------------------------------------------------------------------------

/// Minimum age at which an unreviewed pull request is considered old.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct AgeThreshold(Duration);

impl AgeThreshold {
    /// Creates an age threshold, returning `None` if `age` is negative.
    #[must_use]
    pub fn new(age: Duration) -> Option<Self> {
        if age < Duration::zero() {
            None
        } else {
            Some(Self(age))
        }
    }

    /// Creates an age threshold of a whole number of days.
    ///
    /// Returns `None` if `days` overflows a [`Duration`].
    #[must_use]
    pub fn from_days(days: u32) -> Option<Self> {
        Duration::try_days(i64::from(days)).map(Self)
    }

    /// Returns the threshold as a [`Duration`].
    pub fn as_duration(self) -> Duration {
        self.0
    }

    /// Returns `true` if something created at `created_at` has reached this age at `now`.
    pub fn is_reached(self, created_at: Timestamp, now: Timestamp) -> bool {
        now.since(created_at) >= self.0
    }
}

impl std::fmt::Display for AgeThreshold {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}d", self.0.num_days())
    }
}

// ---------------------------------------------------------------------------
// Reviews
// ---------------------------------------------------------------------------

/// The state a submitted review leaves its pull request in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReviewState {
    /// The reviewer approved the change.
    Approved,
    /// The reviewer asked for changes before the PR can merge.
    ChangesRequested,
    /// The reviewer left comments without a verdict.
    Commented,
    /// Any other state (dismissed, pending, unknown future states).
    Other,
}

/// A single submitted review on a pull request.
///
/// A reviewer may submit several reviews; only the most recent one counts
/// (see [`crate::classify::latest_reviews`]).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Review {
    /// The pull request this review was submitted on.
    pub pull_request: PullRequestKey,
    /// Who submitted the review.
    pub reviewer: Handle,
    /// The verdict carried by the review.
    pub state: ReviewState,
    /// When the review was submitted.
    pub submitted_at: Timestamp,
}

// ---------------------------------------------------------------------------
// Pull requests
// ---------------------------------------------------------------------------

/// An open pull request as delivered by the source feed.
///
/// Immutable once fetched; the engine never modifies pull request records.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PullRequest {
    /// Repository and number.
    pub key: PullRequestKey,
    /// Title as shown on GitHub, unescaped.
    pub title: String,
    /// Browser URL of the pull request.
    pub url: String,
    /// Who opened the pull request.
    pub author: Handle,
    /// When the pull request was opened; ages are measured from here.
    pub created_at: Timestamp,
    /// Last activity on the pull request. Informational only.
    pub updated_at: Timestamp,
    /// Draft pull requests are never relevant.
    pub draft: bool,
    /// Individuals whose review was requested directly.
    pub requested_reviewers: BTreeSet<Handle>,
    /// Teams whose review was requested.
    pub requested_teams: BTreeSet<TeamName>,
}

/// A pull request together with every review submitted on it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FetchedPullRequest {
    pub pull_request: PullRequest,
    /// Submitted reviews in source order; each must name `pull_request`.
    pub reviews: Vec<Review>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn ts(day: u32) -> Timestamp {
        Timestamp::from_utc(Utc.with_ymd_and_hms(2024, 3, day, 12, 0, 0).unwrap())
    }

    #[test]
    fn test_approval_threshold() {
        assert!(ApprovalThreshold::new(0).is_met_by(0));
        assert!(!ApprovalThreshold::new(2).is_met_by(1));
        assert!(ApprovalThreshold::new(2).is_met_by(2));
        assert!(ApprovalThreshold::new(2).is_met_by(3));
    }

    #[test]
    fn test_age_threshold_rejects_negative() {
        assert!(AgeThreshold::new(Duration::hours(-1)).is_none());
        assert!(AgeThreshold::new(Duration::zero()).is_some());
    }

    #[test]
    fn test_age_threshold_is_inclusive() {
        let week = AgeThreshold::from_days(7).unwrap();
        assert!(week.is_reached(ts(1), ts(8)));
        assert!(!week.is_reached(ts(1), ts(7)));
        assert_eq!(week.to_string(), "7d");
    }

    #[test]
    fn test_review_state_serialises_snake_case() {
        let json = serde_json::to_string(&ReviewState::ChangesRequested).unwrap();
        assert_eq!(json, "\"changes_requested\"");
    }
}
