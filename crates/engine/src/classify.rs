//! Review-state classification.
//!
//! Every relevant pull request lands in exactly one [`Category`]. Precedence is
//! declared as data in [`RULES`]: the first rule whose predicate holds wins.
//! When none holds the pull request falls back to [`FALLBACK`], so
//! classification is total.
//!
//! | Rank | Category | Holds when |
//! |------|----------|------------|
//! | 0 | [`Category::ChangesRequested`] | any reviewer's latest review requests changes |
//! | 1 | [`Category::Approved`] | reviewed, and latest approvals ≥ the approval threshold |
//! | 2 | [`Category::Old`] | `now - created_at` ≥ the age threshold |
//! | 3 | [`Category::Other`] | fallback |
//!
//! A pull request without reviews is never approved, even with a threshold of
//! zero; only its age decides.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::{ClassificationPolicy, Handle, PullRequest, Review, ReviewState, Timestamp};

// ---------------------------------------------------------------------------
// Categories
// ---------------------------------------------------------------------------

/// The single bucket a relevant pull request is reported under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    /// At least one reviewer's latest review requests changes.
    ChangesRequested,
    /// Reviewed, and enough latest reviews approve.
    Approved,
    /// Open at least as long as the age threshold.
    Old,
    /// Waiting for review.
    Other,
}

/// All categories, highest precedence first.
pub const PRECEDENCE: [Category; 4] = [
    Category::ChangesRequested,
    Category::Approved,
    Category::Old,
    Category::Other,
];

impl Category {
    /// Position in [`PRECEDENCE`]; lower wins.
    pub fn rank(self) -> usize {
        match self {
            Category::ChangesRequested => 0,
            Category::Approved => 1,
            Category::Old => 2,
            Category::Other => 3,
        }
    }

    /// Stable machine-readable name (`"changes-requested"`, ...).
    pub fn as_str(self) -> &'static str {
        match self {
            Category::ChangesRequested => "changes-requested",
            Category::Approved => "approved",
            Category::Old => "old",
            Category::Other => "other",
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Latest review per reviewer
// ---------------------------------------------------------------------------

/// Reduces `reviews` to the most recent review of each reviewer.
///
/// A review replaces the retained one when its timestamp is not earlier, so on
/// an exact tie the review encountered last wins.
pub fn latest_reviews(reviews: &[Review]) -> BTreeMap<&Handle, &Review> {
    reviews
        .iter()
        .fold(BTreeMap::<&Handle, &Review>::new(), |mut latest, review| {
            let superseded = latest
                .get(&review.reviewer)
                .map_or(true, |kept| review.submitted_at >= kept.submitted_at);
            if superseded {
                latest.insert(&review.reviewer, review);
            }
            latest
        })
}

/// Verdict counts over the latest review of each reviewer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReviewTally {
    /// Distinct reviewers with at least one submitted review.
    pub reviewers: usize,
    /// Reviewers whose latest review approves.
    pub approvals: usize,
    /// Reviewers whose latest review requests changes.
    pub changes_requested: usize,
}

impl ReviewTally {
    /// Tallies the latest review of every reviewer in `reviews`.
    pub fn from_reviews(reviews: &[Review]) -> Self {
        latest_reviews(reviews)
            .values()
            .fold(Self::default(), |mut tally, review| {
                tally.reviewers += 1;
                match review.state {
                    ReviewState::Approved => tally.approvals += 1,
                    ReviewState::ChangesRequested => tally.changes_requested += 1,
                    ReviewState::Commented | ReviewState::Other => {}
                }
                tally
            })
    }
}

// ---------------------------------------------------------------------------
// Rule table
// ---------------------------------------------------------------------------

/// Everything a rule may look at when classifying one pull request.
#[derive(Debug, Clone, Copy)]
pub struct Evidence<'a> {
    pub tally: ReviewTally,
    pub policy: &'a ClassificationPolicy,
    /// Creation time of the pull request being classified.
    pub created_at: Timestamp,
    /// Evaluation instant shared by the whole run.
    pub now: Timestamp,
}

/// A precedence-ranked classification rule.
#[derive(Clone, Copy)]
pub struct Rule {
    /// Category assigned when the predicate holds.
    pub category: Category,
    predicate: fn(&Evidence<'_>) -> bool,
}

impl Rule {
    /// Returns `true` if this rule applies to `evidence`.
    pub fn holds(&self, evidence: &Evidence<'_>) -> bool {
        (self.predicate)(evidence)
    }
}

impl std::fmt::Debug for Rule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Rule").field("category", &self.category).finish()
    }
}

fn changes_requested(evidence: &Evidence<'_>) -> bool {
    evidence.tally.changes_requested > 0
}

fn approved(evidence: &Evidence<'_>) -> bool {
    evidence.tally.reviewers > 0 && evidence.policy.approvals.is_met_by(evidence.tally.approvals)
}

fn old(evidence: &Evidence<'_>) -> bool {
    evidence
        .policy
        .old_after
        .is_reached(evidence.created_at, evidence.now)
}

/// Classification rules in precedence order, tried before [`FALLBACK`].
pub const RULES: [Rule; 3] = [
    Rule {
        category: Category::ChangesRequested,
        predicate: changes_requested,
    },
    Rule {
        category: Category::Approved,
        predicate: approved,
    },
    Rule {
        category: Category::Old,
        predicate: old,
    },
];

/// Category of a pull request no rule in [`RULES`] matches.
pub const FALLBACK: Category = Category::Other;

/// Assigns `pull_request` its category given its reviews and the evaluation instant.
///
/// `reviews` must all belong to `pull_request`; [`crate::aggregate`] enforces that
/// before calling here.
pub fn classify(
    pull_request: &PullRequest,
    reviews: &[Review],
    policy: &ClassificationPolicy,
    now: Timestamp,
) -> Category {
    let evidence = Evidence {
        tally: ReviewTally::from_reviews(reviews),
        policy,
        created_at: pull_request.created_at,
        now,
    };

    RULES
        .iter()
        .find(|rule| rule.holds(&evidence))
        .map_or(FALLBACK, |rule| rule.category)
}
