//! Relevance filter: which open pull requests matter to the tracked team.
//!
//! A pull request is relevant iff it is not a draft and at least one of these holds:
//!
//! - its author is a tracked member;
//! - a tracked member was requested directly as a reviewer;
//! - a tracked team was requested as a reviewer.
//!
//! Team requests are matched on the team itself. Membership is never expanded
//! to individuals here.

use crate::{FetchedPullRequest, PullRequest, TeamRoster};

/// Returns `true` if `pull_request` should be reported to the roster's team.
pub fn is_relevant(pull_request: &PullRequest, roster: &TeamRoster) -> bool {
    if pull_request.draft {
        return false;
    }

    roster.tracks_member(&pull_request.author)
        || pull_request
            .requested_reviewers
            .iter()
            .any(|reviewer| roster.tracks_member(reviewer))
        || pull_request
            .requested_teams
            .iter()
            .any(|team| roster.tracks_team(team))
}

/// Keeps the relevant entries of `snapshot`, preserving their order.
pub fn filter_relevant<'a>(
    snapshot: &'a [FetchedPullRequest],
    roster: &TeamRoster,
) -> Vec<&'a FetchedPullRequest> {
    snapshot
        .iter()
        .filter(|fetched| is_relevant(&fetched.pull_request, roster))
        .collect()
}
