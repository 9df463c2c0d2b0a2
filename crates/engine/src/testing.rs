//! Fixture builders shared by the unit tests.

use std::collections::BTreeSet;

use chrono::{Duration, TimeZone, Utc};

use crate::{
    FetchedPullRequest, Handle, PullRequest, PullRequestKey, PullRequestNumber, RecipientId,
    RepositoryId, Review, ReviewState, TeamName, Timestamp,
};

pub(crate) fn handle(login: &str) -> Handle {
    Handle::new(login).unwrap()
}

pub(crate) fn team(slug: &str) -> TeamName {
    TeamName::new(slug).unwrap()
}

pub(crate) fn recipient(id: &str) -> RecipientId {
    RecipientId::new(id).unwrap()
}

/// Hours expressed as a day count, for use with [`at`].
pub(crate) fn days(n: i64) -> i64 {
    n * 24
}

/// `hours` after the fixed fixture epoch (2024-03-01T00:00:00Z).
pub(crate) fn at(hours: i64) -> Timestamp {
    let epoch = Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap();
    Timestamp::from_utc(epoch + Duration::hours(hours))
}

pub(crate) fn key(number: u64) -> PullRequestKey {
    PullRequestKey::new(
        RepositoryId::parse("acme/widgets").unwrap(),
        PullRequestNumber::new(number),
    )
}

/// A non-draft pull request in `acme/widgets` created at the fixture epoch.
pub(crate) fn pr(number: u64, author: &str) -> PullRequest {
    PullRequest {
        key: key(number),
        title: format!("Change {number}"),
        url: format!("https://github.com/acme/widgets/pull/{number}"),
        author: handle(author),
        created_at: at(0),
        updated_at: at(0),
        draft: false,
        requested_reviewers: BTreeSet::new(),
        requested_teams: BTreeSet::new(),
    }
}

pub(crate) fn review(number: u64, reviewer: &str, state: ReviewState, hour: i64) -> Review {
    Review {
        pull_request: key(number),
        reviewer: handle(reviewer),
        state,
        submitted_at: at(hour),
    }
}

pub(crate) fn fetched(pull_request: PullRequest, reviews: Vec<Review>) -> FetchedPullRequest {
    FetchedPullRequest {
        pull_request,
        reviews,
    }
}
