//! Shared fixtures for engine integration tests.

#![allow(dead_code)]

use std::collections::{BTreeSet, HashMap};

use chrono::{Duration, TimeZone, Utc};
use engine::{
    FetchedPullRequest, Handle, PullRequest, PullRequestKey, PullRequestNumber, RecipientId,
    RepositoryId, Review, ReviewState, TeamName, Timestamp,
};

pub const REPOSITORY: &str = "acme/widgets";

pub fn handle(login: &str) -> Handle {
    Handle::new(login).expect("non-empty login")
}

pub fn team(slug: &str) -> TeamName {
    TeamName::new(slug).expect("non-empty slug")
}

pub fn recipient(id: &str) -> RecipientId {
    RecipientId::new(id).expect("non-empty id")
}

/// `hours` after 2024-03-01T00:00:00Z.
pub fn at(hours: i64) -> Timestamp {
    let epoch = Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap();
    Timestamp::from_utc(epoch + Duration::hours(hours))
}

pub fn key(number: u64) -> PullRequestKey {
    PullRequestKey::new(
        RepositoryId::parse(REPOSITORY).unwrap(),
        PullRequestNumber::new(number),
    )
}

pub fn pull_request(number: u64, author: &str, created_hour: i64) -> PullRequest {
    PullRequest {
        key: key(number),
        title: format!("Change {number}"),
        url: format!("https://github.com/{REPOSITORY}/pull/{number}"),
        author: handle(author),
        created_at: at(created_hour),
        updated_at: at(created_hour),
        draft: false,
        requested_reviewers: BTreeSet::new(),
        requested_teams: BTreeSet::new(),
    }
}

pub fn review(number: u64, reviewer: &str, state: ReviewState, hour: i64) -> Review {
    Review {
        pull_request: key(number),
        reviewer: handle(reviewer),
        state,
        submitted_at: at(hour),
    }
}

pub fn fetched(pull_request: PullRequest, reviews: Vec<Review>) -> FetchedPullRequest {
    FetchedPullRequest {
        pull_request,
        reviews,
    }
}

/// Resolves each login in `logins` to `U_<LOGIN>`.
pub fn directory(logins: &[&str]) -> HashMap<Handle, RecipientId> {
    logins
        .iter()
        .map(|login| (handle(login), recipient(&format!("U_{}", login.to_uppercase()))))
        .collect()
}
