//! GitHub REST payloads and their mapping onto engine types.
//!
//! Only the fields Reviewbell reads are declared; serde ignores the rest.

use chrono::{DateTime, Utc};
use engine::{
    Handle, PullRequest, PullRequestKey, PullRequestNumber, RepositoryId, Review, ReviewState,
    TeamName, Timestamp,
};
use serde::Deserialize;
use tracing::warn;

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct UserPayload {
    pub login: String,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct TeamPayload {
    pub slug: String,
}

/// An entry of `GET /repos/{owner}/{repo}/pulls`.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct PullRequestPayload {
    pub number: u64,
    pub title: String,
    pub html_url: String,
    /// `null` when the author's account has been deleted.
    pub user: Option<UserPayload>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub draft: Option<bool>,
    #[serde(default)]
    pub requested_reviewers: Vec<UserPayload>,
    #[serde(default)]
    pub requested_teams: Vec<TeamPayload>,
}

impl PullRequestPayload {
    /// Converts to an engine [`PullRequest`], or `None` if the author is unknown.
    pub(crate) fn into_domain(self, repository: &RepositoryId) -> Option<PullRequest> {
        let key = PullRequestKey::new(repository.clone(), PullRequestNumber::new(self.number));
        let Some(author) = self.user.and_then(|u| Handle::new(u.login)) else {
            warn!(pull_request = %key, "Skipping pull request without an author");
            return None;
        };

        Some(PullRequest {
            key,
            title: self.title,
            url: self.html_url,
            author,
            created_at: Timestamp::from_utc(self.created_at),
            updated_at: Timestamp::from_utc(self.updated_at),
            draft: self.draft.unwrap_or(false),
            requested_reviewers: self
                .requested_reviewers
                .into_iter()
                .filter_map(|u| Handle::new(u.login))
                .collect(),
            requested_teams: self
                .requested_teams
                .into_iter()
                .filter_map(|t| TeamName::new(t.slug))
                .collect(),
        })
    }
}

/// An entry of `GET /repos/{owner}/{repo}/pulls/{number}/reviews`.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ReviewPayload {
    pub user: Option<UserPayload>,
    pub state: String,
    /// Absent while a review is still pending.
    #[serde(default)]
    pub submitted_at: Option<DateTime<Utc>>,
}

impl ReviewPayload {
    /// Converts to an engine [`Review`]; pending and authorless reviews yield `None`.
    pub(crate) fn into_domain(self, pull_request: &PullRequestKey) -> Option<Review> {
        let reviewer = self.user.and_then(|u| Handle::new(u.login))?;
        let submitted_at = self.submitted_at?;
        Some(Review {
            pull_request: pull_request.clone(),
            reviewer,
            state: review_state(&self.state),
            submitted_at: Timestamp::from_utc(submitted_at),
        })
    }
}

fn review_state(state: &str) -> ReviewState {
    match state {
        "APPROVED" => ReviewState::Approved,
        "CHANGES_REQUESTED" => ReviewState::ChangesRequested,
        "COMMENTED" => ReviewState::Commented,
        _ => ReviewState::Other,
    }
}
