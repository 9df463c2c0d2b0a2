//! [`SourceFeed`] implementation backed by [`GitHubClient`].

use std::sync::Arc;

use async_trait::async_trait;
use engine::{FetchedPullRequest, PullRequest, RepositoryId, Review, SourceFeed};
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{info, instrument};

use crate::{GitHubClient, GitHubError};

/// Default number of review listings fetched at once.
pub const DEFAULT_CONCURRENCY: usize = 8;

/// Fetches open pull requests and their reviews for a fixed list of repositories.
///
/// Repositories are listed one after another in configured order. Review
/// listings fan out concurrently (bounded by `concurrency`) and are put back
/// in pull request order before returning.
#[derive(Debug, Clone)]
pub struct GitHubSourceFeed {
    client: GitHubClient,
    repositories: Vec<RepositoryId>,
    concurrency: usize,
}

impl GitHubSourceFeed {
    pub fn new(client: GitHubClient, repositories: Vec<RepositoryId>) -> Self {
        Self {
            client,
            repositories,
            concurrency: DEFAULT_CONCURRENCY,
        }
    }

    /// Caps concurrent review requests. Zero is treated as one.
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    async fn fetch_reviews(
        &self,
        pull_requests: &[PullRequest],
    ) -> Result<Vec<Vec<Review>>, GitHubError> {
        let permits = Arc::new(Semaphore::new(self.concurrency));
        let mut tasks = JoinSet::new();

        for (index, pull_request) in pull_requests.iter().enumerate() {
            let client = self.client.clone();
            let key = pull_request.key.clone();
            let permits = Arc::clone(&permits);
            tasks.spawn(async move {
                let _permit = permits.acquire_owned().await.map_err(|e| GitHubError::Task {
                    message: e.to_string(),
                })?;
                client.list_reviews(&key).await.map(|reviews| (index, reviews))
            });
        }

        let mut reviews = vec![Vec::new(); pull_requests.len()];
        while let Some(joined) = tasks.join_next().await {
            let (index, fetched) = joined.map_err(|e| GitHubError::Task {
                message: e.to_string(),
            })??;
            reviews[index] = fetched;
        }
        Ok(reviews)
    }
}

#[async_trait]
impl SourceFeed for GitHubSourceFeed {
    type Error = GitHubError;

    #[instrument(skip(self), fields(repositories = self.repositories.len()))]
    async fn fetch_open_pull_requests(&self) -> Result<Vec<FetchedPullRequest>, GitHubError> {
        let mut pull_requests = Vec::new();
        for repository in &self.repositories {
            pull_requests.extend(self.client.list_open_pull_requests(repository).await?);
        }

        let reviews = self.fetch_reviews(&pull_requests).await?;

        info!(
            pull_requests = pull_requests.len(),
            reviews = reviews.iter().map(Vec::len).sum::<usize>(),
            "Fetched GitHub snapshot"
        );

        Ok(pull_requests
            .into_iter()
            .zip(reviews)
            .map(|(pull_request, reviews)| FetchedPullRequest {
                pull_request,
                reviews,
            })
            .collect())
    }
}
