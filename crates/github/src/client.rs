//! Thin GitHub REST client: authentication headers, pagination, error mapping.

use std::time::Duration;

use engine::{PullRequest, PullRequestKey, RepositoryId, Review};
use reqwest::{header, Client, Response, StatusCode};
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::wire::{PullRequestPayload, ReviewPayload};
use crate::GitHubError;

/// Default GitHub REST endpoint.
pub const DEFAULT_API_URL: &str = "https://api.github.com";

const API_VERSION: &str = "2022-11-28";
const PAGE_SIZE: u32 = 100;

/// Settings for [`GitHubClient`].
#[derive(Debug, Clone)]
pub struct GitHubClientConfig {
    /// Base URL, e.g. `https://api.github.com` or a GitHub Enterprise `/api/v3` root.
    pub api_url: String,
    /// Personal access token or installation token.
    pub token: String,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
}

impl GitHubClientConfig {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            token: token.into(),
            timeout_secs: 30,
        }
    }
}

/// Authenticated client for the handful of endpoints Reviewbell reads.
#[derive(Debug, Clone)]
pub struct GitHubClient {
    client: Client,
    api_url: String,
}

impl GitHubClient {
    /// Builds a client with bearer authentication and the GitHub JSON media type.
    ///
    /// # Errors
    ///
    /// Returns [`GitHubError::Configuration`] if the token is not a valid header
    /// value or the HTTP client cannot be constructed.
    pub fn new(config: &GitHubClientConfig) -> Result<Self, GitHubError> {
        let mut headers = header::HeaderMap::new();

        let mut auth = header::HeaderValue::from_str(&format!("Bearer {}", config.token))
            .map_err(|_| GitHubError::configuration("token contains invalid characters"))?;
        auth.set_sensitive(true);
        headers.insert(header::AUTHORIZATION, auth);
        headers.insert(
            header::ACCEPT,
            header::HeaderValue::from_static("application/vnd.github+json"),
        );
        headers.insert(
            "X-GitHub-Api-Version",
            header::HeaderValue::from_static(API_VERSION),
        );

        let client = Client::builder()
            .default_headers(headers)
            .user_agent(concat!("reviewbell/", env!("CARGO_PKG_VERSION")))
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| GitHubError::configuration(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            api_url: config.api_url.trim_end_matches('/').to_string(),
        })
    }

    fn api_url(&self, path: &str) -> String {
        format!("{}{}", self.api_url, path)
    }

    /// Lists every open pull request of `repository`, in the order GitHub returns them.
    ///
    /// # Errors
    ///
    /// Propagates any [`GitHubError`] from the underlying requests.
    pub async fn list_open_pull_requests(
        &self,
        repository: &RepositoryId,
    ) -> Result<Vec<PullRequest>, GitHubError> {
        let path = format!(
            "/repos/{}/{}/pulls?state=open&per_page={PAGE_SIZE}",
            repository.owner(),
            repository.name()
        );
        let payloads: Vec<PullRequestPayload> = self.get_all_pages(&path).await?;
        debug!(%repository, count = payloads.len(), "Fetched open pull requests");

        Ok(payloads
            .into_iter()
            .filter_map(|p| p.into_domain(repository))
            .collect())
    }

    /// Lists every submitted review on `pull_request`, oldest first.
    ///
    /// # Errors
    ///
    /// Propagates any [`GitHubError`] from the underlying requests.
    pub async fn list_reviews(
        &self,
        pull_request: &PullRequestKey,
    ) -> Result<Vec<Review>, GitHubError> {
        let path = format!(
            "/repos/{}/{}/pulls/{}/reviews?per_page={PAGE_SIZE}",
            pull_request.repository.owner(),
            pull_request.repository.name(),
            pull_request.number
        );
        let payloads: Vec<ReviewPayload> = self.get_all_pages(&path).await?;

        Ok(payloads
            .into_iter()
            .filter_map(|r| r.into_domain(pull_request))
            .collect())
    }

    /// Fetches `path` and every page linked from it via `rel="next"`.
    async fn get_all_pages<T: DeserializeOwned>(&self, path: &str) -> Result<Vec<T>, GitHubError> {
        let mut all_data = Vec::new();
        let mut next = Some(self.api_url(path));

        while let Some(url) = next {
            let response = self
                .client
                .get(&url)
                .send()
                .await
                .map_err(|source| GitHubError::Transport {
                    endpoint: path.to_string(),
                    source,
                })?;

            next = response
                .headers()
                .get(header::LINK)
                .and_then(|v| v.to_str().ok())
                .and_then(next_page_url);

            let page: Vec<T> = handle_response(response, path).await?;
            all_data.extend(page);
        }

        Ok(all_data)
    }
}

/// Maps a response to `T`, or to a [`GitHubError`] carrying GitHub's message.
async fn handle_response<T: DeserializeOwned>(
    response: Response,
    endpoint: &str,
) -> Result<T, GitHubError> {
    let status = response.status();

    if status.is_success() {
        response.json::<T>().await.map_err(|source| GitHubError::Decode {
            endpoint: endpoint.to_string(),
            source,
        })
    } else if status == StatusCode::UNAUTHORIZED {
        Err(GitHubError::Unauthorized {
            endpoint: endpoint.to_string(),
        })
    } else {
        let body = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<serde_json::Value>(&body)
            .ok()
            .and_then(|v| v.get("message").and_then(|m| m.as_str()).map(str::to_string))
            .unwrap_or(body);

        Err(GitHubError::Api {
            status: status.as_u16(),
            endpoint: endpoint.to_string(),
            message,
        })
    }
}

/// Extracts the `rel="next"` target from a `Link` header value.
pub(crate) fn next_page_url(link: &str) -> Option<String> {
    link.split(',').find_map(|part| {
        let (target, params) = part.trim().split_once(';')?;
        let is_next = params
            .split(';')
            .any(|p| p.trim() == r#"rel="next""#);
        is_next.then(|| {
            target
                .trim()
                .trim_start_matches('<')
                .trim_end_matches('>')
                .to_string()
        })
    })
}
