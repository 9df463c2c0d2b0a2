//! [`Notifier`] implementation posting to a Slack channel.

use std::time::Duration;

use async_trait::async_trait;
use engine::{DigestReport, Notifier};
use reqwest::{header, Client};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};

use crate::render::{render_digest, render_summary, RenderContext};
use crate::SlackError;

/// Default Slack Web API root.
pub const DEFAULT_API_URL: &str = "https://slack.com/api";

const POST_MESSAGE: &str = "chat.postMessage";

/// Settings for [`SlackNotifier`].
#[derive(Debug, Clone)]
pub struct SlackConfig {
    pub api_url: String,
    /// Bot token (`xoxb-...`) with `chat:write`.
    pub token: String,
    /// Channel id or name the summary is posted to.
    pub channel: String,
    pub timeout_secs: u64,
}

impl SlackConfig {
    pub fn new(token: impl Into<String>, channel: impl Into<String>) -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            token: token.into(),
            channel: channel.into(),
            timeout_secs: 30,
        }
    }
}

/// Body of a `chat.postMessage` call.
#[derive(Debug, Serialize)]
pub(crate) struct PostMessage<'a> {
    pub channel: &'a str,
    pub text: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thread_ts: Option<&'a str>,
    pub unfurl_links: bool,
    pub unfurl_media: bool,
}

impl<'a> PostMessage<'a> {
    pub(crate) fn new(channel: &'a str, text: &'a str, thread_ts: Option<&'a str>) -> Self {
        Self {
            channel,
            text,
            thread_ts,
            unfurl_links: false,
            unfurl_media: false,
        }
    }
}

/// The parts of a Slack Web API response Reviewbell reads.
#[derive(Debug, Deserialize)]
pub(crate) struct ApiResponse {
    pub ok: bool,
    #[serde(default)]
    pub ts: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

impl ApiResponse {
    /// Returns the message timestamp, or the API error Slack reported.
    pub(crate) fn into_timestamp(self) -> Result<Option<String>, SlackError> {
        if self.ok {
            Ok(self.ts)
        } else {
            Err(SlackError::Api {
                method: POST_MESSAGE,
                error: self.error.unwrap_or_else(|| "unknown_error".to_string()),
            })
        }
    }
}

/// Posts the summary to a channel and each digest as a reply in its thread.
#[derive(Debug, Clone)]
pub struct SlackNotifier {
    client: Client,
    api_url: String,
    channel: String,
    context: RenderContext,
}

impl SlackNotifier {
    /// Builds a notifier. `context` must carry the `now` the report was built for.
    ///
    /// # Errors
    ///
    /// Returns [`SlackError::Configuration`] if the token is not a valid header
    /// value or the HTTP client cannot be constructed.
    pub fn new(config: &SlackConfig, context: RenderContext) -> Result<Self, SlackError> {
        let mut headers = header::HeaderMap::new();
        let mut auth = header::HeaderValue::from_str(&format!("Bearer {}", config.token))
            .map_err(|_| SlackError::Configuration {
                message: "token contains invalid characters".to_string(),
            })?;
        auth.set_sensitive(true);
        headers.insert(header::AUTHORIZATION, auth);

        let client = Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| SlackError::Configuration {
                message: format!("failed to build HTTP client: {e}"),
            })?;

        Ok(Self {
            client,
            api_url: config.api_url.trim_end_matches('/').to_string(),
            channel: config.channel.clone(),
            context,
        })
    }

    async fn post(
        &self,
        text: &str,
        thread_ts: Option<&str>,
    ) -> Result<Option<String>, SlackError> {
        let url = format!("{}/{POST_MESSAGE}", self.api_url);
        let response = self
            .client
            .post(&url)
            .json(&PostMessage::new(&self.channel, text, thread_ts))
            .send()
            .await
            .map_err(|source| SlackError::Transport {
                method: POST_MESSAGE,
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(SlackError::Status {
                method: POST_MESSAGE,
                status: status.as_u16(),
            });
        }

        response
            .json::<ApiResponse>()
            .await
            .map_err(|source| SlackError::Transport {
                method: POST_MESSAGE,
                source,
            })?
            .into_timestamp()
    }
}

#[async_trait]
impl Notifier for SlackNotifier {
    type Error = SlackError;

    #[instrument(skip_all, fields(channel = %self.channel, recipients = report.digests.len()))]
    async fn deliver(&self, report: &DigestReport) -> Result<(), SlackError> {
        if report.is_empty() {
            info!("No relevant pull requests; nothing posted");
            return Ok(());
        }

        let summary = render_summary(&report.summary, &self.context);
        let thread = self
            .post(&summary, None)
            .await?
            .ok_or(SlackError::MissingTimestamp)?;
        debug!(%thread, "Posted summary");

        for (recipient, digest) in &report.digests {
            let text = render_digest(recipient, digest, &self.context);
            self.post(&text, Some(&thread)).await?;
            debug!(%recipient, "Posted digest");
        }

        info!(
            pull_requests = report.summary.total(),
            digests = report.digests.len(),
            "Delivered Slack notifications"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::collections::{BTreeSet, HashMap};

    use chrono::Duration as ChronoDuration;
    use engine::{
        build, AgeThreshold, Category, ClassifiedPullRequest, Handle, PullRequest, PullRequestKey,
        PullRequestNumber, RecipientId, RepositoryId, Timestamp,
    };
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    const SUMMARY_TS: &str = "1700000000.000100";

    fn context() -> RenderContext {
        RenderContext {
            now: Timestamp::now(),
            old_after: AgeThreshold::new(ChronoDuration::days(7)).unwrap(),
        }
    }

    fn notifier(server: &MockServer) -> SlackNotifier {
        let mut config = SlackConfig::new("xoxb-test", "C1");
        config.api_url = server.uri();
        SlackNotifier::new(&config, context()).unwrap()
    }

    fn classified(number: u64, author: &str, category: Category) -> ClassifiedPullRequest {
        let now = Timestamp::now();
        ClassifiedPullRequest {
            pull_request: PullRequest {
                key: PullRequestKey::new(
                    RepositoryId::parse("acme/widgets").unwrap(),
                    PullRequestNumber::new(number),
                ),
                title: format!("Change {number}"),
                url: format!("https://github.com/acme/widgets/pull/{number}"),
                author: Handle::new(author).unwrap(),
                created_at: now,
                updated_at: now,
                draft: false,
                requested_reviewers: BTreeSet::new(),
                requested_teams: BTreeSet::new(),
            },
            category,
        }
    }

    /// Two pull requests, one digest each for `U_ALICE` and `U_BOB`.
    fn report() -> DigestReport {
        let classified = vec![
            classified(1, "bob", Category::ChangesRequested),
            classified(2, "alice", Category::Approved),
        ];
        let directory = HashMap::from([
            (Handle::new("alice").unwrap(), RecipientId::new("U_ALICE").unwrap()),
            (Handle::new("bob").unwrap(), RecipientId::new("U_BOB").unwrap()),
        ]);
        build(&classified, &directory)
    }

    async fn posted_bodies(server: &MockServer) -> Vec<serde_json::Value> {
        server
            .received_requests()
            .await
            .unwrap()
            .iter()
            .map(|request| serde_json::from_slice(&request.body).unwrap())
            .collect()
    }

    #[test]
    fn test_post_message_payload() {
        let top = serde_json::to_value(PostMessage::new("C1", "hello", None)).unwrap();
        assert_eq!(
            top,
            serde_json::json!({
                "channel": "C1",
                "text": "hello",
                "unfurl_links": false,
                "unfurl_media": false
            })
        );

        let reply = serde_json::to_value(PostMessage::new("C1", "hi", Some("123.456"))).unwrap();
        assert_eq!(reply["thread_ts"], "123.456");
    }

    #[test]
    fn test_api_response_ok_and_error() {
        let ok: ApiResponse = serde_json::from_str(r#"{"ok": true, "ts": "1.2"}"#).unwrap();
        assert_eq!(ok.into_timestamp().unwrap().as_deref(), Some("1.2"));

        let failed: ApiResponse =
            serde_json::from_str(r#"{"ok": false, "error": "channel_not_found"}"#).unwrap();
        let err = failed.into_timestamp().unwrap_err();
        assert_eq!(
            err.to_string(),
            "Slack API error on chat.postMessage: channel_not_found"
        );
    }

    #[tokio::test]
    async fn test_summary_posted_before_threaded_digests() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat.postMessage"))
            .and(header("authorization", "Bearer xoxb-test"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({"ok": true, "ts": SUMMARY_TS})),
            )
            .expect(3)
            .mount(&server)
            .await;

        notifier(&server).deliver(&report()).await.unwrap();

        let bodies = posted_bodies(&server).await;
        assert_eq!(bodies.len(), 3);

        let summary = &bodies[0];
        assert!(summary.get("thread_ts").is_none());
        assert!(summary["text"]
            .as_str()
            .unwrap()
            .starts_with("*2 open pull requests need the team's attention*"));

        for reply in &bodies[1..] {
            assert_eq!(reply["channel"], "C1");
            assert_eq!(reply["thread_ts"], SUMMARY_TS);
        }
        assert!(bodies[1]["text"].as_str().unwrap().starts_with("<@U_ALICE>"));
        assert!(bodies[2]["text"].as_str().unwrap().starts_with("<@U_BOB>"));
    }

    #[tokio::test]
    async fn test_not_ok_response_is_api_error_and_stops_delivery() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat.postMessage"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({"ok": false, "error": "channel_not_found"})),
            )
            .expect(1)
            .mount(&server)
            .await;

        let err = notifier(&server).deliver(&report()).await.unwrap_err();

        assert!(matches!(
            err,
            SlackError::Api { ref error, .. } if error == "channel_not_found"
        ));
    }

    #[tokio::test]
    async fn test_http_failure_is_status_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let err = notifier(&server).deliver(&report()).await.unwrap_err();

        assert!(matches!(err, SlackError::Status { status: 503, .. }));
    }

    #[tokio::test]
    async fn test_empty_report_posts_nothing() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        notifier(&server)
            .deliver(&DigestReport::default())
            .await
            .unwrap();

        assert!(posted_bodies(&server).await.is_empty());
    }
}
