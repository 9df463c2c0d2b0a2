//! One aggregation run: fetch, aggregate, deliver.

use std::collections::HashMap;

use anyhow::{Context, Result};
use engine::{
    ClassificationPolicy, DigestReport, Handle, Notifier, RecipientId, RunId, SourceFeed,
    TeamRoster, Timestamp,
};
use tracing::{info, instrument};

/// Everything the engine needs besides the snapshot itself.
#[derive(Debug, Clone)]
pub struct RunSettings {
    pub roster: TeamRoster,
    pub policy: ClassificationPolicy,
    pub directory: HashMap<Handle, RecipientId>,
    /// Evaluation instant; fixed once per run so every age is measured against it.
    pub now: Timestamp,
}

/// Fetches a snapshot from `feed`, aggregates it, and hands the report to `notifier`.
///
/// Nothing is delivered when fetching or aggregation fails.
///
/// # Errors
///
/// Returns the first collaborator or engine error, with context.
#[instrument(skip_all, fields(run_id = %run_id))]
pub async fn run_once<F, N>(
    feed: &F,
    notifier: &N,
    settings: &RunSettings,
    run_id: RunId,
) -> Result<DigestReport>
where
    F: SourceFeed,
    N: Notifier,
{
    let snapshot = feed
        .fetch_open_pull_requests()
        .await
        .context("fetching open pull requests")?;

    let report = engine::aggregate(
        &snapshot,
        &settings.roster,
        &settings.policy,
        &settings.directory,
        settings.now,
    )
    .context("aggregating pull requests")?;

    notifier
        .deliver(&report)
        .await
        .context("delivering notifications")?;

    info!(
        pull_requests = report.summary.total(),
        recipients = report.digests.len(),
        "Run complete"
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;
    use std::io;
    use std::sync::Mutex;

    use async_trait::async_trait;
    use engine::{
        FetchedPullRequest, PullRequest, PullRequestKey, PullRequestNumber, RepositoryId, Review,
        ReviewState,
    };

    use super::*;

    struct FixedFeed(io::Result<Vec<FetchedPullRequest>>);

    #[async_trait]
    impl SourceFeed for FixedFeed {
        type Error = io::Error;

        async fn fetch_open_pull_requests(&self) -> Result<Vec<FetchedPullRequest>, io::Error> {
            match &self.0 {
                Ok(snapshot) => Ok(snapshot.clone()),
                Err(e) => Err(io::Error::new(e.kind(), e.to_string())),
            }
        }
    }

    #[derive(Default)]
    struct RecordingNotifier {
        delivered: Mutex<Vec<DigestReport>>,
    }

    #[async_trait]
    impl Notifier for RecordingNotifier {
        type Error = io::Error;

        async fn deliver(&self, report: &DigestReport) -> Result<(), io::Error> {
            self.delivered.lock().unwrap().push(report.clone());
            Ok(())
        }
    }

    fn handle(login: &str) -> Handle {
        Handle::new(login).unwrap()
    }

    fn key(number: u64) -> PullRequestKey {
        PullRequestKey::new(
            RepositoryId::parse("acme/widgets").unwrap(),
            PullRequestNumber::new(number),
        )
    }

    fn pull_request(number: u64, author: &str) -> PullRequest {
        let now = Timestamp::now();
        PullRequest {
            key: key(number),
            title: format!("Change {number}"),
            url: format!("https://github.com/acme/widgets/pull/{number}"),
            author: handle(author),
            created_at: now,
            updated_at: now,
            draft: false,
            requested_reviewers: BTreeSet::new(),
            requested_teams: BTreeSet::new(),
        }
    }

    fn settings() -> RunSettings {
        RunSettings {
            roster: TeamRoster::new([handle("alice")], []),
            policy: ClassificationPolicy::with_days(1, 7).unwrap(),
            directory: HashMap::from([(handle("alice"), RecipientId::new("U_ALICE").unwrap())]),
            now: Timestamp::now(),
        }
    }

    #[tokio::test]
    async fn test_run_delivers_aggregated_report() {
        let approval = Review {
            pull_request: key(1),
            reviewer: handle("bob"),
            state: ReviewState::Approved,
            submitted_at: Timestamp::now(),
        };
        let feed = FixedFeed(Ok(vec![
            FetchedPullRequest {
                pull_request: pull_request(1, "alice"),
                reviews: vec![approval],
            },
            FetchedPullRequest {
                pull_request: pull_request(2, "mallory"),
                reviews: vec![],
            },
        ]));
        let notifier = RecordingNotifier::default();

        let report = run_once(&feed, &notifier, &settings(), RunId::new_random())
            .await
            .unwrap();

        assert_eq!(report.summary.total(), 1);
        let delivered = notifier.delivered.lock().unwrap();
        assert_eq!(delivered.len(), 1);
        assert_eq!(delivered[0], report);
        assert_eq!(
            report.digests[&RecipientId::new("U_ALICE").unwrap()].approved.len(),
            1
        );
    }

    #[tokio::test]
    async fn test_feed_failure_delivers_nothing() {
        let feed = FixedFeed(Err(io::Error::new(io::ErrorKind::Other, "github down")));
        let notifier = RecordingNotifier::default();

        let err = run_once(&feed, &notifier, &settings(), RunId::new_random())
            .await
            .unwrap_err();

        assert!(format!("{err:#}").contains("github down"));
        assert!(notifier.delivered.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_invalid_snapshot_delivers_nothing() {
        let stray = Review {
            pull_request: key(9),
            reviewer: handle("bob"),
            state: ReviewState::Approved,
            submitted_at: Timestamp::now(),
        };
        let feed = FixedFeed(Ok(vec![FetchedPullRequest {
            pull_request: pull_request(1, "alice"),
            reviews: vec![stray],
        }]));
        let notifier = RecordingNotifier::default();

        let err = run_once(&feed, &notifier, &settings(), RunId::new_random())
            .await
            .unwrap_err();

        assert!(format!("{err:#}").contains("aggregating pull requests"));
        assert!(notifier.delivered.lock().unwrap().is_empty());
    }
}
