//! Reviewbell CLI entry point.
//!
//! This binary is the composition root for the entire system. Responsibilities:
//!
//! 1. **Parse configuration**: flags and environment variables, validated by
//!    [`config::Cli`] before any network call.
//! 2. **Wire observability**: `tracing-subscriber` with a pretty or JSON layer
//!    and an optional OpenTelemetry OTLP exporter. All spans and structured
//!    events emitted by every crate in the workspace flow through it.
//! 3. **Construct infrastructure**: a [`github::GitHubSourceFeed`] and either a
//!    [`slack::SlackNotifier`] or, with `--dry-run`, a
//!    [`dry_run::StdoutNotifier`].
//! 4. **Run once**: fetch, aggregate, and deliver via [`run::run_once`].

mod config;
mod dry_run;
mod observability;
mod run;

use anyhow::{Context, Result};
use clap::Parser;
use engine::{RunId, Timestamp};
use github::{GitHubClient, GitHubSourceFeed};
use slack::{RenderContext, SlackNotifier};
use tracing::info;

use crate::config::Cli;
use crate::dry_run::StdoutNotifier;
use crate::run::RunSettings;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let _telemetry = observability::init(cli.log_format, cli.otlp_endpoint.as_deref())?;

    let run_id = RunId::new_random();
    let settings = RunSettings {
        roster: cli.roster(),
        policy: cli.policy()?,
        directory: cli.user_map.0.clone(),
        now: Timestamp::now(),
    };
    info!(
        %run_id,
        repositories = cli.repositories.len(),
        members = settings.roster.member_count(),
        teams = settings.roster.team_count(),
        dry_run = cli.dry_run,
        "Starting Reviewbell run"
    );

    let client = GitHubClient::new(&cli.github_config()).context("creating GitHub client")?;
    let feed = GitHubSourceFeed::new(client, cli.repositories.clone())
        .with_concurrency(cli.fetch_concurrency);
    let context = RenderContext {
        now: settings.now,
        old_after: settings.policy.old_after,
    };

    if cli.dry_run {
        let notifier = StdoutNotifier::new(cli.output, context);
        run::run_once(&feed, &notifier, &settings, run_id).await?;
    } else {
        let notifier = SlackNotifier::new(&cli.slack_config()?, context)
            .context("creating Slack client")?;
        run::run_once(&feed, &notifier, &settings, run_id).await?;
    }

    Ok(())
}
