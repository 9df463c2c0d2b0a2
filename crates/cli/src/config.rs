//! Command line and environment configuration.
//!
//! Every option can be given as a flag or through the environment variable
//! named next to it, so the binary runs unchanged from a shell or a scheduled
//! job. Values are validated here, before any network call is made.

use std::collections::HashMap;

use anyhow::{bail, Result};
use clap::{Parser, ValueEnum};
use engine::{ClassificationPolicy, Handle, RecipientId, RepositoryId, TeamName, TeamRoster};
use github::GitHubClientConfig;
use slack::SlackConfig;

/// How log lines are written to stderr.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    /// Human-readable lines.
    Pretty,
    /// One JSON object per event.
    Json,
}

/// What `--dry-run` prints to stdout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// The Slack messages as they would be posted.
    Text,
    /// The full report as JSON.
    Json,
}

/// GitHub login → Slack user id.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserMap(pub HashMap<Handle, RecipientId>);

/// Aggregates open pull requests for a team and posts a Slack digest.
#[derive(Debug, Parser)]
#[command(name = "reviewbell", version, about)]
pub struct Cli {
    /// GitHub token with read access to every repository.
    #[arg(long, env = "GITHUB_TOKEN", hide_env_values = true)]
    pub github_token: String,

    /// GitHub REST API root.
    #[arg(long, env = "GITHUB_API_URL", default_value = github::DEFAULT_API_URL)]
    pub github_api_url: String,

    /// Repositories to scan, as `owner/name`, in reporting order.
    #[arg(
        long = "repository",
        env = "REVIEWBELL_REPOSITORIES",
        value_delimiter = ',',
        required = true,
        value_parser = parse_repository
    )]
    pub repositories: Vec<RepositoryId>,

    /// GitHub logins of tracked team members.
    #[arg(
        long = "member",
        env = "REVIEWBELL_MEMBERS",
        value_delimiter = ',',
        value_parser = parse_handle
    )]
    pub members: Vec<Handle>,

    /// Slugs of tracked GitHub teams.
    #[arg(
        long = "team",
        env = "REVIEWBELL_TEAMS",
        value_delimiter = ',',
        value_parser = parse_team
    )]
    pub teams: Vec<TeamName>,

    /// Approvals needed before a pull request counts as approved.
    #[arg(long, env = "REVIEWBELL_APPROVALS", default_value_t = 2)]
    pub approvals: u32,

    /// Days after which an unapproved pull request is reported as old.
    #[arg(long, env = "REVIEWBELL_OLD_AFTER_DAYS", default_value_t = 7)]
    pub old_after_days: u32,

    /// JSON object mapping GitHub logins to Slack user ids.
    #[arg(long, env = "REVIEWBELL_USER_MAP", default_value = "{}", value_parser = parse_user_map)]
    pub user_map: UserMap,

    /// Maximum concurrent review listings.
    #[arg(
        long,
        env = "REVIEWBELL_FETCH_CONCURRENCY",
        default_value_t = github::DEFAULT_CONCURRENCY
    )]
    pub fetch_concurrency: usize,

    /// Slack bot token.
    #[arg(long, env = "SLACK_TOKEN", hide_env_values = true, required_unless_present = "dry_run")]
    pub slack_token: Option<String>,

    /// Slack channel to post the summary to.
    #[arg(long, env = "SLACK_CHANNEL", required_unless_present = "dry_run")]
    pub slack_channel: Option<String>,

    /// Slack Web API root.
    #[arg(long, env = "SLACK_API_URL", default_value = slack::DEFAULT_API_URL)]
    pub slack_api_url: String,

    /// Print the messages instead of posting them.
    #[arg(long, env = "REVIEWBELL_DRY_RUN")]
    pub dry_run: bool,

    /// Dry-run output format.
    #[arg(long, value_enum, env = "REVIEWBELL_OUTPUT", default_value_t = OutputFormat::Text)]
    pub output: OutputFormat,

    /// Log line format.
    #[arg(long, value_enum, env = "REVIEWBELL_LOG_FORMAT", default_value_t = LogFormat::Pretty)]
    pub log_format: LogFormat,

    /// OTLP collector endpoint; traces are exported only when set.
    #[arg(long, env = "OTEL_EXPORTER_OTLP_ENDPOINT")]
    pub otlp_endpoint: Option<String>,
}

impl Cli {
    pub fn roster(&self) -> TeamRoster {
        TeamRoster::new(self.members.iter().cloned(), self.teams.iter().cloned())
    }

    /// # Errors
    ///
    /// Fails if the age threshold does not fit a duration.
    pub fn policy(&self) -> Result<ClassificationPolicy> {
        Ok(ClassificationPolicy::with_days(
            self.approvals,
            self.old_after_days,
        )?)
    }

    pub fn github_config(&self) -> GitHubClientConfig {
        let mut config = GitHubClientConfig::new(self.github_token.clone());
        config.api_url = self.github_api_url.clone();
        config
    }

    /// # Errors
    ///
    /// Fails when the Slack token or channel is missing.
    pub fn slack_config(&self) -> Result<SlackConfig> {
        let (Some(token), Some(channel)) = (&self.slack_token, &self.slack_channel) else {
            bail!("SLACK_TOKEN and SLACK_CHANNEL are required unless --dry-run is set");
        };
        let mut config = SlackConfig::new(token.clone(), channel.clone());
        config.api_url = self.slack_api_url.clone();
        Ok(config)
    }
}

fn parse_repository(value: &str) -> Result<RepositoryId, String> {
    RepositoryId::parse(value).ok_or_else(|| format!("expected `owner/name`, got `{value}`"))
}

fn parse_handle(value: &str) -> Result<Handle, String> {
    Handle::new(value.trim()).ok_or_else(|| "member login must not be empty".to_string())
}

fn parse_team(value: &str) -> Result<TeamName, String> {
    TeamName::new(value.trim()).ok_or_else(|| "team slug must not be empty".to_string())
}

fn parse_user_map(value: &str) -> Result<UserMap, String> {
    let raw: HashMap<String, String> =
        serde_json::from_str(value).map_err(|e| format!("invalid user map JSON: {e}"))?;

    raw.into_iter()
        .map(|(login, slack_id)| -> Result<(Handle, RecipientId), String> {
            let handle = Handle::new(login.trim())
                .ok_or_else(|| "user map contains an empty GitHub login".to_string())?;
            let recipient = RecipientId::new(slack_id.trim())
                .ok_or_else(|| format!("user map entry for `{handle}` has an empty Slack id"))?;
            Ok((handle, recipient))
        })
        .collect::<Result<HashMap<_, _>, String>>()
        .map(UserMap)
}
