//! Slack `mrkdwn` rendering of summaries and digests.
//!
//! Output is plain text ready for `chat.postMessage`. Pull request titles are
//! escaped; everything else is generated here and already safe.

use engine::{
    AgeThreshold, Category, CategoryGroup, PullRequestRef, RecipientDigest, RecipientId, Summary,
    Timestamp,
};

/// Values every rendered message depends on.
#[derive(Debug, Clone, Copy)]
pub struct RenderContext {
    /// The instant the report was computed for; ages are measured against it.
    pub now: Timestamp,
    /// Threshold used for [`Category::Old`], shown in its heading.
    pub old_after: AgeThreshold,
}

/// Escapes the three characters Slack treats as control sequences.
pub fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

fn heading(category: Category, context: &RenderContext) -> String {
    match category {
        Category::ChangesRequested => ":no_entry: *Changes requested*".to_string(),
        Category::Approved => ":white_check_mark: *Approved*".to_string(),
        Category::Old => format!(
            ":hourglass: *Open for {} days or more*",
            context.old_after.as_duration().num_days()
        ),
        Category::Other => ":eyes: *Waiting for review*".to_string(),
    }
}

fn age(pr: &PullRequestRef, now: Timestamp) -> String {
    match now.since(pr.created_at).num_days() {
        days if days <= 0 => "opened today".to_string(),
        1 => "opened 1 day ago".to_string(),
        days => format!("opened {days} days ago"),
    }
}

/// One bullet line: link, title, author, age.
pub fn pull_request_line(pr: &PullRequestRef, context: &RenderContext) -> String {
    format!(
        "• <{}|{}> {} by {} ({})",
        pr.url,
        pr.key,
        escape(&pr.title),
        pr.author,
        age(pr, context.now)
    )
}

fn section(title: &str, pull_requests: &[PullRequestRef], context: &RenderContext) -> String {
    let mut lines = vec![title.to_string()];
    lines.extend(pull_requests.iter().map(|pr| pull_request_line(pr, context)));
    lines.join("\n")
}

fn group_section(group: &CategoryGroup, context: &RenderContext) -> String {
    section(&heading(group.category, context), &group.pull_requests, context)
}

/// Renders the channel summary. Categories appear in precedence order.
pub fn render_summary(summary: &Summary, context: &RenderContext) -> String {
    let total = summary.total();
    let header = if total == 1 {
        "*1 open pull request needs the team's attention*".to_string()
    } else {
        format!("*{total} open pull requests need the team's attention*")
    };

    std::iter::once(header)
        .chain(summary.groups().iter().map(|g| group_section(g, context)))
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Renders one recipient's digest as a thread reply mentioning them.
pub fn render_digest(
    recipient: &RecipientId,
    digest: &RecipientDigest,
    context: &RenderContext,
) -> String {
    let sections = [
        ("*Your pull requests that are approved*", &digest.approved),
        (
            "*Your pull requests with changes requested*",
            &digest.changes_requested,
        ),
        (
            "*Pull requests waiting for your review*",
            &digest.review_requested,
        ),
    ];

    std::iter::once(format!("<@{recipient}>"))
        .chain(
            sections
                .iter()
                .filter(|(_, prs)| !prs.is_empty())
                .map(|(title, prs)| section(title, prs, context)),
        )
        .collect::<Vec<_>>()
        .join("\n\n")
}
