//! A [`Notifier`] that prints to stdout instead of posting to Slack.

use std::io::{self, Write};

use async_trait::async_trait;
use engine::{DigestReport, Notifier};
use slack::{render_digest, render_summary, RenderContext};

use crate::config::OutputFormat;

const REPLY_SEPARATOR: &str = "\n\n--- thread reply ---\n\n";

pub struct StdoutNotifier {
    format: OutputFormat,
    context: RenderContext,
}

impl StdoutNotifier {
    pub fn new(format: OutputFormat, context: RenderContext) -> Self {
        Self { format, context }
    }

    /// Renders the report the way it would be delivered.
    ///
    /// Text output mirrors the Slack messages: the summary, then one reply per
    /// recipient. An empty report renders to an empty string.
    pub fn render(&self, report: &DigestReport) -> Result<String, serde_json::Error> {
        match self.format {
            OutputFormat::Json => serde_json::to_string_pretty(report),
            OutputFormat::Text if report.is_empty() => Ok(String::new()),
            OutputFormat::Text => {
                let mut messages = vec![render_summary(&report.summary, &self.context)];
                messages.extend(
                    report
                        .digests
                        .iter()
                        .map(|(recipient, digest)| render_digest(recipient, digest, &self.context)),
                );
                Ok(messages.join(REPLY_SEPARATOR))
            }
        }
    }
}

#[async_trait]
impl Notifier for StdoutNotifier {
    type Error = io::Error;

    async fn deliver(&self, report: &DigestReport) -> Result<(), io::Error> {
        let text = self.render(report)?;
        if text.is_empty() {
            tracing::info!("Nothing to report");
            return Ok(());
        }
        let mut stdout = io::stdout().lock();
        writeln!(stdout, "{text}")?;
        stdout.flush()
    }
}
