//! Reviewbell Slack notifier.
//!
//! Implements [`engine::Notifier`] over the Slack Web API. The channel summary
//! is posted first with `chat.postMessage`; every recipient digest follows as a
//! reply in the summary's thread, mentioning the recipient.
//!
//! ## Architectural Layer
//!
//! **Infrastructure.** Rendering to Slack `mrkdwn`, HTTP transport and Slack
//! error mapping live here. The [`engine`] crate sees only [`engine::Notifier`].

mod errors;
mod notifier;
pub mod render;

pub use errors::SlackError;
pub use notifier::{SlackConfig, SlackNotifier, DEFAULT_API_URL};
pub use render::{render_digest, render_summary, RenderContext};
