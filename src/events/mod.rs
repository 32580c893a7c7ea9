//! Event formatters and the event-type dispatch registry.
//!
//! One pure function per webhook event type. Each formatter deserializes its
//! own envelope from the raw delivery body and returns a [`Message`]; an
//! empty message text means "nothing worth notifying". The registry is built
//! once and maps the `X-GitHub-Event` tag to its formatter so every event can
//! be rendered (and tested) in isolation.

mod ci;
mod code;
mod issues;
mod org;
mod pulls;
mod social;

use std::collections::HashMap;
use std::sync::LazyLock;

use tracing::warn;

use crate::markdown::{escape, escape_url};

/// A single inline-keyboard link button.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Button {
    pub label: String,
    pub url: String,
}

/// A rendered notification: MarkdownV2 text plus an optional link button.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Message {
    pub text: String,
    pub button: Option<Button>,
}

impl Message {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            button: None,
        }
    }

    /// Attaches a button unless the label or URL is empty.
    pub fn with_button(text: impl Into<String>, label: &str, url: &str) -> Self {
        let button = if label.is_empty() || url.is_empty() {
            None
        } else {
            Some(Button {
                label: label.to_string(),
                url: url.to_string(),
            })
        };
        Self {
            text: text.into(),
            button,
        }
    }

    /// "Nothing to notify" — the handler replies 200 OK without sending.
    pub fn none() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }
}

/// A repository name as a clickable MarkdownV2 link.
fn repo_link(full_name: &str) -> String {
    format!(
        "[{}](https://github.com/{})",
        escape(full_name),
        escape_url(full_name)
    )
}

/// A user login as a clickable MarkdownV2 link.
fn user_link(login: &str) -> String {
    format!(
        "[{}](https://github.com/{})",
        escape(login),
        escape_url(login)
    )
}

/// First 7 characters of a commit SHA. Forged deliveries can put arbitrary
/// text here, so the cut must land on a char boundary.
fn short_sha(sha: &str) -> &str {
    sha.char_indices().nth(7).map_or(sha, |(i, _)| &sha[..i])
}

/// Strips backticks from a value destined for an inline code span, where
/// they cannot be escaped and would terminate the span early.
fn code_safe(text: &str) -> String {
    text.replace('`', "")
}

type FormatterFn = fn(&str) -> Result<Message, serde_json::Error>;

static REGISTRY: LazyLock<HashMap<&'static str, FormatterFn>> = LazyLock::new(|| {
    let mut m: HashMap<&'static str, FormatterFn> = HashMap::new();

    // Code and repository activity
    m.insert("push", code::push);
    m.insert("create", code::create);
    m.insert("delete", code::delete);
    m.insert("fork", code::fork);
    m.insert("commit_comment", code::commit_comment);
    m.insert("status", code::status);
    m.insert("public", code::public);
    m.insert("gollum", code::gollum);

    // Issues
    m.insert("issues", issues::issues);
    m.insert("issue_comment", issues::issue_comment);
    m.insert("label", issues::label);
    m.insert("milestone", issues::milestone);

    // Pull requests and reviews
    m.insert("pull_request", pulls::pull_request);
    m.insert("pull_request_review", pulls::pull_request_review);
    m.insert("pull_request_review_comment", pulls::pull_request_review_comment);

    // CI/CD and deployments
    m.insert("workflow_run", ci::workflow_run);
    m.insert("workflow_job", ci::workflow_job);
    m.insert("workflow_dispatch", ci::workflow_dispatch);
    m.insert("check_run", ci::check_run);
    m.insert("check_suite", ci::check_suite);
    m.insert("deployment", ci::deployment);
    m.insert("deployment_status", ci::deployment_status);
    m.insert("page_build", ci::page_build);
    m.insert("deploy_key", ci::deploy_key);

    // Organizations, teams, and repository administration
    m.insert("repository", org::repository);
    m.insert("repository_dispatch", org::repository_dispatch);
    m.insert("organization", org::organization);
    m.insert("org_block", org::org_block);
    m.insert("member", org::member);
    m.insert("membership", org::membership);
    m.insert("team", org::team);
    m.insert("team_add", org::team_add);
    m.insert("package", org::package);
    m.insert("marketplace_purchase", org::marketplace_purchase);
    m.insert("meta", org::meta);
    m.insert("installation", org::installation);
    m.insert("security_advisory", org::security_advisory);

    // Social and releases
    m.insert("star", social::star);
    m.insert("watch", social::watch);
    m.insert("release", social::release);
    m.insert("ping", social::ping);

    m
});

/// Renders a delivery into a notification message.
///
/// Unknown event types are not an error: they produce a generic fallback
/// message so the delivery still succeeds.
pub fn render(event_type: &str, body: &str) -> Result<Message, serde_json::Error> {
    match REGISTRY.get(event_type) {
        Some(formatter) => formatter(body),
        None => {
            warn!("Unhandled event type: {event_type}");
            Ok(Message::text(format!("Unhandled event type: {event_type}")))
        }
    }
}
