//! Formatters for issue, issue comment, label, and milestone events.

use serde::Deserialize;

use super::{code_safe, repo_link, user_link, Message};
use crate::markdown::{escape, format_safe, truncate};
use crate::payload::{Comment, Issue, Label, Milestone, Repository, User};

/// Character budget for issue descriptions.
const ISSUE_BODY_BUDGET: usize = 1000;
/// Character budget for issue comments.
const COMMENT_BUDGET: usize = 500;

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct IssuesEvent {
    action: String,
    issue: Issue,
    assignee: Option<User>,
    label: Option<Label>,
    milestone: Option<Milestone>,
    repository: Repository,
    sender: User,
}

pub(super) fn issues(body: &str) -> Result<Message, serde_json::Error> {
    let ev: IssuesEvent = serde_json::from_str(body)?;
    let sender = user_link(&ev.sender.login);
    let repo = repo_link(&ev.repository.full_name);
    let number = ev.issue.number;
    let title = escape(&ev.issue.title);

    let text = match ev.action.as_str() {
        "opened" => {
            let mut text = format!(
                "🐛 New issue \\#{number} in {repo}\n*{title}*\n👤 Opened by {sender}\n"
            );
            if !ev.issue.body.is_empty() {
                text.push_str(&format!(
                    "\n📝 *Description*\n{}\n",
                    format_safe(&truncate(&ev.issue.body, ISSUE_BODY_BUDGET)),
                ));
            }
            text
        }
        "closed" => {
            let closer = ev
                .issue
                .closed_by
                .as_ref()
                .map(|u| user_link(&u.login))
                .unwrap_or(sender);
            format!("✅ Issue \\#{number} in {repo} closed by {closer}\n*{title}*")
        }
        "reopened" => {
            format!("🔄 Issue \\#{number} in {repo} reopened by {sender}\n*{title}*")
        }
        "edited" => {
            format!("✏️ Issue \\#{number} in {repo} edited by {sender}\n*{title}*")
        }
        "assigned" | "unassigned" => {
            let assignee = ev
                .assignee
                .as_ref()
                .map(|u| user_link(&u.login))
                .unwrap_or_else(|| "someone".to_string());
            let verb = if ev.action == "assigned" {
                format!("assigned {assignee} to")
            } else {
                format!("unassigned {assignee} from")
            };
            format!("👤 {sender} {verb} issue \\#{number} in {repo}\n*{title}*")
        }
        "labeled" | "unlabeled" => {
            let label = ev
                .label
                .as_ref()
                .map(|l| escape(&l.name))
                .unwrap_or_default();
            let verb = if ev.action == "labeled" {
                "added label"
            } else {
                "removed label"
            };
            format!("🏷️ {sender} {verb} *{label}* on issue \\#{number} in {repo}\n*{title}*")
        }
        "milestoned" | "demilestoned" => {
            let milestone = ev
                .milestone
                .as_ref()
                .map(|m| escape(&m.title))
                .unwrap_or_default();
            let verb = if ev.action == "milestoned" {
                "added issue"
            } else {
                "removed issue"
            };
            format!("🎯 {sender} {verb} \\#{number} to milestone *{milestone}* in {repo}")
        }
        "pinned" => format!("📌 {sender} pinned issue \\#{number} in {repo}\n*{title}*"),
        "unpinned" => format!("📌 {sender} unpinned issue \\#{number} in {repo}\n*{title}*"),
        "locked" => format!("🔒 {sender} locked issue \\#{number} in {repo}\n*{title}*"),
        "unlocked" => format!("🔓 {sender} unlocked issue \\#{number} in {repo}\n*{title}*"),
        "transferred" => format!("📤 {sender} transferred issue \\#{number} from {repo}\n*{title}*"),
        "deleted" => format!("❌ {sender} deleted issue \\#{number} in {repo}\n*{title}*"),
        other => format!(
            "⚠️ {sender} performed an unknown action \\({}\\) on issue \\#{number} in {repo}",
            escape(other),
        ),
    };

    Ok(Message::with_button(text, "View Issue", &ev.issue.html_url))
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct IssueCommentEvent {
    action: String,
    issue: Issue,
    comment: Comment,
    repository: Repository,
    sender: User,
}

pub(super) fn issue_comment(body: &str) -> Result<Message, serde_json::Error> {
    let ev: IssueCommentEvent = serde_json::from_str(body)?;
    let sender = user_link(&ev.sender.login);
    let repo = repo_link(&ev.repository.full_name);
    let number = ev.issue.number;
    // GitHub delivers pull request comments through this event as well.
    let noun = if ev.issue.html_url.contains("/pull/") {
        "pull request"
    } else {
        "issue"
    };
    let title = escape(&ev.issue.title);

    let text = match ev.action.as_str() {
        "created" => format!(
            "💬 {sender} commented on {noun} \\#{number} in {repo}\n*{title}*\n\n📝 {}",
            format_safe(&truncate(&ev.comment.body, COMMENT_BUDGET)),
        ),
        "edited" => format!(
            "✏️ {sender} edited a comment on {noun} \\#{number} in {repo}\n*{title}*\n\n📝 {}",
            format_safe(&truncate(&ev.comment.body, COMMENT_BUDGET)),
        ),
        "deleted" => {
            format!("❌ {sender} deleted a comment on {noun} \\#{number} in {repo}\n*{title}*")
        }
        other => format!(
            "⚠️ {sender} performed an unknown action \\({}\\) on a comment on {noun} \\#{number} in {repo}",
            escape(other),
        ),
    };

    Ok(Message::with_button(
        text,
        "View Comment",
        &ev.comment.html_url,
    ))
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct LabelEvent {
    action: String,
    label: Label,
    repository: Repository,
    sender: User,
}

pub(super) fn label(body: &str) -> Result<Message, serde_json::Error> {
    let ev: LabelEvent = serde_json::from_str(body)?;
    let verb = match ev.action.as_str() {
        "created" => "created",
        "edited" => "edited",
        "deleted" => "deleted",
        _ => "changed",
    };
    let mut text = format!(
        "🏷️ {} {verb} label *{}* in {}",
        user_link(&ev.sender.login),
        escape(&ev.label.name),
        repo_link(&ev.repository.full_name),
    );
    if !ev.label.color.is_empty() {
        text.push_str(&format!("\n🎨 Color: `#{}`", code_safe(&ev.label.color)));
    }
    if !ev.label.description.is_empty() {
        text.push_str(&format!("\n📝 {}", escape(&ev.label.description)));
    }
    Ok(Message::text(text))
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct MilestoneEvent {
    action: String,
    milestone: Milestone,
    repository: Repository,
    sender: User,
}

pub(super) fn milestone(body: &str) -> Result<Message, serde_json::Error> {
    let ev: MilestoneEvent = serde_json::from_str(body)?;
    let emoji = match ev.action.as_str() {
        "created" | "opened" => "🎯",
        "closed" => "✅",
        "deleted" => "❌",
        _ => "✏️",
    };
    let verb = if ev.action.is_empty() {
        "changed"
    } else {
        &ev.action
    };
    let mut text = format!(
        "{emoji} {} {} milestone *{}* in {}",
        user_link(&ev.sender.login),
        escape(verb),
        escape(&ev.milestone.title),
        repo_link(&ev.repository.full_name),
    );
    if !ev.milestone.description.is_empty() {
        text.push_str(&format!("\n📝 {}", escape(&ev.milestone.description)));
    }
    Ok(Message::with_button(
        text,
        "View Milestone",
        &ev.milestone.html_url,
    ))
}
