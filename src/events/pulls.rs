//! Formatters for pull request, review, and review comment events.

use serde::Deserialize;

use super::{repo_link, user_link, Message};
use crate::markdown::{escape, format_safe, truncate};
use crate::payload::{Comment, Label, PullRequest, Repository, Review, User};

/// Character budget for pull request descriptions.
const PR_BODY_BUDGET: usize = 1000;
/// Character budget for review bodies.
const REVIEW_BUDGET: usize = 150;
/// Character budget for review comments.
const REVIEW_COMMENT_BUDGET: usize = 169;

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct PullRequestEvent {
    action: String,
    pull_request: PullRequest,
    assignee: Option<User>,
    requested_reviewer: Option<User>,
    label: Option<Label>,
    repository: Repository,
    sender: User,
}

pub(super) fn pull_request(body: &str) -> Result<Message, serde_json::Error> {
    let ev: PullRequestEvent = serde_json::from_str(body)?;
    let sender = user_link(&ev.sender.login);
    let repo = repo_link(&ev.repository.full_name);
    let pr = &ev.pull_request;
    let number = pr.number;
    let title = escape(&pr.title);

    let text = match ev.action.as_str() {
        "opened" => {
            let mut text = format!(
                "🔀 New pull request \\#{number} in {repo}\n*{title}*\n👤 Opened by {sender}\n"
            );
            if !pr.body.is_empty() {
                text.push_str(&format!(
                    "\n📝 *Description*\n{}\n",
                    format_safe(&truncate(&pr.body, PR_BODY_BUDGET)),
                ));
            }
            text
        }
        "closed" => {
            if pr.merged {
                format!("🎉 Pull request \\#{number} in {repo} merged by {sender}\n*{title}*")
            } else {
                format!(
                    "❌ Pull request \\#{number} in {repo} closed without merging by {sender}\n*{title}*"
                )
            }
        }
        "reopened" => {
            format!("🔄 Pull request \\#{number} in {repo} reopened by {sender}\n*{title}*")
        }
        "edited" => {
            format!("✏️ Pull request \\#{number} in {repo} edited by {sender}\n*{title}*")
        }
        "synchronize" => {
            format!("🔄 {sender} pushed new commits to pull request \\#{number} in {repo}\n*{title}*")
        }
        "ready_for_review" => {
            format!("👀 Pull request \\#{number} in {repo} is ready for review\n*{title}*")
        }
        "converted_to_draft" => {
            format!("📝 Pull request \\#{number} in {repo} was converted to a draft\n*{title}*")
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
            format!("👤 {sender} {verb} pull request \\#{number} in {repo}\n*{title}*")
        }
        "review_requested" | "review_request_removed" => {
            let reviewer = ev
                .requested_reviewer
                .as_ref()
                .map(|u| user_link(&u.login))
                .unwrap_or_else(|| "someone".to_string());
            let verb = if ev.action == "review_requested" {
                format!("requested a review from {reviewer} on")
            } else {
                format!("removed the review request for {reviewer} on")
            };
            format!("👀 {sender} {verb} pull request \\#{number} in {repo}\n*{title}*")
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
            format!(
                "🏷️ {sender} {verb} *{label}* on pull request \\#{number} in {repo}\n*{title}*"
            )
        }
        "locked" => format!("🔒 {sender} locked pull request \\#{number} in {repo}\n*{title}*"),
        "unlocked" => format!("🔓 {sender} unlocked pull request \\#{number} in {repo}\n*{title}*"),
        other => format!(
            "⚠️ {sender} performed an unknown action \\({}\\) on pull request \\#{number} in {repo}",
            escape(other),
        ),
    };

    Ok(Message::with_button(text, "View Pull Request", &pr.html_url))
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct PullRequestReviewEvent {
    action: String,
    review: Review,
    pull_request: PullRequest,
    repository: Repository,
    sender: User,
}

pub(super) fn pull_request_review(body: &str) -> Result<Message, serde_json::Error> {
    let ev: PullRequestReviewEvent = serde_json::from_str(body)?;
    if ev.action != "submitted" {
        return Ok(Message::none());
    }
    let sender = user_link(&ev.sender.login);
    let repo = repo_link(&ev.repository.full_name);
    let number = ev.pull_request.number;
    let title = escape(&ev.pull_request.title);

    let (emoji, verdict) = match ev.review.state.as_str() {
        "approved" => ("✅", "approved"),
        "changes_requested" => ("🔧", "requested changes on"),
        "commented" => ("💬", "commented on"),
        "dismissed" => ("🚫", "had their review dismissed on"),
        _ => ("👀", "reviewed"),
    };
    let mut text =
        format!("{emoji} {sender} {verdict} pull request \\#{number} in {repo}\n*{title}*");
    if !ev.review.body.is_empty() {
        text.push_str(&format!(
            "\n\n📝 {}",
            format_safe(&truncate(&ev.review.body, REVIEW_BUDGET)),
        ));
    }
    Ok(Message::with_button(text, "View Review", &ev.review.html_url))
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct PullRequestReviewCommentEvent {
    action: String,
    comment: Comment,
    pull_request: PullRequest,
    repository: Repository,
    sender: User,
}

pub(super) fn pull_request_review_comment(body: &str) -> Result<Message, serde_json::Error> {
    let ev: PullRequestReviewCommentEvent = serde_json::from_str(body)?;
    let sender = user_link(&ev.sender.login);
    let repo = repo_link(&ev.repository.full_name);
    let number = ev.pull_request.number;
    let title = escape(&ev.pull_request.title);

    let text = match ev.action.as_str() {
        "created" => format!(
            "💬 {sender} commented on a diff in pull request \\#{number} in {repo}\n*{title}*\n\n📝 {}",
            format_safe(&truncate(&ev.comment.body, REVIEW_COMMENT_BUDGET)),
        ),
        "edited" => format!(
            "✏️ {sender} edited a diff comment on pull request \\#{number} in {repo}\n*{title}*\n\n📝 {}",
            format_safe(&truncate(&ev.comment.body, REVIEW_COMMENT_BUDGET)),
        ),
        "deleted" => format!(
            "❌ {sender} deleted a diff comment on pull request \\#{number} in {repo}\n*{title}*"
        ),
        other => format!(
            "⚠️ {sender} performed an unknown action \\({}\\) on a diff comment on pull request \\#{number} in {repo}",
            escape(other),
        ),
    };
    Ok(Message::with_button(
        text,
        "View Comment",
        &ev.comment.html_url,
    ))
}
