//! Formatters for code and repository activity: pushes, branch/tag
//! lifecycle, forks, commit comments, statuses, visibility, and wiki edits.

use serde::Deserialize;

use super::{code_safe, repo_link, short_sha, user_link, Message};
use crate::markdown::{escape, escape_url, format_safe, truncate};
use crate::payload::{null_default, Comment, Commit, Repository, User, WikiPage};

/// Character budget for commit-comment bodies.
const COMMENT_BUDGET: usize = 169;
/// Character budget for a single commit message line.
const COMMIT_LINE_BUDGET: usize = 72;

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct PushEvent {
    #[serde(rename = "ref")]
    git_ref: String,
    compare: String,
    created: bool,
    deleted: bool,
    forced: bool,
    commits: Vec<Commit>,
    head_commit: Option<Commit>,
    repository: Repository,
    sender: User,
}

fn branch_of(git_ref: &str) -> &str {
    git_ref
        .strip_prefix("refs/heads/")
        .or_else(|| git_ref.strip_prefix("refs/tags/"))
        .unwrap_or(git_ref)
}

pub(super) fn push(body: &str) -> Result<Message, serde_json::Error> {
    let ev: PushEvent = serde_json::from_str(body)?;
    let repo = code_safe(&ev.repository.full_name);
    let branch = code_safe(branch_of(&ev.git_ref));
    let sender = user_link(&ev.sender.login);

    if ev.deleted {
        return Ok(Message::text(format!(
            "🗑️ {sender} deleted `{repo}:{branch}`"
        )));
    }

    let mut commits = ev.commits;
    if commits.is_empty() {
        if let Some(head) = ev.head_commit {
            commits.push(head);
        }
    }

    if commits.is_empty() {
        if ev.created {
            let url = format!("{}/tree/{}", ev.repository.html_url, branch);
            return Ok(Message::with_button(
                format!("🌱 {sender} created `{repo}:{branch}`"),
                "View Branch",
                &url,
            ));
        }
        // Nothing moved and nothing was created: nothing to notify.
        return Ok(Message::none());
    }

    let verb = if ev.forced { "force\\-pushed" } else { "pushed" };
    let noun = if commits.len() == 1 {
        "new commit"
    } else {
        "new commits"
    };
    let mut text = format!(
        "🚀 {sender} {verb} {} {noun} to `{repo}:{branch}`\n\n",
        commits.len()
    );
    for commit in &commits {
        let first_line = commit.message.lines().next().unwrap_or("");
        text.push_str(&format!(
            "• `{}` {} by {}\n",
            code_safe(short_sha(&commit.id)),
            escape(&truncate(first_line, COMMIT_LINE_BUDGET)),
            escape(&commit.author.name),
        ));
    }

    Ok(Message::with_button(text, "View Commits", &ev.compare))
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct CreateEvent {
    #[serde(rename = "ref")]
    git_ref: String,
    ref_type: String,
    master_branch: String,
    #[serde(deserialize_with = "null_default")]
    description: String,
    repository: Repository,
    sender: User,
}

pub(super) fn create(body: &str) -> Result<Message, serde_json::Error> {
    let ev: CreateEvent = serde_json::from_str(body)?;
    let mut text = format!(
        "🆕 {} created a new {} `{}` in {}\n",
        user_link(&ev.sender.login),
        escape(&ev.ref_type),
        code_safe(&ev.git_ref),
        repo_link(&ev.repository.full_name),
    );
    if !ev.description.is_empty() {
        text.push_str(&format!("📖 _{}_\n", escape(&ev.description)));
    }
    if ev.ref_type == "branch" && !ev.master_branch.is_empty() {
        text.push_str(&format!(
            "🌟 *Default branch:* `{}`\n",
            code_safe(&ev.master_branch)
        ));
    }
    Ok(Message::with_button(
        text,
        "View Repository",
        &ev.repository.html_url,
    ))
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct DeleteEvent {
    #[serde(rename = "ref")]
    git_ref: String,
    ref_type: String,
    repository: Repository,
    sender: User,
}

pub(super) fn delete(body: &str) -> Result<Message, serde_json::Error> {
    let ev: DeleteEvent = serde_json::from_str(body)?;
    let emoji = match ev.ref_type.as_str() {
        "branch" => "🗑️",
        "tag" => "🏷️",
        _ => "❌",
    };
    Ok(Message::text(format!(
        "{emoji} {} deleted the {} `{}` in {}",
        user_link(&ev.sender.login),
        escape(&ev.ref_type),
        code_safe(&ev.git_ref),
        repo_link(&ev.repository.full_name),
    )))
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ForkEvent {
    forkee: Repository,
    repository: Repository,
    sender: User,
}

pub(super) fn fork(body: &str) -> Result<Message, serde_json::Error> {
    let ev: ForkEvent = serde_json::from_str(body)?;
    let text = format!(
        "🍴 {} forked {} to {}\n🌟 The original repository now has *{} stars* and *{} forks*",
        user_link(&ev.sender.login),
        repo_link(&ev.repository.full_name),
        repo_link(&ev.forkee.full_name),
        ev.repository.stargazers_count,
        ev.repository.forks_count,
    );
    Ok(Message::with_button(text, "View Fork", &ev.forkee.html_url))
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct CommitCommentEvent {
    action: String,
    comment: Comment,
    repository: Repository,
    sender: User,
}

pub(super) fn commit_comment(body: &str) -> Result<Message, serde_json::Error> {
    let ev: CommitCommentEvent = serde_json::from_str(body)?;
    let sender = user_link(&ev.sender.login);
    let repo = repo_link(&ev.repository.full_name);
    let sha = code_safe(short_sha(&ev.comment.commit_id));

    let text = match ev.action.as_str() {
        "created" => format!(
            "💬 {sender} commented on commit `{sha}` in {repo}\n📝 {}",
            format_safe(&truncate(&ev.comment.body, COMMENT_BUDGET)),
        ),
        "edited" => format!(
            "✏️ {sender} edited their comment on commit `{sha}` in {repo}\n📝 {}",
            format_safe(&truncate(&ev.comment.body, COMMENT_BUDGET)),
        ),
        "deleted" => format!("❌ {sender} deleted their comment on commit `{sha}` in {repo}"),
        _ => format!(
            "⚠️ {sender} performed an unknown action \\({}\\) on a comment on commit `{sha}` in {repo}",
            escape(&ev.action),
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
struct StatusCommit {
    html_url: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct StatusEvent {
    sha: String,
    state: String,
    #[serde(deserialize_with = "null_default")]
    description: String,
    commit: StatusCommit,
    repository: Repository,
    sender: User,
}

pub(super) fn status(body: &str) -> Result<Message, serde_json::Error> {
    let ev: StatusEvent = serde_json::from_str(body)?;
    let (emoji, label) = match ev.state.as_str() {
        "success" => ("✅", "*SUCCESS*".to_string()),
        "error" => ("❌", "*ERROR*".to_string()),
        "failure" => ("❌", "*FAILURE*".to_string()),
        "pending" => ("⏳", "*PENDING*".to_string()),
        other => ("⚠️", format!("unknown \\({}\\)", escape(other))),
    };
    let mut text = format!(
        "{emoji} Status for commit `{}` in {} is {label}",
        code_safe(short_sha(&ev.sha)),
        repo_link(&ev.repository.full_name),
    );
    if !ev.description.is_empty() {
        text.push_str(&format!("\n_{}_", escape(&ev.description)));
    }
    text.push_str(&format!("\n👤 {}", user_link(&ev.sender.login)));
    Ok(Message::with_button(text, "View Commit", &ev.commit.html_url))
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct PublicEvent {
    repository: Repository,
    sender: User,
}

pub(super) fn public(body: &str) -> Result<Message, serde_json::Error> {
    let ev: PublicEvent = serde_json::from_str(body)?;
    let text = format!(
        "🔓 {} is now public\n👤 Made public by {}",
        repo_link(&ev.repository.full_name),
        user_link(&ev.sender.login),
    );
    Ok(Message::with_button(
        text,
        "View Repository",
        &ev.repository.html_url,
    ))
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct GollumEvent {
    pages: Vec<WikiPage>,
    repository: Repository,
    sender: User,
}

pub(super) fn gollum(body: &str) -> Result<Message, serde_json::Error> {
    let ev: GollumEvent = serde_json::from_str(body)?;
    if ev.pages.is_empty() {
        return Ok(Message::none());
    }
    let mut text = format!(
        "📖 {} updated the wiki in {}\n",
        user_link(&ev.sender.login),
        repo_link(&ev.repository.full_name),
    );
    for page in &ev.pages {
        text.push_str(&format!(
            "• {}: [{}]({})\n",
            escape(&page.action),
            escape(&page.title),
            escape_url(&page.html_url),
        ));
    }
    let first_url = ev.pages[0].html_url.clone();
    Ok(Message::with_button(text, "View Wiki", &first_url))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn push_payload(commit_count: usize) -> String {
        let commits: Vec<String> = (0..commit_count)
            .map(|i| {
                format!(
                    r#"{{"id":"{:0>40}","message":"commit number {i}","url":"https://github.com/o/r/commit/{i}","author":{{"name":"Dev {i}"}}}}"#,
                    i
                )
            })
            .collect();
        format!(
            r#"{{
                "ref": "refs/heads/main",
                "compare": "https://github.com/o/r/compare/abc...def",
                "created": false, "deleted": false, "forced": false,
                "commits": [{}],
                "head_commit": {},
                "repository": {{"full_name": "o/r", "html_url": "https://github.com/o/r"}},
                "sender": {{"login": "alice"}}
            }}"#,
            commits.join(","),
            if commit_count == 0 { "null" } else { r#"{"id":"head","message":"head","author":{"name":"Dev"}}"# },
        )
    }

    #[test]
    fn test_push_two_commits() {
        let msg = push(&push_payload(2)).unwrap();
        assert!(msg.text.contains("2 new commits to `o/r:main`"));
        assert!(msg.text.contains("commit number 0"));
        assert!(msg.text.contains("commit number 1"));
        let button = msg.button.unwrap();
        assert_eq!(button.label, "View Commits");
        assert_eq!(button.url, "https://github.com/o/r/compare/abc...def");
    }

    #[test]
    fn test_push_zero_commits_no_head_is_noop() {
        let msg = push(&push_payload(0)).unwrap();
        assert!(msg.is_empty());
        assert!(msg.button.is_none());
    }

    #[test]
    fn test_push_head_commit_fallback() {
        let payload = push_payload(0).replace(
            r#""head_commit": null"#,
            r#""head_commit": {"id":"feedfacefeedface","message":"lone commit","author":{"name":"Dev"}}"#,
        );
        let msg = push(&payload).unwrap();
        assert!(msg.text.contains("1 new commit to `o/r:main`"));
        assert!(msg.text.contains("`feedfac` lone commit"));
    }

    #[test]
    fn test_push_deleted_branch() {
        let payload = push_payload(0).replace(r#""deleted": false"#, r#""deleted": true"#);
        let msg = push(&payload).unwrap();
        assert!(msg.text.starts_with("🗑️"));
        assert!(msg.text.contains("`o/r:main`"));
        assert!(msg.button.is_none());
    }

    #[test]
    fn test_push_created_branch_without_commits() {
        let payload = push_payload(0).replace(r#""created": false"#, r#""created": true"#);
        let msg = push(&payload).unwrap();
        assert!(msg.text.starts_with("🌱"));
        assert_eq!(msg.button.unwrap().url, "https://github.com/o/r/tree/main");
    }

    #[test]
    fn test_push_forced() {
        let payload = push_payload(1).replace(r#""forced": false"#, r#""forced": true"#);
        let msg = push(&payload).unwrap();
        assert!(msg.text.contains("force\\-pushed"));
    }

    #[test]
    fn test_push_multibyte_commit_id() {
        // A forged delivery can use any string as the commit id; slicing it
        // for display must not split a multi-byte character.
        let payload = r#"{
            "ref": "refs/heads/main",
            "compare": "https://github.com/o/r/compare/a...b",
            "commits": [{"id": "ééééé", "message": "m", "author": {"name": "Dev"}}],
            "repository": {"full_name": "o/r", "html_url": "https://github.com/o/r"},
            "sender": {"login": "alice"}
        }"#;
        let msg = push(payload).unwrap();
        assert!(msg.text.contains("`ééééé`"));
    }

    #[test]
    fn test_push_backtick_in_ref_cannot_break_code_span() {
        let payload = push_payload(1).replace("refs/heads/main", "refs/heads/ma`in");
        let msg = push(&payload).unwrap();
        assert!(msg.text.contains("`o/r:main`"));
        assert!(!msg.text.contains("ma`in"));
    }

    #[test]
    fn test_push_escapes_commit_message() {
        let payload = push_payload(1).replace("commit number 0", "fix: handle *edge* case");
        let msg = push(&payload).unwrap();
        assert!(msg.text.contains("fix: handle \\*edge\\* case"));
    }

    #[test]
    fn test_delete_tag() {
        let msg = delete(
            r#"{"ref":"v1.0","ref_type":"tag","repository":{"full_name":"o/r"},"sender":{"login":"bob"}}"#,
        )
        .unwrap();
        assert!(msg.text.starts_with("🏷️"));
        assert!(msg.text.contains("`v1.0`"));
    }

    #[test]
    fn test_commit_comment_truncates_long_body() {
        let long_body = "x".repeat(400);
        let payload = format!(
            r#"{{"action":"created","comment":{{"body":"{long_body}","html_url":"https://c","commit_id":"0123456789ab"}},"repository":{{"full_name":"o/r"}},"sender":{{"login":"bob"}}}}"#
        );
        let msg = commit_comment(&payload).unwrap();
        assert!(msg.text.contains("\\.\\.\\."));
        assert!(msg.text.contains("`0123456`"));
    }

    #[test]
    fn test_status_success() {
        let msg = status(
            r#"{"sha":"0123456789ab","state":"success","description":"Build passed","commit":{"html_url":"https://c"},"repository":{"full_name":"o/r"},"sender":{"login":"ci"}}"#,
        )
        .unwrap();
        assert!(msg.text.contains("*SUCCESS*"));
        assert!(msg.text.contains("Build passed"));
    }

    #[test]
    fn test_gollum_lists_pages() {
        let msg = gollum(
            r#"{"pages":[{"title":"Home","action":"edited","html_url":"https://w"}],"repository":{"full_name":"o/r"},"sender":{"login":"bob"}}"#,
        )
        .unwrap();
        assert!(msg.text.contains("[Home](https://w)"));
        assert_eq!(msg.button.unwrap().label, "View Wiki");
    }
}
