//! Formatters for stars, watches, releases, and webhook pings.

use serde::Deserialize;

use super::{code_safe, repo_link, user_link, Message};
use crate::markdown::{escape, format_quoted, truncate};
use crate::payload::{Release, Repository, User};

/// Character budget for release notes.
const RELEASE_BODY_BUDGET: usize = 1500;

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct StarEvent {
    action: String,
    repository: Repository,
    sender: User,
}

pub(super) fn star(body: &str) -> Result<Message, serde_json::Error> {
    let ev: StarEvent = serde_json::from_str(body)?;
    let sender = user_link(&ev.sender.login);
    let repo = repo_link(&ev.repository.full_name);
    let text = match ev.action.as_str() {
        "created" => format!(
            "⭐ {sender} starred {repo}\n🌟 Total stars: *{}*",
            ev.repository.stargazers_count
        ),
        "deleted" => format!(
            "💔 {sender} unstarred {repo}\n🌟 Total stars: *{}*",
            ev.repository.stargazers_count
        ),
        other => format!("🔔 {sender} performed `{}` on {repo}", escape(other)),
    };
    Ok(Message::with_button(
        text,
        "View Repository",
        &ev.repository.html_url,
    ))
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct WatchEvent {
    repository: Repository,
    sender: User,
}

pub(super) fn watch(body: &str) -> Result<Message, serde_json::Error> {
    let ev: WatchEvent = serde_json::from_str(body)?;
    let text = format!(
        "👀 {} is now watching {}",
        user_link(&ev.sender.login),
        repo_link(&ev.repository.full_name),
    );
    Ok(Message::with_button(
        text,
        "View Repository",
        &ev.repository.html_url,
    ))
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ReleaseEvent {
    action: String,
    release: Release,
    repository: Repository,
    sender: User,
}

pub(super) fn release(body: &str) -> Result<Message, serde_json::Error> {
    let ev: ReleaseEvent = serde_json::from_str(body)?;
    let rel = &ev.release;
    let sender = user_link(&ev.sender.login);
    let repo = repo_link(&ev.repository.full_name);
    let name = if rel.name.is_empty() {
        &rel.tag_name
    } else {
        &rel.name
    };
    let name = escape(name);

    let (emoji, verb) = match ev.action.as_str() {
        "published" => ("🎉", "published"),
        "released" => ("🎉", "released"),
        "prereleased" => ("🧪", "prereleased"),
        "created" => ("📝", "drafted"),
        "edited" => ("✏️", "edited"),
        "deleted" => ("❌", "deleted"),
        "unpublished" => ("📤", "unpublished"),
        _ => ("🔔", "changed"),
    };

    let mut text = format!(
        "{emoji} {sender} {verb} *{name}* in {repo}\n🏷️ Tag: `{}`",
        code_safe(&rel.tag_name)
    );
    if rel.prerelease {
        text.push_str("\n🧪 _This is a prerelease_");
    }
    if rel.draft {
        text.push_str("\n📝 _This is a draft_");
    }
    if !rel.body.is_empty() {
        // Long release notes collapse into an expandable quote.
        text.push_str(&format!(
            "\n\n📋 *Release notes*\n{}",
            format_quoted(&truncate(&rel.body, RELEASE_BODY_BUDGET)),
        ));
    }
    Ok(Message::with_button(text, "View Release", &rel.html_url))
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct PingEvent {
    zen: String,
    hook_id: u64,
    repository: Repository,
}

pub(super) fn ping(body: &str) -> Result<Message, serde_json::Error> {
    let ev: PingEvent = serde_json::from_str(body)?;
    let mut text = format!("🏓 Webhook `{}` is live", ev.hook_id);
    if !ev.repository.full_name.is_empty() {
        text.push_str(&format!(" for {}", repo_link(&ev.repository.full_name)));
    }
    if !ev.zen.is_empty() {
        text.push_str(&format!("\n💭 _{}_", escape(&ev.zen)));
    }
    Ok(Message::text(text))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_star_created() {
        let payload = r#"{
            "action": "created",
            "repository": {
                "full_name": "o/r",
                "html_url": "https://github.com/o/r",
                "stargazers_count": 128
            },
            "sender": {"login": "alice", "html_url": "https://github.com/alice"}
        }"#;
        let msg = star(payload).unwrap();
        assert!(msg.text.starts_with("⭐"));
        assert!(msg.text.contains("*128*"));
        assert_eq!(msg.button.unwrap().label, "View Repository");
    }

    #[test]
    fn test_release_published_short_notes_stay_inline() {
        let payload = r#"{
            "action": "published",
            "release": {
                "name": "v1.2.0",
                "tag_name": "v1.2.0",
                "body": "Bug fixes",
                "html_url": "https://github.com/o/r/releases/v1.2.0",
                "draft": false,
                "prerelease": false
            },
            "repository": {"full_name": "o/r"},
            "sender": {"login": "alice"}
        }"#;
        let msg = release(payload).unwrap();
        assert!(msg.text.contains("*v1\\.2\\.0*"));
        assert!(msg.text.contains(">Bug fixes"));
        // Short notes are quoted but not collapsed.
        assert!(!msg.text.contains("**>"));
        assert!(!msg.text.ends_with("||"));
    }

    #[test]
    fn test_release_long_notes_collapse() {
        let notes: Vec<String> = (0..12).map(|i| format!("change {i}")).collect();
        let payload = format!(
            r#"{{
                "action": "published",
                "release": {{
                    "name": "v2.0.0", "tag_name": "v2.0.0",
                    "body": "{}",
                    "html_url": "https://r", "draft": false, "prerelease": false
                }},
                "repository": {{"full_name": "o/r"}},
                "sender": {{"login": "alice"}}
            }}"#,
            notes.join("\\n"),
        );
        let msg = release(&payload).unwrap();
        assert!(msg.text.contains("**>"));
        assert!(msg.text.ends_with("||"));
    }

    #[test]
    fn test_release_name_falls_back_to_tag() {
        let payload = r#"{
            "action": "published",
            "release": {"name": null, "tag_name": "v0.1.0", "html_url": "https://r"},
            "repository": {"full_name": "o/r"},
            "sender": {"login": "alice"}
        }"#;
        let msg = release(payload).unwrap();
        assert!(msg.text.contains("*v0\\.1\\.0*"));
    }

    #[test]
    fn test_ping_includes_zen() {
        let payload = r#"{
            "zen": "Keep it logically awesome.",
            "hook_id": 99,
            "repository": {"full_name": "o/r"}
        }"#;
        let msg = ping(payload).unwrap();
        assert!(msg.text.contains("`99`"));
        assert!(msg.text.contains("Keep it logically awesome\\."));
    }
}
