//! Formatters for CI and deployment events: workflows, checks,
//! deployments, page builds, and deploy keys.

use serde::Deserialize;

use super::{code_safe, repo_link, user_link, Message};
use crate::markdown::escape;
use crate::payload::{
    CheckRun, CheckSuite, DeployKey, Deployment, DeploymentStatus, PageBuild, Repository, User,
    Workflow, WorkflowJob, WorkflowRun,
};

fn conclusion_emoji(conclusion: &str) -> &'static str {
    match conclusion {
        "success" => "✅",
        "failure" => "❌",
        "cancelled" => "🚫",
        "skipped" => "⏭️",
        "timed_out" => "⏰",
        "action_required" => "⚠️",
        "neutral" => "⚪",
        _ => "🔔",
    }
}

/// Conclusion when finished, otherwise the in-flight status.
fn outcome(status: &str, conclusion: &str) -> String {
    if conclusion.is_empty() {
        escape(status)
    } else {
        escape(conclusion)
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct WorkflowRunEvent {
    action: String,
    workflow: Workflow,
    workflow_run: WorkflowRun,
    repository: Repository,
}

pub(super) fn workflow_run(body: &str) -> Result<Message, serde_json::Error> {
    let ev: WorkflowRunEvent = serde_json::from_str(body)?;
    let run = &ev.workflow_run;
    let emoji = match ev.action.as_str() {
        "completed" => conclusion_emoji(&run.conclusion),
        "requested" => "🔄",
        "in_progress" => "⏳",
        _ => "🔔",
    };
    let text = format!(
        "{emoji} Workflow *{}* {} in {}\n📊 Outcome: *{}*",
        escape(&ev.workflow.name),
        escape(&ev.action),
        repo_link(&ev.repository.full_name),
        outcome(&run.status, &run.conclusion),
    );
    Ok(Message::with_button(text, "View Run", &run.html_url))
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct WorkflowJobEvent {
    action: String,
    workflow_job: WorkflowJob,
    repository: Repository,
}

pub(super) fn workflow_job(body: &str) -> Result<Message, serde_json::Error> {
    let ev: WorkflowJobEvent = serde_json::from_str(body)?;
    let job = &ev.workflow_job;
    let emoji = match ev.action.as_str() {
        "completed" => conclusion_emoji(&job.conclusion),
        "queued" => "📋",
        "in_progress" => "⏳",
        "waiting" => "⏸️",
        _ => "🔔",
    };
    let text = format!(
        "{emoji} Job *{}* {} in {}\n📊 Outcome: *{}*",
        escape(&job.name),
        escape(&ev.action),
        repo_link(&ev.repository.full_name),
        outcome(&job.status, &job.conclusion),
    );
    Ok(Message::with_button(text, "View Job", &job.html_url))
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct WorkflowDispatchEvent {
    // Path of the workflow file, not an object.
    workflow: String,
    #[serde(rename = "ref")]
    git_ref: String,
    repository: Repository,
    sender: User,
}

pub(super) fn workflow_dispatch(body: &str) -> Result<Message, serde_json::Error> {
    let ev: WorkflowDispatchEvent = serde_json::from_str(body)?;
    let text = format!(
        "▶️ {} manually dispatched workflow `{}` on `{}` in {}",
        user_link(&ev.sender.login),
        code_safe(&ev.workflow),
        code_safe(&ev.git_ref),
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
struct CheckRunEvent {
    action: String,
    check_run: CheckRun,
    repository: Repository,
}

pub(super) fn check_run(body: &str) -> Result<Message, serde_json::Error> {
    let ev: CheckRunEvent = serde_json::from_str(body)?;
    // Only terminal states are worth a notification.
    if ev.action != "completed" {
        return Ok(Message::none());
    }
    let run = &ev.check_run;
    let text = format!(
        "{} Check *{}* completed in {}\n📊 Outcome: *{}*",
        conclusion_emoji(&run.conclusion),
        escape(&run.name),
        repo_link(&ev.repository.full_name),
        outcome(&run.status, &run.conclusion),
    );
    Ok(Message::with_button(text, "View Check", &run.html_url))
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct CheckSuiteEvent {
    action: String,
    check_suite: CheckSuite,
    repository: Repository,
}

pub(super) fn check_suite(body: &str) -> Result<Message, serde_json::Error> {
    let ev: CheckSuiteEvent = serde_json::from_str(body)?;
    if ev.action != "completed" {
        return Ok(Message::none());
    }
    let suite = &ev.check_suite;
    let mut text = format!(
        "{} Check suite completed in {}\n📊 Outcome: *{}*",
        conclusion_emoji(&suite.conclusion),
        repo_link(&ev.repository.full_name),
        outcome(&suite.status, &suite.conclusion),
    );
    if !suite.head_branch.is_empty() {
        text.push_str(&format!("\n🌿 Branch: `{}`", code_safe(&suite.head_branch)));
    }
    Ok(Message::with_button(
        text,
        "View Repository",
        &ev.repository.html_url,
    ))
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct DeploymentEvent {
    deployment: Deployment,
    repository: Repository,
    sender: User,
}

pub(super) fn deployment(body: &str) -> Result<Message, serde_json::Error> {
    let ev: DeploymentEvent = serde_json::from_str(body)?;
    let mut text = format!(
        "🚀 {} created a deployment to *{}* in {}",
        user_link(&ev.sender.login),
        escape(&ev.deployment.environment),
        repo_link(&ev.repository.full_name),
    );
    if !ev.deployment.description.is_empty() {
        text.push_str(&format!("\n📝 {}", escape(&ev.deployment.description)));
    }
    Ok(Message::with_button(
        text,
        "View Repository",
        &ev.repository.html_url,
    ))
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct DeploymentStatusEvent {
    deployment_status: DeploymentStatus,
    repository: Repository,
}

pub(super) fn deployment_status(body: &str) -> Result<Message, serde_json::Error> {
    let ev: DeploymentStatusEvent = serde_json::from_str(body)?;
    let st = &ev.deployment_status;
    let emoji = match st.state.as_str() {
        "success" => "✅",
        "failure" | "error" => "❌",
        "pending" | "queued" | "in_progress" => "⏳",
        "inactive" => "💤",
        _ => "🔔",
    };
    let mut text = format!(
        "{emoji} Deployment to *{}* in {} is *{}*",
        escape(&st.environment),
        repo_link(&ev.repository.full_name),
        escape(&st.state),
    );
    if !st.description.is_empty() {
        text.push_str(&format!("\n📝 {}", escape(&st.description)));
    }
    Ok(Message::with_button(
        text,
        "View Repository",
        &ev.repository.html_url,
    ))
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct PageBuildEvent {
    build: PageBuild,
    repository: Repository,
    sender: User,
}

pub(super) fn page_build(body: &str) -> Result<Message, serde_json::Error> {
    let ev: PageBuildEvent = serde_json::from_str(body)?;
    let (emoji, label) = match ev.build.status.as_str() {
        "built" => ("✅", "succeeded"),
        "errored" => ("❌", "failed"),
        "building" => ("⏳", "started"),
        _ => ("🔔", "changed"),
    };
    let mut text = format!(
        "{emoji} Pages build {label} in {}\n👤 Triggered by {}",
        repo_link(&ev.repository.full_name),
        user_link(&ev.sender.login),
    );
    if let Some(message) = ev.build.error.message.as_deref() {
        if !message.is_empty() {
            text.push_str(&format!("\n⚠️ {}", escape(message)));
        }
    }
    Ok(Message::with_button(
        text,
        "View Repository",
        &ev.repository.html_url,
    ))
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct DeployKeyEvent {
    action: String,
    key: DeployKey,
    repository: Repository,
    sender: User,
}

pub(super) fn deploy_key(body: &str) -> Result<Message, serde_json::Error> {
    let ev: DeployKeyEvent = serde_json::from_str(body)?;
    let (emoji, verb) = match ev.action.as_str() {
        "created" => ("🔑", "added"),
        "deleted" => ("❌", "removed"),
        _ => ("🔔", "changed"),
    };
    let text = format!(
        "{emoji} {} {verb} deploy key *{}* in {}",
        user_link(&ev.sender.login),
        escape(&ev.key.title),
        repo_link(&ev.repository.full_name),
    );
    Ok(Message::with_button(
        text,
        "View Repository",
        &ev.repository.html_url,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_workflow_run_completed_success() {
        let payload = r#"{
            "action": "completed",
            "workflow": {"name": "CI"},
            "workflow_run": {
                "id": 1, "name": "CI", "status": "completed",
                "conclusion": "success", "html_url": "https://run"
            },
            "repository": {"full_name": "o/r"},
            "sender": {"login": "alice"}
        }"#;
        let msg = workflow_run(payload).unwrap();
        assert!(msg.text.starts_with("✅"));
        assert!(msg.text.contains("*success*"));
        assert_eq!(msg.button.unwrap().url, "https://run");
    }

    #[test]
    fn test_workflow_run_null_conclusion_uses_status() {
        let payload = r#"{
            "action": "in_progress",
            "workflow": {"name": "CI"},
            "workflow_run": {
                "id": 1, "status": "in_progress",
                "conclusion": null, "html_url": "https://run"
            },
            "repository": {"full_name": "o/r"},
            "sender": {"login": "alice"}
        }"#;
        let msg = workflow_run(payload).unwrap();
        assert!(msg.text.contains("*in\\_progress*"));
    }

    #[test]
    fn test_workflow_dispatch_workflow_is_a_path() {
        let payload = r#"{
            "workflow": ".github/workflows/ci.yml",
            "ref": "refs/heads/main",
            "repository": {"full_name": "o/r", "html_url": "https://github.com/o/r"},
            "sender": {"login": "alice"}
        }"#;
        let msg = workflow_dispatch(payload).unwrap();
        assert!(msg.text.contains("`.github/workflows/ci.yml`"));
    }

    #[test]
    fn test_workflow_dispatch_backtick_cannot_break_code_span() {
        let payload = r#"{
            "workflow": "ci`.yml",
            "ref": "refs/heads/main",
            "repository": {"full_name": "o/r", "html_url": "https://github.com/o/r"},
            "sender": {"login": "alice"}
        }"#;
        let msg = workflow_dispatch(payload).unwrap();
        assert!(msg.text.contains("`ci.yml`"));
        assert!(!msg.text.contains("ci`.yml"));
    }

    #[test]
    fn test_check_run_ignores_non_terminal_actions() {
        let payload = r#"{"action": "created", "check_run": {}, "repository": {}}"#;
        assert!(check_run(payload).unwrap().is_empty());
    }

    #[test]
    fn test_page_build_error_message_surfaced() {
        let payload = r#"{
            "build": {"status": "errored", "error": {"message": "Missing index.md"}},
            "repository": {"full_name": "o/r", "html_url": "https://github.com/o/r"},
            "sender": {"login": "alice"}
        }"#;
        let msg = page_build(payload).unwrap();
        assert!(msg.text.contains("Missing index\\.md"));
    }

    #[test]
    fn test_deployment_status_failure() {
        let payload = r#"{
            "deployment_status": {"state": "failure", "environment": "production", "description": null},
            "repository": {"full_name": "o/r", "html_url": "https://github.com/o/r"}
        }"#;
        let msg = deployment_status(payload).unwrap();
        assert!(msg.text.starts_with("❌"));
        assert!(msg.text.contains("*production*"));
    }
}
