//! Formatters for repository administration, organization, membership,
//! installation, marketplace, and security events.

use serde::Deserialize;

use super::{code_safe, repo_link, user_link, Message};
use crate::markdown::{escape, truncate};
use crate::payload::{
    Installation, MarketplacePurchase, Organization, Package, Repository, SecurityAdvisory, Team,
    User,
};

/// Character budget for security advisory descriptions.
const ADVISORY_BUDGET: usize = 500;

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RepositoryEvent {
    action: String,
    repository: Repository,
    sender: User,
}

pub(super) fn repository(body: &str) -> Result<Message, serde_json::Error> {
    let ev: RepositoryEvent = serde_json::from_str(body)?;
    let sender = user_link(&ev.sender.login);
    let repo = repo_link(&ev.repository.full_name);
    let (emoji, verb) = match ev.action.as_str() {
        "created" => ("🆕", "created"),
        "deleted" => ("❌", "deleted"),
        "archived" => ("📦", "archived"),
        "unarchived" => ("📤", "unarchived"),
        "publicized" => ("🔓", "made public"),
        "privatized" => ("🔒", "made private"),
        "renamed" => ("✏️", "renamed"),
        "transferred" => ("📤", "transferred"),
        "edited" => ("✏️", "edited"),
        _ => ("🔔", "changed"),
    };
    let mut text = format!("{emoji} {sender} {verb} repository {repo}");
    if !ev.repository.description.is_empty() {
        text.push_str(&format!("\n📖 _{}_", escape(&ev.repository.description)));
    }
    Ok(Message::with_button(
        text,
        "View Repository",
        &ev.repository.html_url,
    ))
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RepositoryDispatchEvent {
    action: String,
    repository: Repository,
    sender: User,
}

pub(super) fn repository_dispatch(body: &str) -> Result<Message, serde_json::Error> {
    let ev: RepositoryDispatchEvent = serde_json::from_str(body)?;
    let text = format!(
        "📡 {} triggered a repository dispatch `{}` in {}",
        user_link(&ev.sender.login),
        code_safe(&ev.action),
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
struct OrganizationEvent {
    action: String,
    organization: Organization,
    membership: Option<OrgMembership>,
    sender: User,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct OrgMembership {
    role: String,
    user: User,
}

pub(super) fn organization(body: &str) -> Result<Message, serde_json::Error> {
    let ev: OrganizationEvent = serde_json::from_str(body)?;
    let sender = user_link(&ev.sender.login);
    let org = escape(&ev.organization.login);
    let member = ev
        .membership
        .as_ref()
        .map(|m| user_link(&m.user.login))
        .unwrap_or_else(|| "a member".to_string());

    let text = match ev.action.as_str() {
        "member_added" => format!("👥 {member} joined organization *{org}*"),
        "member_removed" => format!("👥 {member} was removed from organization *{org}*"),
        "member_invited" => format!("✉️ {sender} invited a new member to organization *{org}*"),
        "renamed" => format!("✏️ Organization *{org}* was renamed"),
        "deleted" => format!("❌ Organization *{org}* was deleted"),
        other => format!(
            "🔔 {sender} performed `{}` on organization *{org}*",
            escape(other)
        ),
    };
    Ok(Message::text(text))
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct OrgBlockEvent {
    action: String,
    blocked_user: User,
    organization: Organization,
    sender: User,
}

pub(super) fn org_block(body: &str) -> Result<Message, serde_json::Error> {
    let ev: OrgBlockEvent = serde_json::from_str(body)?;
    let verb = match ev.action.as_str() {
        "blocked" => "blocked",
        "unblocked" => "unblocked",
        _ => "changed the block state of",
    };
    Ok(Message::text(format!(
        "🚫 {} {verb} {} in organization *{}*",
        user_link(&ev.sender.login),
        user_link(&ev.blocked_user.login),
        escape(&ev.organization.login),
    )))
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct MemberEvent {
    action: String,
    member: User,
    repository: Repository,
    sender: User,
}

pub(super) fn member(body: &str) -> Result<Message, serde_json::Error> {
    let ev: MemberEvent = serde_json::from_str(body)?;
    let verb = match ev.action.as_str() {
        "added" => "added",
        "removed" => "removed",
        "edited" => "changed permissions for",
        _ => "changed",
    };
    let text = format!(
        "👥 {} {verb} collaborator {} in {}",
        user_link(&ev.sender.login),
        user_link(&ev.member.login),
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
struct MembershipEvent {
    action: String,
    member: User,
    team: Team,
    organization: Organization,
    sender: User,
}

pub(super) fn membership(body: &str) -> Result<Message, serde_json::Error> {
    let ev: MembershipEvent = serde_json::from_str(body)?;
    let verb = match ev.action.as_str() {
        "added" => "added",
        "removed" => "removed",
        _ => "changed",
    };
    let preposition = if ev.action == "removed" { "from" } else { "to" };
    Ok(Message::text(format!(
        "👥 {} {verb} {} {preposition} team *{}* in organization *{}*",
        user_link(&ev.sender.login),
        user_link(&ev.member.login),
        escape(&ev.team.name),
        escape(&ev.organization.login),
    )))
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct TeamEvent {
    action: String,
    team: Team,
    organization: Organization,
    sender: User,
}

pub(super) fn team(body: &str) -> Result<Message, serde_json::Error> {
    let ev: TeamEvent = serde_json::from_str(body)?;
    let (emoji, verb) = match ev.action.as_str() {
        "created" => ("🆕", "created"),
        "deleted" => ("❌", "deleted"),
        "edited" => ("✏️", "edited"),
        "added_to_repository" => ("➕", "granted repository access to"),
        "removed_from_repository" => ("➖", "revoked repository access from"),
        _ => ("🔔", "changed"),
    };
    let mut text = format!(
        "{emoji} {} {verb} team *{}* in organization *{}*",
        user_link(&ev.sender.login),
        escape(&ev.team.name),
        escape(&ev.organization.login),
    );
    if !ev.team.description.is_empty() {
        text.push_str(&format!("\n📝 {}", escape(&ev.team.description)));
    }
    Ok(Message::text(text))
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct TeamAddEvent {
    team: Team,
    repository: Repository,
    sender: User,
}

pub(super) fn team_add(body: &str) -> Result<Message, serde_json::Error> {
    let ev: TeamAddEvent = serde_json::from_str(body)?;
    let text = format!(
        "➕ {} added {} to team *{}*",
        user_link(&ev.sender.login),
        repo_link(&ev.repository.full_name),
        escape(&ev.team.name),
    );
    Ok(Message::with_button(
        text,
        "View Repository",
        &ev.repository.html_url,
    ))
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct PackageEvent {
    action: String,
    package: Package,
    repository: Repository,
    sender: User,
}

pub(super) fn package(body: &str) -> Result<Message, serde_json::Error> {
    let ev: PackageEvent = serde_json::from_str(body)?;
    let verb = match ev.action.as_str() {
        "published" => "published",
        "updated" => "updated",
        _ => "changed",
    };
    let text = format!(
        "📦 {} {verb} package *{}* \\({}\\) in {}",
        user_link(&ev.sender.login),
        escape(&ev.package.name),
        escape(&ev.package.package_type),
        repo_link(&ev.repository.full_name),
    );
    Ok(Message::with_button(
        text,
        "View Package",
        &ev.package.html_url,
    ))
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct MarketplacePurchaseEvent {
    action: String,
    marketplace_purchase: MarketplacePurchase,
    sender: User,
}

pub(super) fn marketplace_purchase(body: &str) -> Result<Message, serde_json::Error> {
    let ev: MarketplacePurchaseEvent = serde_json::from_str(body)?;
    let purchase = &ev.marketplace_purchase;
    let (emoji, verb) = match ev.action.as_str() {
        "purchased" => ("💰", "purchased"),
        "changed" => ("🔄", "changed their plan for"),
        "cancelled" => ("❌", "cancelled"),
        "pending_change" => ("⏳", "scheduled a plan change for"),
        "pending_change_cancelled" => ("🔄", "cancelled a scheduled plan change for"),
        _ => ("🔔", "updated"),
    };
    let mut text = format!(
        "{emoji} {} {verb} plan *{}*",
        user_link(&ev.sender.login),
        escape(&purchase.plan.name),
    );
    if !purchase.billing_cycle.is_empty() {
        text.push_str(&format!(
            "\n💳 Billing: {}, {} unit{}",
            escape(&purchase.billing_cycle),
            purchase.unit_count,
            if purchase.unit_count == 1 { "" } else { "s" },
        ));
    }
    if !purchase.account.login.is_empty() {
        text.push_str(&format!(
            "\n🏢 Account: *{}* \\({}\\)",
            escape(&purchase.account.login),
            escape(&purchase.account.account_type),
        ));
    }
    Ok(Message::text(text))
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct MetaEvent {
    action: String,
    hook_id: u64,
    repository: Repository,
    sender: User,
}

pub(super) fn meta(body: &str) -> Result<Message, serde_json::Error> {
    let ev: MetaEvent = serde_json::from_str(body)?;
    if ev.action != "deleted" {
        return Ok(Message::none());
    }
    Ok(Message::text(format!(
        "🗑️ Webhook `{}` was deleted from {} by {}",
        ev.hook_id,
        repo_link(&ev.repository.full_name),
        user_link(&ev.sender.login),
    )))
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct InstallationEvent {
    action: String,
    installation: Installation,
    repositories: Vec<InstallationRepository>,
    sender: User,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct InstallationRepository {
    full_name: String,
}

pub(super) fn installation(body: &str) -> Result<Message, serde_json::Error> {
    let ev: InstallationEvent = serde_json::from_str(body)?;
    let (emoji, verb) = match ev.action.as_str() {
        "created" => ("🆕", "installed the app on"),
        "deleted" => ("❌", "uninstalled the app from"),
        "suspend" => ("⏸️", "suspended the app on"),
        "unsuspend" => ("▶️", "unsuspended the app on"),
        "new_permissions_accepted" => ("🔑", "accepted new permissions for"),
        _ => ("🔔", "changed the app installation on"),
    };
    let mut text = format!(
        "{emoji} {} {verb} *{}*",
        user_link(&ev.sender.login),
        escape(&ev.installation.account.login),
    );
    if !ev.repositories.is_empty() {
        text.push_str(&format!(
            "\n📚 {} repositor{}",
            ev.repositories.len(),
            if ev.repositories.len() == 1 { "y" } else { "ies" },
        ));
    }
    Ok(Message::text(text))
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct SecurityAdvisoryEvent {
    action: String,
    security_advisory: SecurityAdvisory,
}

pub(super) fn security_advisory(body: &str) -> Result<Message, serde_json::Error> {
    let ev: SecurityAdvisoryEvent = serde_json::from_str(body)?;
    let advisory = &ev.security_advisory;
    let verb = match ev.action.as_str() {
        "published" => "published",
        "updated" => "updated",
        "withdrawn" => "withdrawn",
        "performed" => "performed",
        _ => "changed",
    };
    let mut text = format!(
        "🛡️ Security advisory {verb}\n*{}*\n⚠️ Severity: *{}*",
        escape(&advisory.summary),
        escape(&advisory.severity),
    );
    if !advisory.cve_id.is_empty() {
        text.push_str(&format!("\n🔎 CVE: `{}`", code_safe(&advisory.cve_id)));
    }
    if !advisory.description.is_empty() {
        text.push_str(&format!(
            "\n\n📝 {}",
            escape(&truncate(&advisory.description, ADVISORY_BUDGET)),
        ));
    }
    Ok(Message::text(text))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_repository_created_with_description() {
        let payload = r#"{
            "action": "created",
            "repository": {
                "full_name": "o/new-repo",
                "html_url": "https://github.com/o/new-repo",
                "description": "A fresh start."
            },
            "sender": {"login": "alice"}
        }"#;
        let msg = repository(payload).unwrap();
        assert!(msg.text.contains("created repository"));
        assert!(msg.text.contains("A fresh start\\."));
    }

    #[test]
    fn test_member_added() {
        let payload = r#"{
            "action": "added",
            "member": {"login": "carol", "html_url": "https://github.com/carol"},
            "repository": {"full_name": "o/r", "html_url": "https://github.com/o/r"},
            "sender": {"login": "alice"}
        }"#;
        let msg = member(payload).unwrap();
        assert!(msg.text.contains("added collaborator [carol]"));
    }

    #[test]
    fn test_meta_non_deleted_is_noop() {
        let payload = r#"{"action": "pinged", "repository": {}, "sender": {}}"#;
        assert!(meta(payload).unwrap().is_empty());
    }

    #[test]
    fn test_security_advisory_published() {
        let payload = r#"{
            "action": "published",
            "security_advisory": {
                "summary": "RCE in parser",
                "description": "A crafted payload escapes the sandbox.",
                "severity": "critical",
                "cve_id": "CVE-2026-0001"
            }
        }"#;
        let msg = security_advisory(payload).unwrap();
        assert!(msg.text.contains("*critical*"));
        assert!(msg.text.contains("`CVE-2026-0001`"));
    }

    #[test]
    fn test_marketplace_purchase() {
        let payload = r#"{
            "action": "purchased",
            "marketplace_purchase": {
                "plan": {"name": "Pro"},
                "account": {"login": "acme", "type": "Organization"},
                "billing_cycle": "monthly",
                "unit_count": 3
            },
            "sender": {"login": "alice"}
        }"#;
        let msg = marketplace_purchase(payload).unwrap();
        assert!(msg.text.contains("purchased plan *Pro*"));
        assert!(msg.text.contains("3 units"));
    }
}
