//! Shared GitHub webhook payload objects.
//!
//! Every struct takes `#[serde(default)]` so absent fields deserialize to
//! empty values; GitHub omits fields freely across event variants and we
//! never want a missing optional field to fail the whole delivery.

use serde::{Deserialize, Deserializer};

/// GitHub sends explicit `null` (not an absent key) for empty bodies,
/// descriptions, and pending conclusions; map those to the default value.
pub fn null_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
pub struct User {
    pub login: String,
    pub html_url: String,
}

#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
pub struct Repository {
    pub name: String,
    pub full_name: String,
    pub html_url: String,
    #[serde(deserialize_with = "null_default")]
    pub description: String,
    pub default_branch: String,
    pub stargazers_count: u64,
    pub forks_count: u64,
}

#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
pub struct Organization {
    pub login: String,
}

#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
pub struct Label {
    pub name: String,
    pub color: String,
    #[serde(deserialize_with = "null_default")]
    pub description: String,
}

#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
pub struct Milestone {
    pub title: String,
    #[serde(deserialize_with = "null_default")]
    pub description: String,
    pub html_url: String,
}

#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
pub struct Issue {
    pub number: u64,
    pub title: String,
    #[serde(deserialize_with = "null_default")]
    pub body: String,
    pub html_url: String,
    pub state: String,
    pub closed_by: Option<User>,
    pub assignees: Vec<User>,
    pub labels: Vec<Label>,
    pub milestone: Option<Milestone>,
}

#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
pub struct PullRequest {
    pub number: u64,
    pub title: String,
    #[serde(deserialize_with = "null_default")]
    pub body: String,
    pub html_url: String,
    pub state: String,
    pub merged: bool,
    pub assignees: Vec<User>,
    pub requested_reviewers: Vec<User>,
    pub labels: Vec<Label>,
}

#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
pub struct Comment {
    #[serde(deserialize_with = "null_default")]
    pub body: String,
    pub html_url: String,
    pub commit_id: String,
}

#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
pub struct Review {
    pub state: String,
    #[serde(deserialize_with = "null_default")]
    pub body: String,
    pub html_url: String,
}

#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
pub struct CommitAuthor {
    pub name: String,
    pub email: String,
}

#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
pub struct Commit {
    pub id: String,
    pub message: String,
    pub url: String,
    pub author: CommitAuthor,
}

#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
pub struct Release {
    #[serde(deserialize_with = "null_default")]
    pub name: String,
    pub tag_name: String,
    #[serde(deserialize_with = "null_default")]
    pub body: String,
    pub html_url: String,
    pub draft: bool,
    pub prerelease: bool,
}

#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
pub struct Team {
    pub name: String,
    pub description: String,
}

#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
pub struct Workflow {
    pub name: String,
}

#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
pub struct WorkflowRun {
    pub id: u64,
    pub name: String,
    pub status: String,
    #[serde(deserialize_with = "null_default")]
    pub conclusion: String,
    pub html_url: String,
}

#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
pub struct WorkflowJob {
    pub id: u64,
    pub run_id: u64,
    pub name: String,
    pub status: String,
    #[serde(deserialize_with = "null_default")]
    pub conclusion: String,
    pub html_url: String,
}

#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
pub struct CheckRun {
    pub name: String,
    pub status: String,
    #[serde(deserialize_with = "null_default")]
    pub conclusion: String,
    pub html_url: String,
}

#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
pub struct CheckSuite {
    pub status: String,
    #[serde(deserialize_with = "null_default")]
    pub conclusion: String,
    #[serde(deserialize_with = "null_default")]
    pub head_branch: String,
}

#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
pub struct Deployment {
    pub id: u64,
    pub environment: String,
    #[serde(deserialize_with = "null_default")]
    pub description: String,
}

#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
pub struct DeploymentStatus {
    pub state: String,
    pub environment: String,
    #[serde(deserialize_with = "null_default")]
    pub description: String,
}

#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
pub struct SecurityAdvisory {
    pub summary: String,
    pub description: String,
    pub severity: String,
    #[serde(deserialize_with = "null_default")]
    pub cve_id: String,
}

#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
pub struct Package {
    pub name: String,
    pub package_type: String,
    pub html_url: String,
}

#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
pub struct PageBuildError {
    pub message: Option<String>,
}

#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
pub struct PageBuild {
    pub status: String,
    pub error: PageBuildError,
}

#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
pub struct DeployKey {
    pub title: String,
    pub url: String,
}

#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
pub struct WikiPage {
    pub page_name: String,
    pub title: String,
    pub action: String,
    pub html_url: String,
}

#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
pub struct Installation {
    pub id: u64,
    pub account: User,
}

#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
pub struct MarketplacePlan {
    pub name: String,
}

#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
pub struct MarketplaceAccount {
    pub login: String,
    #[serde(rename = "type")]
    pub account_type: String,
}

#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
pub struct MarketplacePurchase {
    pub plan: MarketplacePlan,
    pub account: MarketplaceAccount,
    pub billing_cycle: String,
    pub unit_count: u64,
}
