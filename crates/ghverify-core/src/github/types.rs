use serde::Deserialize;
use serde_json::Value;

/// Public profile of a GitHub account (`/users/{login}`, `/user/{id}`, `/user`).
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct User {
    pub login: String,
    pub id: i64,
    #[serde(default)]
    pub node_id: String,
    #[serde(default)]
    pub avatar_url: String,
    #[serde(default)]
    pub html_url: String,
    #[serde(default, rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub site_admin: bool,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub company: Option<String>,
    #[serde(default)]
    pub blog: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub hireable: Option<bool>,
    #[serde(default)]
    pub bio: Option<String>,
    #[serde(default)]
    pub twitter_username: Option<String>,
    #[serde(default)]
    pub public_repos: u64,
    #[serde(default)]
    pub public_gists: u64,
    #[serde(default)]
    pub followers: u64,
    #[serde(default)]
    pub following: u64,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
}

/// Repository metadata (`/repos/{owner}/{repo}`, `/repositories/{id}`).
///
/// Timestamps stay as the strings GitHub sends; see
/// [`parse_github_time`](super::parse_github_time).
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Repository {
    pub id: i64,
    #[serde(default)]
    pub node_id: String,
    pub name: String,
    #[serde(default)]
    pub full_name: String,
    #[serde(default)]
    pub private: bool,
    pub owner: RepoOwner,
    #[serde(default)]
    pub html_url: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub fork: bool,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
    #[serde(default)]
    pub pushed_at: Option<String>,
    #[serde(default)]
    pub git_url: String,
    #[serde(default)]
    pub ssh_url: String,
    #[serde(default)]
    pub clone_url: String,
    #[serde(default)]
    pub svn_url: String,
    #[serde(default)]
    pub homepage: Option<String>,
    #[serde(default)]
    pub size: u64,
    #[serde(default)]
    pub stargazers_count: u64,
    #[serde(default)]
    pub watchers_count: u64,
    #[serde(default)]
    pub language: Option<String>,
    #[serde(default)]
    pub has_issues: bool,
    #[serde(default)]
    pub has_wiki: bool,
    #[serde(default)]
    pub has_pages: bool,
    #[serde(default)]
    pub forks_count: u64,
    #[serde(default)]
    pub archived: bool,
    #[serde(default)]
    pub disabled: bool,
    #[serde(default)]
    pub open_issues_count: u64,
    #[serde(default)]
    pub license: Option<License>,
    #[serde(default)]
    pub is_template: bool,
    /// Raw topic entries; non-string values are skipped by `topics()`.
    #[serde(default)]
    pub topics: Vec<Value>,
    #[serde(default)]
    pub visibility: String,
    #[serde(default)]
    pub watchers: u64,
    #[serde(default)]
    pub default_branch: String,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct RepoOwner {
    pub login: String,
    #[serde(default)]
    pub id: i64,
    #[serde(default)]
    pub avatar_url: String,
    #[serde(default)]
    pub html_url: String,
    #[serde(default, rename = "type")]
    pub kind: String,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct License {
    #[serde(default)]
    pub key: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub spdx_id: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
}

/// Response of `PUT /repos/{owner}/{repo}/contents/{path}`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct CreateContentResponse {
    #[serde(default)]
    pub content: Option<ContentFile>,
    pub commit: ContentCommit,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ContentFile {
    pub name: String,
    pub path: String,
    pub sha: String,
    #[serde(default)]
    pub html_url: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ContentCommit {
    pub sha: String,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub html_url: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct Tag {
    pub name: String,
}
