use std::ops::Deref;
use std::path::Path;

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use chrono::{DateTime, NaiveDateTime, Utc};
use reqwest::{Method, StatusCode};
use serde_json::json;

use super::client::GitHubApi;
use super::error::{GitHubError, Result};
use super::humanize::{humanize_count, humanize_since};
use super::profile::non_blank_or;
use super::types::{CreateContentResponse, Repository, Tag};

const DEFAULT_TIME_LAYOUT: &str = "%Y-%m-%d %H:%M:%S UTC";
const MARKDOWN_EXTENSION: &str = "md";

/// Parses a GitHub timestamp: RFC 3339 with or without fractional seconds,
/// or the same without a zone suffix (read as UTC).
///
/// # Errors
/// Returns `InvalidTimestamp` when no variant matches.
pub fn parse_github_time(value: &str) -> Result<DateTime<Utc>> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(GitHubError::InvalidTimestamp {
            value: value.to_string(),
            reason: "empty time string".to_string(),
        });
    }

    match DateTime::parse_from_rfc3339(trimmed) {
        Ok(parsed) => Ok(parsed.with_timezone(&Utc)),
        Err(rfc3339_err) => NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%dT%H:%M:%S%.f")
            .map(|naive| naive.and_utc())
            .map_err(|naive_err| GitHubError::InvalidTimestamp {
                value: value.to_string(),
                reason: format!("{rfc3339_err}; {naive_err}"),
            }),
    }
}

impl Repository {
    pub fn created_at(&self) -> Result<DateTime<Utc>> {
        stored_time(self.created_at.as_deref(), "created_at")
    }

    pub fn updated_at(&self) -> Result<DateTime<Utc>> {
        stored_time(self.updated_at.as_deref(), "updated_at")
    }

    pub fn pushed_at(&self) -> Result<DateTime<Utc>> {
        stored_time(self.pushed_at.as_deref(), "pushed_at")
    }

    /// Formats `created_at` with a chrono layout (default
    /// `%Y-%m-%d %H:%M:%S UTC`).
    ///
    /// # Errors
    /// Returns `InvalidTimestamp` if the stored value does not parse.
    pub fn format_created_at(&self, layout: Option<&str>) -> Result<String> {
        Ok(format_time(self.created_at()?, layout))
    }

    /// # Errors
    /// Returns `InvalidTimestamp` if the stored value does not parse.
    pub fn format_updated_at(&self, layout: Option<&str>) -> Result<String> {
        Ok(format_time(self.updated_at()?, layout))
    }

    /// # Errors
    /// Returns `InvalidTimestamp` if the stored value does not parse.
    pub fn format_pushed_at(&self, layout: Option<&str>) -> Result<String> {
        Ok(format_time(self.pushed_at()?, layout))
    }

    /// "3 days ago" style label for the last update.
    ///
    /// # Errors
    /// Returns `InvalidTimestamp` if the stored value does not parse.
    pub fn updated_ago(&self, now: DateTime<Utc>) -> Result<String> {
        Ok(humanize_since(self.updated_at()?, now))
    }

    pub fn homepage_or<'a>(&'a self, placeholder: &'a str) -> &'a str {
        non_blank_or(self.homepage.as_deref(), placeholder)
    }

    pub fn language(&self) -> Option<&str> {
        self.language.as_deref()
    }

    pub fn has_license(&self) -> bool {
        self.license
            .as_ref()
            .is_some_and(|license| !license.name.is_empty())
    }

    pub fn license_name(&self) -> Option<&str> {
        self.license
            .as_ref()
            .map(|license| license.name.as_str())
            .filter(|name| !name.is_empty())
    }

    pub fn topics(&self) -> Vec<&str> {
        self.topics.iter().filter_map(|topic| topic.as_str()).collect()
    }

    pub fn stars(&self) -> u64 {
        self.stargazers_count
    }

    pub fn stars_human(&self) -> String {
        humanize_count(self.stargazers_count)
    }

    pub fn forks_human(&self) -> String {
        humanize_count(self.forks_count)
    }

    pub fn watchers_human(&self) -> String {
        humanize_count(self.watchers)
    }

    /// First non-empty of: SSH URL (only when `prefer_ssh`), HTTPS clone
    /// URL, git URL, web URL.
    pub fn preferred_clone_url(&self, prefer_ssh: bool) -> &str {
        let ssh = if prefer_ssh { self.ssh_url.as_str() } else { "" };
        [
            ssh,
            self.clone_url.as_str(),
            self.git_url.as_str(),
            self.html_url.as_str(),
        ]
        .into_iter()
        .find(|url| !url.is_empty())
        .unwrap_or_default()
    }

    /// Requires both `private == false` and visibility "public".
    pub fn is_public(&self) -> bool {
        !self.private && self.visibility.eq_ignore_ascii_case("public")
    }

    pub fn is_archived(&self) -> bool {
        self.archived
    }

    pub fn is_disabled(&self) -> bool {
        self.disabled
    }
}

fn stored_time(value: Option<&str>, field: &str) -> Result<DateTime<Utc>> {
    match value {
        Some(value) => parse_github_time(value),
        None => Err(GitHubError::InvalidTimestamp {
            value: String::new(),
            reason: format!("{field} is not set"),
        }),
    }
}

fn format_time(time: DateTime<Utc>, layout: Option<&str>) -> String {
    time.format(layout.unwrap_or(DEFAULT_TIME_LAYOUT)).to_string()
}

/// A markdown file to create through the contents API.
#[derive(Debug, Clone, Default)]
pub struct FileUpload {
    /// Path inside the repository; `.md` is appended when it has no
    /// extension.
    pub filename: String,
    pub content: String,
    /// Defaults to `chore: add <path>`.
    pub message: Option<String>,
    /// Defaults to the repository's default branch.
    pub branch: Option<String>,
}

/// A fetched [`Repository`] bound to the client that produced it.
#[derive(Debug, Clone)]
pub struct Repo {
    client: GitHubApi,
    repo: Repository,
    access_token: Option<String>,
}

impl Deref for Repo {
    type Target = Repository;

    fn deref(&self) -> &Repository {
        &self.repo
    }
}

impl Repo {
    pub fn new(client: GitHubApi, repo: Repository) -> Self {
        Self {
            client,
            repo,
            access_token: None,
        }
    }

    /// Token sent as `Authorization: Bearer` on write calls.
    #[must_use]
    pub fn with_access_token(mut self, token: impl Into<String>) -> Self {
        self.access_token = Some(token.into());
        self
    }

    pub fn repository(&self) -> &Repository {
        &self.repo
    }

    pub fn into_repository(self) -> Repository {
        self.repo
    }

    /// Tag names (first page).
    ///
    /// # Errors
    /// Returns an error if the request fails.
    pub async fn tags(&self) -> Result<Vec<String>> {
        let url = self
            .client
            .api_url(&["repos", &self.repo.owner.login, &self.repo.name, "tags"])?;
        let tags: Vec<Tag> = self.client.get_json(url).await?;
        Ok(tags.into_iter().map(|tag| tag.name).collect())
    }

    /// Creates a markdown file with base64-encoded content.
    ///
    /// # Errors
    /// Returns `InvalidInput` for an empty filename, `AlreadyExists` when
    /// GitHub answers 422, `Http` for other non-2xx responses.
    pub async fn upload_markdown(&self, upload: &FileUpload) -> Result<CreateContentResponse> {
        let path = markdown_path(&upload.filename)?;
        let message = upload
            .message
            .as_deref()
            .filter(|message| !message.trim().is_empty())
            .map_or_else(|| format!("chore: add {path}"), str::to_string);
        let branch = upload
            .branch
            .as_deref()
            .filter(|branch| !branch.trim().is_empty())
            .unwrap_or(self.repo.default_branch.as_str())
            .to_string();

        let mut body = json!({
            "message": message,
            "content": BASE64.encode(upload.content.as_bytes()),
        });
        if !branch.is_empty() {
            body["branch"] = json!(branch);
        }

        let mut segments = vec![
            "repos",
            self.repo.owner.login.as_str(),
            self.repo.name.as_str(),
            "contents",
        ];
        segments.extend(path.split('/'));
        let mut request = self
            .client
            .request(Method::PUT, self.client.api_url(&segments)?)
            .json(&body);
        if let Some(token) = &self.access_token {
            request = request.bearer_auth(token);
        }

        let (status, bytes) = self.client.send(request).await?;
        if status == StatusCode::UNPROCESSABLE_ENTITY {
            return Err(GitHubError::AlreadyExists {
                path,
                branch,
                body: String::from_utf8_lossy(&bytes).into_owned(),
            });
        }
        if !status.is_success() {
            return Err(GitHubError::Http {
                status,
                body: String::from_utf8_lossy(&bytes).into_owned(),
            });
        }
        Ok(serde_json::from_slice(&bytes)?)
    }
}

/// Normalizes an upload path: trims, drops leading `/`, appends `.md` when
/// the file name has no extension.
fn markdown_path(filename: &str) -> Result<String> {
    let trimmed = filename.trim().trim_start_matches('/');
    let file_name = trimmed.rsplit('/').next().unwrap_or_default();
    if file_name.is_empty() {
        return Err(GitHubError::InvalidInput("filename is empty".to_string()));
    }
    if Path::new(file_name).extension().is_some() {
        Ok(trimmed.to_string())
    } else {
        Ok(format!("{trimmed}.{MARKDOWN_EXTENSION}"))
    }
}
