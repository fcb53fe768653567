use std::ops::Deref;

use super::client::GitHubApi;
use super::error::{GitHubError, ResourceKind, Result};
use super::repo::Repo;
use super::types::{Repository, User};

/// A fetched [`User`] bound to the client that produced it.
#[derive(Debug, Clone)]
pub struct Profile {
    client: GitHubApi,
    user: User,
}

impl Deref for Profile {
    type Target = User;

    fn deref(&self) -> &User {
        &self.user
    }
}

impl Profile {
    pub fn new(client: GitHubApi, user: User) -> Self {
        Self { client, user }
    }

    pub fn user(&self) -> &User {
        &self.user
    }

    pub fn into_user(self) -> User {
        self.user
    }

    /// Public repositories of this account (first page).
    ///
    /// # Errors
    /// Returns an error if the request fails.
    pub async fn public_repos(&self) -> Result<Vec<Repo>> {
        let url = self.client.api_url(&["users", &self.user.login, "repos"])?;
        let repos: Vec<Repository> = self.client.get_json(url).await?;
        Ok(repos
            .into_iter()
            .map(|repo| Repo::new(self.client.clone(), repo))
            .collect())
    }

    /// # Errors
    /// Propagates any non-404 failure.
    pub async fn repo_exists(&self, name: &str) -> Result<bool> {
        let name = repo_name(name)?;
        let url = self.client.api_url(&["repos", &self.user.login, name])?;
        self.client.exists(url).await
    }

    /// # Errors
    /// Returns `NotFound` with the repository name when it does not exist.
    pub async fn repo(&self, name: &str) -> Result<Repo> {
        let name = repo_name(name)?;
        let url = self.client.api_url(&["repos", &self.user.login, name])?;
        let repo = self
            .client
            .get_json(url)
            .await
            .map_err(|err| err.or_not_found(ResourceKind::Repo, name))?;
        Ok(Repo::new(self.client.clone(), repo))
    }
}

fn repo_name(name: &str) -> Result<&str> {
    let name = name.trim();
    if name.is_empty() {
        return Err(GitHubError::InvalidInput("repository name is empty".to_string()));
    }
    Ok(name)
}

impl User {
    /// Name, or `placeholder` when unset or blank.
    pub fn display_name<'a>(&'a self, placeholder: &'a str) -> &'a str {
        non_blank_or(self.name.as_deref(), placeholder)
    }

    /// Public email, or `placeholder` when hidden or blank.
    pub fn email_or<'a>(&'a self, placeholder: &'a str) -> &'a str {
        non_blank_or(self.email.as_deref(), placeholder)
    }

    pub fn blog_or<'a>(&'a self, placeholder: &'a str) -> &'a str {
        non_blank_or(self.blog.as_deref(), placeholder)
    }

    /// Case-insensitive login comparison.
    pub fn is_login(&self, login: &str) -> bool {
        self.login.to_lowercase() == login.trim().to_lowercase()
    }
}

pub(crate) fn non_blank_or<'a>(value: Option<&'a str>, placeholder: &'a str) -> &'a str {
    match value {
        Some(value) if !value.trim().is_empty() => value,
        _ => placeholder,
    }
}
