use std::sync::Arc;
use std::time::Duration;

use reqwest::header::{ACCEPT, USER_AGENT};
use reqwest::{Method, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use tracing::debug;
use url::Url;

use super::error::{GitHubError, ResourceKind, Result};
use super::oauth::OAuthApp;
use super::profile::Profile;
use super::repo::Repo;
use super::types::User;

pub const DEFAULT_API_BASE_URL: &str = "https://api.github.com";
pub const DEFAULT_OAUTH_BASE_URL: &str = "https://github.com";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);
const DEFAULT_USER_AGENT: &str = concat!("ghverify/", env!("CARGO_PKG_VERSION"));

/// Versioned media type sent on every API request.
pub const ACCEPT_GITHUB_JSON: &str = "application/vnd.github.v3+json";

/// Response bodies are truncated to this many bytes before decoding.
pub const MAX_BODY_BYTES: usize = 1 << 20;

/// Settings shared by a client and every handle it produces.
#[derive(Debug)]
pub struct ClientConfig {
    pub api_base_url: Url,
    pub oauth_base_url: Url,
    pub user_agent: Option<String>,
    pub timeout: Duration,
    pub oauth: OAuthApp,
    http: reqwest::Client,
}

/// GitHub REST client. Cheap to clone.
#[derive(Debug, Clone)]
pub struct GitHubApi {
    config: Arc<ClientConfig>,
}

pub struct GitHubApiBuilder {
    api_base_url: String,
    oauth_base_url: String,
    user_agent: Option<String>,
    timeout: Duration,
    oauth: OAuthApp,
    http: Option<reqwest::Client>,
}

impl Default for GitHubApiBuilder {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            oauth_base_url: DEFAULT_OAUTH_BASE_URL.to_string(),
            user_agent: Some(DEFAULT_USER_AGENT.to_string()),
            timeout: DEFAULT_TIMEOUT,
            oauth: OAuthApp::default(),
            http: None,
        }
    }
}

impl GitHubApiBuilder {
    #[must_use]
    pub fn api_base_url(mut self, url: impl Into<String>) -> Self {
        self.api_base_url = url.into();
        self
    }

    #[must_use]
    pub fn oauth_base_url(mut self, url: impl Into<String>) -> Self {
        self.oauth_base_url = url.into();
        self
    }

    /// Empty strings disable the header.
    #[must_use]
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        let user_agent = user_agent.into();
        self.user_agent = (!user_agent.trim().is_empty()).then_some(user_agent);
        self
    }

    #[must_use]
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    #[must_use]
    pub fn oauth(mut self, oauth: OAuthApp) -> Self {
        self.oauth = oauth;
        self
    }

    /// Uses a caller-provided transport instead of building one.
    #[must_use]
    pub fn http_client(mut self, http: reqwest::Client) -> Self {
        self.http = Some(http);
        self
    }

    /// # Errors
    /// Returns an error if a base URL does not parse or the HTTP client
    /// cannot be built.
    pub fn build(self) -> Result<GitHubApi> {
        let api_base_url = parse_base_url(&self.api_base_url)?;
        let oauth_base_url = parse_base_url(&self.oauth_base_url)?;
        let http = match self.http {
            Some(http) => http,
            None => reqwest::Client::builder().timeout(self.timeout).build()?,
        };

        Ok(GitHubApi {
            config: Arc::new(ClientConfig {
                api_base_url,
                oauth_base_url,
                user_agent: self.user_agent,
                timeout: self.timeout,
                oauth: self.oauth,
                http,
            }),
        })
    }
}

fn parse_base_url(raw: &str) -> Result<Url> {
    let url = Url::parse(raw.trim())?;
    if url.cannot_be_a_base() {
        return Err(GitHubError::InvalidInput(format!(
            "base url must be hierarchical: {raw}"
        )));
    }
    Ok(url)
}

fn join_segments(base: &Url, segments: &[&str]) -> Result<Url> {
    let mut url = base.clone();
    url.path_segments_mut()
        .map_err(|()| GitHubError::InvalidInput(format!("base url cannot be a base: {base}")))?
        .pop_if_empty()
        .extend(segments);
    Ok(url)
}

pub(crate) fn normalize_login(login: &str) -> Result<&str> {
    let login = login.trim();
    if login.is_empty() {
        return Err(GitHubError::InvalidInput("username is empty".to_string()));
    }
    Ok(login)
}

impl GitHubApi {
    pub fn builder() -> GitHubApiBuilder {
        GitHubApiBuilder::default()
    }

    /// Client against the public GitHub endpoints with default settings.
    ///
    /// # Errors
    /// Returns an error if the HTTP client cannot be built.
    pub fn with_defaults() -> Result<Self> {
        Self::builder().build()
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn oauth_app(&self) -> &OAuthApp {
        &self.config.oauth
    }

    /// Returns true when `/users/{login}` answers 2xx, false on 404.
    ///
    /// # Errors
    /// Returns `InvalidInput` for an empty login and propagates any non-404
    /// failure.
    pub async fn user_exists(&self, login: &str) -> Result<bool> {
        let login = normalize_login(login)?;
        self.exists(self.api_url(&["users", login])?).await
    }

    /// # Errors
    /// Propagates any non-404 failure.
    pub async fn user_exists_by_id(&self, id: i64) -> Result<bool> {
        self.exists(self.api_url(&["user", &id.to_string()])?).await
    }

    /// # Errors
    /// Returns `NotFound` with the login as identifier when the account does
    /// not exist.
    pub async fn get_user(&self, login: &str) -> Result<Profile> {
        let login = normalize_login(login)?;
        let user: User = self
            .get_json(self.api_url(&["users", login])?)
            .await
            .map_err(|err| err.or_not_found(ResourceKind::Profile, login))?;
        Ok(Profile::new(self.clone(), user))
    }

    /// # Errors
    /// Returns `NotFound` with the id as identifier when the account does not
    /// exist.
    pub async fn get_user_by_id(&self, id: i64) -> Result<Profile> {
        let id = id.to_string();
        let user: User = self
            .get_json(self.api_url(&["user", &id])?)
            .await
            .map_err(|err| err.or_not_found(ResourceKind::Profile, id.as_str()))?;
        Ok(Profile::new(self.clone(), user))
    }

    /// Returns false on 404. Every other failure is returned as an error.
    ///
    /// # Errors
    /// Propagates any non-404 failure.
    pub async fn repo_exists_by_id(&self, id: i64) -> Result<bool> {
        self.exists(self.api_url(&["repositories", &id.to_string()])?)
            .await
    }

    /// # Errors
    /// Returns `NotFound` with the id as identifier when the repository does
    /// not exist.
    pub async fn get_repo_by_id(&self, id: i64) -> Result<Repo> {
        let id = id.to_string();
        let repo = self
            .get_json(self.api_url(&["repositories", &id])?)
            .await
            .map_err(|err| err.or_not_found(ResourceKind::Repo, id.as_str()))?;
        Ok(Repo::new(self.clone(), repo))
    }

    /// # Errors
    /// Returns `NotFound` with `owner/name` as identifier when the repository
    /// does not exist.
    pub async fn get_repo(&self, owner: &str, name: &str) -> Result<Repo> {
        let owner = normalize_login(owner)?;
        let name = name.trim();
        if name.is_empty() {
            return Err(GitHubError::InvalidInput("repository name is empty".to_string()));
        }
        let repo = self
            .get_json(self.api_url(&["repos", owner, name])?)
            .await
            .map_err(|err| err.or_not_found(ResourceKind::Repo, format!("{owner}/{name}")))?;
        Ok(Repo::new(self.clone(), repo))
    }

    /// Fetches the account that owns `access_token`.
    ///
    /// # Errors
    /// Returns an error if the request fails or the token is rejected.
    pub async fn authenticated_user(&self, access_token: &str) -> Result<User> {
        let request = self
            .request(Method::GET, self.api_url(&["user"])?)
            .bearer_auth(access_token);
        let body = self.send_checked(request).await?;
        Ok(serde_json::from_slice(&body)?)
    }

    pub(crate) fn api_url(&self, segments: &[&str]) -> Result<Url> {
        join_segments(&self.config.api_base_url, segments)
    }

    pub(crate) fn oauth_url(&self, segments: &[&str]) -> Result<Url> {
        join_segments(&self.config.oauth_base_url, segments)
    }

    /// Request with the headers every GitHub call carries.
    pub(crate) fn request(&self, method: Method, url: Url) -> RequestBuilder {
        let mut builder = self
            .config
            .http
            .request(method, url)
            .header(ACCEPT, ACCEPT_GITHUB_JSON)
            .timeout(self.config.timeout);
        if let Some(user_agent) = &self.config.user_agent {
            builder = builder.header(USER_AGENT, user_agent);
        }
        builder
    }

    /// Sends the request and returns the status with the capped body.
    pub(crate) async fn send(&self, request: RequestBuilder) -> Result<(StatusCode, Vec<u8>)> {
        let request = request.build()?;
        debug!(method = %request.method(), url = %request.url(), "GitHub request");
        let mut response = self.config.http.execute(request).await?;
        let status = response.status();
        let body = read_capped(&mut response).await?;
        debug!(status = status.as_u16(), bytes = body.len(), "GitHub response");
        Ok((status, body))
    }

    /// Like [`send`](Self::send) but turns non-2xx into `Http`.
    pub(crate) async fn send_checked(&self, request: RequestBuilder) -> Result<Vec<u8>> {
        let (status, body) = self.send(request).await?;
        if !status.is_success() {
            return Err(GitHubError::Http {
                status,
                body: String::from_utf8_lossy(&body).into_owned(),
            });
        }
        Ok(body)
    }

    pub(crate) async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T> {
        let body = self.send_checked(self.request(Method::GET, url)).await?;
        Ok(serde_json::from_slice(&body)?)
    }

    pub(crate) async fn exists(&self, url: Url) -> Result<bool> {
        match self.send_checked(self.request(Method::GET, url)).await {
            Ok(_) => Ok(true),
            Err(err) if err.status() == Some(StatusCode::NOT_FOUND) => Ok(false),
            Err(err) => Err(err),
        }
    }
}

async fn read_capped(response: &mut reqwest::Response) -> Result<Vec<u8>> {
    let mut body = Vec::new();
    while let Some(chunk) = response.chunk().await? {
        let remaining = MAX_BODY_BYTES - body.len();
        if chunk.len() >= remaining {
            body.extend_from_slice(&chunk[..remaining]);
            break;
        }
        body.extend_from_slice(&chunk);
    }
    Ok(body)
}

impl GitHubError {
    /// Maps a 404 `Http` error to `NotFound`; other errors pass through.
    pub(crate) fn or_not_found(self, kind: ResourceKind, identifier: impl Into<String>) -> Self {
        match self {
            GitHubError::Http { status, .. } if status == StatusCode::NOT_FOUND => {
                GitHubError::not_found(kind, identifier)
            }
            other => other,
        }
    }
}
