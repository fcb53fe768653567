//! Configuration management for ghverify.
//!
//! Loads configuration from ${GHVERIFY_HOME}/config.toml with sensible
//! defaults. Secrets may come from the environment instead of the file.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::github::{
    DEFAULT_API_BASE_URL, DEFAULT_OAUTH_BASE_URL, DEFAULT_TIMEOUT, GitHubApi, OAuthApp,
};

pub const ENV_TELEGRAM_BOT_TOKEN: &str = "GHVERIFY_TELEGRAM_BOT_TOKEN";
pub const ENV_GITHUB_CLIENT_ID: &str = "GHVERIFY_GITHUB_CLIENT_ID";
pub const ENV_GITHUB_CLIENT_SECRET: &str = "GHVERIFY_GITHUB_CLIENT_SECRET";
pub const ENV_REDIRECT_URI: &str = "GHVERIFY_REDIRECT_URI";

/// Telegram bot configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TelegramConfig {
    /// Bot token for the Telegram Bot API.
    pub bot_token: Option<String>,
    /// Bot API base URL (tests point this at a mock server).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_base_url: Option<String>,
}

/// GitHub OAuth app and REST client settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GitHubConfig {
    pub client_id: Option<String>,
    pub client_secret: Option<String>,
    /// Must match the callback URL registered for the OAuth app.
    pub redirect_uri: Option<String>,
    pub api_base_url: String,
    pub oauth_base_url: String,
    /// Empty disables the header.
    pub user_agent: Option<String>,
    pub timeout_secs: u64,
    pub scopes: Vec<String>,
    /// Send a PKCE challenge with the authorize redirect.
    pub use_pkce: bool,
}

impl Default for GitHubConfig {
    fn default() -> Self {
        Self {
            client_id: None,
            client_secret: None,
            redirect_uri: None,
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            oauth_base_url: DEFAULT_OAUTH_BASE_URL.to_string(),
            user_agent: None,
            timeout_secs: DEFAULT_TIMEOUT.as_secs(),
            scopes: vec!["read:user".to_string(), "user:email".to_string()],
            use_pkce: true,
        }
    }
}

impl GitHubConfig {
    /// Never shorter than one second.
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs.max(1))
    }

    pub fn oauth_app(&self) -> OAuthApp {
        OAuthApp {
            client_id: self.client_id.clone().unwrap_or_default(),
            client_secret: self.client_secret.clone().unwrap_or_default(),
            redirect_uri: self.redirect_uri.clone(),
        }
    }

    /// Builds a client with these settings.
    ///
    /// # Errors
    /// Returns an error if a base URL is invalid.
    pub fn build_client(&self) -> crate::github::Result<GitHubApi> {
        let mut builder = GitHubApi::builder()
            .api_base_url(&self.api_base_url)
            .oauth_base_url(&self.oauth_base_url)
            .timeout(self.timeout())
            .oauth(self.oauth_app());
        if let Some(user_agent) = &self.user_agent {
            builder = builder.user_agent(user_agent);
        }
        builder.build()
    }
}

/// HTTP listener for the OAuth redirect.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CallbackConfig {
    pub listen_addr: String,
}

impl Default for CallbackConfig {
    fn default() -> Self {
        Self {
            listen_addr: "0.0.0.0:8080".to_string(),
        }
    }
}

/// Pending-session lifetime.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Seconds a state token stays valid (0 disables expiry).
    pub ttl_secs: u64,
    pub purge_interval_secs: u64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            ttl_secs: 600,
            purge_interval_secs: 60,
        }
    }
}

impl SessionConfig {
    pub fn ttl(&self) -> Option<Duration> {
        (self.ttl_secs > 0).then(|| Duration::from_secs(self.ttl_secs))
    }

    /// Never shorter than one second.
    pub fn purge_interval(&self) -> Duration {
        Duration::from_secs(self.purge_interval_secs.max(1))
    }
}

/// Logging configuration. `RUST_LOG` takes precedence over `filter`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    pub filter: String,
    /// Optional file that receives a copy of every log line.
    pub file: Option<PathBuf>,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            filter: "info".to_string(),
            file: None,
        }
    }
}

/// Main configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub telegram: TelegramConfig,
    pub github: GitHubConfig,
    pub callback: CallbackConfig,
    pub session: SessionConfig,
    pub log: LogConfig,
}

pub mod paths {
    //! Path resolution for the ghverify configuration directory.
    //!
    //! GHVERIFY_HOME resolution order:
    //! 1. GHVERIFY_HOME environment variable (if set)
    //! 2. ~/.config/ghverify (default)

    use std::path::PathBuf;

    /// Returns the ghverify home directory.
    pub fn ghverify_home() -> PathBuf {
        if let Ok(home) = std::env::var("GHVERIFY_HOME") {
            return PathBuf::from(home);
        }

        dirs::home_dir()
            .map_or_else(|| PathBuf::from(".ghverify"), |h| h.join(".config").join("ghverify"))
    }

    /// Returns the path to the config.toml file.
    pub fn config_path() -> PathBuf {
        ghverify_home().join("config.toml")
    }
}

impl Config {
    /// Loads configuration from the default path.
    ///
    /// # Errors
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load() -> Result<Self> {
        Self::load_from(&paths::config_path())
    }

    /// Loads configuration from a specific path.
    /// Returns defaults if the file doesn't exist.
    ///
    /// # Errors
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let contents = fs::read_to_string(path)
                .with_context(|| format!("Failed to read config from {}", path.display()))?;
            toml::from_str(&contents)
                .with_context(|| format!("Failed to parse config from {}", path.display()))
        } else {
            Ok(Config::default())
        }
    }

    /// Overrides secrets with the `GHVERIFY_*` environment variables.
    pub fn apply_env(&mut self) {
        self.apply_env_with(|key| std::env::var(key).ok());
    }

    /// Like [`apply_env`](Self::apply_env) with a custom lookup. Empty values
    /// are ignored.
    pub fn apply_env_with(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());
        if let Some(token) = get(ENV_TELEGRAM_BOT_TOKEN) {
            self.telegram.bot_token = Some(token);
        }
        if let Some(client_id) = get(ENV_GITHUB_CLIENT_ID) {
            self.github.client_id = Some(client_id);
        }
        if let Some(secret) = get(ENV_GITHUB_CLIENT_SECRET) {
            self.github.client_secret = Some(secret);
        }
        if let Some(redirect_uri) = get(ENV_REDIRECT_URI) {
            self.github.redirect_uri = Some(redirect_uri);
        }
    }
}
