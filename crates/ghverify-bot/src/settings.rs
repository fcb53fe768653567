use std::net::SocketAddr;

use anyhow::{Context, Result, bail};
use ghverify_core::config::Config;

/// Startup settings checked up front so a misconfigured bot fails fast.
#[derive(Debug, Clone)]
pub struct BotSettings {
    pub bot_token: String,
    pub listen_addr: SocketAddr,
}

impl BotSettings {
    /// # Errors
    /// Returns an error when a required secret is missing or the listen
    /// address does not parse.
    pub fn from_config(config: &Config) -> Result<Self> {
        let Some(bot_token) = non_empty(config.telegram.bot_token.as_deref()) else {
            bail!("telegram.bot_token or GHVERIFY_TELEGRAM_BOT_TOKEN is required");
        };
        if non_empty(config.github.client_id.as_deref()).is_none() {
            bail!("github.client_id or GHVERIFY_GITHUB_CLIENT_ID is required");
        }
        if non_empty(config.github.client_secret.as_deref()).is_none() {
            bail!("github.client_secret or GHVERIFY_GITHUB_CLIENT_SECRET is required");
        }

        let listen_addr = config
            .callback
            .listen_addr
            .trim()
            .parse()
            .with_context(|| {
                format!(
                    "Invalid callback.listen_addr: {}",
                    config.callback.listen_addr
                )
            })?;

        Ok(Self {
            bot_token: bot_token.to_string(),
            listen_addr,
        })
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|value| !value.is_empty())
}
