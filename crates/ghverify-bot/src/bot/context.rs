use std::sync::Arc;

use ghverify_core::github::GitHubApi;
use ghverify_core::session::SessionStore;

use crate::telegram::TelegramClient;

pub(crate) struct BotContext {
    client: TelegramClient,
    github: GitHubApi,
    sessions: Arc<dyn SessionStore>,
    scopes: Vec<String>,
    use_pkce: bool,
}

impl BotContext {
    pub(crate) fn new(
        client: TelegramClient,
        github: GitHubApi,
        sessions: Arc<dyn SessionStore>,
        scopes: Vec<String>,
        use_pkce: bool,
    ) -> Self {
        Self {
            client,
            github,
            sessions,
            scopes,
            use_pkce,
        }
    }

    pub(crate) fn client(&self) -> &TelegramClient {
        &self.client
    }

    pub(crate) fn github(&self) -> &GitHubApi {
        &self.github
    }

    pub(crate) fn sessions(&self) -> &dyn SessionStore {
        self.sessions.as_ref()
    }

    pub(crate) fn scopes(&self) -> &[String] {
        &self.scopes
    }

    pub(crate) fn use_pkce(&self) -> bool {
        self.use_pkce
    }
}
