use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use ghverify_core::config::Config;
use ghverify_core::session::{InMemorySessionStore, SessionStore};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::bot::{BotContext, dispatch_message, new_chat_queues};
use crate::callback::CallbackState;
use crate::settings::BotSettings;
use crate::telegram::TelegramClient;

mod bot;
pub mod callback;
pub mod commands;
mod handlers;
pub mod notify;
pub mod settings;
pub mod telegram;

const POLL_TIMEOUT: Duration = Duration::from_secs(30);

/// Starts the callback listener, the session purge task and the polling
/// loop. Returns after Ctrl-C once the listener has drained.
///
/// # Errors
/// Returns an error if configuration is invalid, the listener cannot bind,
/// or the callback server fails.
pub async fn run_with_config(config: Config) -> Result<()> {
    let settings = BotSettings::from_config(&config)?;
    let github = config
        .github
        .build_client()
        .context("Failed to build GitHub client")?;
    let sessions: Arc<dyn SessionStore> = match config.session.ttl() {
        Some(ttl) => Arc::new(InMemorySessionStore::with_ttl(ttl)),
        None => Arc::new(InMemorySessionStore::new()),
    };

    let mut client = TelegramClient::new(settings.bot_token).with_timeout(config.github.timeout());
    if let Some(base_url) = config.telegram.api_base_url.as_deref() {
        client = client.with_base_url(base_url);
    }

    let listener = TcpListener::bind(settings.listen_addr)
        .await
        .with_context(|| format!("Failed to bind callback listener on {}", settings.listen_addr))?;
    let shutdown = CancellationToken::new();
    let callback_state = CallbackState::new(
        Arc::clone(&sessions),
        github.clone(),
        Arc::new(client.clone()),
    );
    let server = tokio::spawn(callback::serve(listener, callback_state, shutdown.clone()));
    let purge = spawn_purge_task(
        Arc::clone(&sessions),
        config.session.purge_interval(),
        shutdown.clone(),
    );

    register_commands(&client).await;

    let context = Arc::new(BotContext::new(
        client,
        github,
        sessions,
        config.github.scopes.clone(),
        config.github.use_pkce,
    ));
    info!(
        pkce = config.github.use_pkce,
        scopes = ?config.github.scopes,
        "ghverify-bot started. Polling for updates..."
    );
    poll_updates(&context, &shutdown).await;

    shutdown.cancel();
    if let Err(err) = purge.await {
        warn!("Session purge task ended abnormally: {err}");
    }
    server
        .await
        .map_err(|err| anyhow!("Callback server task failed: {err}"))?
}

async fn register_commands(client: &TelegramClient) {
    match client
        .set_my_commands(&commands::telegram_command_specs())
        .await
    {
        Ok(()) => debug!("Registered bot commands"),
        Err(err) => warn!("Failed to register bot commands: {err:#}"),
    }
}

/// Long-polls until Ctrl-C or until `shutdown` is cancelled elsewhere.
async fn poll_updates(context: &Arc<BotContext>, shutdown: &CancellationToken) {
    let chat_queues = new_chat_queues();
    let mut offset: Option<i64> = None;
    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    loop {
        let current_offset = offset;
        tokio::select! {
            _ = &mut ctrl_c => {
                info!("Shutting down Telegram bot.");
                break;
            }
            () = shutdown.cancelled() => break,
            updates = context.client().get_updates(current_offset, POLL_TIMEOUT) => {
                let updates = match updates {
                    Ok(updates) => updates,
                    Err(err) => {
                        warn!("Telegram polling error: {err:#}");
                        tokio::time::sleep(Duration::from_secs(1)).await;
                        continue;
                    }
                };

                if !updates.is_empty() {
                    debug!(count = updates.len(), "Received updates");
                }
                for update in updates {
                    offset = Some(update.update_id + 1);
                    if let Some(message) = update.message {
                        dispatch_message(&chat_queues, context, message).await;
                    }
                }
            }
        }
    }
}

/// Drops expired sessions every `interval` until `shutdown` is cancelled.
fn spawn_purge_task(
    sessions: Arc<dyn SessionStore>,
    interval: Duration,
    shutdown: CancellationToken,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        loop {
            tokio::select! {
                () = shutdown.cancelled() => break,
                _ = ticker.tick() => {
                    let purged = sessions.purge_expired();
                    if purged > 0 {
                        debug!(purged, remaining = sessions.len(), "Purged expired sessions");
                    }
                }
            }
        }
    })
}
