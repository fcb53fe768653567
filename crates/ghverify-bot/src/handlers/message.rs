use anyhow::Result;
use ghverify_core::github::{AuthorizeRequest, Pkce};
use ghverify_core::session::{Session, generate_state};
use tracing::{debug, info, warn};

use crate::bot::context::BotContext;
use crate::commands::{BotCommand, Incoming, classify};
use crate::telegram::{InlineKeyboardMarkup, Message};

const GREETING: &str = "Hi! Send me your GitHub username to verify that you own the account.\n\n\
Usage: /verify <github_username> or just the username.";
const VERIFY_USAGE: &str = "Usage: /verify <github_username>";
const VERIFY_BUTTON: &str = "Verify on GitHub";

pub(crate) async fn handle_message(context: &BotContext, message: Message) -> Result<()> {
    if message.is_from_bot() {
        return Ok(());
    }
    let Some(text) = message.text.as_deref() else {
        return Ok(());
    };
    let chat_id = message.chat.id;

    match classify(text) {
        Incoming::Command(BotCommand::Start | BotCommand::Help, _) => {
            context.client().send_message(chat_id, GREETING, None).await
        }
        Incoming::Command(BotCommand::Verify, None) => {
            context.client().send_message(chat_id, VERIFY_USAGE, None).await
        }
        Incoming::Command(BotCommand::Verify, Some(login)) | Incoming::Username(login) => {
            submit_username(context, chat_id, login).await
        }
        Incoming::Ignored => {
            debug!(chat_id, "Ignoring message");
            Ok(())
        }
    }
}

/// Checks the account exists, opens a session and replies with the
/// authorize button.
pub(crate) async fn submit_username(context: &BotContext, chat_id: i64, login: &str) -> Result<()> {
    let login = login.trim().trim_start_matches('@');

    match context.github().user_exists(login).await {
        Ok(true) => {}
        Ok(false) => {
            info!(chat_id, login, "GitHub user not found");
            let text = format!("❌ GitHub user @{login} was not found.");
            return context.client().send_message(chat_id, &text, None).await;
        }
        Err(err) => {
            warn!(chat_id, login, "Username check failed: {err}");
            let text = format!("⚠️ Could not check the username: {err}");
            return context.client().send_message(chat_id, &text, None).await;
        }
    }

    let state = generate_state(chat_id);
    let pkce = context.use_pkce().then(Pkce::generate);
    let authorize_url = context.github().authorize_url(&AuthorizeRequest {
        login: Some(login),
        state: &state,
        scopes: context.scopes(),
        allow_signup: false,
        pkce: pkce.as_ref(),
    })?;

    let mut session = Session::new(state, chat_id, login);
    if let Some(pkce) = pkce {
        session = session.with_pkce_verifier(pkce.verifier);
    }
    context.sessions().put(session);
    info!(chat_id, login, "Verification session created");

    let text = format!("To confirm that you own @{login}, tap the button below and sign in to GitHub.");
    let keyboard = InlineKeyboardMarkup::url_button(VERIFY_BUTTON, authorize_url);
    context
        .client()
        .send_message(chat_id, &text, Some(&keyboard))
        .await
}
