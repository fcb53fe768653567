use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use ghverify_core::github::{GitHubError, User};
use serde::Deserialize;
use tracing::{info, warn};

use super::CallbackState;
use super::pages;

const PLACEHOLDER: &str = "not set";

#[derive(Debug, Default, Deserialize)]
pub struct CallbackParams {
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
}

/// Result of a callback that reached the identity comparison.
#[derive(Debug, Clone, PartialEq)]
pub enum CallbackOutcome {
    Verified(User),
    Mismatch { requested: String, actual: String },
}

/// Callback failures, each mapped to a status code.
#[derive(Debug, thiserror::Error)]
pub enum VerifyError {
    #[error("missing code or state")]
    MissingParams,

    /// Unknown, already used or expired state token.
    #[error("invalid or expired state")]
    SessionInvalid,

    #[error("token exchange failed: {0}")]
    Exchange(#[source] GitHubError),

    #[error("failed to fetch authenticated user: {0}")]
    Identity(#[source] GitHubError),
}

impl VerifyError {
    pub fn status(&self) -> StatusCode {
        match self {
            VerifyError::MissingParams | VerifyError::SessionInvalid => StatusCode::BAD_REQUEST,
            VerifyError::Exchange(_) | VerifyError::Identity(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn public_message(&self) -> &'static str {
        match self {
            VerifyError::MissingParams => "Missing code or state",
            VerifyError::SessionInvalid => "Invalid or expired state",
            VerifyError::Exchange(_) => "Authentication failed",
            VerifyError::Identity(_) => "Failed to get user info",
        }
    }
}

impl IntoResponse for VerifyError {
    fn into_response(self) -> Response {
        (self.status(), self.public_message()).into_response()
    }
}

pub(super) async fn github_callback(
    State(state): State<CallbackState>,
    Query(params): Query<CallbackParams>,
) -> Result<Html<String>, VerifyError> {
    let outcome = verify(&state, &params).await?;
    Ok(Html(pages::render(&outcome)))
}

/// Consumes the session named by `state`, exchanges the code and compares
/// the authorized login with the requested one. The chat is notified of
/// every outcome past the session lookup.
///
/// # Errors
/// See [`VerifyError`].
pub async fn verify(
    state: &CallbackState,
    params: &CallbackParams,
) -> Result<CallbackOutcome, VerifyError> {
    let (Some(code), Some(token)) = (non_empty(params.code.as_deref()), non_empty(params.state.as_deref()))
    else {
        return Err(VerifyError::MissingParams);
    };

    let session = state
        .sessions
        .take(token)
        .ok_or(VerifyError::SessionInvalid)?;
    let chat_id = session.chat_id;

    let access = match state
        .github
        .exchange_code(code, session.pkce_verifier.as_deref())
        .await
    {
        Ok(access) => access,
        Err(err) => {
            warn!(chat_id, "Token exchange failed: {err}");
            notify(state, chat_id, "❌ Authorization failed.").await;
            return Err(VerifyError::Exchange(err));
        }
    };

    let user = match state.github.authenticated_user(&access.access_token).await {
        Ok(user) => user,
        Err(err) => {
            warn!(chat_id, "Fetching authenticated user failed: {err}");
            notify(state, chat_id, "❌ Could not fetch your GitHub account details.").await;
            return Err(VerifyError::Identity(err));
        }
    };

    if !user.is_login(&session.requested_login) {
        info!(
            chat_id,
            requested = %session.requested_login,
            actual = %user.login,
            "Verification mismatch"
        );
        let text = format!(
            "❌ Verification failed!\n\nRequested: @{}\nAuthorized: @{}\n\nPlease sign in with the requested account.",
            session.requested_login, user.login
        );
        notify(state, chat_id, &text).await;
        return Ok(CallbackOutcome::Mismatch {
            requested: session.requested_login,
            actual: user.login,
        });
    }

    info!(chat_id, login = %user.login, "Account ownership verified");
    let text = format!(
        "✅ Account ownership confirmed!\n\n👤 Name: {}\n🔗 GitHub: @{}\n📧 Email: {}\n🆔 ID: {}",
        user.display_name(PLACEHOLDER),
        user.login,
        user.email_or(PLACEHOLDER),
        user.id
    );
    notify(state, chat_id, &text).await;
    Ok(CallbackOutcome::Verified(user))
}

async fn notify(state: &CallbackState, chat_id: i64, text: &str) {
    if let Err(err) = state.notifier.notify(chat_id, text).await {
        warn!(chat_id, "Failed to notify chat: {err:#}");
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|value| !value.is_empty())
}
