//! HTTP endpoint that completes the OAuth redirect.

use std::sync::Arc;

use anyhow::{Context, Result};
use axum::Router;
use axum::routing::get;
use ghverify_core::github::GitHubApi;
use ghverify_core::session::SessionStore;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::notify::Notifier;

mod handler;
mod pages;

pub use handler::{CallbackOutcome, CallbackParams, VerifyError, verify};

/// Shared by every callback request.
#[derive(Clone)]
pub struct CallbackState {
    sessions: Arc<dyn SessionStore>,
    github: GitHubApi,
    notifier: Arc<dyn Notifier>,
}

impl CallbackState {
    pub fn new(
        sessions: Arc<dyn SessionStore>,
        github: GitHubApi,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            sessions,
            github,
            notifier,
        }
    }
}

/// `GET /callback` and `GET /healthz`, with request tracing.
pub fn router(state: CallbackState) -> Router {
    Router::new()
        .route("/callback", get(handler::github_callback))
        .route("/healthz", get(healthz))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn healthz() -> &'static str {
    "ok"
}

/// Serves the router until `shutdown` is cancelled, then drains in-flight
/// requests.
///
/// # Errors
/// Returns an error if the server fails.
pub async fn serve(
    listener: TcpListener,
    state: CallbackState,
    shutdown: CancellationToken,
) -> Result<()> {
    let addr = listener
        .local_addr()
        .context("Failed to read callback listener address")?;
    info!(%addr, "Callback listener started");

    axum::serve(listener, router(state))
        .with_graceful_shutdown(async move { shutdown.cancelled().await })
        .await
        .context("Callback server failed")?;

    info!("Callback listener stopped");
    Ok(())
}
