//! One-time state tokens correlating a chat request with its OAuth callback.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use sha2::{Digest, Sha256};

use crate::github::oauth::random_bytes;

/// A pending verification, created when a user submits a username.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub state: String,
    pub chat_id: i64,
    pub requested_login: String,
    pub created_at: Instant,
    pub pkce_verifier: Option<String>,
}

impl Session {
    pub fn new(state: impl Into<String>, chat_id: i64, requested_login: impl Into<String>) -> Self {
        Self {
            state: state.into(),
            chat_id,
            requested_login: requested_login.into(),
            created_at: Instant::now(),
            pkce_verifier: None,
        }
    }

    #[must_use]
    pub fn with_pkce_verifier(mut self, verifier: impl Into<String>) -> Self {
        self.pkce_verifier = Some(verifier.into());
        self
    }

    pub fn is_expired(&self, ttl: Duration, now: Instant) -> bool {
        now.saturating_duration_since(self.created_at) >= ttl
    }
}

/// Unguessable token bound to `chat_id`: SHA-256 over 32 random bytes, the
/// chat id and the current time, base64url without padding.
pub fn generate_state(chat_id: i64) -> String {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_nanos())
        .unwrap_or_default();

    let mut hasher = Sha256::new();
    hasher.update(random_bytes());
    hasher.update(chat_id.to_be_bytes());
    hasher.update(nanos.to_be_bytes());
    URL_SAFE_NO_PAD.encode(hasher.finalize())
}

/// Storage for pending sessions, shared by the chat handler and the callback.
pub trait SessionStore: Send + Sync {
    /// Inserts or replaces the session under its state token.
    fn put(&self, session: Session);

    /// Removes and returns the session. A token is handed out at most once;
    /// expired sessions are removed and reported as absent.
    fn take(&self, state: &str) -> Option<Session>;

    /// Drops every expired session and returns how many were removed.
    fn purge_expired(&self) -> usize;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Process-local store behind a single mutex.
#[derive(Debug, Default)]
pub struct InMemorySessionStore {
    sessions: Mutex<HashMap<String, Session>>,
    ttl: Option<Duration>,
}

impl InMemorySessionStore {
    /// Store whose sessions never expire.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            sessions: Mutex::new(HashMap::new()),
            ttl: Some(ttl),
        }
    }

    pub fn ttl(&self) -> Option<Duration> {
        self.ttl
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, Session>> {
        self.sessions.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn expired(&self, session: &Session, now: Instant) -> bool {
        self.ttl.is_some_and(|ttl| session.is_expired(ttl, now))
    }
}

impl SessionStore for InMemorySessionStore {
    fn put(&self, session: Session) {
        self.lock().insert(session.state.clone(), session);
    }

    fn take(&self, state: &str) -> Option<Session> {
        let session = self.lock().remove(state)?;
        if self.expired(&session, Instant::now()) {
            tracing::debug!(chat_id = session.chat_id, "Dropped expired session");
            return None;
        }
        Some(session)
    }

    fn purge_expired(&self) -> usize {
        let Some(ttl) = self.ttl else {
            return 0;
        };
        let now = Instant::now();
        let mut sessions = self.lock();
        let before = sessions.len();
        sessions.retain(|_, session| !session.is_expired(ttl, now));
        before - sessions.len()
    }

    fn len(&self) -> usize {
        self.lock().len()
    }
}
