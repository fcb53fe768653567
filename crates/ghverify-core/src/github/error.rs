use std::fmt;

use reqwest::StatusCode;

/// Resource a lookup was made for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceKind {
    Profile,
    Repo,
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResourceKind::Profile => write!(f, "profile"),
            ResourceKind::Repo => write!(f, "repo"),
        }
    }
}

/// Errors returned by the GitHub client and its resource handles.
#[derive(Debug, thiserror::Error)]
pub enum GitHubError {
    /// The API answered 404 for a profile or repository lookup.
    #[error("{kind} not found: {identifier}")]
    NotFound {
        kind: ResourceKind,
        identifier: String,
    },

    /// Any other non-2xx response.
    #[error("github: http {status}: {body}")]
    Http { status: StatusCode, body: String },

    #[error("failed to decode GitHub response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// The contents API refused to create a file (422).
    #[error("file {path:?} already exists on branch {branch:?}: {body}")]
    AlreadyExists {
        path: String,
        branch: String,
        body: String,
    },

    /// Error reported by the OAuth token endpoint.
    #[error("{}", oauth_message(.code, .description.as_deref()))]
    OAuth {
        code: String,
        description: Option<String>,
    },

    #[error("invalid time format: {value:?}: {reason}")]
    InvalidTimestamp { value: String, reason: String },

    #[error("invalid url: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("GitHub request failed: {0}")]
    Transport(#[from] reqwest::Error),
}

fn oauth_message(code: &str, description: Option<&str>) -> String {
    match description {
        Some(description) if !description.is_empty() => {
            format!("GitHub error: {code} ({description})")
        }
        _ => format!("GitHub error: {code}"),
    }
}

impl GitHubError {
    pub(crate) fn not_found(kind: ResourceKind, identifier: impl Into<String>) -> Self {
        Self::NotFound {
            kind,
            identifier: identifier.into(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, GitHubError::NotFound { .. })
    }

    pub fn is_already_exists(&self) -> bool {
        matches!(self, GitHubError::AlreadyExists { .. })
    }

    /// HTTP status for `Http` errors.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            GitHubError::Http { status, .. } => Some(*status),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, GitHubError>;
