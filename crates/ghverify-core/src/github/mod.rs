//! GitHub REST API client.
//!
//! [`GitHubApi`] owns an immutable [`ClientConfig`] shared through an `Arc`.
//! Lookups return [`Profile`] and [`Repo`] handles that keep a clone of the
//! client, so follow-up calls reuse the same transport, base URLs and OAuth
//! credentials.

mod client;
mod error;
pub mod humanize;
pub mod oauth;
mod profile;
mod repo;
mod types;

pub use client::{
    ACCEPT_GITHUB_JSON, ClientConfig, DEFAULT_API_BASE_URL, DEFAULT_OAUTH_BASE_URL,
    DEFAULT_TIMEOUT, GitHubApi, GitHubApiBuilder, MAX_BODY_BYTES,
};
pub use error::{GitHubError, ResourceKind, Result};
pub use oauth::{AccessToken, AuthorizeRequest, OAuthApp, Pkce};
pub use profile::Profile;
pub use repo::{FileUpload, Repo, parse_github_time};
pub use types::{ContentCommit, ContentFile, CreateContentResponse, License, RepoOwner, Repository, User};
