//! Core of ghverify: GitHub API client, OAuth helpers, session correlation,
//! configuration and logging.

pub mod config;
pub mod github;
pub mod logging;
pub mod session;
