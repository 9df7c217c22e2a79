//! Session and authentication client for the job board API.
//!
//! The [`session::SessionManager`] owns the authenticated user and the
//! authenticated flag. It talks to the backend through a [`api::Transport`]
//! and mirrors `{ user }` into a [`storage::SnapshotStore`] so the last known
//! identity survives restarts. A rehydrated identity is never trusted until
//! the backend confirms it.

pub mod account;
pub mod api;
pub mod cli;
pub mod config;
pub mod errors;
pub mod guards;
pub mod oauth;
pub mod session;
pub mod storage;
pub mod types;

#[allow(clippy::doc_markdown, clippy::needless_raw_string_hashes)]
pub mod built_info {
    include!(concat!(env!("OUT_DIR"), "/built.rs"));
}

pub use errors::AppError;
pub use session::{SessionManager, SessionState, SessionStatus};
pub use types::User;

pub const GIT_COMMIT_HASH: &str = match built_info::GIT_COMMIT_HASH {
    Some(hash) => hash,
    None => "unknown",
};

pub const APP_USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));
