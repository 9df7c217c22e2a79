//! Route guard decisions. These are UX-only: real access control lives on
//! the API. Guards read a [`SessionState`] and tell the caller whether to
//! render, wait, or redirect.

use crate::{
    api::Transport,
    session::{SessionManager, SessionState, SessionStatus},
};

pub const LOGIN_ROUTE: &str = "/login";
pub const UNAUTHORIZED_ROUTE: &str = "/unauthorized";

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Access {
    /// Render the protected view.
    Granted,
    /// The first session check has not resolved yet.
    Pending,
    /// No verified session.
    Redirect(&'static str),
    /// Signed in, but the role is not allowed.
    Forbidden(&'static str),
}

/// Requires an authenticated session.
#[must_use]
pub fn require_auth(state: &SessionState) -> Access {
    match state.status {
        SessionStatus::Unknown => Access::Pending,
        SessionStatus::Unauthenticated => Access::Redirect(LOGIN_ROUTE),
        SessionStatus::Authenticated => Access::Granted,
    }
}

/// Requires an authenticated session whose role is one of `allowed`. An
/// empty list allows any role.
#[must_use]
pub fn require_role(state: &SessionState, allowed: &[&str]) -> Access {
    match require_auth(state) {
        Access::Granted => {}
        other => return other,
    }

    if allowed.is_empty() {
        return Access::Granted;
    }

    match state.role() {
        Some(role) if allowed.contains(&role) => Access::Granted,
        _ => Access::Forbidden(UNAUTHORIZED_ROUTE),
    }
}

/// Revalidates the session with the server, then applies [`require_role`].
/// Used on every protected render, so it never fails.
pub async fn protect<T: Transport>(manager: &SessionManager<T>, allowed: &[&str]) -> Access {
    manager.check_session().await;
    require_role(&manager.state(), allowed)
}
