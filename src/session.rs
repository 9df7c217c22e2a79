//! Client-side session state machine.
//!
//! States are `Unknown` (before the first session check resolves),
//! `Unauthenticated` and `Authenticated`. A user rehydrated from the snapshot
//! store is kept but never trusted: only a successful session check, login or
//! registration marks the session authenticated.
//!
//! Responses can arrive out of order. Every request takes a ticket when it
//! starts and its result is applied only if it is still current:
//! - a session check is dropped if a login, registration or logout was
//!   applied after it started;
//! - login and registration are dropped if a newer login, registration or
//!   logout already applied, and the caller gets [`AppError::Superseded`];
//! - logout always applies.
//!
//! `set_user` is a local edit: it replaces the user record in place and
//! never fences or is fenced by server responses.

use crate::{
    api::{decode, Reply, Transport},
    errors::{AppError, SUPERSEDED_MESSAGE},
    oauth::{parse_callback, CallbackOutcome, Navigate, OAuthProvider, OAUTH_FAILED_MESSAGE},
    storage::SnapshotStore,
    types::{AuthResponse, LoginRequest, RegisterRequest, Snapshot, User, WhoamiResponse},
};
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use serde_json::Value;
use std::sync::{
    atomic::{AtomicU64, Ordering},
    Arc, Mutex, MutexGuard, PoisonError,
};
use tokio::sync::OnceCell;
use tracing::{debug, info, instrument, warn};
use url::Url;

pub const WHOAMI_PATH: &str = "/auth/@me";
pub const LOGIN_PATH: &str = "/auth/login";
pub const REGISTER_PATH: &str = "/auth/register";
pub const LOGOUT_PATH: &str = "/auth/logout";

const LOGIN_FAILED: &str = "Login failed";
const REGISTER_FAILED: &str = "Registration failed";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionStatus {
    Unknown,
    Unauthenticated,
    Authenticated,
}

/// Point-in-time view of the session handed to guards and UI code.
#[derive(Clone, Debug, PartialEq)]
pub struct SessionState {
    pub status: SessionStatus,
    pub user: Option<User>,
}

impl SessionState {
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.status == SessionStatus::Authenticated
    }

    #[must_use]
    pub fn role(&self) -> Option<&str> {
        self.user.as_ref().map(|user| user.role.as_str())
    }
}

#[derive(Clone, Copy, Debug)]
enum WriteKind {
    Check,
    Mutation,
    Logout,
}

struct Inner {
    state: SessionState,
    /// Highest ticket whose result may no longer be overwritten by a check.
    last_write: u64,
    /// Ticket of the newest applied mutation.
    last_mutation: u64,
}

pub struct SessionManager<T> {
    transport: T,
    store: Arc<dyn SnapshotStore>,
    inner: Mutex<Inner>,
    generation: AtomicU64,
    initialized: OnceCell<()>,
}

impl<T: Transport> SessionManager<T> {
    /// Builds a manager and rehydrates the persisted user. The rehydrated
    /// user stays unverified until [`SessionManager::initialize`] or
    /// [`SessionManager::check_session`] confirms it.
    pub fn new(transport: T, store: Arc<dyn SnapshotStore>) -> Self {
        let user = match store.load() {
            Ok(snapshot) => snapshot.and_then(|snapshot| snapshot.state.user),
            Err(err) => {
                warn!("ignoring unreadable session snapshot: {err}");
                None
            }
        };

        if let Some(user) = &user {
            debug!(user_id = %user.id, "rehydrated unverified user");
        }

        Self {
            transport,
            store,
            inner: Mutex::new(Inner {
                state: SessionState {
                    status: SessionStatus::Unknown,
                    user,
                },
                last_write: 0,
                last_mutation: 0,
            }),
            generation: AtomicU64::new(0),
            initialized: OnceCell::new(),
        }
    }

    #[must_use]
    pub fn transport(&self) -> &T {
        &self.transport
    }

    #[must_use]
    pub fn state(&self) -> SessionState {
        self.lock().state.clone()
    }

    #[must_use]
    pub fn status(&self) -> SessionStatus {
        self.lock().state.status
    }

    #[must_use]
    pub fn user(&self) -> Option<User> {
        self.lock().state.user.clone()
    }

    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.lock().state.is_authenticated()
    }

    /// Reconciles the rehydrated state with the server. Runs one session
    /// check; later calls wait for or reuse the first one. Never fails.
    pub async fn initialize(&self) {
        self.initialized
            .get_or_init(|| async {
                let authenticated = self.check_session().await;
                info!(authenticated, "session initialized");
            })
            .await;
    }

    /// Asks the server who the current user is. Any failure clears the
    /// session and yields `false`; this never returns an error.
    #[instrument(skip(self))]
    pub async fn check_session(&self) -> bool {
        let ticket = self.next_ticket();

        let user = match self.transport.get(WHOAMI_PATH).await {
            Ok(response) => match decode::<WhoamiResponse>(&response) {
                Reply::Success(body) => Some(body.into_user()),
                Reply::Rejected { status, .. } => {
                    debug!(status, "session check rejected");
                    None
                }
                Reply::Malformed(detail) => {
                    warn!("session check returned a malformed body: {detail}");
                    None
                }
            },
            Err(err) if err.is_transport() => {
                debug!("session check failed: {err}");
                None
            }
            Err(err) => {
                warn!("session check could not be sent: {err}");
                None
            }
        };

        let authenticated = user.is_some();
        let status = if authenticated {
            SessionStatus::Authenticated
        } else {
            SessionStatus::Unauthenticated
        };

        if self.commit(ticket, WriteKind::Check, status, user) {
            authenticated
        } else {
            self.is_authenticated()
        }
    }

    /// Logs in with email and password. On failure the session is untouched.
    ///
    /// # Errors
    /// Returns `AppError::Http` with the server message (or `"Login failed"`),
    /// `AppError::Parse` when a 2xx body has no `user`, `AppError::Superseded`
    /// when a logout or a newer login applied first, or a transport error.
    #[instrument(skip_all, fields(remember_me = remember_me))]
    pub async fn login(
        &self,
        email: &str,
        password: &SecretString,
        remember_me: bool,
    ) -> Result<User, AppError> {
        let request = LoginRequest {
            email,
            password: password.expose_secret(),
            remember_me,
        };
        let user = self.authenticate(LOGIN_PATH, &request, LOGIN_FAILED).await?;
        info!(user_id = %user.id, "logged in");
        Ok(user)
    }

    /// Creates an account and signs it in immediately.
    ///
    /// # Errors
    /// Same failure modes as [`SessionManager::login`], with the fallback
    /// message `"Registration failed"`.
    #[instrument(skip_all, fields(role = role))]
    pub async fn register(
        &self,
        name: &str,
        email: &str,
        password: &SecretString,
        role: &str,
    ) -> Result<User, AppError> {
        let request = RegisterRequest {
            name,
            email,
            password: password.expose_secret(),
            role,
        };
        let user = self
            .authenticate(REGISTER_PATH, &request, REGISTER_FAILED)
            .await?;
        info!(user_id = %user.id, "registered");
        Ok(user)
    }

    /// Notifies the server, then clears the local session whatever the
    /// outcome of that request.
    #[instrument(skip(self))]
    pub async fn logout(&self) {
        let ticket = self.next_ticket();

        match self.transport.post(LOGOUT_PATH, None).await {
            Ok(response) if response.is_success() => debug!("server session cleared"),
            Ok(response) => warn!(
                status = response.status,
                "logout rejected by server, clearing local session"
            ),
            Err(err) => warn!("logout request failed, clearing local session: {err}"),
        }

        self.commit(ticket, WriteKind::Logout, SessionStatus::Unauthenticated, None);
        info!("logged out");
    }

    /// Replaces the stored user record, e.g. after a profile edit. The
    /// authentication status is left as is and session checks in flight
    /// still apply.
    pub fn set_user(&self, user: User) {
        let mut inner = self.lock();
        inner.state.user = Some(user);
        self.persist(&inner.state);
    }

    /// Navigation target that starts a provider login.
    ///
    /// # Errors
    /// Returns `AppError::Config` if the redirect URL cannot be built.
    pub fn login_with(&self, provider: OAuthProvider) -> Result<Navigate, AppError> {
        let url = self.transport.resolve(provider.login_path())?;
        info!(%provider, "redirecting to OAuth provider");
        Ok(Navigate { url })
    }

    /// # Errors
    /// Returns `AppError::Config` if the redirect URL cannot be built.
    pub fn login_with_google(&self) -> Result<Navigate, AppError> {
        self.login_with(OAuthProvider::Google)
    }

    /// # Errors
    /// Returns `AppError::Config` if the redirect URL cannot be built.
    pub fn login_with_linkedin(&self) -> Result<Navigate, AppError> {
        self.login_with(OAuthProvider::LinkedIn)
    }

    /// Finishes an OAuth hand-off once the browser is back on the callback
    /// route: the query is checked for an error marker, then the session is
    /// verified with the server.
    ///
    /// # Errors
    /// Returns `AppError::Http` (401) when the callback reports an error or
    /// no session was established.
    #[instrument(skip_all)]
    pub async fn complete_oauth(&self, callback: &Url) -> Result<User, AppError> {
        if let CallbackOutcome::Failed(message) = parse_callback(callback) {
            warn!("OAuth callback reported a failure");
            return Err(AppError::Http {
                status: 401,
                message,
            });
        }

        if self.check_session().await {
            if let Some(user) = self.user() {
                return Ok(user);
            }
        }

        Err(AppError::Http {
            status: 401,
            message: OAUTH_FAILED_MESSAGE.to_string(),
        })
    }

    async fn authenticate<B: Serialize>(
        &self,
        path: &str,
        request: &B,
        fallback: &str,
    ) -> Result<User, AppError> {
        let ticket = self.next_ticket();
        let body = to_body(request)?;

        let response = self.transport.post(path, Some(body)).await?;
        let user = decode::<AuthResponse>(&response)
            .into_result(fallback)?
            .user
            .ok_or_else(AppError::malformed)?;

        let applied = self.commit(
            ticket,
            WriteKind::Mutation,
            SessionStatus::Authenticated,
            Some(user.clone()),
        );
        if !applied {
            return Err(AppError::Superseded(SUPERSEDED_MESSAGE.to_string()));
        }
        Ok(user)
    }

    fn next_ticket(&self) -> u64 {
        self.generation.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// Applies a transition unless it is stale, then persists the snapshot.
    fn commit(
        &self,
        ticket: u64,
        kind: WriteKind,
        status: SessionStatus,
        user: Option<User>,
    ) -> bool {
        let mut inner = self.lock();

        let stale = match kind {
            WriteKind::Check => ticket <= inner.last_write,
            WriteKind::Mutation => ticket < inner.last_mutation,
            WriteKind::Logout => false,
        };
        if stale {
            debug!(ticket, ?kind, "discarding stale session response");
            return false;
        }

        inner.state = SessionState { status, user };
        match kind {
            WriteKind::Check => inner.last_write = ticket,
            WriteKind::Mutation | WriteKind::Logout => {
                inner.last_mutation = inner.last_mutation.max(ticket);
                inner.last_write = self.generation.load(Ordering::SeqCst);
            }
        }

        self.persist(&inner.state);
        true
    }

    /// Called with the state lock held so writes reach the store in order.
    fn persist(&self, state: &SessionState) {
        let snapshot = Snapshot::with_user(state.user.clone());
        if let Err(err) = self.store.save(&snapshot) {
            warn!("failed to persist session snapshot: {err}");
        }
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

fn to_body<B: Serialize>(request: &B) -> Result<Value, AppError> {
    serde_json::to_value(request)
        .map_err(|err| AppError::Serialization(format!("Failed to encode request: {err}")))
}
