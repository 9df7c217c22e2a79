//! Wire and storage types for the auth API. Request payloads carry
//! passwords, so they must never be logged or derive `Debug`.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Well-known role values. The session layer never validates roles; these
/// exist for guards and callers.
pub mod roles {
    pub const JOB_SEEKER: &str = "job_seeker";
    pub const EMPLOYER: &str = "employer";
    pub const ADMIN: &str = "admin";
}

/// The authenticated principal. `id` accepts the backend's `_id` spelling so
/// whoami and login payloads normalise to the same record.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[serde(alias = "_id")]
    pub id: String,
    pub email: String,
    pub name: String,
    pub role: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile_image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile: Option<Value>,
}

impl User {
    #[must_use]
    pub fn has_role(&self, role: &str) -> bool {
        self.role == role
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest<'a> {
    pub email: &'a str,
    pub password: &'a str,
    pub remember_me: bool,
}

#[derive(Serialize)]
pub struct RegisterRequest<'a> {
    pub name: &'a str,
    pub email: &'a str,
    pub password: &'a str,
    pub role: &'a str,
}

#[derive(Serialize)]
pub struct VerifyEmailRequest<'a> {
    pub token: &'a str,
}

#[derive(Serialize)]
pub struct EmailRequest<'a> {
    pub email: &'a str,
}

#[derive(Serialize)]
pub struct ResetPasswordRequest<'a> {
    pub token: &'a str,
    pub password: &'a str,
}

/// Body returned by login and register. `user` is optional on the wire so a
/// 2xx without it decodes and can be reported as a malformed response.
#[derive(Clone, Debug, Deserialize)]
pub struct AuthResponse {
    #[serde(default)]
    pub user: Option<User>,
}

/// Whoami accepts both the bare user and a `{ user }` envelope.
#[derive(Clone, Debug, Deserialize)]
#[serde(untagged)]
pub enum WhoamiResponse {
    Wrapped { user: User },
    Bare(User),
}

impl WhoamiResponse {
    #[must_use]
    pub fn into_user(self) -> User {
        match self {
            WhoamiResponse::Wrapped { user } | WhoamiResponse::Bare(user) => user,
        }
    }
}

/// Informational body returned by the account endpoints.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct MessageResponse {
    #[serde(default)]
    pub message: Option<String>,
}

/// Error body shape used by the backend for non-2xx responses.
#[derive(Clone, Debug, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

impl ErrorBody {
    #[must_use]
    pub fn into_message(self) -> Option<String> {
        [self.message, self.error]
            .into_iter()
            .flatten()
            .map(|message| message.trim().to_string())
            .find(|message| !message.is_empty())
    }
}

/// Fields of the session that survive restarts. `isAuthenticated` is never
/// part of it.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct PersistedState {
    #[serde(default)]
    pub user: Option<User>,
}

/// On-disk record stored under the `auth-storage` key.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct Snapshot {
    pub state: PersistedState,
    #[serde(default)]
    pub version: u32,
}

impl Snapshot {
    pub const VERSION: u32 = 0;

    #[must_use]
    pub fn with_user(user: Option<User>) -> Self {
        Self {
            state: PersistedState { user },
            version: Self::VERSION,
        }
    }
}
