//! OAuth login hand-off. Starting a provider login is not a request: it is a
//! full-page navigation to a backend endpoint that redirects through the
//! provider and back into the app. It is modelled as a [`Navigate`] effect so
//! callers decide how to perform it (browser redirect, printing the URL).

use crate::errors::AppError;
use std::fmt;
use url::Url;

/// Fallback shown when the callback reports a failure without details.
pub const OAUTH_FAILED_MESSAGE: &str = "Authentication failed";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OAuthProvider {
    Google,
    LinkedIn,
}

impl OAuthProvider {
    /// Backend path that starts the provider's redirect chain.
    #[must_use]
    pub fn login_path(self) -> &'static str {
        match self {
            OAuthProvider::Google => "/auth/google/login",
            OAuthProvider::LinkedIn => "/auth/linkedin/login",
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            OAuthProvider::Google => "google",
            OAuthProvider::LinkedIn => "linkedin",
        }
    }

    /// # Errors
    /// Returns `AppError::Config` for unknown provider names.
    pub fn parse(value: &str) -> Result<Self, AppError> {
        match value.trim().to_lowercase().as_str() {
            "google" => Ok(OAuthProvider::Google),
            "linkedin" => Ok(OAuthProvider::LinkedIn),
            other => Err(AppError::Config(format!("Unsupported OAuth provider: {other}"))),
        }
    }
}

impl fmt::Display for OAuthProvider {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

/// Instruction to leave the current page. Nothing runs after it is performed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Navigate {
    pub url: Url,
}

/// What the OAuth callback route reported.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CallbackOutcome {
    /// No error marker: the backend set the session cookie.
    Completed,
    Failed(String),
}

/// Reads the callback query. Only an `error` parameter marks a failed
/// hand-off; `message` or `error_description` just supply its text.
#[must_use]
pub fn parse_callback(callback: &Url) -> CallbackOutcome {
    let mut error = None;
    let mut message = None;

    for (key, value) in callback.query_pairs() {
        match key.as_ref() {
            "error" => error = Some(value.into_owned()),
            "message" | "error_description" => message = Some(value.into_owned()),
            _ => {}
        }
    }

    let Some(error) = error else {
        return CallbackOutcome::Completed;
    };

    let text = message
        .into_iter()
        .chain(std::iter::once(error))
        .map(|value| value.trim().to_string())
        .find(|value| !value.is_empty() && value != "true" && value != "1")
        .unwrap_or_else(|| OAUTH_FAILED_MESSAGE.to_string());

    CallbackOutcome::Failed(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn provider_paths() {
        assert_eq!(OAuthProvider::Google.login_path(), "/auth/google/login");
        assert_eq!(OAuthProvider::LinkedIn.login_path(), "/auth/linkedin/login");
    }

    #[test]
    fn provider_parse_is_case_insensitive() {
        assert_eq!(OAuthProvider::parse(" LinkedIn ").unwrap(), OAuthProvider::LinkedIn);
        assert_eq!(OAuthProvider::parse("google").unwrap(), OAuthProvider::Google);
        assert!(matches!(OAuthProvider::parse("github"), Err(AppError::Config(_))));
    }

    #[test]
    fn callback_without_error_completes() {
        let url = Url::parse("https://jobs.example.com/auth/callback?provider=google").unwrap();
        assert_eq!(parse_callback(&url), CallbackOutcome::Completed);
    }

    #[test]
    fn callback_message_without_error_completes() {
        let url =
            Url::parse("https://jobs.example.com/auth/callback?message=Welcome%20back").unwrap();
        assert_eq!(parse_callback(&url), CallbackOutcome::Completed);

        let url = Url::parse(
            "https://jobs.example.com/auth/callback?error_description=ignored&provider=linkedin",
        )
        .unwrap();
        assert_eq!(parse_callback(&url), CallbackOutcome::Completed);
    }

    #[test]
    fn callback_error_prefers_message() {
        let url = Url::parse(
            "https://jobs.example.com/auth/callback?error=access_denied&message=Email%20already%20registered",
        )
        .unwrap();
        assert_eq!(
            parse_callback(&url),
            CallbackOutcome::Failed("Email already registered".to_string())
        );
    }

    #[test]
    fn callback_error_flag_uses_fallback() {
        let url = Url::parse("https://jobs.example.com/auth/callback?error=true").unwrap();
        assert_eq!(
            parse_callback(&url),
            CallbackOutcome::Failed(OAUTH_FAILED_MESSAGE.to_string())
        );

        let url = Url::parse("https://jobs.example.com/auth/callback?error=access_denied").unwrap();
        assert_eq!(
            parse_callback(&url),
            CallbackOutcome::Failed("access_denied".to_string())
        );
    }
}
