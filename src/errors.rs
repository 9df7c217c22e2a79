//! Error type shared by the transport, the session manager and the account
//! flows. Every variant carries a message that is safe to show to a user;
//! none of them ever contain credentials.

use std::fmt;

/// Fallback used when a 2xx response is missing the fields an operation needs.
pub const INVALID_RESPONSE_MESSAGE: &str = "Invalid response from server";

/// Generic text for requests that never produced a response.
pub const NETWORK_ERROR_MESSAGE: &str = "Unable to reach the server. Please try again.";

/// Generic text for requests aborted by the transport timeout.
pub const TIMEOUT_MESSAGE: &str = "Request timed out. Please try again.";

/// A sign-in response arrived after a logout or a newer sign-in.
pub const SUPERSEDED_MESSAGE: &str = "Session changed while signing in. Please try again.";

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AppError {
    Config(String),
    Network(String),
    Timeout(String),
    Http { status: u16, message: String },
    Parse(String),
    Serialization(String),
    Storage(String),
    Superseded(String),
}

impl AppError {
    /// Human-readable text for the UI layer. For `Http` this is the server
    /// supplied message, forwarded verbatim.
    #[must_use]
    pub fn message(&self) -> &str {
        match self {
            AppError::Config(message)
            | AppError::Network(message)
            | AppError::Timeout(message)
            | AppError::Parse(message)
            | AppError::Serialization(message)
            | AppError::Storage(message)
            | AppError::Superseded(message)
            | AppError::Http { message, .. } => message,
        }
    }

    /// HTTP status for server rejections.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            AppError::Http { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// True when the request never produced a response.
    #[must_use]
    pub fn is_transport(&self) -> bool {
        matches!(self, AppError::Network(_) | AppError::Timeout(_))
    }

    #[must_use]
    pub fn malformed() -> Self {
        AppError::Parse(INVALID_RESPONSE_MESSAGE.to_string())
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Config(message) => write!(formatter, "Config error: {message}"),
            AppError::Network(message) => write!(formatter, "Network error: {message}"),
            AppError::Timeout(message) => write!(formatter, "Timeout: {message}"),
            AppError::Http { status, message } => {
                write!(formatter, "Request failed ({status}): {message}")
            }
            AppError::Parse(message) => write!(formatter, "Response error: {message}"),
            AppError::Serialization(message) => {
                write!(formatter, "Request error: {message}")
            }
            AppError::Storage(message) => write!(formatter, "Storage error: {message}"),
            AppError::Superseded(message) => write!(formatter, "Superseded: {message}"),
        }
    }
}

impl std::error::Error for AppError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn message_forwards_server_text_verbatim() {
        let err = AppError::Http {
            status: 401,
            message: "Invalid email or password".to_string(),
        };
        assert_eq!(err.message(), "Invalid email or password");
        assert_eq!(err.status(), Some(401));
        assert_eq!(
            err.to_string(),
            "Request failed (401): Invalid email or password"
        );
    }

    #[test]
    fn malformed_uses_fixed_message() {
        let err = AppError::malformed();
        assert_eq!(err.message(), "Invalid response from server");
        assert!(!err.is_transport());
        assert_eq!(err.status(), None);
    }

    #[test]
    fn transport_errors_are_flagged() {
        assert!(AppError::Network(NETWORK_ERROR_MESSAGE.to_string()).is_transport());
        assert!(AppError::Timeout(TIMEOUT_MESSAGE.to_string()).is_transport());
        assert!(!AppError::Storage("disk full".to_string()).is_transport());
    }

    #[test]
    fn superseded_is_a_local_failure() {
        let err = AppError::Superseded(SUPERSEDED_MESSAGE.to_string());
        assert!(!err.is_transport());
        assert_eq!(err.status(), None);
        assert_eq!(err.message(), SUPERSEDED_MESSAGE);
    }
}
