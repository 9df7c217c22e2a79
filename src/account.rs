//! Account flows that do not touch the session: email verification and
//! password reset. Tokens and passwords are request payloads only and must
//! never be logged. Request-a-link endpoints answer the same way whether or
//! not the account exists.

use crate::{
    api::{decode, Transport},
    errors::AppError,
    types::{EmailRequest, MessageResponse, ResetPasswordRequest, VerifyEmailRequest},
};
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use tracing::{info, instrument};

pub const VERIFY_EMAIL_PATH: &str = "/auth/verify-email";
pub const RESEND_VERIFICATION_PATH: &str = "/auth/resend-verification";
pub const FORGOT_PASSWORD_PATH: &str = "/auth/forgot-password";
pub const RESET_PASSWORD_PATH: &str = "/auth/reset-password";

/// Confirms an email address with the token from the verification link.
///
/// # Errors
/// Returns `AppError::Http` with the server message when the token is
/// rejected, or a transport error.
#[instrument(skip_all)]
pub async fn verify_email<T: Transport>(
    transport: &T,
    token: &str,
) -> Result<Option<String>, AppError> {
    let message = send(
        transport,
        VERIFY_EMAIL_PATH,
        &VerifyEmailRequest { token: token.trim() },
        "Email verification failed",
    )
    .await?;
    info!("email verified");
    Ok(message)
}

/// Requests a new verification email.
///
/// # Errors
/// Returns `AppError::Http` or a transport error.
#[instrument(skip_all)]
pub async fn resend_verification<T: Transport>(
    transport: &T,
    email: &str,
) -> Result<Option<String>, AppError> {
    send(
        transport,
        RESEND_VERIFICATION_PATH,
        &EmailRequest { email: email.trim() },
        "Could not resend verification email",
    )
    .await
}

/// Starts the password reset flow for `email`.
///
/// # Errors
/// Returns `AppError::Http` or a transport error.
#[instrument(skip_all)]
pub async fn forgot_password<T: Transport>(
    transport: &T,
    email: &str,
) -> Result<Option<String>, AppError> {
    send(
        transport,
        FORGOT_PASSWORD_PATH,
        &EmailRequest { email: email.trim() },
        "Could not start password reset",
    )
    .await
}

/// Sets a new password using the token from the reset link.
///
/// # Errors
/// Returns `AppError::Http` with the server message when the token is
/// invalid or expired, or a transport error.
#[instrument(skip_all)]
pub async fn reset_password<T: Transport>(
    transport: &T,
    token: &str,
    password: &SecretString,
) -> Result<Option<String>, AppError> {
    let message = send(
        transport,
        RESET_PASSWORD_PATH,
        &ResetPasswordRequest {
            token: token.trim(),
            password: password.expose_secret(),
        },
        "Password reset failed",
    )
    .await?;
    info!("password reset");
    Ok(message)
}

/// Posts `request` and returns the optional informational message. An
/// empty 2xx body counts as success.
async fn send<T: Transport, B: Serialize>(
    transport: &T,
    path: &str,
    request: &B,
    fallback: &str,
) -> Result<Option<String>, AppError> {
    let body = serde_json::to_value(request)
        .map_err(|err| AppError::Serialization(format!("Failed to encode request: {err}")))?;
    let response = transport.post(path, Some(body)).await?;

    if response.is_success() && response.body.trim().is_empty() {
        return Ok(None);
    }

    decode::<MessageResponse>(&response)
        .into_result(fallback)
        .map(|body| body.message)
}
