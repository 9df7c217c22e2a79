use crate::{account, api::HttpTransport, cli::globals::GlobalArgs};
use anyhow::{anyhow, Result};
use secrecy::SecretString;

#[derive(Debug)]
pub enum Args {
    VerifyEmail { token: String },
    ResendVerification { email: String },
    ForgotPassword { email: String },
    ResetPassword { token: String, password: SecretString },
}

impl Args {
    fn done(&self) -> &'static str {
        match self {
            Args::VerifyEmail { .. } => "Email verified",
            Args::ResendVerification { .. } => "Verification email sent",
            Args::ForgotPassword { .. } => "If the account exists, a reset link is on its way",
            Args::ResetPassword { .. } => "Password updated",
        }
    }
}

/// Runs an account flow. These never touch the stored session, so only
/// the transport is built.
///
/// # Errors
/// Returns the server's message when the request is rejected.
pub async fn execute(globals: &GlobalArgs, args: Args) -> Result<()> {
    let transport = HttpTransport::new(&globals.config())?;
    let done = args.done();

    let message = match args {
        Args::VerifyEmail { token } => account::verify_email(&transport, &token).await,
        Args::ResendVerification { email } => {
            account::resend_verification(&transport, &email).await
        }
        Args::ForgotPassword { email } => account::forgot_password(&transport, &email).await,
        Args::ResetPassword { token, password } => {
            account::reset_password(&transport, &token, &password).await
        }
    }
    .map_err(|err| anyhow!(err.message().to_string()))?;

    println!("{}", message.as_deref().unwrap_or(done));
    Ok(())
}
