use crate::cli::{
    actions::{account, session, Action},
    commands::{ARG_API_URL, ARG_STORAGE_DIR, ARG_TIMEOUT},
    globals::GlobalArgs,
};
use crate::oauth::OAuthProvider;
use anyhow::{anyhow, Context, Result};
use clap::ArgMatches;
use secrecy::SecretString;
use url::Url;

fn required(matches: &ArgMatches, name: &str) -> Result<String> {
    matches
        .get_one::<String>(name)
        .cloned()
        .with_context(|| format!("missing required argument: --{name}"))
}

fn password(matches: &ArgMatches) -> Result<SecretString> {
    required(matches, "password").map(SecretString::from)
}

/// Maps parsed arguments to an action and the global options.
///
/// # Errors
/// Returns an error if required arguments are missing or invalid.
pub fn handler(matches: &ArgMatches) -> Result<(Action, GlobalArgs)> {
    let globals = GlobalArgs {
        api_url: matches.get_one::<String>(ARG_API_URL).cloned(),
        storage_dir: matches.get_one::<String>(ARG_STORAGE_DIR).cloned(),
        timeout_ms: matches.get_one::<u64>(ARG_TIMEOUT).copied(),
    };

    let action = match matches.subcommand() {
        Some(("whoami", _)) => Action::Whoami,
        Some(("login", sub_m)) => Action::Login(session::LoginArgs {
            email: required(sub_m, "email")?,
            password: password(sub_m)?,
            remember_me: sub_m.get_flag("remember-me"),
        }),
        Some(("register", sub_m)) => Action::Register(session::RegisterArgs {
            name: required(sub_m, "name")?,
            email: required(sub_m, "email")?,
            password: password(sub_m)?,
            role: required(sub_m, "role")?,
        }),
        Some(("logout", _)) => Action::Logout,
        Some(("oauth", sub_m)) => {
            let provider = required(sub_m, "provider")?;
            Action::OAuth(OAuthProvider::parse(&provider)?)
        }
        Some(("oauth-callback", sub_m)) => {
            let url = required(sub_m, "url")?;
            let url =
                Url::parse(url.trim()).with_context(|| format!("invalid callback URL: {url}"))?;
            Action::OAuthCallback(url)
        }
        Some(("verify-email", sub_m)) => Action::Account(account::Args::VerifyEmail {
            token: required(sub_m, "token")?,
        }),
        Some(("resend-verification", sub_m)) => {
            Action::Account(account::Args::ResendVerification {
                email: required(sub_m, "email")?,
            })
        }
        Some(("forgot-password", sub_m)) => Action::Account(account::Args::ForgotPassword {
            email: required(sub_m, "email")?,
        }),
        Some(("reset-password", sub_m)) => Action::Account(account::Args::ResetPassword {
            token: required(sub_m, "token")?,
            password: password(sub_m)?,
        }),
        _ => return Err(anyhow!("unknown subcommand")),
    };

    Ok((action, globals))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::commands;
    use secrecy::ExposeSecret;

    fn parse(args: &[&str]) -> Result<(Action, GlobalArgs)> {
        temp_env::with_vars(
            [
                ("JOBBOARD_API_URL", None::<&str>),
                ("JOBBOARD_PASSWORD", None::<&str>),
                ("JOBBOARD_EMAIL", None::<&str>),
                ("JOBBOARD_TIMEOUT", None::<&str>),
            ],
            || handler(&commands::new().get_matches_from(args)),
        )
    }

    #[test]
    fn test_login_action() {
        let (action, globals) = parse(&[
            "jobboard",
            "--timeout",
            "500",
            "login",
            "-e",
            "a@b.com",
            "-p",
            "secret",
        ])
        .unwrap();

        assert_eq!(globals.timeout_ms, Some(500));
        assert!(globals.api_url.is_none());
        match action {
            Action::Login(args) => {
                assert_eq!(args.email, "a@b.com");
                assert_eq!(args.password.expose_secret(), "secret");
                assert!(!args.remember_me);
            }
            other => panic!("unexpected action: {other:?}"),
        }
    }

    #[test]
    fn test_oauth_action() {
        let (action, _) = parse(&["jobboard", "oauth", "linkedin"]).unwrap();
        assert!(matches!(action, Action::OAuth(OAuthProvider::LinkedIn)));
    }

    #[test]
    fn test_oauth_callback_requires_absolute_url() {
        assert!(parse(&["jobboard", "oauth-callback", "/auth/callback?error=1"]).is_err());

        let (action, _) = parse(&[
            "jobboard",
            "oauth-callback",
            "https://jobs.tld/auth/callback",
        ])
        .unwrap();
        assert!(matches!(action, Action::OAuthCallback(_)));
    }

    #[test]
    fn test_reset_password_action() {
        let (action, _) = parse(&[
            "jobboard",
            "reset-password",
            "--token",
            "abc",
            "--password",
            "n3w",
        ])
        .unwrap();
        match action {
            Action::Account(account::Args::ResetPassword { token, password }) => {
                assert_eq!(token, "abc");
                assert_eq!(password.expose_secret(), "n3w");
            }
            other => panic!("unexpected action: {other:?}"),
        }
    }
}
