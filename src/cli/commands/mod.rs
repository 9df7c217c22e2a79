pub mod logging;

use crate::types::roles;
use clap::{
    builder::styling::{AnsiColor, Effects, Styles},
    Arg, ArgAction, ColorChoice, Command,
};

pub const ARG_API_URL: &str = "api-url";
pub const ARG_STORAGE_DIR: &str = "storage-dir";
pub const ARG_TIMEOUT: &str = "timeout";

fn email_arg() -> Arg {
    Arg::new("email")
        .short('e')
        .long("email")
        .help("Account email address")
        .env("JOBBOARD_EMAIL")
        .required(true)
}

fn password_arg() -> Arg {
    Arg::new("password")
        .short('p')
        .long("password")
        .help("Account password (prefer the environment variable)")
        .env("JOBBOARD_PASSWORD")
        .hide_env_values(true)
        .required(true)
}

fn token_arg(help: &'static str) -> Arg {
    Arg::new("token")
        .short('t')
        .long("token")
        .help(help)
        .required(true)
}

#[must_use]
pub fn new() -> Command {
    let styles = Styles::styled()
        .header(AnsiColor::Yellow.on_default() | Effects::BOLD)
        .usage(AnsiColor::Green.on_default() | Effects::BOLD)
        .literal(AnsiColor::Blue.on_default() | Effects::BOLD)
        .placeholder(AnsiColor::Green.on_default());

    let long_version: &'static str = Box::leak(
        format!("{} - {}", env!("CARGO_PKG_VERSION"), crate::GIT_COMMIT_HASH).into_boxed_str(),
    );

    let command = Command::new("jobboard")
        .about(env!("CARGO_PKG_DESCRIPTION"))
        .version(env!("CARGO_PKG_VERSION"))
        .long_version(long_version)
        .color(ColorChoice::Auto)
        .styles(styles)
        .subcommand_required(true)
        .arg_required_else_help(true)
        .arg(
            Arg::new(ARG_API_URL)
                .long("api-url")
                .help("Job board API base URL, example: https://jobs.tld/api")
                .env("JOBBOARD_API_URL")
                .global(true),
        )
        .arg(
            Arg::new(ARG_STORAGE_DIR)
                .long("storage-dir")
                .help("Directory holding the session snapshot and cookies")
                .env("JOBBOARD_STORAGE_DIR")
                .global(true),
        )
        .arg(
            Arg::new(ARG_TIMEOUT)
                .long("timeout")
                .help("Request timeout in milliseconds")
                .env("JOBBOARD_TIMEOUT")
                .global(true)
                .value_parser(clap::value_parser!(u64)),
        )
        .subcommand(Command::new("whoami").about("Show the signed-in user"))
        .subcommand(
            Command::new("login")
                .about("Sign in with email and password")
                .arg(email_arg())
                .arg(password_arg())
                .arg(
                    Arg::new("remember-me")
                        .long("remember-me")
                        .help("Ask the server for a long-lived session")
                        .action(ArgAction::SetTrue),
                ),
        )
        .subcommand(
            Command::new("register")
                .about("Create an account and sign in")
                .arg(
                    Arg::new("name")
                        .short('n')
                        .long("name")
                        .help("Display name")
                        .required(true),
                )
                .arg(email_arg())
                .arg(password_arg())
                .arg(
                    Arg::new("role")
                        .short('r')
                        .long("role")
                        .help("Account role")
                        .default_value(roles::JOB_SEEKER)
                        .value_parser([roles::JOB_SEEKER, roles::EMPLOYER]),
                ),
        )
        .subcommand(Command::new("logout").about("Sign out and forget the session"))
        .subcommand(
            Command::new("oauth")
                .about("Print the URL that starts a provider login")
                .arg(
                    Arg::new("provider")
                        .help("OAuth provider")
                        .required(true)
                        .value_parser(["google", "linkedin"]),
                ),
        )
        .subcommand(
            Command::new("oauth-callback")
                .about("Finish a provider login from the callback URL")
                .arg(
                    Arg::new("url")
                        .help("Callback URL the browser landed on")
                        .required(true),
                ),
        )
        .subcommand(
            Command::new("verify-email")
                .about("Confirm an email address")
                .arg(token_arg("Token from the verification link")),
        )
        .subcommand(
            Command::new("resend-verification")
                .about("Send a new verification email")
                .arg(email_arg()),
        )
        .subcommand(
            Command::new("forgot-password")
                .about("Request a password reset link")
                .arg(email_arg()),
        )
        .subcommand(
            Command::new("reset-password")
                .about("Set a new password from a reset link")
                .arg(token_arg("Token from the reset link"))
                .arg(password_arg()),
        );

    logging::with_args(command)
}
