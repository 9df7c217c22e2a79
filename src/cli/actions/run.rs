use crate::cli::{
    actions::{account, session, Action},
    globals::GlobalArgs,
};
use anyhow::Result;

/// Execute the provided action.
// Single dispatch point for all CLI actions.
/// # Errors
/// Returns an error if the action fails.
pub async fn execute(action: Action, globals: &GlobalArgs) -> Result<()> {
    match action {
        Action::Whoami => session::whoami(globals).await,
        Action::Login(args) => session::login(globals, args).await,
        Action::Register(args) => session::register(globals, args).await,
        Action::Logout => session::logout(globals).await,
        Action::OAuth(provider) => session::oauth(globals, provider),
        Action::OAuthCallback(url) => session::oauth_callback(globals, &url).await,
        Action::Account(args) => account::execute(globals, args).await,
    }
}
