pub mod account;
pub mod session;

// Internal "interpreter" for `Action`.
mod run;

use crate::cli::globals::GlobalArgs;
use crate::oauth::OAuthProvider;
use url::Url;

#[derive(Debug)]
pub enum Action {
    Whoami,
    Login(session::LoginArgs),
    Register(session::RegisterArgs),
    Logout,
    OAuth(OAuthProvider),
    OAuthCallback(Url),
    Account(account::Args),
}

impl Action {
    /// Execute the action.
    /// # Errors
    /// Returns an error if the action fails.
    pub async fn execute(self, globals: &GlobalArgs) -> anyhow::Result<()> {
        run::execute(self, globals).await
    }
}
