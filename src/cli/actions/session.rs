use crate::{
    api::HttpTransport,
    cli::globals::{credentials_path, GlobalArgs},
    errors::AppError,
    oauth::OAuthProvider,
    session::SessionManager,
    storage::{FileStore, SnapshotStore},
    types::User,
};
use anyhow::{anyhow, Result};
use secrecy::SecretString;
use std::sync::Arc;
use tracing::debug;
use url::Url;

#[derive(Debug)]
pub struct LoginArgs {
    pub email: String,
    pub password: SecretString,
    pub remember_me: bool,
}

#[derive(Debug)]
pub struct RegisterArgs {
    pub name: String,
    pub email: String,
    pub password: SecretString,
    pub role: String,
}

/// Session manager backed by the on-disk snapshot and cookie jar.
///
/// # Errors
/// Returns an error if the configuration is invalid or saved cookies cannot
/// be read.
pub fn connect(globals: &GlobalArgs) -> Result<SessionManager<HttpTransport>> {
    let config = globals.config();
    debug!(
        api = %config.api_base_url,
        storage = %config.storage_dir.display(),
        "connecting"
    );

    let transport =
        HttpTransport::new(&config)?.with_credentials_file(credentials_path(&config))?;
    let store: Arc<dyn SnapshotStore> = Arc::new(FileStore::new(&config.storage_dir));

    Ok(SessionManager::new(transport, store))
}

/// Only the server message reaches the terminal.
fn user_facing(err: &AppError) -> anyhow::Error {
    anyhow!(err.message().to_string())
}

fn describe(user: &User) -> String {
    format!("{} <{}> ({})", user.name, user.email, user.role)
}

/// # Errors
/// Returns an error if the session cannot be set up.
pub async fn whoami(globals: &GlobalArgs) -> Result<()> {
    let manager = connect(globals)?;
    manager.initialize().await;

    match manager.user() {
        Some(user) if manager.is_authenticated() => println!("{}", describe(&user)),
        _ => println!("Not signed in"),
    }

    Ok(())
}

/// # Errors
/// Returns the server's message when the login is rejected.
pub async fn login(globals: &GlobalArgs, args: LoginArgs) -> Result<()> {
    let manager = connect(globals)?;
    let user = manager
        .login(&args.email, &args.password, args.remember_me)
        .await
        .map_err(|err| user_facing(&err))?;

    println!("Signed in as {}", describe(&user));
    Ok(())
}

/// # Errors
/// Returns the server's message when registration is rejected.
pub async fn register(globals: &GlobalArgs, args: RegisterArgs) -> Result<()> {
    let manager = connect(globals)?;
    let user = manager
        .register(&args.name, &args.email, &args.password, &args.role)
        .await
        .map_err(|err| user_facing(&err))?;

    println!("Registered and signed in as {}", describe(&user));
    Ok(())
}

/// Signs out, then removes the saved cookies and the session snapshot.
///
/// # Errors
/// Returns an error if the saved files cannot be removed.
pub async fn logout(globals: &GlobalArgs) -> Result<()> {
    let manager = connect(globals)?;
    manager.logout().await;
    manager.transport().forget_credentials()?;
    FileStore::new(&globals.config().storage_dir).clear()?;

    println!("Signed out");
    Ok(())
}

/// Prints the URL to open in a browser; there is nothing to navigate here.
///
/// # Errors
/// Returns an error if the URL cannot be built.
pub fn oauth(globals: &GlobalArgs, provider: OAuthProvider) -> Result<()> {
    let manager = connect(globals)?;
    let navigate = match provider {
        OAuthProvider::Google => manager.login_with_google(),
        OAuthProvider::LinkedIn => manager.login_with_linkedin(),
    }?;

    println!("{}", navigate.url);
    Ok(())
}

/// # Errors
/// Returns the callback's error message or `Authentication failed`.
pub async fn oauth_callback(globals: &GlobalArgs, url: &Url) -> Result<()> {
    let manager = connect(globals)?;
    let user = manager
        .complete_oauth(url)
        .await
        .map_err(|err| user_facing(&err))?;

    println!("Signed in as {}", describe(&user));
    Ok(())
}
