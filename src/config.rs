//! Client configuration: API base URL, where the session snapshot lives and
//! the request timeout. Defaults come from build-time environment variables;
//! the CLI layers runtime overrides on top. Configuration values are public;
//! do not store secrets here.

use crate::errors::AppError;
use std::{path::PathBuf, time::Duration};
use url::Url;

/// API base used when nothing else is configured.
pub const DEFAULT_API_BASE_URL: &str = "http://localhost:5000/api";
/// Default request timeout (milliseconds) applied by the HTTP transport.
pub const DEFAULT_TIMEOUT_MS: u64 = 10_000;
/// Directory name created under the user's config dir.
const STORAGE_DIR_NAME: &str = "jobboard";

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub api_base_url: String,
    pub storage_dir: PathBuf,
    pub request_timeout: Duration,
}

impl AppConfig {
    /// Loads config from build-time environment variables.
    #[must_use]
    pub fn load() -> Self {
        let api_base_url = option_env!("JOBBOARD_API_BASE_URL").unwrap_or(DEFAULT_API_BASE_URL);

        Self {
            api_base_url: api_base_url.to_string(),
            storage_dir: default_storage_dir(),
            request_timeout: Duration::from_millis(DEFAULT_TIMEOUT_MS),
        }
    }

    /// Parses the API base URL. A trailing slash is added so relative joins
    /// keep the base path (`/api` + `auth/login`).
    ///
    /// # Errors
    /// Returns `AppError::Config` if the base URL is empty or not absolute.
    pub fn api_base(&self) -> Result<Url, AppError> {
        parse_base_url(&self.api_base_url)
    }
}

/// Overrides supplied at runtime (CLI flags or environment).
#[derive(Debug, Default)]
pub struct RuntimeConfig {
    pub api_base_url: Option<String>,
    pub storage_dir: Option<String>,
    pub request_timeout_ms: Option<u64>,
}

pub fn apply_runtime_overrides(config: &mut AppConfig, runtime: RuntimeConfig) {
    if let Some(value) = runtime.api_base_url.as_deref().and_then(normalize_runtime_value) {
        config.api_base_url = value;
    }
    if let Some(value) = runtime.storage_dir.as_deref().and_then(normalize_runtime_value) {
        config.storage_dir = PathBuf::from(value);
    }
    if let Some(ms) = runtime.request_timeout_ms.filter(|ms| *ms > 0) {
        config.request_timeout = Duration::from_millis(ms);
    }
}

#[must_use]
pub fn normalize_runtime_value(value: &str) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Parses a base URL and guarantees a trailing slash on its path.
///
/// # Errors
/// Returns `AppError::Config` if the value is empty or cannot be parsed.
pub fn parse_base_url(value: &str) -> Result<Url, AppError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(AppError::Config("API base URL is not configured.".to_string()));
    }

    let mut url = Url::parse(trimmed)
        .map_err(|err| AppError::Config(format!("Invalid API base URL '{trimmed}': {err}")))?;

    if url.cannot_be_a_base() {
        return Err(AppError::Config(format!(
            "API base URL '{trimmed}' cannot be used as a base"
        )));
    }

    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }

    Ok(url)
}

/// Joins an API path (`/auth/login`) onto the base, keeping the base path.
///
/// # Errors
/// Returns `AppError::Config` if the joined URL is invalid.
pub fn join_api_path(base: &Url, path: &str) -> Result<Url, AppError> {
    base.join(path.trim().trim_start_matches('/'))
        .map_err(|err| AppError::Config(format!("Invalid API path '{path}': {err}")))
}

fn default_storage_dir() -> PathBuf {
    dirs::config_dir()
        .or_else(dirs::home_dir)
        .unwrap_or_else(std::env::temp_dir)
        .join(STORAGE_DIR_NAME)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> AppConfig {
        AppConfig {
            api_base_url: "https://api.default/api".to_string(),
            storage_dir: PathBuf::from("/tmp/jobboard-default"),
            request_timeout: Duration::from_millis(DEFAULT_TIMEOUT_MS),
        }
    }

    #[test]
    fn normalize_runtime_value_trims_and_rejects_empty() {
        assert_eq!(normalize_runtime_value(""), None);
        assert_eq!(normalize_runtime_value("   "), None);
        assert_eq!(
            normalize_runtime_value("  https://jobs.example.com/api "),
            Some("https://jobs.example.com/api".to_string())
        );
    }

    #[test]
    fn apply_runtime_overrides_ignores_empty_values() {
        let mut config = config();
        let runtime = RuntimeConfig {
            api_base_url: Some("  ".to_string()),
            storage_dir: Some(String::new()),
            request_timeout_ms: Some(0),
        };

        apply_runtime_overrides(&mut config, runtime);

        assert_eq!(config.api_base_url, "https://api.default/api");
        assert_eq!(config.storage_dir, PathBuf::from("/tmp/jobboard-default"));
        assert_eq!(config.request_timeout, Duration::from_millis(DEFAULT_TIMEOUT_MS));
    }

    #[test]
    fn apply_runtime_overrides_overwrites_when_present() {
        let mut config = config();
        let runtime = RuntimeConfig {
            api_base_url: Some("https://api.override/v2".to_string()),
            storage_dir: Some("/var/lib/jobboard".to_string()),
            request_timeout_ms: Some(2_500),
        };

        apply_runtime_overrides(&mut config, runtime);

        assert_eq!(config.api_base_url, "https://api.override/v2");
        assert_eq!(config.storage_dir, PathBuf::from("/var/lib/jobboard"));
        assert_eq!(config.request_timeout, Duration::from_millis(2_500));
    }

    #[test]
    fn base_url_keeps_path_prefix_when_joining() {
        let base = parse_base_url("http://localhost:5000/api").unwrap();
        assert_eq!(base.as_str(), "http://localhost:5000/api/");

        let login = join_api_path(&base, "/auth/login").unwrap();
        assert_eq!(login.as_str(), "http://localhost:5000/api/auth/login");

        let me = join_api_path(&base, "/auth/@me").unwrap();
        assert_eq!(me.as_str(), "http://localhost:5000/api/auth/@me");
    }

    #[test]
    fn base_url_rejects_empty_and_relative_values() {
        assert!(matches!(parse_base_url("  "), Err(AppError::Config(_))));
        assert!(matches!(parse_base_url("/api"), Err(AppError::Config(_))));
        assert!(matches!(parse_base_url("mailto:jobs@example.com"), Err(AppError::Config(_))));
    }
}
