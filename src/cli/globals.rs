use crate::config::{apply_runtime_overrides, AppConfig, RuntimeConfig};
use std::path::PathBuf;

/// File holding the persisted session cookies, next to the snapshot.
pub const CREDENTIALS_FILE: &str = "credentials";

#[derive(Debug, Clone, Default)]
pub struct GlobalArgs {
    pub api_url: Option<String>,
    pub storage_dir: Option<String>,
    pub timeout_ms: Option<u64>,
}

impl GlobalArgs {
    /// Build-time defaults with the command-line overrides applied.
    #[must_use]
    pub fn config(&self) -> AppConfig {
        let mut config = AppConfig::load();
        apply_runtime_overrides(
            &mut config,
            RuntimeConfig {
                api_base_url: self.api_url.clone(),
                storage_dir: self.storage_dir.clone(),
                request_timeout_ms: self.timeout_ms,
            },
        );
        config
    }
}

#[must_use]
pub fn credentials_path(config: &AppConfig) -> PathBuf {
    config.storage_dir.join(CREDENTIALS_FILE)
}
