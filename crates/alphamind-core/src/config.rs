//! Unified configuration loading.
//!
//! This module holds the default values and env-var helpers used across the
//! project so individual crates do not re-define the same constants.

use std::path::PathBuf;

/// Default endpoint constants.
pub mod endpoints {
    /// Default n8n engine endpoint.
    pub const ENGINE: &str = "http://localhost:5678";
}

/// Environment variable names.
pub mod env_vars {
    pub const DATA_DIR: &str = "ALPHAMIND_DATA_DIR";
    pub const HOST: &str = "ALPHAMIND_HOST";
    pub const PORT: &str = "ALPHAMIND_PORT";
    pub const ENGINE_ENDPOINT: &str = "N8N_ENDPOINT";
    pub const ENGINE_USER: &str = "N8N_USER";
    pub const ENGINE_PASSWORD: &str = "N8N_PASSWORD";
}

/// Engine call timeout constants, in seconds.
pub mod timeouts {
    /// Health probe timeout.
    pub const HEALTH_SECS: u64 = 5;
    /// Metadata calls (list/get/activate/...).
    pub const API_SECS: u64 = 10;
    /// Workflow execution and webhook triggers.
    pub const EXECUTE_SECS: u64 = 30;
}

/// Where persistent stores live. Defaults to `data/` under the working
/// directory, overridable via `ALPHAMIND_DATA_DIR`.
pub fn data_dir() -> PathBuf {
    std::env::var(env_vars::DATA_DIR)
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("data"))
}

/// Connection settings for the external workflow engine.
#[derive(Debug, Clone)]
pub struct EngineSettings {
    /// Base URL of the engine, without a trailing slash.
    pub endpoint: String,
    /// Basic-auth username.
    pub username: String,
    /// Basic-auth password.
    pub password: String,
}

impl EngineSettings {
    /// Load engine settings from the environment, falling back to defaults.
    pub fn from_env() -> Self {
        let mut endpoint = std::env::var(env_vars::ENGINE_ENDPOINT)
            .unwrap_or_else(|_| endpoints::ENGINE.to_string());
        while endpoint.ends_with('/') {
            endpoint.pop();
        }
        Self {
            endpoint,
            username: std::env::var(env_vars::ENGINE_USER).unwrap_or_default(),
            password: std::env::var(env_vars::ENGINE_PASSWORD).unwrap_or_default(),
        }
    }
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            endpoint: endpoints::ENGINE.to_string(),
            username: String::new(),
            password: String::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_engine_settings() {
        let settings = EngineSettings::default();
        assert_eq!(settings.endpoint, "http://localhost:5678");
        assert!(settings.username.is_empty());
    }
}
