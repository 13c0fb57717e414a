//! Configuration types for Tally.
//!
//! Configuration is a single YAML file (`tally.yaml` by default). Every
//! section has defaults, so an empty file or a missing one is a valid
//! configuration.
//!
//! ```yaml
//! server:
//!   host: 0.0.0.0
//!   port: 3000
//! store:
//!   backend: file
//!   path: data/expenses.json
//! reconcile:
//!   exceptional: drop
//! ```

pub mod server;
pub mod store;

use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use crate::reconcile::ExceptionalPolicy;

pub use server::ServerConfig;
pub use store::{HttpStoreConfig, StoreBackend, StoreConfig};

/// Environment variable pointing at the configuration file.
pub const CONFIG_ENV: &str = "TALLY_CONFIG";

/// Default configuration file name.
pub const DEFAULT_CONFIG_FILE: &str = "tally.yaml";

/// Complete Tally configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TallyConfig {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub store: StoreConfig,

    #[serde(default)]
    pub auth: AuthConfig,

    #[serde(default)]
    pub reconcile: ReconcileConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Authentication settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Store new passwords as Argon2 hashes and upgrade legacy plaintext
    /// values on login.
    #[serde(default = "default_true")]
    pub hash_passwords: bool,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            hash_passwords: true,
        }
    }
}

/// Fixed-expense reconciliation settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReconcileConfig {
    #[serde(default)]
    pub exceptional: ExceptionalPolicy,
}

/// Log output settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Filter directive used when `RUST_LOG` is unset.
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Error type for configuration loading.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl TallyConfig {
    /// Load configuration from a YAML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path.as_ref())?;
        Self::from_yaml(&content)
    }

    /// Parse configuration from YAML content.
    pub fn from_yaml(content: &str) -> Result<Self, ConfigError> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        let config: Self = serde_yaml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from an explicit path, `TALLY_CONFIG`, or `tally.yaml`.
    ///
    /// An explicit or env-provided path must exist. The default file is
    /// optional and its absence yields the default configuration.
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        if let Some(path) = explicit {
            return Self::from_file(path);
        }
        if let Ok(path) = env::var(CONFIG_ENV) {
            return Self::from_file(PathBuf::from(path));
        }

        let default_path = Path::new(DEFAULT_CONFIG_FILE);
        if default_path.exists() {
            Self::from_file(default_path)
        } else {
            tracing::debug!("No {} found, using default configuration", DEFAULT_CONFIG_FILE);
            Ok(Self::default())
        }
    }

    /// Reject settings that cannot work.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.store.backend == StoreBackend::Http && self.store.http.base_url.trim().is_empty() {
            return Err(ConfigError::Config(
                "store.http.base_url is required for the http backend".to_string(),
            ));
        }
        if self.store.backend == StoreBackend::File && self.store.path.as_os_str().is_empty() {
            return Err(ConfigError::Config(
                "store.path is required for the file backend".to_string(),
            ));
        }
        Ok(())
    }
}
