//! Document store configuration.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Storage backend type.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    /// JSON file on local disk.
    #[default]
    File,
    /// Remote key-value document store over HTTP.
    Http,
    /// In-process document, lost on exit.
    Memory,
}

/// Configuration for the whole-document store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    #[serde(default)]
    pub backend: StoreBackend,

    /// Path of the JSON file (file backend).
    #[serde(default = "default_path")]
    pub path: PathBuf,

    /// Seed a missing document with the default fixed-expense catalog.
    #[serde(default = "default_true")]
    pub seed_defaults: bool,

    /// Remote store settings (http backend).
    #[serde(default)]
    pub http: HttpStoreConfig,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            backend: StoreBackend::default(),
            path: default_path(),
            seed_defaults: true,
            http: HttpStoreConfig::default(),
        }
    }
}

/// Remote key-value store settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpStoreConfig {
    /// Base URL, e.g. `https://kv.example.com/documents`.
    #[serde(default)]
    pub base_url: String,

    /// Key the document is stored under.
    #[serde(default = "default_key")]
    pub key: String,

    /// Environment variable holding the bearer token.
    #[serde(default = "default_token_env")]
    pub token_env: String,

    /// Request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for HttpStoreConfig {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            key: default_key(),
            token_env: default_token_env(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl HttpStoreConfig {
    /// Bearer token from the configured environment variable, if set.
    pub fn token(&self) -> Option<String> {
        std::env::var(&self.token_env)
            .ok()
            .filter(|t| !t.trim().is_empty())
    }
}

fn default_path() -> PathBuf {
    PathBuf::from("data/expenses.json")
}

fn default_true() -> bool {
    true
}

fn default_key() -> String {
    "expenses".to_string()
}

fn default_token_env() -> String {
    "TALLY_STORE_TOKEN".to_string()
}

fn default_timeout_secs() -> u64 {
    10
}
