//! # tally-store
//!
//! Whole-document storage for Tally.
//!
//! The dataset is read and written as one [`AllData`] value. There is no
//! partial update: callers load, mutate in memory and save the whole thing.
//! Every save carries the revision it was loaded at; a stale revision fails
//! with [`StoreError::Conflict`] instead of overwriting a newer document.
//!
//! ## Backends
//!
//! | Backend | Description |
//! |---------|-------------|
//! | [`FileStore`] | Pretty-printed JSON file, atomic rename on write |
//! | [`HttpStore`] | Remote key-value service (`GET`/`PUT` one key) |
//! | [`MemoryStore`] | In-process, for tests and ephemeral runs |

pub mod error;
pub mod file;
pub mod http;
pub mod memory;

use async_trait::async_trait;
use std::sync::Arc;
use tally_core::{AllData, StoreBackend, StoreConfig};

pub use error::StoreError;
pub use file::FileStore;
pub use http::HttpStore;
pub use memory::MemoryStore;

/// Read-modify-write access to the whole document.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Fetch the entire document.
    async fn load(&self) -> Result<AllData, StoreError>;

    /// Persist the entire document.
    ///
    /// `data.revision` must equal the stored revision. Returns the new one.
    async fn save(&self, data: &AllData) -> Result<u64, StoreError>;

    /// Short description for logs, e.g. `file:data/expenses.json`.
    fn describe(&self) -> String;
}

/// Create a storage backend based on configuration.
pub fn create_store(config: &StoreConfig) -> Result<Arc<dyn DocumentStore>, StoreError> {
    let store: Arc<dyn DocumentStore> = match config.backend {
        StoreBackend::File => Arc::new(FileStore::new(&config.path, config.seed_defaults)),
        StoreBackend::Http => Arc::new(HttpStore::new(&config.http, config.seed_defaults)?),
        StoreBackend::Memory => {
            tracing::warn!("Using in-memory store, data will be lost on exit");
            let initial = if config.seed_defaults {
                AllData::seeded()
            } else {
                AllData::default()
            };
            Arc::new(MemoryStore::new(initial))
        }
    };
    Ok(store)
}
