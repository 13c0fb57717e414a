//! In-memory document store.

use async_trait::async_trait;
use std::sync::RwLock;
use tally_core::AllData;

use crate::DocumentStore;
use crate::error::{StoreError, check_revision};

/// Keeps the document in process memory. Used by tests and ephemeral runs.
#[derive(Default)]
pub struct MemoryStore {
    data: RwLock<AllData>,
}

impl MemoryStore {
    pub fn new(data: AllData) -> Self {
        Self {
            data: RwLock::new(data),
        }
    }

    /// Copy of the current document, bypassing the trait.
    pub fn snapshot(&self) -> AllData {
        self.data
            .read()
            .map(|d| d.clone())
            .unwrap_or_else(|poisoned| poisoned.into_inner().clone())
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn load(&self) -> Result<AllData, StoreError> {
        let data = self
            .data
            .read()
            .map_err(|e| StoreError::Unavailable(format!("Failed to acquire read lock: {}", e)))?;
        Ok(data.clone())
    }

    async fn save(&self, incoming: &AllData) -> Result<u64, StoreError> {
        let mut data = self
            .data
            .write()
            .map_err(|e| StoreError::Unavailable(format!("Failed to acquire write lock: {}", e)))?;
        check_revision(data.revision, incoming.revision)?;

        let revision = data.revision + 1;
        *data = AllData {
            revision,
            ..incoming.clone()
        };
        Ok(revision)
    }

    fn describe(&self) -> String {
        "memory".to_string()
    }
}
