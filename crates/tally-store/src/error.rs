//! Error types for the store crate.

use thiserror::Error;

/// Errors that can occur while loading or saving the document.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The backing store could not be reached.
    #[error("store unavailable: {0}")]
    Unavailable(String),

    /// The stored document is not valid JSON for [`tally_core::AllData`].
    #[error("malformed document: {0}")]
    Malformed(#[from] serde_json::Error),

    /// The store refused the write.
    #[error("write rejected: {0}")]
    Rejected(String),

    /// The document changed since it was loaded.
    #[error("revision conflict: expected {expected}, found {found}")]
    Conflict { expected: u64, found: u64 },

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// HTTP client error.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

impl StoreError {
    pub fn is_conflict(&self) -> bool {
        matches!(self, StoreError::Conflict { .. })
    }
}

/// Fail unless the caller saw the revision currently stored.
pub(crate) fn check_revision(stored: u64, incoming: u64) -> Result<(), StoreError> {
    if stored == incoming {
        Ok(())
    } else {
        Err(StoreError::Conflict {
            expected: incoming,
            found: stored,
        })
    }
}
