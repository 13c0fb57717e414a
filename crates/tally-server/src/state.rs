//! Shared application state.

use std::sync::Arc;
use tally_core::{ExceptionalPolicy, TallyConfig};
use tally_store::DocumentStore;
use tokio::sync::{Mutex, MutexGuard};

/// State handed to every handler.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    store: Arc<dyn DocumentStore>,
    /// Held across a load-mutate-save cycle.
    write_lock: Mutex<()>,
    policy: ExceptionalPolicy,
    hash_passwords: bool,
}

impl AppState {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self::with_options(store, ExceptionalPolicy::default(), true)
    }

    pub fn with_options(
        store: Arc<dyn DocumentStore>,
        policy: ExceptionalPolicy,
        hash_passwords: bool,
    ) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                store,
                write_lock: Mutex::new(()),
                policy,
                hash_passwords,
            }),
        }
    }

    /// Build state from the loaded configuration.
    pub fn from_config(store: Arc<dyn DocumentStore>, config: &TallyConfig) -> Self {
        Self::with_options(store, config.reconcile.exceptional, config.auth.hash_passwords)
    }

    pub fn store(&self) -> &dyn DocumentStore {
        self.inner.store.as_ref()
    }

    /// Serialize a read-modify-write of the document.
    pub async fn lock_writes(&self) -> MutexGuard<'_, ()> {
        self.inner.write_lock.lock().await
    }

    pub fn policy(&self) -> ExceptionalPolicy {
        self.inner.policy
    }

    pub fn hash_passwords(&self) -> bool {
        self.inner.hash_passwords
    }
}
