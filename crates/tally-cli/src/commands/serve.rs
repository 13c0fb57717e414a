//! `tally serve`: run the HTTP API.

use anyhow::Result;
use std::sync::Arc;
use tally_core::{StoreBackend, TallyConfig};
use tally_server::{AppState, TallyServer};

/// Command-line overrides for `tally serve`.
#[derive(Debug, Default)]
pub struct ServeOverrides {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub ephemeral: bool,
}

/// Apply command-line overrides on top of the file configuration.
pub fn apply_overrides(mut config: TallyConfig, overrides: &ServeOverrides) -> TallyConfig {
    if let Some(host) = &overrides.host {
        config.server.host = host.clone();
    }
    if let Some(port) = overrides.port {
        config.server.port = port;
    }
    if overrides.ephemeral {
        config.store.backend = StoreBackend::Memory;
    }
    config
}

pub async fn run(config: TallyConfig) -> Result<()> {
    let store = tally_store::create_store(&config.store)?;
    // Fail fast on an unreachable or corrupt store.
    let data = store.load().await?;
    tracing::info!(
        store = %store.describe(),
        users = data.users.len(),
        months = data.months.len(),
        exceptional = ?config.reconcile.exceptional,
        "Loaded expense document"
    );

    let state = AppState::from_config(Arc::clone(&store), &config);
    TallyServer::new(config.server.clone(), state).run().await?;
    Ok(())
}
