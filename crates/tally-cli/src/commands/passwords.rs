//! `tally hash-passwords`: upgrade plaintext passwords in place.

use anyhow::{Context, Result};
use tally_core::TallyConfig;
use tally_server::auth::hash_all_passwords;

pub async fn run(config: &TallyConfig) -> Result<()> {
    let store = tally_store::create_store(&config.store)?;
    let mut data = store.load().await.context("failed to load document")?;

    let changed = hash_all_passwords(&mut data)?;
    if changed == 0 {
        println!("No plaintext passwords in {}.", store.describe());
        return Ok(());
    }

    let revision = store.save(&data).await.context("failed to save document")?;
    tracing::info!(changed, revision, "Hashed plaintext passwords");
    println!("Hashed {changed} password(s) in {}.", store.describe());
    Ok(())
}
