//! Local JSON file storage.
//!
//! The whole document is one pretty-printed JSON file. Writes go to a
//! sibling `.tmp` file which is then renamed over the target, so readers
//! never observe a half-written document.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tally_core::AllData;
use tokio::fs;
use tokio::sync::Mutex;

use crate::DocumentStore;
use crate::error::{StoreError, check_revision};

/// File-backed document store.
pub struct FileStore {
    path: PathBuf,
    seed_defaults: bool,
    /// Serializes saves within this process.
    write_lock: Mutex<()>,
}

impl FileStore {
    /// Create a store for the given file. Nothing is touched until the
    /// first load or save.
    pub fn new(path: impl AsRef<Path>, seed_defaults: bool) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            seed_defaults,
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| "expenses.json".into());
        name.push(".tmp");
        self.path.with_file_name(name)
    }

    fn initial_document(&self) -> AllData {
        if self.seed_defaults {
            AllData::seeded()
        } else {
            AllData::default()
        }
    }

    async fn ensure_parent_dir(&self) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
            && !fs::try_exists(parent).await?
        {
            fs::create_dir_all(parent).await?;
        }
        Ok(())
    }

    async fn read(&self) -> Result<Option<AllData>, StoreError> {
        match fs::read_to_string(&self.path).await {
            Ok(content) => Ok(Some(serde_json::from_str(&content)?)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn write(&self, data: &AllData) -> Result<(), StoreError> {
        self.ensure_parent_dir().await?;
        let json = serde_json::to_string_pretty(data)?;
        let temp = self.temp_path();
        fs::write(&temp, json).await?;
        fs::rename(&temp, &self.path).await?;
        Ok(())
    }
}

#[async_trait]
impl DocumentStore for FileStore {
    async fn load(&self) -> Result<AllData, StoreError> {
        if let Some(data) = self.read().await? {
            return Ok(data);
        }

        let _guard = self.write_lock.lock().await;
        // Another task may have created it while we waited.
        if let Some(data) = self.read().await? {
            return Ok(data);
        }

        let data = self.initial_document();
        self.write(&data).await?;
        tracing::info!(path = %self.path.display(), "Created new expense document");
        Ok(data)
    }

    async fn save(&self, data: &AllData) -> Result<u64, StoreError> {
        let _guard = self.write_lock.lock().await;

        let stored = self.read().await?.map(|d| d.revision).unwrap_or(0);
        check_revision(stored, data.revision)?;

        let mut next = data.clone();
        next.revision = stored + 1;
        self.write(&next).await?;

        tracing::debug!(path = %self.path.display(), revision = next.revision, "Saved document");
        Ok(next.revision)
    }

    fn describe(&self) -> String {
        format!("file:{}", self.path.display())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tally_core::{MonthData, User};

    fn store_in(dir: &tempfile::TempDir) -> FileStore {
        FileStore::new(dir.path().join("data").join("expenses.json"), true)
    }

    #[tokio::test]
    async fn test_load_creates_seeded_document() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);

        let data = store.load().await.unwrap();
        assert_eq!(data.default_fixed_expenses.len(), 3);
        assert!(store.path().exists());
    }

    #[tokio::test]
    async fn test_unseeded_document_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path().join("expenses.json"), false);

        let data = store.load().await.unwrap();
        assert_eq!(data, AllData::default());
    }

    #[tokio::test]
    async fn test_save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);

        let mut data = store.load().await.unwrap();
        data.users.push(User::new("alex", "pw"));
        data.upsert_month(MonthData::new("alex", "2025-01"));
        assert_eq!(store.save(&data).await.unwrap(), 1);

        let reloaded = store.load().await.unwrap();
        assert_eq!(reloaded.users, data.users);
        assert_eq!(reloaded.months, data.months);
        assert_eq!(reloaded.revision, 1);
        assert!(!store.temp_path().exists());
    }

    #[tokio::test]
    async fn test_round_trip_only_bumps_revision() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);

        let before = store.load().await.unwrap();
        store.save(&before).await.unwrap();
        let after = store.load().await.unwrap();

        assert_eq!(after.revision, before.revision + 1);
        assert_eq!(AllData { revision: 0, ..after }, AllData { revision: 0, ..before });
    }

    #[tokio::test]
    async fn test_stale_save_conflicts() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);

        let first = store.load().await.unwrap();
        let second = store.load().await.unwrap();
        store.save(&first).await.unwrap();

        let err = store.save(&second).await.unwrap_err();
        assert!(err.is_conflict());
        assert_eq!(store.load().await.unwrap().revision, 1);
    }

    #[tokio::test]
    async fn test_malformed_document() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("expenses.json");
        std::fs::write(&path, "{not json").unwrap();

        let store = FileStore::new(&path, true);
        let err = store.load().await.unwrap_err();
        assert!(matches!(err, StoreError::Malformed(_)));
    }
}
