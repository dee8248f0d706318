//! The flat-file ledger: one JSON array in `ledger.json`, read and rewritten wholesale on every
//! operation.

use super::{new_id, unique_ids, Store};
use crate::error::Res;
use crate::model::{sort_newest_first, Transaction, TransactionData};
use crate::utils;
use anyhow::{bail, ensure, Context};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;
use tracing::debug;

#[derive(Debug)]
pub(crate) struct JsonStore {
    path: PathBuf,
    /// Serializes read-modify-write cycles within this process.
    lock: Mutex<()>,
}

impl JsonStore {
    /// Writes an empty ledger to `path`, which must not exist yet.
    pub(crate) async fn init(path: impl AsRef<Path>) -> Res<Self> {
        let path = path.as_ref();
        ensure!(
            !path.exists(),
            "A ledger already exists at '{}'",
            path.display()
        );
        let store = Self::new(path);
        store.save(&[]).await?;
        debug!("Created JSON ledger at {}", path.display());
        Ok(store)
    }

    pub(crate) async fn load(path: impl AsRef<Path>) -> Res<Self> {
        let path = path.as_ref();
        ensure!(
            path.is_file(),
            "The ledger file is missing '{}'",
            path.display()
        );
        let store = Self::new(path);
        // Fail early on a ledger that does not parse.
        let _ = store.read().await?;
        Ok(store)
    }

    fn new(path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
            lock: Mutex::new(()),
        }
    }

    async fn read(&self) -> Res<Vec<Transaction>> {
        utils::deserialize(&self.path).await
    }

    /// Writes to a sibling temp file first so a failed write never leaves a truncated ledger.
    async fn save(&self, transactions: &[Transaction]) -> Res<()> {
        let json =
            serde_json::to_string_pretty(transactions).context("Unable to serialize ledger")?;
        let tmp = self.path.with_extension("json.tmp");
        utils::write(&tmp, json).await?;
        utils::rename(&tmp, &self.path).await
    }
}

#[async_trait]
impl Store for JsonStore {
    async fn create(&self, data: &TransactionData) -> Res<String> {
        let _guard = self.lock.lock().await;
        let mut all = self.read().await?;
        let id = new_id();
        all.push(Transaction::new(id.clone(), data.clone()));
        self.save(&all).await?;
        Ok(id)
    }

    async fn list(&self) -> Res<Vec<Transaction>> {
        let _guard = self.lock.lock().await;
        let mut all = self.read().await?;
        sort_newest_first(&mut all);
        Ok(all)
    }

    async fn get(&self, id: &str) -> Res<Option<Transaction>> {
        let _guard = self.lock.lock().await;
        Ok(self.read().await?.into_iter().find(|t| t.id() == id))
    }

    async fn update(&self, id: &str, data: &TransactionData) -> Res<Transaction> {
        let _guard = self.lock.lock().await;
        let mut all = self.read().await?;
        let Some(slot) = all.iter_mut().find(|t| t.id() == id) else {
            bail!("Transaction not found: {id}");
        };
        *slot = Transaction::new(id, data.clone());
        let updated = slot.clone();
        self.save(&all).await?;
        Ok(updated)
    }

    async fn delete(&self, ids: &[String]) -> Res<Vec<String>> {
        let _guard = self.lock.lock().await;
        let ids = unique_ids(ids);
        let mut all = self.read().await?;
        if let Some(missing) = ids.iter().find(|id| !all.iter().any(|t| t.id() == id.as_str())) {
            bail!("Transaction not found: {missing}");
        }
        all.retain(|t| !ids.iter().any(|id| id == t.id()));
        self.save(&all).await?;
        Ok(ids)
    }

    async fn delete_all(&self) -> Res<u64> {
        let _guard = self.lock.lock().await;
        let count = self.read().await?.len() as u64;
        self.save(&[]).await?;
        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_file_is_a_json_array() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("ledger.json");
        let store = JsonStore::init(&path).await.unwrap();
        assert_eq!(utils::read(&path).await.unwrap().trim(), "[]");

        let today = chrono::NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        let data = TransactionData::parse(
            crate::model::TransactionType::Income,
            "100",
            Some("bonus"),
            Some("Gift"),
            None,
            today,
        )
        .unwrap();
        let id = store.create(&data).await.unwrap();

        let raw: serde_json::Value =
            serde_json::from_str(&utils::read(&path).await.unwrap()).unwrap();
        assert_eq!(raw[0]["id"], id.as_str());
        assert_eq!(raw[0]["category"], "bonus");
        assert!(!dir.path().join("ledger.json.tmp").exists());
    }

    #[tokio::test]
    async fn test_load_rejects_garbage() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("ledger.json");
        utils::write(&path, "not json").await.unwrap();
        let err = JsonStore::load(&path).await.unwrap_err();
        assert!(format!("{err:#}").contains("Failed to parse JSON file"));
    }
}
