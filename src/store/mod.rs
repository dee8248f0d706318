//! Persistence for the ledger. Everything above this module talks to a `dyn Store` and never
//! knows which backend it is using.

mod json;
mod migrations;
mod sqlite;

use crate::error::Res;
use crate::model::{Transaction, TransactionData};
use async_trait::async_trait;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt::Debug;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use uuid::Uuid;

pub(crate) use json::JsonStore;
pub(crate) use sqlite::SqliteStore;

/// The ledger's persistence operations.
#[async_trait]
pub(crate) trait Store: Debug + Send + Sync {
    /// Stores a new transaction and returns the id it was given.
    async fn create(&self, data: &TransactionData) -> Res<String>;

    /// All transactions, newest date first and then by id.
    async fn list(&self) -> Res<Vec<Transaction>>;

    async fn get(&self, id: &str) -> Res<Option<Transaction>>;

    /// Replaces every field of the transaction with `id`. Fails if there is no such transaction.
    async fn update(&self, id: &str, data: &TransactionData) -> Res<Transaction>;

    /// Deletes the given transactions. If any id is unknown nothing is deleted.
    async fn delete(&self, ids: &[String]) -> Res<Vec<String>>;

    /// Deletes every transaction and returns how many there were.
    async fn delete_all(&self) -> Res<u64>;
}

/// Which backend holds the ledger.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Default,
    Serialize,
    Deserialize,
    JsonSchema,
    clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum StoreKind {
    /// A SQLite database file, `cashbook.sqlite`.
    #[default]
    Sqlite,
    /// A single JSON document, `ledger.json`, rewritten on every change.
    Json,
}

serde_plain::derive_display_from_serialize!(StoreKind);
serde_plain::derive_fromstr_from_deserialize!(StoreKind);

impl StoreKind {
    pub fn file_name(&self) -> &'static str {
        match self {
            StoreKind::Sqlite => "cashbook.sqlite",
            StoreKind::Json => "ledger.json",
        }
    }

    /// Where this kind of store lives inside the home directory.
    pub fn path(&self, root: &Path) -> PathBuf {
        root.join(self.file_name())
    }
}

/// Creates a new, empty store. Fails if the store file already exists.
pub(crate) async fn init(kind: StoreKind, path: &Path) -> Res<Arc<dyn Store>> {
    Ok(match kind {
        StoreKind::Sqlite => Arc::new(SqliteStore::init(path).await?),
        StoreKind::Json => Arc::new(JsonStore::init(path).await?),
    })
}

/// Opens an existing store.
pub(crate) async fn load(kind: StoreKind, path: &Path) -> Res<Arc<dyn Store>> {
    Ok(match kind {
        StoreKind::Sqlite => Arc::new(SqliteStore::load(path).await?),
        StoreKind::Json => Arc::new(JsonStore::load(path).await?),
    })
}

fn new_id() -> String {
    Uuid::new_v4().simple().to_string()
}

/// Removes repeated ids, keeping the first occurrence of each.
fn unique_ids(ids: &[String]) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(ids.len());
    for id in ids {
        if !out.contains(id) {
            out.push(id.clone());
        }
    }
    out
}
