use crate::commands::Out;
use crate::error::{ErrorType, IntoResult};
use crate::store::StoreKind;
use crate::{Config, Result};
use anyhow::Context;
use serde::Serialize;
use std::path::{Path, PathBuf};

/// What `init` created.
#[derive(Debug, Clone, Serialize)]
pub struct Initialized {
    pub home: PathBuf,
    pub store: StoreKind,
    pub store_path: PathBuf,
}

/// Creates the data directory, its subdirectories, an initial `config.json` and an empty store.
///
/// # Arguments
/// - `cashbook_home` - The directory that will be the root of data directory, e.g.
///   `$HOME/cashbook`
/// - `store` - Which backend keeps the ledger
///
/// # Errors
/// - Returns an error if the directory is already initialized or a file operation fails.
pub async fn init(cashbook_home: &Path, store: StoreKind) -> Result<Out<Initialized>> {
    let config = Config::create(cashbook_home, store)
        .await
        .context("Unable to create the data directory and configs")
        .pub_result(ErrorType::Config)?;
    let created = Initialized {
        home: config.root().to_path_buf(),
        store,
        store_path: config.store_path().to_path_buf(),
    };
    Ok(Out::new(
        format!(
            "Successfully created the cashbook directory at {}",
            created.home.display()
        ),
        created,
    ))
}

/// Loads the configuration and opens the store for every command other than `init`.
pub async fn load_config(cashbook_home: &Path) -> Result<Config> {
    Config::load(cashbook_home)
        .await
        .pub_result(ErrorType::Config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_init_then_load() {
        let dir = TempDir::new().unwrap();
        let home = dir.path().join("cb");
        let out = init(&home, StoreKind::Json).await.unwrap();
        let created = out.structure().unwrap();
        assert_eq!(created.store, StoreKind::Json);
        assert!(created.store_path.is_file());

        let config = load_config(&home).await.unwrap();
        assert_eq!(config.store_kind(), StoreKind::Json);
    }

    #[tokio::test]
    async fn test_init_twice_is_config_error() {
        let dir = TempDir::new().unwrap();
        init(dir.path(), StoreKind::Sqlite).await.unwrap();
        let err = init(dir.path(), StoreKind::Sqlite).await.unwrap_err();
        assert_eq!(err.error_type(), ErrorType::Config);
        assert!(err.to_string().contains("already initialized"));
    }

    #[tokio::test]
    async fn test_load_config_missing_home() {
        let dir = TempDir::new().unwrap();
        let err = load_config(&dir.path().join("missing")).await.unwrap_err();
        assert_eq!(err.error_type(), ErrorType::Config);
    }
}
