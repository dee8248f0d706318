//! Configuration file handling for cashbook.
//!
//! The configuration file is stored at `$CASHBOOK_HOME/config.json`. It selects the store
//! backend and holds backup, display and notification settings. Secrets never go in it; they
//! come from the environment or from files in `$CASHBOOK_HOME/.secrets`.

use crate::backup::Backup;
use crate::error::Res;
use crate::store::{self, Store, StoreKind};
use crate::utils;
use crate::view::MoneyFormat;
use anyhow::{bail, Context};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;

const APP_NAME: &str = "cashbook";
const CONFIG_VERSION: u8 = 1;
const BACKUP_COPIES: u32 = 5;
const RECENT_COUNT: usize = 5;
const SECRETS: &str = ".secrets";
const BACKUPS: &str = ".backups";
const CONFIG_JSON: &str = "config.json";
const BOT_TOKEN_FILE: &str = "bot_token";
const DEFAULT_API_BASE: &str = "https://api.telegram.org";

/// Environment variable holding the chat bot token. Takes precedence over `.secrets/bot_token`.
pub const BOT_TOKEN_ENV: &str = "CASHBOOK_BOT_TOKEN";

/// Environment variable holding the chat id. Takes precedence over `notify.chat_id`.
pub const CHAT_ID_ENV: &str = "CASHBOOK_CHAT_ID";

/// The `Config` object represents the configuration of the app. You instantiate it by providing
/// the path to `$CASHBOOK_HOME` and from there it loads `$CASHBOOK_HOME/config.json` and opens
/// the store. It provides paths to the other items expected in the home directory.
#[derive(Debug, Clone)]
pub struct Config {
    root: PathBuf,
    backups: PathBuf,
    secrets: PathBuf,
    config_path: PathBuf,
    config_file: ConfigFile,
    store: Arc<dyn Store>,
    store_path: PathBuf,
}

impl Config {
    /// Creates the home directory, its subdirectories, an initial `config.json` with default
    /// settings, and an empty store of the given kind.
    ///
    /// # Errors
    /// - Returns an error if any file operation fails or if a store already exists there.
    pub async fn create(dir: impl Into<PathBuf>, store_kind: StoreKind) -> Res<Self> {
        let maybe_relative = dir.into();
        utils::make_dir(&maybe_relative)
            .await
            .context("Unable to create the cashbook home directory")?;
        let root = utils::canonicalize(&maybe_relative).await?;

        let config_path = root.join(CONFIG_JSON);
        let store_path = store_kind.path(&root);
        if config_path.exists() || store_path.exists() {
            bail!("Cashbook is already initialized at '{}'", root.display())
        }

        let backups = root.join(BACKUPS);
        utils::make_dir(&backups).await?;
        let secrets = root.join(SECRETS);
        utils::make_dir(&secrets).await?;

        let config_file = ConfigFile {
            store: store_kind,
            ..ConfigFile::default()
        };
        config_file.save(&config_path).await?;

        let store = store::init(store_kind, &store_path)
            .await
            .context("Unable to create the store")?;

        Ok(Self {
            root,
            backups,
            secrets,
            config_path,
            config_file,
            store,
            store_path,
        })
    }

    /// This will
    /// - validate that the home directory and the config file exist
    /// - load the config file
    /// - validate that the backups and secrets directories exist
    /// - open the store named in the config file
    pub async fn load(home: impl Into<PathBuf>) -> Res<Self> {
        let maybe_relative = home.into();
        let root = utils::canonicalize(&maybe_relative)
            .await
            .context("Cashbook home is missing, run 'cashbook init' first")?;

        let config_path = root.join(CONFIG_JSON);
        if !config_path.is_file() {
            bail!("The config file is missing '{}'", config_path.display())
        }
        let config_file = ConfigFile::load(&config_path).await?;

        let backups = root.join(BACKUPS);
        if !backups.is_dir() {
            bail!("The backups directory is missing '{}'", backups.display())
        }
        let secrets = root.join(SECRETS);
        if !secrets.is_dir() {
            bail!("The secrets directory is missing '{}'", secrets.display())
        }

        let store_path = config_file.store.path(&root);
        let store = store::load(config_file.store, &store_path)
            .await
            .context("Unable to open the store")?;

        Ok(Self {
            root,
            backups,
            secrets,
            config_path,
            config_file,
            store,
            store_path,
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    pub fn backups(&self) -> &Path {
        &self.backups
    }

    pub fn secrets(&self) -> &Path {
        &self.secrets
    }

    pub(crate) fn store(&self) -> &dyn Store {
        self.store.as_ref()
    }

    pub fn store_kind(&self) -> StoreKind {
        self.config_file.store
    }

    pub fn store_path(&self) -> &Path {
        &self.store_path
    }

    pub fn backup_copies(&self) -> u32 {
        self.config_file.backup_copies
    }

    /// How many transactions the dashboard lists.
    pub fn recent_count(&self) -> usize {
        self.config_file.recent_count
    }

    pub fn money(&self) -> &MoneyFormat {
        &self.config_file.money
    }

    pub fn notify(&self) -> &NotifySettings {
        &self.config_file.notify
    }

    /// Creates a new `Backup` instance for managing backup files.
    pub fn backup(&self) -> Backup {
        Backup::new(self)
    }

    /// The chat bot token, from `CASHBOOK_BOT_TOKEN` or else `.secrets/bot_token`.
    pub(crate) fn bot_token(&self) -> Res<String> {
        let path = self.secrets.join(BOT_TOKEN_FILE);
        resolve_secret(std::env::var(BOT_TOKEN_ENV).ok(), &path).with_context(|| {
            format!(
                "No bot token, set {BOT_TOKEN_ENV} or write it to '{}'",
                path.display()
            )
        })
    }

    /// The chat id, from `CASHBOOK_CHAT_ID` or else `notify.chat_id` in `config.json`.
    pub(crate) fn chat_id(&self) -> Res<String> {
        first_non_empty([
            std::env::var(CHAT_ID_ENV).ok(),
            self.config_file.notify.chat_id.clone(),
        ])
        .with_context(|| format!("No chat id, set {CHAT_ID_ENV} or notify.chat_id in config.json"))
    }
}

fn first_non_empty(candidates: impl IntoIterator<Item = Option<String>>) -> Option<String> {
    candidates
        .into_iter()
        .flatten()
        .map(|s| s.trim().to_string())
        .find(|s| !s.is_empty())
}

/// Prefers `from_env`, then the contents of `file`.
fn resolve_secret(from_env: Option<String>, file: &Path) -> Option<String> {
    let from_file = std::fs::read_to_string(file).ok();
    first_non_empty([from_env, from_file])
}

/// Where report messages are sent.
#[derive(Debug, Clone, Serialize, Deserialize, Eq, PartialEq)]
#[serde(default)]
pub struct NotifySettings {
    /// Base URL of the bot API.
    pub api_base: String,

    /// The chat to post to. `CASHBOOK_CHAT_ID` overrides it.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chat_id: Option<String>,
}

impl Default for NotifySettings {
    fn default() -> Self {
        Self {
            api_base: DEFAULT_API_BASE.to_string(),
            chat_id: None,
        }
    }
}

/// Represents the serialization and deserialization format of the configuration file.
///
/// Example configuration:
/// ```json
/// {
///   "app_name": "cashbook",
///   "config_version": 1,
///   "store": "sqlite",
///   "backup_copies": 5,
///   "recent_count": 5,
///   "money": {
///     "symbol": "Rp",
///     "thousands": ".",
///     "decimal": ",",
///     "min_fraction_digits": 0,
///     "max_fraction_digits": 2
///   },
///   "notify": { "api_base": "https://api.telegram.org", "chat_id": "123456" }
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, Eq, PartialEq)]
struct ConfigFile {
    /// Application name, should always be "cashbook"
    app_name: String,

    config_version: u8,

    #[serde(default)]
    store: StoreKind,

    /// Number of backup copies to keep
    #[serde(default = "default_backup_copies")]
    backup_copies: u32,

    #[serde(default = "default_recent_count")]
    recent_count: usize,

    #[serde(default)]
    money: MoneyFormat,

    #[serde(default)]
    notify: NotifySettings,
}

fn default_backup_copies() -> u32 {
    BACKUP_COPIES
}

fn default_recent_count() -> usize {
    RECENT_COUNT
}

impl Default for ConfigFile {
    fn default() -> Self {
        Self {
            app_name: APP_NAME.to_string(),
            config_version: CONFIG_VERSION,
            store: StoreKind::default(),
            backup_copies: BACKUP_COPIES,
            recent_count: RECENT_COUNT,
            money: MoneyFormat::default(),
            notify: NotifySettings::default(),
        }
    }
}

impl ConfigFile {
    /// Loads and validates a config file.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or parsed, if it belongs to another app, or if
    /// it would keep no backups.
    async fn load(path: impl AsRef<Path>) -> Res<Self> {
        let path = path.as_ref();
        let content = utils::read(path).await?;

        let config: ConfigFile = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config file at {}", path.display()))?;

        anyhow::ensure!(
            config.app_name == APP_NAME,
            "Invalid app_name in config file: expected '{}', got '{}'",
            APP_NAME,
            config.app_name
        );
        anyhow::ensure!(
            config.config_version <= CONFIG_VERSION,
            "Config file version {} is newer than this program supports ({})",
            config.config_version,
            CONFIG_VERSION
        );
        anyhow::ensure!(
            config.backup_copies >= 1,
            "backup_copies in config file must be at least 1, got {}",
            config.backup_copies
        );

        Ok(config)
    }

    async fn save(&self, path: impl AsRef<Path>) -> Res<()> {
        let p = path.as_ref();
        let data = serde_json::to_string_pretty(self).context("Unable to serialize config")?;
        utils::write(p, data)
            .await
            .context("Unable to write config file")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_config_create() {
        let dir = TempDir::new().unwrap();
        let home_dir = dir.path().join("cashbook_home");

        let config = Config::create(&home_dir, StoreKind::Json).await.unwrap();

        assert!(config.backups().is_dir());
        assert!(config.secrets().is_dir());
        assert!(config.config_path().is_file());
        assert!(config.store_path().ends_with("ledger.json"));
        assert!(config.store_path().is_file());
        assert_eq!(config.store_kind(), StoreKind::Json);
        assert_eq!(config.backup_copies(), 5);
        assert_eq!(config.recent_count(), 5);
        assert_eq!(config.money(), &MoneyFormat::default());
    }

    #[tokio::test]
    async fn test_config_create_then_load() {
        let dir = TempDir::new().unwrap();
        let created = Config::create(dir.path(), StoreKind::Sqlite).await.unwrap();
        let loaded = Config::load(dir.path()).await.unwrap();
        assert_eq!(created.root(), loaded.root());
        assert_eq!(loaded.store_kind(), StoreKind::Sqlite);
        assert!(loaded.store_path().ends_with("cashbook.sqlite"));
    }

    #[tokio::test]
    async fn test_config_create_twice_fails() {
        let dir = TempDir::new().unwrap();
        Config::create(dir.path(), StoreKind::Sqlite).await.unwrap();
        let err = Config::create(dir.path(), StoreKind::Json).await.unwrap_err();
        assert!(err.to_string().contains("already initialized"));
        let loaded = Config::load(dir.path()).await.unwrap();
        assert_eq!(loaded.store_kind(), StoreKind::Sqlite);
    }

    #[tokio::test]
    async fn test_config_load_missing_home() {
        let dir = TempDir::new().unwrap();
        let err = Config::load(dir.path().join("nope")).await.unwrap_err();
        assert!(format!("{err:#}").contains("run 'cashbook init' first"));
    }

    #[tokio::test]
    async fn test_config_load_missing_backups() {
        let dir = TempDir::new().unwrap();
        let config = Config::create(dir.path(), StoreKind::Json).await.unwrap();
        std::fs::remove_dir(config.backups()).unwrap();
        let err = Config::load(dir.path()).await.unwrap_err();
        assert!(err.to_string().contains("backups directory is missing"));
    }

    #[test]
    fn test_config_file_default() {
        let config = ConfigFile::default();
        assert_eq!(config.app_name, "cashbook");
        assert_eq!(config.store, StoreKind::Sqlite);
        assert_eq!(config.backup_copies, 5);
        assert_eq!(config.notify.api_base, "https://api.telegram.org");
        assert!(config.notify.chat_id.is_none());
    }

    #[tokio::test]
    async fn test_config_file_save_and_load() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("config.json");

        let original = ConfigFile {
            store: StoreKind::Json,
            backup_copies: 7,
            recent_count: 10,
            notify: NotifySettings {
                api_base: "http://localhost:8081".to_string(),
                chat_id: Some("-100200".to_string()),
            },
            ..ConfigFile::default()
        };
        original.save(&config_path).await.unwrap();
        let loaded = ConfigFile::load(&config_path).await.unwrap();
        assert_eq!(original, loaded);
    }

    #[tokio::test]
    async fn test_config_file_load_with_minimal_config() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("config.json");
        utils::write(
            &config_path,
            r#"{ "app_name": "cashbook", "config_version": 1, "money": { "symbol": "$" } }"#,
        )
        .await
        .unwrap();

        let config = ConfigFile::load(&config_path).await.unwrap();
        assert_eq!(config.store, StoreKind::Sqlite);
        assert_eq!(config.backup_copies, 5);
        assert_eq!(config.recent_count, 5);
        assert_eq!(config.money.symbol, "$");
        assert_eq!(config.money.thousands, '.');
        assert_eq!(config.notify, NotifySettings::default());
    }

    #[tokio::test]
    async fn test_config_file_load_rejects_zero_backup_copies() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("config.json");
        utils::write(
            &config_path,
            r#"{ "app_name": "cashbook", "config_version": 1, "backup_copies": 0 }"#,
        )
        .await
        .unwrap();

        let err = ConfigFile::load(&config_path).await.unwrap_err();
        assert!(err.to_string().contains("backup_copies"), "{err:#}");
    }

    #[tokio::test]
    async fn test_config_file_load_invalid_app_name() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("config.json");
        utils::write(
            &config_path,
            r#"{ "app_name": "wrong_app", "config_version": 1 }"#,
        )
        .await
        .unwrap();

        let result = ConfigFile::load(&config_path).await;
        assert!(result.unwrap_err().to_string().contains("Invalid app_name"));
    }

    #[test]
    fn test_config_file_serialization_omits_chat_id() {
        let json = serde_json::to_string(&ConfigFile::default()).unwrap();
        assert!(!json.contains("chat_id"));
    }

    #[tokio::test]
    async fn test_resolve_secret() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join(BOT_TOKEN_FILE);
        assert_eq!(resolve_secret(None, &file), None);

        utils::write(&file, "  from-file\n").await.unwrap();
        assert_eq!(resolve_secret(None, &file).as_deref(), Some("from-file"));
        assert_eq!(
            resolve_secret(Some("from-env".to_string()), &file).as_deref(),
            Some("from-env")
        );
        assert_eq!(
            resolve_secret(Some("  ".to_string()), &file).as_deref(),
            Some("from-file")
        );
    }

    #[tokio::test]
    async fn test_chat_id_from_config_file() {
        let dir = TempDir::new().unwrap();
        let mut config = Config::create(dir.path(), StoreKind::Json).await.unwrap();
        config.config_file.notify.chat_id = Some("777".to_string());
        // The env var, when a test runner sets it, wins; otherwise the config value is used.
        let expected = std::env::var(CHAT_ID_ENV)
            .ok()
            .filter(|s| !s.trim().is_empty())
            .unwrap_or_else(|| "777".to_string());
        assert_eq!(config.chat_id().unwrap(), expected.trim());
    }
}
