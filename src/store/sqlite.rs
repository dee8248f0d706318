//! The SQLite ledger.

use super::{migrations, new_id, unique_ids, Store};
use crate::error::Res;
use crate::model::{Amount, Category, Transaction, TransactionData, TransactionType};
use anyhow::{anyhow, bail, ensure, Context};
use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::path::Path;
use std::str::FromStr;
use tracing::debug;

const SELECT: &str = "SELECT id, type, amount, category, description, date FROM transactions";
const DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Debug, Clone)]
pub(crate) struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    /// Creates the database file at `path`, which must not exist yet, and brings its schema up
    /// to the current version.
    pub(crate) async fn init(path: impl AsRef<Path>) -> Res<Self> {
        let path = path.as_ref();
        ensure!(
            !path.exists(),
            "A database already exists at '{}'",
            path.display()
        );
        let pool = connect(path, true).await?;
        migrations::bootstrap(&pool).await?;
        migrations::run(&pool, 0, migrations::CURRENT_VERSION).await?;
        debug!("Created SQLite ledger at {}", path.display());
        Ok(Self { pool })
    }

    /// Opens the database file at `path` and migrates it if it is behind.
    pub(crate) async fn load(path: impl AsRef<Path>) -> Res<Self> {
        let path = path.as_ref();
        ensure!(
            path.is_file(),
            "The database file is missing '{}'",
            path.display()
        );
        let pool = connect(path, false).await?;
        let version = migrations::version(&pool).await?;
        if version > migrations::CURRENT_VERSION {
            bail!(
                "The database schema version {version} is newer than this program supports ({})",
                migrations::CURRENT_VERSION
            );
        }
        migrations::run(&pool, version, migrations::CURRENT_VERSION).await?;
        debug!("Opened SQLite ledger at {}", path.display());
        Ok(Self { pool })
    }
}

async fn connect(path: &Path, create: bool) -> Res<SqlitePool> {
    let options = SqliteConnectOptions::new()
        .filename(path)
        .create_if_missing(create);
    SqlitePoolOptions::new()
        .max_connections(1)
        .connect_with(options)
        .await
        .with_context(|| format!("Unable to open SQLite database at {}", path.display()))
}

#[async_trait]
impl Store for SqliteStore {
    async fn create(&self, data: &TransactionData) -> Res<String> {
        let id = new_id();
        sqlx::query(
            "INSERT INTO transactions (id, type, amount, category, description, date) \
             VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(&id)
        .bind(data.r#type().to_string())
        .bind(data.amount().to_string())
        .bind(data.category().key())
        .bind(data.description())
        .bind(data.date().format(DATE_FORMAT).to_string())
        .execute(&self.pool)
        .await
        .context("Unable to insert transaction")?;
        Ok(id)
    }

    async fn list(&self) -> Res<Vec<Transaction>> {
        let rows: Vec<Row> = sqlx::query_as(&format!("{SELECT} ORDER BY date DESC, id ASC"))
            .fetch_all(&self.pool)
            .await
            .context("Unable to list transactions")?;
        rows.into_iter().map(Transaction::try_from).collect()
    }

    async fn get(&self, id: &str) -> Res<Option<Transaction>> {
        let row: Option<Row> = sqlx::query_as(&format!("{SELECT} WHERE id = ?"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .with_context(|| format!("Unable to read transaction {id}"))?;
        row.map(Transaction::try_from).transpose()
    }

    async fn update(&self, id: &str, data: &TransactionData) -> Res<Transaction> {
        let result = sqlx::query(
            "UPDATE transactions SET type = ?, amount = ?, category = ?, description = ?, \
             date = ? WHERE id = ?",
        )
        .bind(data.r#type().to_string())
        .bind(data.amount().to_string())
        .bind(data.category().key())
        .bind(data.description())
        .bind(data.date().format(DATE_FORMAT).to_string())
        .bind(id)
        .execute(&self.pool)
        .await
        .with_context(|| format!("Unable to update transaction {id}"))?;
        if result.rows_affected() == 0 {
            bail!("Transaction not found: {id}");
        }
        Ok(Transaction::new(id, data.clone()))
    }

    async fn delete(&self, ids: &[String]) -> Res<Vec<String>> {
        let ids = unique_ids(ids);
        let mut tx = self
            .pool
            .begin()
            .await
            .context("Failed to begin delete transaction")?;
        for id in &ids {
            let result = sqlx::query("DELETE FROM transactions WHERE id = ?")
                .bind(id)
                .execute(&mut *tx)
                .await
                .with_context(|| format!("Unable to delete transaction {id}"))?;
            if result.rows_affected() == 0 {
                // Dropping `tx` rolls back the deletes done so far.
                bail!("Transaction not found: {id}");
            }
        }
        tx.commit()
            .await
            .context("Failed to commit delete transaction")?;
        Ok(ids)
    }

    async fn delete_all(&self) -> Res<u64> {
        let result = sqlx::query("DELETE FROM transactions")
            .execute(&self.pool)
            .await
            .context("Unable to delete transactions")?;
        Ok(result.rows_affected())
    }
}

/// A transaction exactly as it is stored in the `transactions` table.
#[derive(Debug, sqlx::FromRow)]
struct Row {
    id: String,
    #[sqlx(rename = "type")]
    kind: String,
    amount: String,
    category: String,
    description: String,
    date: String,
}

impl TryFrom<Row> for Transaction {
    type Error = anyhow::Error;

    fn try_from(row: Row) -> Res<Self> {
        let r#type = TransactionType::from_str(&row.kind)
            .map_err(|e| anyhow!("Bad type '{}' on transaction {}: {e}", row.kind, row.id))?;
        let amount = Amount::from_str(&row.amount)
            .with_context(|| format!("Bad amount on transaction {}", row.id))?;
        let date = NaiveDate::parse_from_str(&row.date, DATE_FORMAT)
            .with_context(|| format!("Bad date '{}' on transaction {}", row.date, row.id))?;
        let data = TransactionData::new(
            r#type,
            amount,
            Category::new(row.category),
            row.description,
            date,
        );
        Ok(Transaction::new(row.id, data))
    }
}
