//! Delete command handlers.

use crate::args::{ClearArgs, DeleteArgs};
use crate::backup::CLEAR;
use crate::commands::{load_all, plural, Out};
use crate::error::{ErrorType, IntoResult};
use crate::report::Totals;
use crate::view::TotalsView;
use crate::{Config, Result};
use anyhow::anyhow;
use serde::Serialize;
use std::path::PathBuf;

/// The result of `delete`: what was removed and the totals over what is left.
#[derive(Debug, Clone, Serialize)]
pub struct Deleted {
    pub ids: Vec<String>,
    pub totals: TotalsView,
}

/// The result of `clear`.
#[derive(Debug, Clone, Serialize)]
pub struct Cleared {
    pub deleted: u64,
    /// The snapshot written before deleting, absent when there was nothing to delete.
    pub backup: Option<PathBuf>,
}

/// Deletes one or more transactions by id atomically.
///
/// This operation is all-or-nothing: either all specified transactions are deleted, or none are.
/// If any id is not found, nothing is deleted.
pub async fn delete(config: Config, args: DeleteArgs) -> Result<Out<Deleted>> {
    if args.ids().is_empty() {
        return Err(anyhow!("No transaction ids were given")).pub_result(ErrorType::Validation);
    }
    let ids = config
        .store()
        .delete(args.ids())
        .await
        .pub_result(ErrorType::Database)?;

    let remaining = load_all(&config).await?;
    let totals = Totals::of(&remaining).pub_result(ErrorType::Validation)?;
    let totals = TotalsView::new(&totals, config.money());
    let message = format!(
        "Deleted {}, balance is now {}",
        plural(ids.len(), "transaction", "transactions"),
        totals.balance
    );
    Ok(Out::new(message, Deleted { ids, totals }))
}

/// Deletes every transaction after saving them to a JSON backup. Refuses to do anything unless
/// `args.yes()` confirms it.
pub async fn clear(config: Config, args: ClearArgs) -> Result<Out<Cleared>> {
    if !args.yes() {
        return Err(anyhow!(
            "Refusing to delete every transaction without confirmation, pass --yes"
        ))
        .pub_result(ErrorType::Validation);
    }

    let all = load_all(&config).await?;
    if all.is_empty() {
        return Ok(Out::new(
            "There were no transactions to delete",
            Cleared {
                deleted: 0,
                backup: None,
            },
        ));
    }

    let backup = config
        .backup()
        .save_json(CLEAR, &all)
        .await
        .pub_result(ErrorType::Io)?;
    let deleted = config
        .store()
        .delete_all()
        .await
        .pub_result(ErrorType::Database)?;

    let message = format!(
        "Deleted {}, a backup was saved to {}",
        plural(deleted as usize, "transaction", "transactions"),
        backup.display()
    );
    Ok(Out::new(
        message,
        Cleared {
            deleted,
            backup: Some(backup),
        },
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Transaction;
    use crate::store::StoreKind;
    use crate::test::TestEnv;
    use crate::utils;

    #[tokio::test]
    async fn test_delete_single_recomputes_totals() {
        let env = TestEnv::new().await;
        let ids = env.add_sample().await;

        // Drop the salary; only the three expenses remain.
        let out = delete(env.config(), DeleteArgs::new([ids[0].clone()]))
            .await
            .unwrap();
        let deleted = out.structure().unwrap();
        assert_eq!(deleted.ids, vec![ids[0].clone()]);
        assert_eq!(deleted.totals.income, "Rp 0");
        assert_eq!(deleted.totals.expense, "Rp 140.000");
        assert_eq!(deleted.totals.balance, "-Rp 140.000");
        assert_eq!(deleted.totals.count, 3);
        assert_eq!(out.message(), "Deleted 1 transaction, balance is now -Rp 140.000");

        let remaining: Vec<String> = env
            .config()
            .store()
            .list()
            .await
            .unwrap()
            .iter()
            .map(|t| t.id().to_string())
            .collect();
        assert_eq!(remaining.len(), 3);
        assert!(!remaining.contains(&ids[0]));
    }

    #[tokio::test]
    async fn test_delete_is_all_or_nothing() {
        let env = TestEnv::with_store(StoreKind::Json).await;
        let ids = env.add_sample().await;
        let err = delete(env.config(), DeleteArgs::new([ids[0].as_str(), "ghost"]))
            .await
            .unwrap_err();
        assert_eq!(err.error_type(), ErrorType::Database);
        assert!(err.to_string().contains("ghost"));
        assert_eq!(env.config().store().list().await.unwrap().len(), 4);
    }

    #[tokio::test]
    async fn test_delete_requires_ids() {
        let env = TestEnv::new().await;
        let err = delete(env.config(), DeleteArgs::new(Vec::<String>::new()))
            .await
            .unwrap_err();
        assert_eq!(err.error_type(), ErrorType::Validation);
    }

    #[tokio::test]
    async fn test_clear_requires_confirmation() {
        let env = TestEnv::new().await;
        env.add_sample().await;
        let err = clear(env.config(), ClearArgs::new(false)).await.unwrap_err();
        assert_eq!(err.error_type(), ErrorType::Validation);
        assert_eq!(env.config().store().list().await.unwrap().len(), 4);
    }

    #[tokio::test]
    async fn test_clear_backs_up_then_deletes() {
        let env = TestEnv::new().await;
        env.add_sample().await;
        let before = env.config().store().list().await.unwrap();

        let out = clear(env.config(), ClearArgs::new(true)).await.unwrap();
        let cleared = out.structure().unwrap();
        assert_eq!(cleared.deleted, 4);
        assert!(env.config().store().list().await.unwrap().is_empty());

        let backup = cleared.backup.as_ref().unwrap();
        assert!(backup.starts_with(env.config().backups()));
        let saved: Vec<Transaction> = utils::deserialize(backup).await.unwrap();
        assert_eq!(saved, before);
    }

    #[tokio::test]
    async fn test_clear_never_runs_without_backup_copies() {
        let env = TestEnv::new().await;
        env.add_sample().await;
        let config = env.config();
        let mut file: serde_json::Value = utils::deserialize(config.config_path()).await.unwrap();
        file["backup_copies"] = serde_json::json!(0);
        utils::write(config.config_path(), file.to_string()).await.unwrap();

        let err = crate::commands::load_config(config.root()).await.unwrap_err();
        assert_eq!(err.error_type(), ErrorType::Config);
        assert!(err.to_string().contains("backup_copies"), "{err}");
        assert_eq!(config.store().list().await.unwrap().len(), 4);
    }

    #[tokio::test]
    async fn test_clear_empty_ledger() {
        let env = TestEnv::new().await;
        let out = clear(env.config(), ClearArgs::new(true)).await.unwrap();
        assert_eq!(out.structure().unwrap().deleted, 0);
        assert!(out.structure().unwrap().backup.is_none());
    }
}
