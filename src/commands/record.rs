//! Handlers that write a single transaction: `add` and `edit`.

use crate::args::{EditArgs, TransactionArgs};
use crate::commands::{today, Out};
use crate::error::{ErrorType, IntoResult};
use crate::model::{Transaction, TransactionData};
use crate::{Config, Result};
use anyhow::Context;
use chrono::NaiveDate;
use tracing::debug;

/// Validates the user's input. Nothing reaches the store unless this succeeds.
fn validate(args: &TransactionArgs, today: NaiveDate) -> Result<TransactionData> {
    TransactionData::parse(
        args.kind(),
        args.amount(),
        args.category(),
        args.description(),
        args.date(),
        today,
    )
    .pub_result(ErrorType::Validation)
}

async fn refetch(config: &Config, id: &str) -> Result<Transaction> {
    config
        .store()
        .get(id)
        .await
        .and_then(|found| {
            found.with_context(|| format!("Transaction {id} is missing after write"))
        })
        .pub_result(ErrorType::Database)
}

/// Records a new transaction and returns it as stored, including its new id.
pub async fn add(config: Config, args: TransactionArgs) -> Result<Out<Transaction>> {
    let data = validate(&args, today())?;
    let id = config
        .store()
        .create(&data)
        .await
        .pub_result(ErrorType::Database)?;
    debug!("Created transaction {id}");
    let created = refetch(&config, &id).await?;
    let message = format!(
        "Added {} of {} with id {}",
        created.r#type(),
        config.money().format(created.amount().value()),
        created.id()
    );
    Ok(Out::new(message, created))
}

/// Replaces every field of an existing transaction and returns it as stored.
pub async fn edit(config: Config, args: EditArgs) -> Result<Out<Transaction>> {
    let data = validate(args.transaction(), today())?;
    config
        .store()
        .update(args.id(), &data)
        .await
        .pub_result(ErrorType::Database)?;
    let updated = refetch(&config, args.id()).await?;
    Ok(Out::new(
        format!("Updated transaction {}", updated.id()),
        updated,
    ))
}
