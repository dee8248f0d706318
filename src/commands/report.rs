//! Period reports and CSV export.

use crate::args::{ExportArgs, ReportArgs, SummaryArgs};
use crate::commands::{load_all, parse_period, plural, today, Out};
use crate::error::{ErrorType, IntoResult};
use crate::model::{parse_date, TransactionType};
use crate::report::{self, Report, Summary};
use crate::{utils, view, Config, Result};
use anyhow::Context;
use serde::Serialize;
use std::path::PathBuf;

const CSV_HEADER: [&str; 6] = ["id", "date", "type", "amount", "category", "description"];

/// Income, expense and balance for one period. Defaults to the current month.
pub async fn report(config: Config, args: ReportArgs) -> Result<Out<Report>> {
    let period = parse_period(args.period(), today())?;
    let all = load_all(&config).await?;
    let report = report::build(&all, period).pub_result(ErrorType::Validation)?;
    let message = format!(
        "Balance for {} is {}",
        report.period,
        config.money().format(report.totals.balance)
    );
    let detail = view::report_table(&report, config.money());
    Ok(Out::new(message, report).with_detail(detail))
}

/// The day, ISO week and month reports for the periods containing a date, today by default.
pub async fn summary(config: Config, args: SummaryArgs) -> Result<Out<Summary>> {
    let day = match args.date() {
        Some(s) => parse_date(s).pub_result(ErrorType::Validation)?,
        None => today(),
    };
    let all = load_all(&config).await?;
    let summary = report::summary(&all, day).pub_result(ErrorType::Validation)?;
    let message = format!(
        "Summary for {} ({}, {})",
        summary.daily.period, summary.weekly.period, summary.monthly.period
    );
    let detail = view::summary_table(&summary, config.money());
    Ok(Out::new(message, summary).with_detail(detail))
}

/// The result of `export_csv`.
#[derive(Debug, Clone, Serialize)]
pub struct Exported {
    pub path: PathBuf,
    pub count: usize,
}

#[derive(Serialize)]
struct CsvRow<'a> {
    id: &'a str,
    date: String,
    r#type: TransactionType,
    amount: String,
    category: &'a str,
    description: &'a str,
}

/// Writes the transactions of a period to a CSV file, newest first.
pub async fn export_csv(config: Config, args: ExportArgs) -> Result<Out<Exported>> {
    let period = parse_period(Some(args.period()), today())?;
    let all = load_all(&config).await?;
    let selected: Vec<_> = report::filter(&all, period).collect();

    let csv = to_csv(selected.iter().map(|t| CsvRow {
        id: t.id(),
        date: t.date().format("%Y-%m-%d").to_string(),
        r#type: t.r#type(),
        amount: t.amount().to_string(),
        category: t.category().key(),
        description: t.description(),
    }))
    .pub_result(ErrorType::Io)?;
    utils::write(args.output(), csv)
        .await
        .pub_result(ErrorType::Io)?;

    let exported = Exported {
        path: args.output().to_path_buf(),
        count: selected.len(),
    };
    let message = format!(
        "Exported {} for {period} to {}",
        plural(exported.count, "transaction", "transactions"),
        exported.path.display()
    );
    Ok(Out::new(message, exported))
}

fn to_csv<'a>(rows: impl Iterator<Item = CsvRow<'a>>) -> crate::error::Res<Vec<u8>> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(Vec::new());
    writer
        .write_record(CSV_HEADER)
        .context("Unable to write CSV header")?;
    for row in rows {
        writer.serialize(row).context("Unable to write CSV row")?;
    }
    writer
        .into_inner()
        .map_err(|e| anyhow::anyhow!("Unable to finish CSV output: {e}"))
}
