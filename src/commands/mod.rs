//! Command handlers for the cashbook CLI and the MCP server.
//!
//! Every handler loads what it needs fresh from the store, writes through the store, and then
//! re-reads the ledger for anything it reports back.

mod browse;
mod delete;
mod init;
mod mcp;
mod record;
mod report;
mod send;

use crate::error::{ErrorType, IntoResult};
use crate::model::Transaction;
use crate::report::Period;
use crate::{Config, Result};
use chrono::{Local, NaiveDate};
use serde::Serialize;
use std::fmt::Debug;
use std::str::FromStr;
use tracing::{debug, info};

pub use browse::{dashboard, list};
pub use delete::{clear, delete, Cleared, Deleted};
pub use init::{init, load_config, Initialized};
pub use mcp::mcp;
pub use record::{add, edit};
pub use report::{export_csv, report, summary, Exported};
pub use send::{send_report, Sent};

/// The output type for a command. This allows the command to return a consistent message and,
/// optionally, structured data to both the command line and MCP server interfaces.
#[derive(Debug, Clone, Serialize)]
pub struct Out<T>
where
    T: Serialize + Clone + Debug,
{
    /// A message that can be printed to the user regarding the outcome of the command execution.
    message: String,

    /// Human-readable text, such as a Markdown table, that belongs on stdout.
    detail: Option<String>,

    /// Any structured data that needs to be output from the call.
    structure: Option<T>,
}

impl<T, S> From<S> for Out<T>
where
    T: Debug + Clone + Serialize,
    S: Into<String>,
{
    fn from(value: S) -> Self {
        Out::new_message(value)
    }
}

impl<T> Out<T>
where
    T: Serialize + Clone + Debug,
{
    /// Create a new `Out` object that has `Some(structure)`.
    pub fn new<S>(message: S, structure: T) -> Self
    where
        S: Into<String>,
    {
        Self {
            message: message.into(),
            detail: None,
            structure: Some(structure),
        }
    }

    /// Create a new `Out` object that has `None` for `structure`.
    pub fn new_message<S>(message: S) -> Self
    where
        S: Into<String>,
    {
        Self {
            message: message.into(),
            detail: None,
            structure: None,
        }
    }

    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }

    /// Get the `message`.
    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn detail(&self) -> Option<&str> {
        self.detail.as_deref()
    }

    /// Get the structured data stored in `structure`.
    pub fn structure(&self) -> Option<&T> {
        self.structure.as_ref()
    }

    /// Print the message to `info!`, the detail to stdout, and the structured data (if it
    /// exists) as JSON to `debug!`.
    pub fn print(&self) {
        info!("{}", self.message);
        if let Some(detail) = self.detail() {
            println!("{detail}");
        }
        if let Some(structure) = self.structure() {
            if let Ok(json) = serde_json::to_string_pretty(structure) {
                debug!("Command output:\n\n{json}\n\n");
            }
        }
    }
}

/// The local calendar date.
pub(crate) fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// Parses a user-supplied period, defaulting to the month that contains `today`.
pub(crate) fn parse_period(period: Option<&str>, today: NaiveDate) -> Result<Period> {
    match period.map(str::trim) {
        None | Some("") => Ok(Period::Month(crate::model::YearMonth::of(today))),
        Some(s) => Period::from_str(s).pub_result(ErrorType::Validation),
    }
}

/// The whole ledger, newest first.
pub(crate) async fn load_all(config: &Config) -> Result<Vec<Transaction>> {
    config.store().list().await.pub_result(ErrorType::Database)
}

fn plural(count: usize, one: &str, many: &str) -> String {
    format!("{count} {}", if count == 1 { one } else { many })
}
