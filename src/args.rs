//! These structs provide the CLI interface for the cashbook CLI. Most of them double as MCP tool
//! parameters, which is why they derive `Deserialize` and `JsonSchema` as well as clap's `Parser`.

use crate::model::TransactionType;
use crate::store::StoreKind;
use crate::view::{HistoryFilter, TypeFilter};
use clap::{Parser, Subcommand};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::convert::Infallible;
use std::fmt::{Display, Formatter};
use std::ops::Deref;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::error;
use tracing_subscriber::filter::LevelFilter;

/// cashbook: A command-line tool for tracking personal income and expenses.
///
/// Record transactions with an amount, category, description and date, then look at the totals,
/// browse and search the history, or produce daily, ISO-weekly and monthly reports. A report can
/// be posted to a Telegram chat.
///
/// There is also a mode in which an AI agent can use this program through the mcp subcommand.
#[derive(Debug, Parser, Clone)]
pub struct Args {
    #[clap(flatten)]
    common: Common,

    #[command(subcommand)]
    command: Command,
}

impl Args {
    pub fn new(common: Common, command: Command) -> Self {
        Self { common, command }
    }

    pub fn common(&self) -> &Common {
        &self.common
    }

    pub fn command(&self) -> &Command {
        &self.command
    }
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Create the data directory, the configuration file and an empty ledger.
    ///
    /// Run this once before anything else. The data directory is --cashbook-home, which defaults
    /// to $HOME/cashbook.
    Init(InitArgs),
    /// Record a new income or expense.
    Add(TransactionArgs),
    /// Replace every field of an existing transaction.
    Edit(EditArgs),
    /// Delete one or more transactions by id. Either all of them are deleted or none are.
    Delete(DeleteArgs),
    /// Delete every transaction. A JSON backup is written to .backups first.
    Clear(ClearArgs),
    /// Show the balance, total income, total expense and the most recent transactions.
    Dashboard,
    /// List transactions, newest first, optionally searching and filtering by type.
    List(ListArgs),
    /// Show income, expense and balance for one day, ISO week, month, or everything.
    Report(ReportArgs),
    /// Show the daily, weekly and monthly reports for the periods containing a date.
    Summary(SummaryArgs),
    /// Write the transactions of a period to a CSV file.
    Export(ExportArgs),
    /// Post a report to the configured Telegram chat.
    ///
    /// The bot token comes from CASHBOOK_BOT_TOKEN or $CASHBOOK_HOME/.secrets/bot_token. The chat
    /// id comes from CASHBOOK_CHAT_ID or notify.chat_id in config.json.
    Send(SendArgs),
    /// Run an MCP server over stdio so an AI agent can use cashbook.
    Mcp(McpArgs),
}

/// Arguments common to all subcommands.
#[derive(Debug, Parser, Clone)]
pub struct Common {
    /// The logging verbosity. One of, from least to most verbose:
    /// off, error, warn, info, debug, trace
    ///
    /// This can be overridden by RUST_LOG.
    #[arg(long, default_value_t = LevelFilter::INFO)]
    log_level: LevelFilter,

    /// The directory where cashbook data and configuration is held. Defaults to ~/cashbook
    #[arg(long, env = "CASHBOOK_HOME", default_value_t = default_cashbook_home())]
    cashbook_home: DisplayPath,
}

impl Common {
    pub fn new(log_level: LevelFilter, cashbook_home: PathBuf) -> Self {
        Self {
            log_level,
            cashbook_home: cashbook_home.into(),
        }
    }

    pub fn log_level(&self) -> LevelFilter {
        self.log_level
    }

    pub fn cashbook_home(&self) -> &DisplayPath {
        &self.cashbook_home
    }
}

/// Args for the `cashbook init` command.
#[derive(Debug, Parser, Clone)]
pub struct InitArgs {
    /// Where to keep the ledger: a SQLite database or a single JSON file.
    #[arg(long, value_enum, default_value_t)]
    store: StoreKind,
}

impl InitArgs {
    pub fn new(store: StoreKind) -> Self {
        Self { store }
    }

    pub fn store(&self) -> StoreKind {
        self.store
    }
}

/// The fields of a transaction as the user enters them. Used by `add` and, together with an id,
/// by `edit`.
#[derive(Debug, Clone, Parser, Serialize, Deserialize, JsonSchema)]
pub struct TransactionArgs {
    /// Either 'income' or 'expense'.
    #[arg(long = "type", value_enum)]
    #[serde(rename = "type")]
    kind: TransactionType,

    /// The amount, a number greater than zero, e.g. '25000' or '12.50'. A leading 'Rp' or '$' and
    /// ',' thousands separators are accepted.
    #[arg(long)]
    amount: String,

    /// The category key, e.g. 'makanan', 'transportasi', 'gaji'. Defaults to 'lainnya'.
    #[arg(long)]
    #[serde(default)]
    category: Option<String>,

    /// Free text describing the transaction.
    #[arg(long)]
    #[serde(default)]
    description: Option<String>,

    /// The date in YYYY-MM-DD format. Defaults to today.
    #[arg(long)]
    #[serde(default)]
    date: Option<String>,
}

impl TransactionArgs {
    pub fn new(kind: TransactionType, amount: impl Into<String>) -> Self {
        Self {
            kind,
            amount: amount.into(),
            category: None,
            description: None,
            date: None,
        }
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_date(mut self, date: impl Into<String>) -> Self {
        self.date = Some(date.into());
        self
    }

    pub fn kind(&self) -> TransactionType {
        self.kind
    }

    pub fn amount(&self) -> &str {
        &self.amount
    }

    pub fn category(&self) -> Option<&str> {
        self.category.as_deref()
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn date(&self) -> Option<&str> {
        self.date.as_deref()
    }
}

/// Args for the `cashbook edit` command.
#[derive(Debug, Clone, Parser, Serialize, Deserialize, JsonSchema)]
pub struct EditArgs {
    /// The id of the transaction to replace.
    #[arg(long)]
    id: String,

    #[command(flatten)]
    #[serde(flatten)]
    transaction: TransactionArgs,
}

impl EditArgs {
    pub fn new(id: impl Into<String>, transaction: TransactionArgs) -> Self {
        Self {
            id: id.into(),
            transaction,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn transaction(&self) -> &TransactionArgs {
        &self.transaction
    }
}

/// Args for the `cashbook delete` command.
#[derive(Debug, Clone, Parser, Serialize, Deserialize, JsonSchema)]
pub struct DeleteArgs {
    /// The ids of the transactions to delete. Repeat --id for more than one.
    #[arg(long = "id", required = true)]
    ids: Vec<String>,
}

impl DeleteArgs {
    pub fn new<S: Into<String>>(ids: impl IntoIterator<Item = S>) -> Self {
        Self {
            ids: ids.into_iter().map(Into::into).collect(),
        }
    }

    pub fn ids(&self) -> &[String] {
        &self.ids
    }
}

/// Args for the `cashbook clear` command.
#[derive(Debug, Clone, Parser)]
pub struct ClearArgs {
    /// Confirm that every transaction should be deleted.
    #[arg(long)]
    yes: bool,
}

impl ClearArgs {
    pub fn new(yes: bool) -> Self {
        Self { yes }
    }

    pub fn yes(&self) -> bool {
        self.yes
    }
}

/// Args for the `cashbook list` command.
#[derive(Debug, Clone, Default, Parser, Serialize, Deserialize, JsonSchema)]
pub struct ListArgs {
    /// Case-insensitive text to look for in the description or the category label.
    #[arg(long)]
    #[serde(default)]
    search: Option<String>,

    /// Only show this type of transaction: 'all', 'income' or 'expense'.
    #[arg(long = "type", value_enum, default_value_t)]
    #[serde(default, rename = "type")]
    kind: TypeFilter,
}

impl ListArgs {
    pub fn new(search: Option<String>, kind: TypeFilter) -> Self {
        Self { search, kind }
    }

    pub fn filter(&self) -> HistoryFilter {
        HistoryFilter {
            search: self.search.clone(),
            kind: self.kind,
        }
    }
}

/// Args for the `cashbook report` command.
#[derive(Debug, Clone, Default, Parser, Serialize, Deserialize, JsonSchema)]
pub struct ReportArgs {
    /// The period to report on: a day 'YYYY-MM-DD', an ISO week 'YYYY-Www' (e.g. '2024-W05'), a
    /// month 'YYYY-MM', or 'all'. Defaults to the current month.
    #[serde(default)]
    period: Option<String>,
}

impl ReportArgs {
    pub fn new(period: Option<String>) -> Self {
        Self { period }
    }

    pub fn period(&self) -> Option<&str> {
        self.period.as_deref()
    }
}

/// Args for the `cashbook summary` command.
#[derive(Debug, Clone, Default, Parser, Serialize, Deserialize, JsonSchema)]
pub struct SummaryArgs {
    /// The day whose day, week and month are summarized, as YYYY-MM-DD. Defaults to today.
    #[arg(long)]
    #[serde(default)]
    date: Option<String>,
}

impl SummaryArgs {
    pub fn new(date: Option<String>) -> Self {
        Self { date }
    }

    pub fn date(&self) -> Option<&str> {
        self.date.as_deref()
    }
}

/// Args for the `cashbook export` command.
#[derive(Debug, Clone, Parser)]
pub struct ExportArgs {
    /// The CSV file to write. It is overwritten if it exists.
    #[arg(long)]
    output: PathBuf,

    /// Only export this period: 'YYYY-MM-DD', 'YYYY-Www', 'YYYY-MM' or 'all'.
    #[arg(long, default_value = "all")]
    period: String,
}

impl ExportArgs {
    pub fn new(output: impl Into<PathBuf>, period: impl Into<String>) -> Self {
        Self {
            output: output.into(),
            period: period.into(),
        }
    }

    pub fn output(&self) -> &Path {
        &self.output
    }

    pub fn period(&self) -> &str {
        &self.period
    }
}

/// Args for the `cashbook send` command.
#[derive(Debug, Clone, Default, Parser, Serialize, Deserialize, JsonSchema)]
pub struct SendArgs {
    /// The period to report on, as for `cashbook report`. Defaults to the current month.
    #[serde(default)]
    period: Option<String>,
}

impl SendArgs {
    pub fn new(period: Option<String>) -> Self {
        Self { period }
    }

    pub fn period(&self) -> Option<&str> {
        self.period.as_deref()
    }
}

/// Args for the `cashbook mcp` command.
#[derive(Debug, Clone, Parser)]
pub struct McpArgs {}

fn default_cashbook_home() -> DisplayPath {
    DisplayPath(match dirs::home_dir() {
        Some(home) => home.join("cashbook"),
        None => {
            error!(
                "There was an error when trying to get your home directory. You can get around \
                this by providing --cashbook-home or CASHBOOK_HOME instead of relying on the \
                default cashbook home directory. If you continue using the program right now, you \
                may have problems!",
            );
            PathBuf::from("cashbook")
        }
    })
}

#[derive(Debug, Default, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct DisplayPath(PathBuf);

impl From<PathBuf> for DisplayPath {
    fn from(value: PathBuf) -> Self {
        DisplayPath(value)
    }
}

impl Deref for DisplayPath {
    type Target = Path;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl AsRef<Path> for DisplayPath {
    fn as_ref(&self) -> &Path {
        &self.0
    }
}

impl Display for DisplayPath {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.to_string_lossy())
    }
}

impl FromStr for DisplayPath {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(PathBuf::from(s)))
    }
}

impl DisplayPath {
    pub fn path(&self) -> &Path {
        &self.0
    }
}
