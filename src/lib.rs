//! cashbook: a personal income and expense ledger with daily, ISO-weekly and monthly reports.
//!
//! The same command handlers back the `cashbook` CLI and its MCP server. Transactions live in a
//! SQLite database or a JSON file under `$CASHBOOK_HOME`.

pub mod args;
mod backup;
pub mod commands;
mod config;
mod error;
mod mcp;
pub mod model;
mod notify;
pub mod report;
mod store;
mod utils;
pub mod view;


pub use backup::Backup;
pub use config::{Config, NotifySettings, BOT_TOKEN_ENV, CHAT_ID_ENV};
pub use error::{Error, ErrorType, Result};
pub use notify::{Mode, TEST_MODE_ENV};
pub use store::StoreKind;
