use cashbook::args::{Args, Command};
use cashbook::{commands, Mode, Result};
use clap::Parser;
use std::process::ExitCode;
use tracing::{debug, error, trace};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();
    let log_level = args.common().log_level();
    init_logger(log_level);
    debug!("Log level set to {}", log_level.to_string().to_lowercase());

    match main_inner(args).await {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            error!("Exiting with error: {e}");
            ExitCode::FAILURE
        }
    }
}

pub async fn main_inner(args: Args) -> Result<()> {
    trace!("{args:?}");
    let home = args.common().cashbook_home().path();

    // When CASHBOOK_IN_TEST_MODE is set and non-empty, reports are handed to an in-memory
    // notifier instead of the chat webhook.
    let mode = Mode::from_env();

    let _: () = match args.command() {
        Command::Init(init_args) => commands::init(home, init_args.store()).await?.print(),
        Command::Add(add_args) => {
            let config = commands::load_config(home).await?;
            commands::add(config, add_args.clone()).await?.print()
        }
        Command::Edit(edit_args) => {
            let config = commands::load_config(home).await?;
            commands::edit(config, edit_args.clone()).await?.print()
        }
        Command::Delete(delete_args) => {
            let config = commands::load_config(home).await?;
            commands::delete(config, delete_args.clone()).await?.print()
        }
        Command::Clear(clear_args) => {
            let config = commands::load_config(home).await?;
            commands::clear(config, clear_args.clone()).await?.print()
        }
        Command::Dashboard => commands::dashboard(commands::load_config(home).await?)
            .await?
            .print(),
        Command::List(list_args) => {
            let config = commands::load_config(home).await?;
            commands::list(config, list_args.clone()).await?.print()
        }
        Command::Report(report_args) => {
            let config = commands::load_config(home).await?;
            commands::report(config, report_args.clone()).await?.print()
        }
        Command::Summary(summary_args) => {
            let config = commands::load_config(home).await?;
            commands::summary(config, summary_args.clone()).await?.print()
        }
        Command::Export(export_args) => {
            let config = commands::load_config(home).await?;
            commands::export_csv(config, export_args.clone()).await?.print()
        }
        Command::Send(send_args) => {
            let config = commands::load_config(home).await?;
            commands::send_report(config, mode, send_args.clone())
                .await?
                .print()
        }
        Command::Mcp(_mcp_args) => commands::mcp(commands::load_config(home).await?, mode)
            .await?
            .print(),
    };
    Ok(())
}

/// Initializes the tracing subscriber.
pub fn init_logger(level: LevelFilter) {
    let filter = match std::env::var("RUST_LOG").ok() {
        Some(_) => {
            // RUST_LOG exists; use it.
            EnvFilter::from_default_env()
        }
        None => {
            // RUST_LOG does not exist; use default log level for this crate only.
            EnvFilter::new(format!(
                "{}={},{}={}",
                env!("CARGO_CRATE_NAME"),
                level,
                env!("CARGO_BIN_NAME"),
                level
            ))
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
