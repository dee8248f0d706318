use crate::args::SendArgs;
use crate::commands::{load_all, parse_period, today, Out};
use crate::error::{ErrorType, IntoResult};
use crate::notify::{self, Mode, Notifier};
use crate::report::{self, Period};
use crate::{view, Config, Result};
use serde::Serialize;
use tracing::warn;

/// The result of `send_report`.
#[derive(Debug, Clone, Serialize)]
pub struct Sent {
    pub period: Period,
    pub text: String,
    /// What the chat API reported back. `false` is logged but is not an error.
    pub acknowledged: bool,
}

/// Sends the report for a period, the current month by default, to the configured chat.
pub async fn send_report(config: Config, mode: Mode, args: SendArgs) -> Result<Out<Sent>> {
    let period = parse_period(args.period(), today())?;
    let notifier = notify::notifier(&config, mode).pub_result(ErrorType::Notify)?;
    send_with(&config, notifier.as_ref(), period).await
}

async fn send_with(
    config: &Config,
    notifier: &dyn Notifier,
    period: Period,
) -> Result<Out<Sent>> {
    let all = load_all(config).await?;
    let report = report::build(&all, period).pub_result(ErrorType::Validation)?;
    let text = view::report_message(&report, config.money());
    let acknowledged = notifier.send(&text).await.pub_result(ErrorType::Notify)?;
    let message = if acknowledged {
        format!("Sent the {period} report")
    } else {
        warn!("The chat webhook did not acknowledge the {period} report");
        format!("The {period} report was not acknowledged")
    };
    Ok(Out::new(
        message,
        Sent {
            period,
            text,
            acknowledged,
        },
    ))
}
