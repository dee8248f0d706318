//! Outbound messages to a chat bot webhook.

mod telegram;

use crate::error::Res;
use crate::Config;
use async_trait::async_trait;
use std::sync::Mutex;
use tracing::debug;

pub(crate) use telegram::TelegramNotifier;

/// Environment variable that, when set to anything non-empty, switches on `Mode::Testing`.
pub const TEST_MODE_ENV: &str = "CASHBOOK_IN_TEST_MODE";

/// Whether outbound calls go to the real webhook or to an in-memory stand-in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    #[default]
    Live,
    Testing,
}

impl Mode {
    /// `Mode::Testing` if `CASHBOOK_IN_TEST_MODE` is set and non-empty, otherwise `Mode::Live`.
    pub fn from_env() -> Self {
        match std::env::var(TEST_MODE_ENV) {
            Ok(value) if !value.is_empty() => Mode::Testing,
            _ => Mode::Live,
        }
    }
}

/// Sends a text message somewhere a human will read it.
#[async_trait]
pub(crate) trait Notifier: Send + Sync {
    /// Sends `text` once, with no retry. Returns the acknowledgement flag reported by the
    /// receiving end. Transport failures are errors.
    async fn send(&self, text: &str) -> Res<bool>;
}

/// Builds the notifier for `mode`. In live mode the bot token and chat id must be configured.
pub(crate) fn notifier(config: &Config, mode: Mode) -> Res<Box<dyn Notifier>> {
    match mode {
        Mode::Testing => Ok(Box::<TestNotifier>::default()),
        Mode::Live => Ok(Box::new(TelegramNotifier::new(
            &config.notify().api_base,
            &config.bot_token()?,
            &config.chat_id()?,
        )?)),
    }
}

/// Keeps sent messages in memory and always acknowledges. Compiled into release builds too, so
/// the whole program can be run end to end without a bot.
#[derive(Debug, Default)]
pub(crate) struct TestNotifier {
    sent: Mutex<Vec<String>>,
}

impl TestNotifier {
    #[cfg(test)]
    pub(crate) fn sent(&self) -> Vec<String> {
        self.sent.lock().map(|v| v.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl Notifier for TestNotifier {
    async fn send(&self, text: &str) -> Res<bool> {
        debug!("Test notifier received:\n{text}");
        if let Ok(mut sent) = self.sent.lock() {
            sent.push(text.to_string());
        }
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_test_notifier_records() {
        let n = TestNotifier::default();
        assert!(n.send("hello").await.unwrap());
        assert!(n.send("again").await.unwrap());
        assert_eq!(n.sent(), vec!["hello".to_string(), "again".to_string()]);
    }

    #[test]
    fn test_mode_default_is_live() {
        assert_eq!(Mode::default(), Mode::Live);
    }
}
