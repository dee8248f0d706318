use super::Notifier;
use crate::error::Res;
use anyhow::{bail, Context};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt::{Debug, Formatter};
use tracing::{debug, warn};
use url::Url;

/// Posts messages through the Telegram Bot API `sendMessage` method.
///
/// The bot token is part of the endpoint path, so the endpoint never appears in errors or in
/// `Debug` output.
#[derive(Clone)]
pub(crate) struct TelegramNotifier {
    client: reqwest::Client,
    endpoint: Url,
    chat_id: String,
}

impl Debug for TelegramNotifier {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TelegramNotifier")
            .field("host", &self.endpoint.host_str().unwrap_or_default())
            .field("chat_id", &self.chat_id)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Serialize)]
struct SendMessage<'a> {
    chat_id: &'a str,
    text: &'a str,
}

#[derive(Debug, Deserialize)]
struct ApiResponse {
    ok: bool,
    #[serde(default)]
    description: Option<String>,
}

impl TelegramNotifier {
    /// `api_base` is usually `https://api.telegram.org`.
    pub(crate) fn new(api_base: &str, token: &str, chat_id: &str) -> Res<Self> {
        let endpoint = Url::parse(&format!(
            "{}/bot{token}/sendMessage",
            api_base.trim_end_matches('/')
        ))
        .with_context(|| format!("Invalid notify api_base '{api_base}'"))?;
        Ok(Self {
            client: reqwest::Client::new(),
            endpoint,
            chat_id: chat_id.to_string(),
        })
    }
}

#[async_trait]
impl Notifier for TelegramNotifier {
    async fn send(&self, text: &str) -> Res<bool> {
        let body = SendMessage {
            chat_id: &self.chat_id,
            text,
        };
        debug!("Posting {} characters to the chat webhook", text.len());
        let response = self
            .client
            .post(self.endpoint.clone())
            .json(&body)
            .send()
            .await
            .map_err(reqwest::Error::without_url)
            .context("Unable to reach the chat webhook")?;

        let status = response.status();
        // The API answers with a JSON body even on 4xx, so the status alone is not decisive.
        let reply = response
            .json::<ApiResponse>()
            .await
            .map_err(reqwest::Error::without_url);
        let reply = match reply {
            Ok(reply) => reply,
            Err(e) => bail!("Unexpected reply from the chat webhook (HTTP {status}): {e}"),
        };
        if !reply.ok {
            warn!(
                "The chat webhook did not accept the message: {}",
                reply.description.as_deref().unwrap_or("no description")
            );
        }
        Ok(reply.ok)
    }
}
