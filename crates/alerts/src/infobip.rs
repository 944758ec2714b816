//! Infobip SMS gateway channel.

use crate::channel::{DeliveryReceipt, SmsChannel};
use crate::error::{DispatchError, DispatchResult};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

/// Infobip account settings.
#[derive(Clone)]
pub struct InfobipConfig {
    /// Account-specific host, e.g. "https://xxxxx.api.infobip.com"
    pub base_url: String,
    pub api_key: String,
    /// Alphanumeric sender id or number
    pub sender: String,
}

impl std::fmt::Debug for InfobipConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InfobipConfig")
            .field("base_url", &self.base_url)
            .field("api_key", &"***")
            .field("sender", &self.sender)
            .finish()
    }
}

impl InfobipConfig {
    pub const DEFAULT_SENDER: &'static str = "TickerHug";

    pub fn new(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        sender: impl Into<String>,
    ) -> Self {
        Self {
            base_url: base_url.into(),
            api_key: api_key.into(),
            sender: sender.into(),
        }
    }
}

#[derive(Debug, Serialize)]
struct SendRequest<'a> {
    messages: Vec<OutgoingMessage<'a>>,
}

#[derive(Debug, Serialize)]
struct OutgoingMessage<'a> {
    destinations: Vec<Destination<'a>>,
    from: &'a str,
    text: &'a str,
}

#[derive(Debug, Serialize)]
struct Destination<'a> {
    to: &'a str,
}

#[derive(Debug, Deserialize)]
struct SendResponse {
    #[serde(default)]
    messages: Vec<SentMessage>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SentMessage {
    message_id: String,
    status: MessageStatus,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct MessageStatus {
    group_name: String,
    #[serde(default)]
    description: String,
}

/// REST gateway channel backed by Infobip `sms/2/text/advanced`.
pub struct InfobipChannel {
    config: InfobipConfig,
    http: reqwest::Client,
}

impl InfobipChannel {
    pub fn new(config: InfobipConfig, request_timeout: Duration) -> DispatchResult<Self> {
        if config.base_url.is_empty() || config.api_key.is_empty() {
            return Err(DispatchError::InvalidConfig(
                "Infobip base URL and API key are required".to_string(),
            ));
        }
        let http = reqwest::Client::builder().timeout(request_timeout).build()?;
        Ok(Self { config, http })
    }

    fn send_url(&self) -> String {
        format!(
            "{}/sms/2/text/advanced",
            self.config.base_url.trim_end_matches('/')
        )
    }
}

#[async_trait]
impl SmsChannel for InfobipChannel {
    async fn send(&self, message: &str, recipient: &str) -> DispatchResult<DeliveryReceipt> {
        let payload = SendRequest {
            messages: vec![OutgoingMessage {
                destinations: vec![Destination { to: recipient }],
                from: &self.config.sender,
                text: message,
            }],
        };

        let response = self
            .http
            .post(self.send_url())
            .header("Authorization", format!("App {}", self.config.api_key))
            .json(&payload)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(DispatchError::Rejected {
                channel: "infobip",
                status: status.as_u16(),
                body,
            });
        }

        let parsed: SendResponse = serde_json::from_str(&body)?;
        let sent = parsed
            .messages
            .into_iter()
            .next()
            .ok_or_else(|| DispatchError::Parse("response listed no messages".to_string()))?;

        // Infobip answers 200 even when the message itself was refused
        if sent.status.group_name.eq_ignore_ascii_case("REJECTED") {
            return Err(DispatchError::Rejected {
                channel: "infobip",
                status: status.as_u16(),
                body: sent.status.description,
            });
        }

        debug!(message_id = %sent.message_id, group = %sent.status.group_name, "Infobip accepted message");

        Ok(DeliveryReceipt {
            channel: self.name().to_string(),
            message_id: sent.message_id,
            status: sent.status.group_name,
        })
    }

    fn name(&self) -> &str {
        "infobip"
    }
}
