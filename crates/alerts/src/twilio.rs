//! Twilio Messages API channel.

use crate::channel::{DeliveryReceipt, SmsChannel};
use crate::error::{DispatchError, DispatchResult};
use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

/// Twilio account settings.
#[derive(Clone)]
pub struct TwilioConfig {
    pub account_sid: String,
    pub auth_token: String,
    /// Sending phone number
    pub from: String,
    pub base_url: String,
}

impl std::fmt::Debug for TwilioConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TwilioConfig")
            .field("account_sid", &self.account_sid)
            .field("auth_token", &"***")
            .field("from", &self.from)
            .field("base_url", &self.base_url)
            .finish()
    }
}

impl TwilioConfig {
    pub const DEFAULT_BASE_URL: &'static str = "https://api.twilio.com";

    pub fn new(
        account_sid: impl Into<String>,
        auth_token: impl Into<String>,
        from: impl Into<String>,
    ) -> Self {
        Self {
            account_sid: account_sid.into(),
            auth_token: auth_token.into(),
            from: from.into(),
            base_url: Self::DEFAULT_BASE_URL.to_string(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

#[derive(Debug, Deserialize)]
struct TwilioMessage {
    sid: String,
    #[serde(default)]
    status: String,
}

/// Telecom API channel backed by Twilio.
///
/// Trial accounts prepend "Sent from your Twilio trial account - " to every
/// body, which eats into the single-SMS budget.
pub struct TwilioChannel {
    config: TwilioConfig,
    http: reqwest::Client,
}

impl TwilioChannel {
    pub const SENDER_PREFIX_OVERHEAD: usize = 38;

    pub fn new(config: TwilioConfig, request_timeout: Duration) -> DispatchResult<Self> {
        if config.account_sid.is_empty() || config.auth_token.is_empty() {
            return Err(DispatchError::InvalidConfig(
                "Twilio account SID and auth token are required".to_string(),
            ));
        }
        let http = reqwest::Client::builder().timeout(request_timeout).build()?;
        Ok(Self { config, http })
    }

    fn messages_url(&self) -> String {
        format!(
            "{}/2010-04-01/Accounts/{}/Messages.json",
            self.config.base_url.trim_end_matches('/'),
            self.config.account_sid
        )
    }
}

#[async_trait]
impl SmsChannel for TwilioChannel {
    async fn send(&self, message: &str, recipient: &str) -> DispatchResult<DeliveryReceipt> {
        let params = [
            ("To", recipient),
            ("From", self.config.from.as_str()),
            ("Body", message),
        ];

        let response = self
            .http
            .post(self.messages_url())
            .basic_auth(&self.config.account_sid, Some(&self.config.auth_token))
            .form(&params)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(DispatchError::Rejected {
                channel: "twilio",
                status: status.as_u16(),
                body,
            });
        }

        let accepted: TwilioMessage = serde_json::from_str(&body)?;
        debug!(sid = %accepted.sid, status = %accepted.status, "Twilio accepted message");

        Ok(DeliveryReceipt {
            channel: self.name().to_string(),
            message_id: accepted.sid,
            status: accepted.status,
        })
    }

    fn name(&self) -> &str {
        "twilio"
    }

    fn prefix_overhead(&self) -> usize {
        Self::SENDER_PREFIX_OVERHEAD
    }
}
