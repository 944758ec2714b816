//! SMS channel abstraction.

use crate::error::{DispatchError, DispatchResult};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Provider acknowledgement for an accepted message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeliveryReceipt {
    /// Channel that accepted the message
    pub channel: String,
    /// Provider-assigned message id
    pub message_id: String,
    /// Provider status at acceptance time (e.g. "queued", "PENDING")
    pub status: String,
}

/// Trait for SMS providers.
#[async_trait]
pub trait SmsChannel: Send + Sync {
    /// Send `message` to `recipient` (E.164 phone number).
    async fn send(&self, message: &str, recipient: &str) -> DispatchResult<DeliveryReceipt>;

    /// Channel name for logs.
    fn name(&self) -> &str;

    /// Characters the provider prepends to every message body.
    fn prefix_overhead(&self) -> usize {
        0
    }
}

/// Which provider delivers the digest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SmsChannelKind {
    /// Telecom API (Twilio Messages)
    #[default]
    Twilio,
    /// HTTP REST SMS gateway (Infobip)
    Infobip,
}

impl SmsChannelKind {
    /// Parse from string.
    pub fn parse(s: &str) -> DispatchResult<Self> {
        match s.trim().to_lowercase().as_str() {
            "twilio" => Ok(SmsChannelKind::Twilio),
            "infobip" => Ok(SmsChannelKind::Infobip),
            other => Err(DispatchError::InvalidConfig(format!(
                "unknown SMS channel '{}', expected 'twilio' or 'infobip'",
                other
            ))),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SmsChannelKind::Twilio => "twilio",
            SmsChannelKind::Infobip => "infobip",
        }
    }
}

impl std::fmt::Display for SmsChannelKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
