//! Digest dispatch to the configured recipient.

use crate::channel::{DeliveryReceipt, SmsChannel};
use crate::error::DispatchResult;
use std::sync::Arc;
use tickerhug_core::MessageBudget;
use tracing::{error, info};

/// Sends composed digests over one channel to one recipient.
#[derive(Clone)]
pub struct Dispatcher {
    channel: Arc<dyn SmsChannel>,
    recipient: String,
}

impl std::fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher")
            .field("channel", &self.channel.name())
            .field("recipient", &self.masked_recipient())
            .finish()
    }
}

impl Dispatcher {
    pub fn new(channel: Arc<dyn SmsChannel>, recipient: impl Into<String>) -> Self {
        Self {
            channel,
            recipient: recipient.into(),
        }
    }

    pub fn channel_name(&self) -> &str {
        self.channel.name()
    }

    /// Message budget for this channel: the SMS limit minus the channel's
    /// sender prefix, unless `max_chars_override` is set.
    pub fn budget(&self, sms_char_limit: usize, max_chars_override: Option<usize>) -> MessageBudget {
        MessageBudget::new(sms_char_limit, self.channel.prefix_overhead())
            .with_override(max_chars_override)
    }

    fn masked_recipient(&self) -> String {
        let keep = self.recipient.chars().count().saturating_sub(4);
        let tail: String = self.recipient.chars().skip(keep).collect();
        format!("***{}", tail)
    }

    /// Send one message. Failures are logged and returned, never retried.
    pub async fn dispatch(&self, message: &str) -> DispatchResult<DeliveryReceipt> {
        match self.channel.send(message, &self.recipient).await {
            Ok(receipt) => {
                info!(
                    channel = self.channel.name(),
                    recipient = %self.masked_recipient(),
                    message_id = %receipt.message_id,
                    chars = message.chars().count(),
                    "SMS sent"
                );
                Ok(receipt)
            }
            Err(e) => {
                error!(
                    channel = self.channel.name(),
                    recipient = %self.masked_recipient(),
                    error = %e,
                    "SMS sending failed"
                );
                Err(e)
            }
        }
    }
}
