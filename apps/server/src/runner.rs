//! Digest runner: fan out to every source, compose, dispatch.

use crate::config::AppConfig;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tickerhug_alerts::{
    DeliveryReceipt, DispatchError, Dispatcher, InfobipChannel, SmsChannel, SmsChannelKind,
    TwilioChannel,
};
use tickerhug_core::{DigestSections, MessageBudget};
use tickerhug_feeds::{AccountFeeds, AffirmationClient, FetchError, OkxClient};
use tracing::{debug, info};

/// Timeout for the single SMS provider call.
const DISPATCH_TIMEOUT: Duration = Duration::from_secs(15);

#[derive(Debug, Error)]
pub enum RunError {
    #[error("SMS dispatch failed: {0}")]
    Dispatch(#[from] DispatchError),
}

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("failed to build exchange client: {0}")]
    Feeds(#[from] FetchError),
    #[error("failed to build SMS channel: {0}")]
    Channel(#[from] DispatchError),
}

/// Outcome of a successful run.
#[derive(Debug, Clone)]
pub struct DigestReport {
    pub message: String,
    pub receipt: DeliveryReceipt,
}

/// Runs one complete fetch-compose-dispatch cycle per call.
pub struct DigestRunner {
    feeds: AccountFeeds,
    dispatcher: Dispatcher,
    budget: MessageBudget,
}

impl DigestRunner {
    pub fn new(feeds: AccountFeeds, dispatcher: Dispatcher, budget: MessageBudget) -> Self {
        Self {
            feeds,
            dispatcher,
            budget,
        }
    }

    /// Wire clients, channel and budget from configuration.
    pub fn from_config(config: &AppConfig) -> Result<Self, StartupError> {
        let okx = OkxClient::new(
            config.exchange.base_url.clone(),
            config.exchange.credentials.clone(),
            config.fetch_timeout,
        )?;
        let affirmations = AffirmationClient::new(config.affirmation_url.clone(), config.fetch_timeout)?;
        let feeds = AccountFeeds::new(
            okx,
            affirmations,
            config.exchange.instruments.clone(),
            config.fetch_timeout,
        );

        let channel = build_channel(config)?;
        let dispatcher = Dispatcher::new(channel, config.sms.recipient.clone());
        let budget = dispatcher.budget(config.sms.char_limit, config.sms.max_chars);

        Ok(Self::new(feeds, dispatcher, budget))
    }

    pub fn budget(&self) -> &MessageBudget {
        &self.budget
    }

    pub fn channel_name(&self) -> &str {
        self.dispatcher.channel_name()
    }

    /// Fetch all four sections concurrently. Never fails: each source
    /// substitutes its own fallback.
    pub async fn gather(&self) -> DigestSections {
        let (balance, prices, bots, affirmation) = tokio::join!(
            self.feeds.balance_text(),
            self.feeds.prices_text(),
            self.feeds.bots_section(),
            self.feeds.affirmation_text(),
        );

        DigestSections {
            balance,
            prices,
            bots,
            affirmation,
        }
    }

    /// Gather, compose within budget and send.
    pub async fn run_once(&self) -> Result<DigestReport, RunError> {
        let sections = self.gather().await;
        let message = sections.render(&self.budget);
        debug!(
            chars = message.chars().count(),
            budget = self.budget.max_chars(),
            bots_idle = sections.bots.is_idle(),
            "Composed digest"
        );

        let receipt = self.dispatcher.dispatch(&message).await?;
        info!(channel = %receipt.channel, message_id = %receipt.message_id, "Digest delivered");

        Ok(DigestReport { message, receipt })
    }
}

fn build_channel(config: &AppConfig) -> Result<Arc<dyn SmsChannel>, DispatchError> {
    let missing = |name: &str| DispatchError::InvalidConfig(format!("{} settings missing", name));

    match config.sms.channel {
        SmsChannelKind::Twilio => {
            let twilio = config.sms.twilio.clone().ok_or_else(|| missing("twilio"))?;
            Ok(Arc::new(TwilioChannel::new(twilio, DISPATCH_TIMEOUT)?))
        }
        SmsChannelKind::Infobip => {
            let infobip = config.sms.infobip.clone().ok_or_else(|| missing("infobip"))?;
            Ok(Arc::new(InfobipChannel::new(infobip, DISPATCH_TIMEOUT)?))
        }
    }
}
