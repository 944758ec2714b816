//! Application configuration.
//!
//! Built once at startup from the environment (after `.env` is loaded) and
//! handed to the digest runner; nothing below reads the environment again.

use std::time::Duration;
use thiserror::Error;
use tickerhug_alerts::{InfobipConfig, SmsChannelKind, TwilioConfig};
use tickerhug_core::MessageBudget;
use tickerhug_feeds::{AffirmationClient, OkxClient, OkxCredentials, DEFAULT_INSTRUMENTS};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable {0}")]
    Missing(&'static str),

    #[error("invalid value for {key}: {reason}")]
    Invalid { key: &'static str, reason: String },
}

/// Application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Exchange settings.
    pub exchange: ExchangeSettings,
    /// Affirmation source URL.
    pub affirmation_url: String,
    /// Upper bound for each fetch.
    pub fetch_timeout: Duration,
    /// SMS delivery settings.
    pub sms: SmsSettings,
}

/// OKX settings.
#[derive(Debug, Clone)]
pub struct ExchangeSettings {
    pub base_url: String,
    pub credentials: OkxCredentials,
    /// Instruments quoted in the digest.
    pub instruments: Vec<String>,
}

/// SMS settings.
#[derive(Debug, Clone)]
pub struct SmsSettings {
    pub channel: SmsChannelKind,
    pub twilio: Option<TwilioConfig>,
    pub infobip: Option<InfobipConfig>,
    /// Single recipient phone number.
    pub recipient: String,
    /// Total characters one SMS can carry.
    pub char_limit: usize,
    /// Explicit budget; overrides `char_limit` minus the channel prefix.
    pub max_chars: Option<usize>,
}

impl AppConfig {
    pub const DEFAULT_FETCH_TIMEOUT_SECS: u64 = 10;

    /// Load from process environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load through an arbitrary key lookup. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let require = |key: &'static str| get(key).ok_or(ConfigError::Missing(key));

        let credentials = OkxCredentials::new(
            require("OKX_API_KEY")?,
            require("OKX_SECRET_KEY")?,
            require("OKX_PASSPHRASE")?,
        );

        let instruments = match get("OKX_INSTRUMENTS") {
            Some(list) => list
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect(),
            None => DEFAULT_INSTRUMENTS.iter().map(|s| s.to_string()).collect(),
        };

        let exchange = ExchangeSettings {
            base_url: get("OKX_BASE_URL").unwrap_or_else(|| OkxClient::DEFAULT_BASE_URL.to_string()),
            credentials,
            instruments,
        };

        let fetch_timeout = Duration::from_secs(
            parse_number(&get, "FETCH_TIMEOUT_SECS")?.unwrap_or(Self::DEFAULT_FETCH_TIMEOUT_SECS),
        );

        let channel = match get("SMS_CHANNEL") {
            Some(value) => SmsChannelKind::parse(&value).map_err(|e| ConfigError::Invalid {
                key: "SMS_CHANNEL",
                reason: e.to_string(),
            })?,
            None => SmsChannelKind::default(),
        };

        let (twilio, infobip) = match channel {
            SmsChannelKind::Twilio => {
                let twilio = TwilioConfig::new(
                    require("TWILIO_ACCOUNT_SID")?,
                    require("TWILIO_AUTH_TOKEN")?,
                    require("TWILIO_PHONE_NUMBER")?,
                );
                let twilio = match get("TWILIO_BASE_URL") {
                    Some(url) => twilio.with_base_url(url),
                    None => twilio,
                };
                (Some(twilio), None)
            }
            SmsChannelKind::Infobip => {
                let infobip = InfobipConfig::new(
                    require("INFOBIP_BASE_URL")?,
                    require("INFOBIP_API_KEY")?,
                    get("INFOBIP_SENDER").unwrap_or_else(|| InfobipConfig::DEFAULT_SENDER.to_string()),
                );
                (None, Some(infobip))
            }
        };

        let sms = SmsSettings {
            channel,
            twilio,
            infobip,
            recipient: require("RECIPIENT_PHONE_NUMBER")?,
            char_limit: parse_number(&get, "SMS_CHAR_LIMIT")?
                .map(|n| n as usize)
                .unwrap_or(MessageBudget::DEFAULT_SMS_CHAR_LIMIT),
            max_chars: parse_number(&get, "SMS_MAX_CHARS")?.map(|n| n as usize),
        };

        Ok(Self {
            exchange,
            affirmation_url: get("AFFIRMATION_URL")
                .unwrap_or_else(|| AffirmationClient::DEFAULT_URL.to_string()),
            fetch_timeout,
            sms,
        })
    }
}

fn parse_number<G>(get: &G, key: &'static str) -> Result<Option<u64>, ConfigError>
where
    G: Fn(&str) -> Option<String>,
{
    get(key)
        .map(|value| {
            value.trim().parse::<u64>().map_err(|e| ConfigError::Invalid {
                key,
                reason: format!("{:?}: {}", value, e),
            })
        })
        .transpose()
}
