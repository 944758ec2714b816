//! Fault-isolated digest fetchers.
//!
//! Each fetcher returns display text and never an error: any failure
//! (network, HTTP status, API code, bad payload, timeout) is logged and
//! replaced by a fixed fallback line, so one bad source cannot sink the
//! whole digest.

use crate::affirmation::AffirmationClient;
use crate::error::{FetchError, FetchResult};
use crate::rest::OkxClient;
use futures_util::future::try_join_all;
use std::future::Future;
use std::time::Duration;
use tickerhug_core::{format_quotes, BalanceSnapshot, BotSection, GridBotRecord, TickerQuote};
use tracing::{debug, warn};

pub const PRICES_FALLBACK: &str = "Error fetching prices.";
pub const BALANCE_FALLBACK: &str = "Error fetching balance.";
pub const GRID_BOTS_FALLBACK: &str = "Error fetching grid bots.";
pub const AFFIRMATION_FALLBACK: &str = "Keep going, you're doing great!";

/// Instruments quoted in the digest unless configured otherwise.
pub const DEFAULT_INSTRUMENTS: &[&str] = &["BTC-USDT-SWAP", "LINK-USDT-SWAP"];

/// Run `fut`, turning expiry of `limit` into [`FetchError::Timeout`].
pub async fn bounded<T, F>(limit: Duration, fut: F) -> FetchResult<T>
where
    F: Future<Output = FetchResult<T>>,
{
    match tokio::time::timeout(limit, fut).await {
        Ok(result) => result,
        Err(_) => Err(FetchError::Timeout(limit)),
    }
}

/// Fetch every instrument concurrently. One failed instrument fails the batch.
pub async fn fetch_quotes(client: &OkxClient, instruments: &[String]) -> FetchResult<Vec<TickerQuote>> {
    try_join_all(instruments.iter().map(|inst_id| client.ticker(inst_id))).await
}

/// The four digest sources plus the settings they share.
#[derive(Debug, Clone)]
pub struct AccountFeeds {
    okx: OkxClient,
    affirmations: AffirmationClient,
    instruments: Vec<String>,
    fetch_timeout: Duration,
}

impl AccountFeeds {
    pub fn new(
        okx: OkxClient,
        affirmations: AffirmationClient,
        instruments: Vec<String>,
        fetch_timeout: Duration,
    ) -> Self {
        Self {
            okx,
            affirmations,
            instruments,
            fetch_timeout,
        }
    }

    pub fn instruments(&self) -> &[String] {
        &self.instruments
    }

    pub async fn try_prices(&self) -> FetchResult<Vec<TickerQuote>> {
        bounded(self.fetch_timeout, fetch_quotes(&self.okx, &self.instruments)).await
    }

    pub async fn try_balance(&self) -> FetchResult<BalanceSnapshot> {
        bounded(self.fetch_timeout, self.okx.balance()).await
    }

    pub async fn try_grid_bots(&self) -> FetchResult<Vec<GridBotRecord>> {
        bounded(self.fetch_timeout, self.okx.pending_grid_bots()).await
    }

    pub async fn try_affirmation(&self) -> FetchResult<String> {
        bounded(self.fetch_timeout, self.affirmations.fetch()).await
    }

    /// `SYMBOL: price` lines, or [`PRICES_FALLBACK`] if any instrument failed.
    pub async fn prices_text(&self) -> String {
        match self.try_prices().await {
            Ok(quotes) => format_quotes(&quotes),
            Err(e) => {
                warn!(error = %e, instruments = ?self.instruments, "Ticker fetch failed");
                PRICES_FALLBACK.to_string()
            }
        }
    }

    /// `Eq:$<equity>`, or [`BALANCE_FALLBACK`].
    pub async fn balance_text(&self) -> String {
        match self.try_balance().await {
            Ok(balance) => balance.render(),
            Err(e) => {
                warn!(error = %e, auth = e.is_auth_failure(), "Balance fetch failed");
                BALANCE_FALLBACK.to_string()
            }
        }
    }

    /// Bot summaries, or [`BotSection::Unavailable`] carrying [`GRID_BOTS_FALLBACK`].
    pub async fn bots_section(&self) -> BotSection {
        match self.try_grid_bots().await {
            Ok(bots) => {
                debug!(count = bots.len(), "Fetched running grid bots");
                BotSection::from_bots(&bots)
            }
            Err(e) => {
                warn!(error = %e, auth = e.is_auth_failure(), "Grid bot fetch failed");
                BotSection::Unavailable(GRID_BOTS_FALLBACK.to_string())
            }
        }
    }

    /// Affirmation text, or [`AFFIRMATION_FALLBACK`].
    pub async fn affirmation_text(&self) -> String {
        match self.try_affirmation().await {
            Ok(text) => text,
            Err(e) => {
                warn!(error = %e, "Affirmation fetch failed");
                AFFIRMATION_FALLBACK.to_string()
            }
        }
    }
}
