//! Market ticker quotes.

use serde::{Deserialize, Serialize};

/// Strip the quote currency and contract suffix from an instrument id.
///
/// `"BTC-USDT-SWAP"` -> `"BTC"`, `"LINK-USDT"` -> `"LINK"`.
pub fn display_symbol(inst_id: &str) -> &str {
    inst_id.split('-').next().unwrap_or(inst_id)
}

/// Last traded price for one instrument.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TickerQuote {
    /// Raw exchange instrument id (e.g. "BTC-USDT-SWAP")
    #[serde(rename = "instId")]
    pub inst_id: String,
    /// Last trade price, kept exactly as the exchange printed it
    pub last: String,
}

impl TickerQuote {
    pub fn new(inst_id: impl Into<String>, last: impl Into<String>) -> Self {
        Self {
            inst_id: inst_id.into(),
            last: last.into(),
        }
    }

    pub fn symbol(&self) -> &str {
        display_symbol(&self.inst_id)
    }

    /// `SYMBOL: price`
    pub fn render(&self) -> String {
        format!("{}: {}", self.symbol(), self.last)
    }
}

/// Render quotes one per line, in the order given.
pub fn format_quotes(quotes: &[TickerQuote]) -> String {
    quotes
        .iter()
        .map(TickerQuote::render)
        .collect::<Vec<_>>()
        .join("\n")
}
