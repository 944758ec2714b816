//! Contract grid bot records and their compact one-line summaries.

use crate::number::{f64_from_text, fmt_fixed, opt_count_from_text, opt_f64_from_text};
use crate::price::display_symbol;
use serde::de::{self, Deserializer};
use serde::Deserialize;

/// Line emitted when no grid bot is running.
pub const ZERO_BOTS_LINE: &str = "Active bots: 0";

/// Placeholder for optional fields the exchange left blank.
pub const NOT_AVAILABLE: &str = "N/A";

/// A running contract grid bot.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GridBotRecord {
    /// Underlying, e.g. "BTC-USDT"
    pub uly: String,
    /// "long", "short" or "neutral"
    #[serde(deserialize_with = "non_empty_text")]
    pub direction: String,
    #[serde(deserialize_with = "f64_from_text")]
    pub grid_profit: f64,
    #[serde(deserialize_with = "f64_from_text")]
    pub total_pnl: f64,
    #[serde(deserialize_with = "f64_from_text")]
    pub pnl_ratio: f64,
    #[serde(deserialize_with = "f64_from_text")]
    pub investment: f64,
    #[serde(rename = "liqPx", default, deserialize_with = "opt_f64_from_text")]
    pub liquidation_price: Option<f64>,
    #[serde(rename = "minPx", default, deserialize_with = "opt_f64_from_text")]
    pub min_price: Option<f64>,
    #[serde(rename = "maxPx", default, deserialize_with = "opt_f64_from_text")]
    pub max_price: Option<f64>,
    #[serde(rename = "arbitrageNum", default, deserialize_with = "opt_count_from_text")]
    pub arbitrage_count: Option<u64>,
}

fn non_empty_text<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let text = String::deserialize(deserializer)?;
    if text.trim().is_empty() {
        return Err(de::Error::custom("expected non-empty text"));
    }
    Ok(text)
}

fn price_or_na(value: Option<f64>) -> String {
    value
        .map(|v| fmt_fixed(v, 2))
        .unwrap_or_else(|| NOT_AVAILABLE.to_string())
}

impl GridBotRecord {
    pub fn symbol(&self) -> &str {
        display_symbol(&self.uly)
    }

    /// First letter of the direction, uppercased ('L', 'S', 'N').
    pub fn direction_indicator(&self) -> char {
        self.direction
            .chars()
            .next()
            .map(|c| c.to_ascii_uppercase())
            .unwrap_or('?')
    }

    /// `SYM|D|PnL: $pnl(ratio%)|Inv: $inv|Liq: $liq|R: $min->$max|Arbs: n($profit)`
    pub fn summary_line(&self) -> String {
        let arbs = self
            .arbitrage_count
            .map(|n| n.to_string())
            .unwrap_or_else(|| NOT_AVAILABLE.to_string());

        format!(
            "{}|{}|PnL: ${}({}%)|Inv: ${}|Liq: ${}|R: ${}->${}|Arbs: {}(${})",
            self.symbol(),
            self.direction_indicator(),
            fmt_fixed(self.total_pnl, 2),
            fmt_fixed(self.pnl_ratio * 100.0, 1),
            fmt_fixed(self.investment, 1),
            price_or_na(self.liquidation_price),
            price_or_na(self.min_price),
            price_or_na(self.max_price),
            arbs,
            fmt_fixed(self.grid_profit, 2),
        )
    }
}

/// Render every bot on its own line, or [`ZERO_BOTS_LINE`] when there are none.
pub fn format_grid_bots(bots: &[GridBotRecord]) -> String {
    if bots.is_empty() {
        return ZERO_BOTS_LINE.to_string();
    }
    bots.iter()
        .map(GridBotRecord::summary_line)
        .collect::<Vec<_>>()
        .join("\n")
}
