//! Account balance snapshot.

use crate::number::{f64_from_text, fmt_dp};
use serde::Deserialize;

/// Total account equity as reported by the balance endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct BalanceSnapshot {
    /// Aggregate equity in USD
    #[serde(rename = "totalEq", deserialize_with = "f64_from_text")]
    pub total_equity: f64,
}

impl BalanceSnapshot {
    pub fn new(total_equity: f64) -> Self {
        Self { total_equity }
    }

    /// `Eq:$<equity rounded to cents>`
    pub fn render(&self) -> String {
        format!("Eq:${}", fmt_dp(self.total_equity, 2))
    }
}
