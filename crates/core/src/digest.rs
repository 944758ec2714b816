//! Digest composition and truncation.
//!
//! A digest is the balance line, the price block, and then either the bot
//! summaries or (when no bot is running) an affirmation. The composed text
//! is cut to the transport budget before dispatch.

use crate::grid::{format_grid_bots, GridBotRecord, ZERO_BOTS_LINE};

/// Outcome of the bot fetch as seen by the composer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BotSection {
    /// Fetch succeeded and no bot is running.
    Idle,
    /// Fetch succeeded with one line per running bot.
    Active(String),
    /// Fetch failed; carries the fallback text.
    Unavailable(String),
}

impl BotSection {
    pub fn from_bots(bots: &[GridBotRecord]) -> Self {
        if bots.is_empty() {
            BotSection::Idle
        } else {
            BotSection::Active(format_grid_bots(bots))
        }
    }

    pub fn is_idle(&self) -> bool {
        matches!(self, BotSection::Idle)
    }

    pub fn text(&self) -> &str {
        match self {
            BotSection::Idle => ZERO_BOTS_LINE,
            BotSection::Active(text) | BotSection::Unavailable(text) => text,
        }
    }
}

/// Character budget for a digest carrying bot lines. Idle digests are not cut.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MessageBudget {
    /// Total characters a single SMS may carry.
    pub sms_char_limit: usize,
    /// Characters the provider prepends to every message.
    pub prefix_overhead: usize,
    /// Explicit budget that wins over `sms_char_limit - prefix_overhead`.
    pub max_chars_override: Option<usize>,
}

impl MessageBudget {
    pub const DEFAULT_SMS_CHAR_LIMIT: usize = 159;

    pub fn new(sms_char_limit: usize, prefix_overhead: usize) -> Self {
        Self {
            sms_char_limit,
            prefix_overhead,
            max_chars_override: None,
        }
    }

    pub fn with_override(mut self, max_chars: Option<usize>) -> Self {
        self.max_chars_override = max_chars;
        self
    }

    pub fn max_chars(&self) -> usize {
        self.max_chars_override
            .unwrap_or_else(|| self.sms_char_limit.saturating_sub(self.prefix_overhead))
    }
}

impl Default for MessageBudget {
    fn default() -> Self {
        Self::new(Self::DEFAULT_SMS_CHAR_LIMIT, 0)
    }
}

/// Keep the first `max_chars` characters of `text`.
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

/// Section texts gathered by one digest run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DigestSections {
    pub balance: String,
    pub prices: String,
    pub bots: BotSection,
    pub affirmation: String,
}

impl DigestSections {
    /// Join the sections without any length limit.
    ///
    /// The affirmation only appears when no bot is running; bot details and
    /// the affirmation never share a message.
    pub fn compose(&self) -> String {
        let tail = if self.bots.is_idle() {
            self.affirmation.as_str()
        } else {
            self.bots.text()
        };
        [self.balance.as_str(), self.prices.as_str(), tail].join("\n")
    }

    /// Compose and, when bot lines or the bot fallback are present, cut to
    /// the budget. The idle digest is sent whole so the affirmation survives.
    pub fn render(&self, budget: &MessageBudget) -> String {
        let message = self.compose();
        if self.bots.is_idle() {
            return message;
        }
        truncate_chars(&message, budget.max_chars()).to_string()
    }
}
