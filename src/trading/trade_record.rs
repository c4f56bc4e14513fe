use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::{Action, Outcome};

/// One completed paper trade, as journaled.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradeRecord {
    pub timestamp: DateTime<Utc>,
    /// Contract symbol that was traded (e.g. `NQ`, `MNQ`).
    pub symbol: String,
    pub action: Action,
    /// Fill price after slippage, rounded to 2 decimals.
    pub price: f64,
    #[serde(default)]
    pub quantity: u32,
    /// Realized P&L net of commission.
    pub pnl: f64,
    pub outcome: Outcome,
    #[serde(default)]
    pub reasoning: String,
}

impl TradeRecord {
    pub fn is_win(&self) -> bool {
        self.outcome == Outcome::Win
    }

    /// Journal line, e.g. `2024-01-15 14:30 BUY 1 NQ @ 20000.25 WIN +798.00`.
    pub fn summary(&self) -> String {
        format!(
            "{} {} {} {} @ {:.2} {} {:+.2}",
            self.timestamp.format("%Y-%m-%d %H:%M"),
            self.action,
            self.quantity,
            self.symbol,
            self.price,
            self.outcome,
            self.pnl
        )
    }
}
