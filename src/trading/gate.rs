use serde::{Deserialize, Serialize};
use std::fmt;

use crate::config::Config;
use crate::models::TradingState;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GateReason {
    Ok,
    DailyLossLimitHit,
    MaxTradesReached,
}

impl fmt::Display for GateReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GateReason::Ok => write!(f, "OK"),
            GateReason::DailyLossLimitHit => write!(f, "Daily Loss Limit Hit"),
            GateReason::MaxTradesReached => write!(f, "Max Trades Reached"),
        }
    }
}

/// Daily loss and trade-count limits. The decision is recomputed on every
/// call; only an explicit reset clears the trade counter.
#[derive(Debug, Clone)]
pub struct RiskGate {
    max_daily_loss: f64,
    max_daily_trades: u32,
    trades_today: u32,
}

impl RiskGate {
    pub fn new(cfg: &Config) -> Self {
        Self {
            max_daily_loss: cfg.max_daily_loss,
            max_daily_trades: cfg.max_daily_trades,
            trades_today: 0,
        }
    }

    pub fn with_trades_today(mut self, trades_today: u32) -> Self {
        self.trades_today = trades_today;
        self
    }

    pub fn can_trade(&self, cumulative_pnl: f64) -> (bool, GateReason) {
        if cumulative_pnl <= -self.max_daily_loss {
            return (false, GateReason::DailyLossLimitHit);
        }
        if self.trades_today >= self.max_daily_trades {
            return (false, GateReason::MaxTradesReached);
        }
        (true, GateReason::Ok)
    }

    pub fn state(&self, cumulative_pnl: f64) -> TradingState {
        match self.can_trade(cumulative_pnl) {
            (true, _) => TradingState::TradingActive,
            (false, _) => TradingState::TradingHalted,
        }
    }

    pub fn record_trade(&mut self) {
        self.trades_today += 1;
    }

    pub fn reset(&mut self) {
        self.trades_today = 0;
    }

    pub fn trades_today(&self) -> u32 {
        self.trades_today
    }

    pub fn max_daily_trades(&self) -> u32 {
        self.max_daily_trades
    }

    pub fn max_daily_loss(&self) -> f64 {
        self.max_daily_loss
    }
}
