use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::{info, warn};

use crate::config::Config;
use crate::error::{DeskError, Result};
use crate::market::MarketData;
use crate::models::{Action, ContractClass, Outcome, TradingState};
use crate::trading::execution::{round2, ExecutionSimulator, Order};
use crate::trading::gate::{GateReason, RiskGate};
use crate::trading::journal::DeskSnapshot;
use crate::trading::ledger::AccountLedger;
use crate::trading::randomness::FillRandomness;
use crate::trading::sizer::{Instrument, PositionSizer};
use crate::trading::trade_record::TradeRecord;

pub const MANUAL_REASONING: &str = "Manual Override Execution";

/// What a caller wants traded. `reasoning` is stored verbatim.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TradeIntent {
    pub symbol: String,
    pub action: Action,
    pub reasoning: String,
}

impl TradeIntent {
    pub fn new(symbol: &str, action: Action, reasoning: &str) -> Self {
        Self {
            symbol: symbol.to_string(),
            action,
            reasoning: reasoning.to_string(),
        }
    }

    pub fn manual(symbol: &str, action: Action) -> Self {
        Self::new(symbol, action, MANUAL_REASONING)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FillConfirmation {
    /// Contract symbol actually traded.
    pub symbol: String,
    pub action: Action,
    pub class: ContractClass,
    pub contracts: u32,
    pub reference_price: f64,
    pub stop_price: f64,
    pub fill_price: f64,
    pub outcome: Outcome,
    pub pnl: f64,
}

impl FillConfirmation {
    pub fn detail(&self) -> String {
        format!(
            "{} {} {} {} @ {:.2}",
            self.action, self.contracts, self.class, self.symbol, self.fill_price
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum AttemptStatus {
    Filled,
    Rejected,
    Error,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "UPPERCASE")]
pub enum AttemptResult {
    Filled {
        detail: String,
        outcome: Outcome,
        fill: FillConfirmation,
    },
    Rejected {
        detail: String,
        reason: GateReason,
    },
    Error {
        detail: String,
    },
}

impl AttemptResult {
    pub fn status(&self) -> AttemptStatus {
        match self {
            AttemptResult::Filled { .. } => AttemptStatus::Filled,
            AttemptResult::Rejected { .. } => AttemptStatus::Rejected,
            AttemptResult::Error { .. } => AttemptStatus::Error,
        }
    }

    pub fn detail(&self) -> &str {
        match self {
            AttemptResult::Filled { detail, .. }
            | AttemptResult::Rejected { detail, .. }
            | AttemptResult::Error { detail } => detail,
        }
    }

    pub fn outcome(&self) -> Option<Outcome> {
        match self {
            AttemptResult::Filled { outcome, .. } => Some(*outcome),
            _ => None,
        }
    }
}

/// Read-only view of the account for display.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccountStatus {
    pub balance: f64,
    pub daily_pnl: f64,
    pub daily_limit: f64,
    pub trades_today: u32,
    pub max_trades: u32,
    pub trading_state: TradingState,
    pub win_rate_percent: f64,
    pub trade_count: usize,
    /// Newest first.
    pub recent_history: Vec<TradeRecord>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ResetStatus {
    Reset,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResetAck {
    pub status: ResetStatus,
}

struct DeskInner {
    ledger: AccountLedger,
    gate: RiskGate,
    market: Box<dyn MarketData>,
}

/// One paper-trading account. Every request takes the same lock, so a
/// gate check, price fetch, fill and counter increment happen as one unit
/// with respect to other trades and resets.
pub struct PaperDesk {
    inner: Mutex<DeskInner>,
    sizer: PositionSizer,
    instrument: Instrument,
    stop_distance: f64,
    recent_history_len: usize,
    market_timeout: Duration,
}

impl PaperDesk {
    pub fn new(cfg: &Config, market: Box<dyn MarketData>, rng: Box<dyn FillRandomness>) -> Self {
        let ledger = AccountLedger::new(cfg.initial_balance, ExecutionSimulator::new(cfg, rng));
        Self::assemble(cfg, ledger, RiskGate::new(cfg), market)
    }

    /// Rebuild a desk from a saved journal. The account keeps the base it
    /// was saved with, and the day's trade count is the journal length.
    pub fn restore(
        cfg: &Config,
        snapshot: DeskSnapshot,
        market: Box<dyn MarketData>,
        rng: Box<dyn FillRandomness>,
    ) -> Self {
        let initial_balance =
            if snapshot.initial_balance.is_finite() && snapshot.initial_balance > 0.0 {
                snapshot.initial_balance
            } else {
                cfg.initial_balance
            };
        if initial_balance != cfg.initial_balance {
            warn!(
                "Journal initial balance {:.2} differs from configured {:.2}; keeping the journal's",
                initial_balance, cfg.initial_balance
            );
        }

        let trades_today = u32::try_from(snapshot.history.len()).unwrap_or(u32::MAX);
        if snapshot.trades_today != trades_today {
            warn!(
                "Journal trades_today {} does not match {} records; using the records",
                snapshot.trades_today, trades_today
            );
        }

        let ledger = AccountLedger::restore(
            initial_balance,
            snapshot.history,
            ExecutionSimulator::new(cfg, rng),
        );
        let gate = RiskGate::new(cfg).with_trades_today(trades_today);
        Self::assemble(cfg, ledger, gate, market)
    }

    fn assemble(
        cfg: &Config,
        ledger: AccountLedger,
        gate: RiskGate,
        market: Box<dyn MarketData>,
    ) -> Self {
        Self {
            inner: Mutex::new(DeskInner {
                ledger,
                gate,
                market,
            }),
            sizer: PositionSizer::new(cfg),
            instrument: Instrument::for_root(&cfg.instrument_root),
            stop_distance: cfg.stop_distance,
            recent_history_len: cfg.recent_history_len,
            market_timeout: Duration::from_secs(cfg.market_data_timeout_secs),
        }
    }

    /// Run one trade intent end to end. Rejections and data errors leave
    /// the account untouched.
    pub async fn try_trade(&self, intent: TradeIntent) -> Result<FillConfirmation> {
        let mut guard = self.inner.lock().await;
        let inner = &mut *guard;

        let (allowed, reason) = inner.gate.can_trade(inner.ledger.cumulative_pnl());
        if !allowed {
            warn!(
                "Rejected {} {}: {} (pnl={:.2}, trades_today={})",
                intent.action,
                intent.symbol,
                reason,
                inner.ledger.cumulative_pnl(),
                inner.gate.trades_today()
            );
            return Err(DeskError::TradeRejected(reason));
        }

        let price = self
            .fetch_price(&mut *inner.market, &intent.symbol)
            .await?;
        let stop = price - intent.action.sign() * self.stop_distance;

        let sizing = self
            .sizer
            .size(price, stop, &self.instrument, inner.ledger.balance());

        let record = inner.ledger.record_trade(Order {
            symbol: sizing.symbol.clone(),
            action: intent.action,
            quantity: sizing.contracts,
            reference_price: price,
            stop_price: stop,
            point_value: sizing.point_value,
            reasoning: intent.reasoning,
        });
        inner.gate.record_trade();

        let fill = FillConfirmation {
            symbol: sizing.symbol,
            action: record.action,
            class: sizing.class,
            contracts: sizing.contracts,
            reference_price: round2(price),
            stop_price: round2(stop),
            fill_price: record.price,
            outcome: record.outcome,
            pnl: record.pnl,
        };

        info!(
            "Filled {} -> {} {:+.2} | balance {:.2} | trades today {}/{}",
            fill.detail(),
            fill.outcome,
            fill.pnl,
            inner.ledger.balance(),
            inner.gate.trades_today(),
            inner.gate.max_daily_trades()
        );

        Ok(fill)
    }

    /// `try_trade` folded into the FILLED / REJECTED / ERROR shape callers
    /// display.
    pub async fn attempt_trade(&self, intent: TradeIntent) -> AttemptResult {
        match self.try_trade(intent).await {
            Ok(fill) => AttemptResult::Filled {
                detail: fill.detail(),
                outcome: fill.outcome,
                fill,
            },
            Err(DeskError::TradeRejected(reason)) => AttemptResult::Rejected {
                detail: reason.to_string(),
                reason,
            },
            Err(e) => AttemptResult::Error {
                detail: e.to_string(),
            },
        }
    }

    async fn fetch_price(&self, market: &mut dyn MarketData, symbol: &str) -> Result<f64> {
        let unavailable = |reason: String| {
            warn!("Market data unavailable for {}: {}", symbol, reason);
            DeskError::DataUnavailable {
                symbol: symbol.to_string(),
                reason,
            }
        };

        match tokio::time::timeout(self.market_timeout, market.current_price(symbol)).await {
            Err(_) => Err(unavailable(format!(
                "timed out after {}s",
                self.market_timeout.as_secs()
            ))),
            Ok(Err(e)) => Err(unavailable(e.to_string())),
            Ok(Ok(price)) if !price.is_finite() || price <= 0.0 => {
                Err(unavailable(format!("invalid price {}", price)))
            }
            Ok(Ok(price)) => Ok(price),
        }
    }

    /// Stamp subsequent records with a replay clock; `None` restores the
    /// wall clock.
    pub async fn set_sim_time(&self, t: Option<DateTime<Utc>>) {
        self.inner.lock().await.ledger.set_sim_time(t);
    }

    pub async fn status(&self) -> AccountStatus {
        let inner = self.inner.lock().await;
        let stats = inner.ledger.statistics(self.recent_history_len);
        let pnl = inner.ledger.cumulative_pnl();
        AccountStatus {
            balance: stats.balance,
            daily_pnl: stats.cumulative_pnl,
            daily_limit: inner.gate.max_daily_loss(),
            trades_today: inner.gate.trades_today(),
            max_trades: inner.gate.max_daily_trades(),
            trading_state: inner.gate.state(pnl),
            win_rate_percent: stats.win_rate_percent,
            trade_count: stats.trade_count,
            recent_history: stats.recent_history,
        }
    }

    pub async fn reset(&self) -> ResetAck {
        let mut inner = self.inner.lock().await;
        inner.ledger.reset();
        inner.gate.reset();
        info!("Account reset to {:.2}", inner.ledger.balance());
        ResetAck {
            status: ResetStatus::Reset,
        }
    }

    /// Full journal, oldest first.
    pub async fn history(&self) -> Vec<TradeRecord> {
        self.inner.lock().await.ledger.history().to_vec()
    }

    /// Up to `n` most recent records, newest first.
    pub async fn recent(&self, n: usize) -> Vec<TradeRecord> {
        self.inner.lock().await.ledger.recent(n)
    }

    pub async fn snapshot(&self) -> DeskSnapshot {
        let inner = self.inner.lock().await;
        DeskSnapshot {
            initial_balance: inner.ledger.initial_balance(),
            balance: round2(inner.ledger.balance()),
            cumulative_pnl: round2(inner.ledger.cumulative_pnl()),
            trades_today: inner.gate.trades_today(),
            history: inner.ledger.history().to_vec(),
            saved_at: None,
        }
    }
}
