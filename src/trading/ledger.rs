use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::trading::execution::{round2, ExecutionSimulator, Order};
use crate::trading::trade_record::TradeRecord;

/// Balance, cumulative P&L and the append-only trade journal.
///
/// `balance == initial_balance + cumulative_pnl` and
/// `cumulative_pnl == sum(history.pnl)` hold after every operation.
pub struct AccountLedger {
    initial_balance: f64,
    balance: f64,
    cumulative_pnl: f64,
    history: Vec<TradeRecord>,
    simulator: ExecutionSimulator,
    /// When set, used instead of Utc::now() for record timestamps
    sim_time: Option<DateTime<Utc>>,
}

impl AccountLedger {
    pub fn new(initial_balance: f64, simulator: ExecutionSimulator) -> Self {
        Self {
            initial_balance,
            balance: initial_balance,
            cumulative_pnl: 0.0,
            history: Vec::new(),
            simulator,
            sim_time: None,
        }
    }

    /// Rebuild a ledger from a journal. Balance and P&L are recomputed from
    /// the records so the ledger invariants hold regardless of the source.
    pub fn restore(
        initial_balance: f64,
        history: Vec<TradeRecord>,
        simulator: ExecutionSimulator,
    ) -> Self {
        let mut ledger = Self::new(initial_balance, simulator);
        for record in history {
            ledger.apply(record);
        }
        ledger
    }

    /// Stamp new records with a replay clock instead of the wall clock.
    pub fn set_sim_time(&mut self, t: Option<DateTime<Utc>>) {
        self.sim_time = t;
    }

    fn now(&self) -> DateTime<Utc> {
        self.sim_time.unwrap_or_else(Utc::now)
    }

    fn apply(&mut self, record: TradeRecord) {
        self.balance += record.pnl;
        self.cumulative_pnl += record.pnl;
        self.history.push(record);
    }

    /// Fill `order` through the simulator and journal the result.
    pub fn record_trade(&mut self, order: Order) -> TradeRecord {
        let settlement = self.simulator.settle(&order);

        let record = TradeRecord {
            timestamp: self.now(),
            symbol: order.symbol,
            action: order.action,
            price: round2(settlement.fill.price),
            quantity: order.quantity,
            pnl: settlement.net_pnl,
            outcome: settlement.outcome,
            reasoning: order.reasoning,
        };

        debug!(
            "Settled {} {} {} risk={:.2} gross={:.2} commission={:.2}",
            record.action,
            record.quantity,
            record.symbol,
            settlement.risk_amount,
            settlement.gross_pnl,
            settlement.fill.commission
        );

        self.apply(record.clone());
        record
    }

    pub fn reset(&mut self) {
        self.balance = self.initial_balance;
        self.cumulative_pnl = 0.0;
        self.history.clear();
    }

    pub fn initial_balance(&self) -> f64 {
        self.initial_balance
    }

    pub fn balance(&self) -> f64 {
        self.balance
    }

    pub fn cumulative_pnl(&self) -> f64 {
        self.cumulative_pnl
    }

    /// Full journal, oldest first.
    pub fn history(&self) -> &[TradeRecord] {
        &self.history
    }

    /// Up to `n` most recent records, newest first.
    pub fn recent(&self, n: usize) -> Vec<TradeRecord> {
        self.history.iter().rev().take(n).cloned().collect()
    }

    pub fn win_rate_percent(&self) -> f64 {
        if self.history.is_empty() {
            return 0.0;
        }
        let wins = self.history.iter().filter(|t| t.is_win()).count();
        round1(wins as f64 / self.history.len() as f64 * 100.0)
    }

    pub fn statistics(&self, recent: usize) -> LedgerStats {
        LedgerStats {
            balance: round2(self.balance),
            cumulative_pnl: round2(self.cumulative_pnl),
            trade_count: self.history.len(),
            win_rate_percent: self.win_rate_percent(),
            recent_history: self.recent(recent),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LedgerStats {
    pub balance: f64,
    pub cumulative_pnl: f64,
    pub trade_count: usize,
    pub win_rate_percent: f64,
    /// Newest first.
    pub recent_history: Vec<TradeRecord>,
}

fn round1(x: f64) -> f64 {
    (x * 10.0).round_ties_even() / 10.0
}
