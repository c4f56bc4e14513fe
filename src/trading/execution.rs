use serde::{Deserialize, Serialize};

use crate::config::Config;
use crate::models::{Action, Outcome};
use crate::trading::randomness::FillRandomness;

/// A sized order ready to be filled.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    pub symbol: String,
    pub action: Action,
    pub quantity: u32,
    pub reference_price: f64,
    pub stop_price: f64,
    /// Currency value of one point for one contract.
    pub point_value: f64,
    pub reasoning: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Fill {
    pub price: f64,
    pub commission: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Settlement {
    pub fill: Fill,
    pub outcome: Outcome,
    /// Currency at risk between the fill and the stop.
    pub risk_amount: f64,
    pub reward_multiple: Option<f64>,
    pub gross_pnl: f64,
    /// Gross minus commission, rounded to cents.
    pub net_pnl: f64,
}

/// Simplified fill and outcome model: discrete adverse slippage, flat
/// per-contract commission, and a weighted coin for WIN/LOSS.
pub struct ExecutionSimulator {
    commission_per_contract: f64,
    slippage_steps: Vec<f64>,
    win_probability: f64,
    reward_multiple_min: f64,
    reward_multiple_max: f64,
    rng: Box<dyn FillRandomness>,
}

impl ExecutionSimulator {
    pub fn new(cfg: &Config, rng: Box<dyn FillRandomness>) -> Self {
        Self {
            commission_per_contract: cfg.commission_per_contract,
            slippage_steps: cfg.slippage_steps.clone(),
            win_probability: cfg.win_probability,
            reward_multiple_min: cfg.reward_multiple_min,
            reward_multiple_max: cfg.reward_multiple_max,
            rng,
        }
    }

    pub fn fill(&mut self, reference_price: f64, action: Action, quantity: u32) -> Fill {
        let slippage = self.rng.slippage(&self.slippage_steps);
        Fill {
            price: reference_price + action.sign() * slippage,
            commission: self.commission_per_contract * quantity as f64,
        }
    }

    pub fn outcome(&mut self) -> Outcome {
        self.rng.outcome(self.win_probability)
    }

    /// Fill the order, draw its outcome and compute realized P&L.
    pub fn settle(&mut self, order: &Order) -> Settlement {
        let fill = self.fill(order.reference_price, order.action, order.quantity);
        let outcome = self.outcome();

        let risk_amount =
            (fill.price - order.stop_price).abs() * order.quantity as f64 * order.point_value;

        let (gross_pnl, reward_multiple) = match outcome {
            Outcome::Win => {
                let rr = self
                    .rng
                    .reward_multiple(self.reward_multiple_min, self.reward_multiple_max);
                (risk_amount * rr, Some(rr))
            }
            Outcome::Loss => (-risk_amount, None),
        };

        Settlement {
            fill,
            outcome,
            risk_amount,
            reward_multiple,
            gross_pnl,
            net_pnl: round2(gross_pnl - fill.commission),
        }
    }
}

pub(crate) fn round2(x: f64) -> f64 {
    (x * 100.0).round_ties_even() / 100.0
}
