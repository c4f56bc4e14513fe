pub mod sessions;

pub use sessions::{SessionRange, SessionWindows, SilverBullet};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::warn;

use crate::config::Config;
use crate::market::MarketData;
use crate::models::{Action, CandleSeries, Timeframe};

/// Five-minute bars requested for the analysis (covers several sessions).
const ANALYSIS_LOOKBACK: usize = 400;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Bias {
    Bullish,
    Bearish,
    Neutral,
    DataOffline,
}

impl Bias {
    pub fn to_action(self) -> Option<Action> {
        match self {
            Bias::Bullish => Some(Action::Buy),
            Bias::Bearish => Some(Action::Sell),
            Bias::Neutral | Bias::DataOffline => None,
        }
    }
}

impl fmt::Display for Bias {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Bias::Bullish => write!(f, "BULLISH"),
            Bias::Bearish => write!(f, "BEARISH"),
            Bias::Neutral => write!(f, "NEUTRAL"),
            Bias::DataOffline => write!(f, "DATA_OFFLINE"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarketAnalysis {
    pub symbol: String,
    pub price: f64,
    pub bias: Bias,
    /// Conditions behind the bias, joined with " + ".
    pub reasoning: String,
    pub rdr: Option<SessionRange>,
    pub silver_bullet: SilverBullet,
}

/// Session-range bias: price above the RDR high is bullish, below the
/// low is bearish.
pub struct SessionAnalyzer {
    windows: SessionWindows,
    symbol: String,
}

impl SessionAnalyzer {
    pub fn new(cfg: &Config) -> Self {
        Self {
            windows: SessionWindows::new(cfg),
            symbol: cfg.symbol.clone(),
        }
    }

    pub async fn analyze(
        &self,
        market: &mut dyn MarketData,
        utc_now: Option<DateTime<Utc>>,
    ) -> MarketAnalysis {
        let utc_now = utc_now.unwrap_or_else(Utc::now);
        match market
            .fetch_candles(&self.symbol, Timeframe::M5, ANALYSIS_LOOKBACK)
            .await
        {
            Ok(candles) => self.evaluate(&candles, utc_now),
            Err(e) => {
                warn!("Analysis data for {}: {}", self.symbol, e);
                self.evaluate(&CandleSeries::default(), utc_now)
            }
        }
    }

    pub fn evaluate(&self, candles: &CandleSeries, utc_now: DateTime<Utc>) -> MarketAnalysis {
        let silver_bullet = self.windows.silver_bullet(utc_now);

        let price = match candles.last() {
            Some(c) => round2(c.close),
            None => {
                return MarketAnalysis {
                    symbol: self.symbol.clone(),
                    price: 0.0,
                    bias: Bias::DataOffline,
                    reasoning: "Market Data Unavailable".to_string(),
                    rdr: None,
                    silver_bullet,
                }
            }
        };

        let rdr = self.windows.rdr_range(candles, utc_now);
        let bias = match rdr {
            Some(r) if price > r.high => Bias::Bullish,
            Some(r) if price < r.low => Bias::Bearish,
            _ => Bias::Neutral,
        };

        let mut reasons = Vec::new();
        match bias {
            Bias::Bullish => reasons.push("Price > RDR High".to_string()),
            Bias::Bearish => reasons.push("Price < RDR Low".to_string()),
            _ => {}
        }
        if silver_bullet.is_active() {
            reasons.push(format!("{} Active", silver_bullet));
        }

        MarketAnalysis {
            symbol: self.symbol.clone(),
            price,
            bias,
            reasoning: reasons.join(" + "),
            rdr,
            silver_bullet,
        }
    }
}

fn round2(x: f64) -> f64 {
    (x * 100.0).round_ties_even() / 100.0
}
