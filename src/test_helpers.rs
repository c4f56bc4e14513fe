use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};

use crate::config::{default_sessions, Config};
use crate::market::MarketData;
use crate::models::{Candle, CandleSeries, Timeframe};

/// Create candles from (open, high, low, close) tuples with auto-incrementing 1m timestamps.
pub fn make_candles(data: &[(f64, f64, f64, f64)]) -> CandleSeries {
    let base = DateTime::parse_from_rfc3339("2024-01-15T12:00:00Z")
        .unwrap()
        .with_timezone(&Utc);

    let candles: Vec<Candle> = data
        .iter()
        .enumerate()
        .map(|(i, &(o, h, l, c))| Candle {
            timestamp: base + Duration::minutes(i as i64),
            open: o,
            high: h,
            low: l,
            close: c,
            volume: 100.0,
        })
        .collect();

    CandleSeries::new(candles)
}

/// Market data that always quotes the same price, or nothing at all.
pub struct FixedPrice {
    price: Option<f64>,
}

impl FixedPrice {
    pub fn new(price: Option<f64>) -> Self {
        Self { price }
    }
}

#[async_trait]
impl MarketData for FixedPrice {
    async fn fetch_candles(
        &mut self,
        symbol: &str,
        tf: Timeframe,
        _limit: usize,
    ) -> Result<CandleSeries> {
        match self.price {
            Some(p) => Ok(make_candles(&[(p, p, p, p)])),
            None => anyhow::bail!("No {} candles for {}", tf, symbol),
        }
    }

    async fn current_price(&mut self, symbol: &str) -> Result<f64> {
        match self.price {
            Some(p) => Ok(p),
            None => anyhow::bail!("No price data for {}", symbol),
        }
    }
}

/// A Config suitable for testing: reference limits, no environment, temp log dir.
pub fn default_test_config() -> Config {
    Config {
        symbol: "NQ=F".to_string(),
        fallback_symbol: "QQQ".to_string(),
        market_data_timeout_secs: 5,
        instrument_root: "NQ".to_string(),
        initial_balance: 100_000.0,
        risk_per_trade: 0.005,
        max_daily_loss: 1000.0,
        max_daily_trades: 5,
        stop_distance: 20.0,
        min_stop_distance: 10.0,
        commission_per_contract: 2.0,
        slippage_steps: vec![0.0, 0.25, 0.5],
        win_probability: 2.0 / 3.0,
        reward_multiple_min: 1.5,
        reward_multiple_max: 3.0,
        recent_history_len: 10,
        sessions: default_sessions(),
        log_dir: std::env::temp_dir()
            .join("ict_journal_test")
            .to_string_lossy()
            .to_string(),
        log_level: "ERROR".to_string(),
    }
}
