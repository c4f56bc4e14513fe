#![allow(dead_code)]

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use std::time::Duration as StdDuration;

use ict_paper_journal::config::Config;
use ict_paper_journal::market::MarketData;
use ict_paper_journal::models::{Candle, CandleSeries, Timeframe};

/// Create candles from (open, high, low, close) tuples with auto-incrementing 1m timestamps.
pub fn make_candles(data: &[(f64, f64, f64, f64)]) -> Vec<Candle> {
    let base = DateTime::parse_from_rfc3339("2024-01-15T12:00:00Z")
        .unwrap()
        .with_timezone(&Utc);

    data.iter()
        .enumerate()
        .map(|(i, &(o, h, l, c))| Candle {
            timestamp: base + Duration::minutes(i as i64),
            open: o,
            high: h,
            low: l,
            close: c,
            volume: 100.0,
        })
        .collect()
}

/// Reference account: 100k, 0.5% risk, 1000 loss limit, 5 trades, NQ.
pub fn test_config() -> Config {
    let mut cfg = Config::from_env();
    cfg.symbol = "NQ=F".to_string();
    cfg.instrument_root = "NQ".to_string();
    cfg.initial_balance = 100_000.0;
    cfg.risk_per_trade = 0.005;
    cfg.max_daily_loss = 1000.0;
    cfg.max_daily_trades = 5;
    cfg.stop_distance = 20.0;
    cfg.commission_per_contract = 2.0;
    cfg.slippage_steps = vec![0.0, 0.25, 0.5];
    cfg.market_data_timeout_secs = 1;
    cfg.log_dir = std::env::temp_dir()
        .join(format!("ict_journal_integ_{}", std::process::id()))
        .to_string_lossy()
        .to_string();
    cfg
}

/// Quotes a constant price for every symbol.
pub struct ConstantQuote(pub f64);

#[async_trait]
impl MarketData for ConstantQuote {
    async fn fetch_candles(
        &mut self,
        _symbol: &str,
        _tf: Timeframe,
        _limit: usize,
    ) -> Result<CandleSeries> {
        let p = self.0;
        Ok(CandleSeries::new(make_candles(&[(p, p, p, p)])))
    }

    async fn current_price(&mut self, _symbol: &str) -> Result<f64> {
        Ok(self.0)
    }
}

/// Never answers within any reasonable timeout.
pub struct StalledFeed;

#[async_trait]
impl MarketData for StalledFeed {
    async fn fetch_candles(
        &mut self,
        symbol: &str,
        _tf: Timeframe,
        _limit: usize,
    ) -> Result<CandleSeries> {
        tokio::time::sleep(StdDuration::from_secs(60)).await;
        anyhow::bail!("stalled feed for {}", symbol)
    }

    async fn current_price(&mut self, symbol: &str) -> Result<f64> {
        tokio::time::sleep(StdDuration::from_secs(60)).await;
        anyhow::bail!("stalled feed for {}", symbol)
    }
}
