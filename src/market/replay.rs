use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;

use crate::market::MarketData;
use crate::models::{Candle, CandleSeries, Timeframe};

/// Replays pre-loaded candles. A cursor (`now`) controls which candles are
/// visible: only those with timestamp <= now are returned.
pub struct ReplayFeed {
    data: HashMap<(String, Timeframe), Vec<Candle>>,
    now: DateTime<Utc>,
}

impl ReplayFeed {
    pub fn new() -> Self {
        Self {
            data: HashMap::new(),
            now: Utc::now(),
        }
    }

    /// Load candles for one symbol and timeframe. Candles must be sorted
    /// oldest-first.
    pub fn load(&mut self, symbol: &str, tf: Timeframe, candles: Vec<Candle>) {
        self.data.insert((symbol.to_string(), tf), candles);
    }

    pub fn set_time(&mut self, t: DateTime<Utc>) {
        self.now = t;
    }

    pub fn current_time(&self) -> DateTime<Utc> {
        self.now
    }

    pub fn latest_time(&self) -> Option<DateTime<Utc>> {
        self.data
            .values()
            .filter_map(|v| v.last().map(|c| c.timestamp))
            .max()
    }

    fn visible_candles(&self, symbol: &str, tf: Timeframe, limit: usize) -> CandleSeries {
        let all = match self.data.get(&(symbol.to_string(), tf)) {
            Some(all) => all,
            None => return CandleSeries::default(),
        };

        let end = match all.partition_point(|c| c.timestamp <= self.now) {
            0 => return CandleSeries::default(),
            n => n,
        };

        let start = end.saturating_sub(limit);
        CandleSeries::new(all[start..end].to_vec())
    }
}

impl Default for ReplayFeed {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl MarketData for ReplayFeed {
    async fn fetch_candles(
        &mut self,
        symbol: &str,
        tf: Timeframe,
        limit: usize,
    ) -> Result<CandleSeries> {
        let series = self.visible_candles(symbol, tf, limit);
        if series.is_empty() {
            anyhow::bail!("No {} candles for {} at {}", tf, symbol, self.now);
        }
        Ok(series)
    }

    async fn current_price(&mut self, symbol: &str) -> Result<f64> {
        // Finest timeframe wins
        [Timeframe::M1, Timeframe::M5, Timeframe::M15, Timeframe::H1]
            .into_iter()
            .find_map(|tf| self.visible_candles(symbol, tf, 1).last().map(|c| c.close))
            .with_context(|| format!("No price data for {} at {}", symbol, self.now))
    }
}
