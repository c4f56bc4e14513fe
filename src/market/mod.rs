pub mod replay;
pub mod yahoo;

pub use replay::ReplayFeed;
pub use yahoo::YahooClient;

use anyhow::Result;
use async_trait::async_trait;

use crate::models::{CandleSeries, Timeframe};

/// Price and candle source consumed by the desk and the session analysis.
/// Empty data is reported as an error, never as a zero price.
#[async_trait]
pub trait MarketData: Send + Sync {
    async fn fetch_candles(
        &mut self,
        symbol: &str,
        tf: Timeframe,
        limit: usize,
    ) -> Result<CandleSeries>;
    async fn current_price(&mut self, symbol: &str) -> Result<f64>;
}
