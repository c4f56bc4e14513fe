use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::DateTime;
use reqwest::Client;
use serde::Deserialize;
use std::collections::HashMap;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

use crate::config::Config;
use crate::market::MarketData;
use crate::models::{Candle, CandleSeries, Timeframe};

const BASE_URL: &str = "https://query1.finance.yahoo.com";
const MIN_REQUEST_INTERVAL: Duration = Duration::from_millis(250);
const USER_AGENT: &str = "Mozilla/5.0 (compatible; ict-paper-journal)";

#[derive(Debug, Deserialize)]
struct ChartResponse {
    chart: Chart,
}

#[derive(Debug, Deserialize)]
struct Chart {
    #[serde(default)]
    result: Option<Vec<ChartResult>>,
    #[serde(default)]
    error: Option<ChartError>,
}

#[derive(Debug, Deserialize)]
struct ChartError {
    #[serde(default)]
    code: String,
    #[serde(default)]
    description: String,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    #[serde(default)]
    timestamp: Vec<i64>,
    indicators: Indicators,
}

#[derive(Debug, Deserialize)]
struct Indicators {
    #[serde(default)]
    quote: Vec<Quote>,
}

/// Columns are parallel to `timestamp`; Yahoo emits `null` for empty bars.
#[derive(Debug, Default, Deserialize)]
struct Quote {
    #[serde(default)]
    open: Vec<Option<f64>>,
    #[serde(default)]
    high: Vec<Option<f64>>,
    #[serde(default)]
    low: Vec<Option<f64>>,
    #[serde(default)]
    close: Vec<Option<f64>>,
    #[serde(default)]
    volume: Vec<Option<f64>>,
}

/// Yahoo Finance chart API client. Retries against a fallback symbol when
/// the primary returns no bars (e.g. `NQ=F` outside futures hours).
pub struct YahooClient {
    client: Client,
    fallback_symbol: Option<String>,
    last_request: Option<Instant>,
    cache: HashMap<String, (Instant, CandleSeries)>,
    cache_ttl: Duration,
}

impl YahooClient {
    pub fn new(cfg: &Config) -> Self {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .build()
            .unwrap_or_else(|_| Client::new());
        let fallback = cfg.fallback_symbol.trim();
        Self {
            client,
            fallback_symbol: (!fallback.is_empty()).then(|| fallback.to_string()),
            last_request: None,
            cache: HashMap::new(),
            cache_ttl: Duration::from_secs(5),
        }
    }

    async fn rate_limit(&mut self) {
        if let Some(last) = self.last_request {
            let elapsed = last.elapsed();
            if elapsed < MIN_REQUEST_INTERVAL {
                tokio::time::sleep(MIN_REQUEST_INTERVAL - elapsed).await;
            }
        }
        self.last_request = Some(Instant::now());
    }

    async fn fetch_chart(
        &mut self,
        symbol: &str,
        tf: Timeframe,
        limit: usize,
    ) -> Result<CandleSeries> {
        let range = tf.yahoo_range(limit);
        let cache_key = format!("{}_{}_{}", symbol, tf, range);
        if let Some((cached_at, series)) = self.cache.get(&cache_key) {
            if cached_at.elapsed() < self.cache_ttl {
                debug!("Cache hit {}", cache_key);
                return Ok(series.tail(limit));
            }
        }

        self.rate_limit().await;

        let resp = self
            .client
            .get(format!("{}/v8/finance/chart/{}", BASE_URL, symbol))
            .query(&[("interval", tf.as_str()), ("range", range)])
            .send()
            .await
            .context("Failed to fetch chart")?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            anyhow::bail!("Yahoo chart error {}: {}", status, body);
        }

        let data: ChartResponse = resp.json().await.context("Failed to parse chart response")?;
        if let Some(err) = data.chart.error {
            anyhow::bail!("Yahoo chart error {}: {}", err.code, err.description);
        }

        let series = data
            .chart
            .result
            .and_then(|r| r.into_iter().next())
            .map(parse_chart)
            .unwrap_or_default();

        self.cache
            .insert(cache_key, (Instant::now(), series.clone()));

        Ok(series.tail(limit))
    }
}

fn parse_chart(result: ChartResult) -> CandleSeries {
    let quote = result.indicators.quote.into_iter().next().unwrap_or_default();
    let col = |v: &[Option<f64>], i: usize| v.get(i).copied().flatten();

    let mut candles: Vec<Candle> = result
        .timestamp
        .iter()
        .enumerate()
        .filter_map(|(i, &ts)| {
            Some(Candle {
                timestamp: DateTime::from_timestamp(ts, 0)?,
                open: col(&quote.open, i)?,
                high: col(&quote.high, i)?,
                low: col(&quote.low, i)?,
                close: col(&quote.close, i)?,
                volume: col(&quote.volume, i).unwrap_or(0.0),
            })
        })
        .collect();

    candles.sort_by_key(|c| c.timestamp);
    CandleSeries::new(candles)
}

#[async_trait]
impl MarketData for YahooClient {
    async fn fetch_candles(
        &mut self,
        symbol: &str,
        tf: Timeframe,
        limit: usize,
    ) -> Result<CandleSeries> {
        let primary = self.fetch_chart(symbol, tf, limit).await?;
        if !primary.is_empty() {
            return Ok(primary);
        }

        if let Some(fallback) = self.fallback_symbol.clone() {
            if fallback != symbol {
                warn!("No {} bars for {}, falling back to {}", tf, symbol, fallback);
                let series = self.fetch_chart(&fallback, tf, limit).await?;
                if !series.is_empty() {
                    return Ok(series);
                }
            }
        }

        anyhow::bail!("No {} candles for {}", tf, symbol)
    }

    async fn current_price(&mut self, symbol: &str) -> Result<f64> {
        let series = self.fetch_candles(symbol, Timeframe::M1, 60).await?;
        series
            .last()
            .map(|c| c.close)
            .context("No price in chart response")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_chart_and_skips_null_bars() {
        let json = r#"{
            "chart": {
                "result": [{
                    "timestamp": [1705330800, 1705330860, 1705330920],
                    "indicators": {
                        "quote": [{
                            "open":   [17000.0, null, 17002.0],
                            "high":   [17005.0, null, 17006.0],
                            "low":    [16998.0, null, 17001.0],
                            "close":  [17004.0, null, 17003.5],
                            "volume": [120, null, null]
                        }]
                    }
                }],
                "error": null
            }
        }"#;
        let resp: ChartResponse = serde_json::from_str(json).unwrap();
        let result = resp.chart.result.unwrap().into_iter().next().unwrap();
        let series = parse_chart(result);
        assert_eq!(series.len(), 2);
        assert!((series[0].close - 17004.0).abs() < 1e-9);
        assert!((series[1].close - 17003.5).abs() < 1e-9);
        assert_eq!(series[1].volume, 0.0);
    }

    #[test]
    fn parses_chart_error() {
        let json = r#"{"chart":{"result":null,"error":{"code":"Not Found","description":"No data found, symbol may be delisted"}}}"#;
        let resp: ChartResponse = serde_json::from_str(json).unwrap();
        assert!(resp.chart.result.is_none());
        assert_eq!(resp.chart.error.unwrap().code, "Not Found");
    }

    #[test]
    fn empty_quote_gives_empty_series() {
        let json = r#"{"chart":{"result":[{"indicators":{"quote":[{}]}}],"error":null}}"#;
        let resp: ChartResponse = serde_json::from_str(json).unwrap();
        let result = resp.chart.result.unwrap().into_iter().next().unwrap();
        assert!(parse_chart(result).is_empty());
    }
}
