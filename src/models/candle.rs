use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One OHLCV bar. `timestamp` is the bar open.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candle {
    pub timestamp: DateTime<Utc>,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

/// Oldest-first bars for one symbol and timeframe.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct CandleSeries {
    candles: Vec<Candle>,
}

impl CandleSeries {
    pub fn new(candles: Vec<Candle>) -> Self {
        Self { candles }
    }

    pub fn len(&self) -> usize {
        self.candles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.candles.is_empty()
    }

    pub fn last(&self) -> Option<&Candle> {
        self.candles.last()
    }

    /// The latest `n` bars.
    pub fn tail(&self, n: usize) -> CandleSeries {
        let start = self.candles.len().saturating_sub(n);
        CandleSeries::new(self.candles[start..].to_vec())
    }

    /// Highest high and lowest low, or `None` for an empty series.
    pub fn high_low(&self) -> Option<(f64, f64)> {
        if self.candles.is_empty() {
            return None;
        }
        Some(self.candles.iter().fold(
            (f64::NEG_INFINITY, f64::INFINITY),
            |(hi, lo), c| (hi.max(c.high), lo.min(c.low)),
        ))
    }

    /// Bars opening within `[start, end]`.
    pub fn between(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> CandleSeries {
        self.candles
            .iter()
            .filter(|c| (start..=end).contains(&c.timestamp))
            .cloned()
            .collect::<Vec<_>>()
            .into()
    }
}

impl From<Vec<Candle>> for CandleSeries {
    fn from(candles: Vec<Candle>) -> Self {
        Self::new(candles)
    }
}

impl std::ops::Index<usize> for CandleSeries {
    type Output = Candle;
    fn index(&self, index: usize) -> &Self::Output {
        &self.candles[index]
    }
}

impl IntoIterator for CandleSeries {
    type Item = Candle;
    type IntoIter = std::vec::IntoIter<Candle>;
    fn into_iter(self) -> Self::IntoIter {
        self.candles.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::make_candles;

    #[test]
    fn high_low_spans_all_bars() {
        let s = make_candles(&[
            (100.0, 200.0, 50.0, 150.0),
            (150.0, 300.0, 80.0, 250.0),
            (250.0, 280.0, 60.0, 270.0),
        ]);
        assert_eq!(s.high_low(), Some((300.0, 50.0)));
        assert_eq!(CandleSeries::default().high_low(), None);
    }

    #[test]
    fn tail_keeps_latest() {
        let s = make_candles(&[
            (100.0, 105.0, 95.0, 102.0),
            (102.0, 108.0, 100.0, 106.0),
            (106.0, 112.0, 104.0, 110.0),
        ]);
        let tail = s.tail(2);
        assert_eq!(tail.len(), 2);
        assert_eq!(tail[0].open, 102.0);
        assert_eq!(s.tail(10).len(), 3);
    }

    #[test]
    fn between_includes_both_ends() {
        let s = make_candles(&[
            (1.0, 1.0, 1.0, 1.0),
            (2.0, 2.0, 2.0, 2.0),
            (3.0, 3.0, 3.0, 3.0),
            (4.0, 4.0, 4.0, 4.0),
        ]);
        let window = s.between(s[1].timestamp, s[2].timestamp);
        assert_eq!(window.len(), 2);
        assert_eq!(window[0].open, 2.0);
        assert_eq!(window[1].open, 3.0);
    }
}
