use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Timeframe {
    #[serde(rename = "1m")]
    M1,
    #[serde(rename = "5m")]
    M5,
    #[serde(rename = "15m")]
    M15,
    #[serde(rename = "1h")]
    H1,
}

impl Timeframe {
    pub fn as_str(&self) -> &'static str {
        match self {
            Timeframe::M1 => "1m",
            Timeframe::M5 => "5m",
            Timeframe::M15 => "15m",
            Timeframe::H1 => "1h",
        }
    }

    pub fn as_duration(&self) -> Duration {
        match self {
            Timeframe::M1 => Duration::from_secs(60),
            Timeframe::M5 => Duration::from_secs(300),
            Timeframe::M15 => Duration::from_secs(900),
            Timeframe::H1 => Duration::from_secs(3600),
        }
    }

    /// Yahoo chart API `range` wide enough to cover `limit` bars.
    /// Intraday bars are only served for short ranges.
    pub fn yahoo_range(&self, limit: usize) -> &'static str {
        let secs = self.as_duration().as_secs() * limit as u64;
        match self {
            Timeframe::M1 if secs <= 86_400 => "1d",
            Timeframe::M1 => "5d",
            _ if secs <= 86_400 => "1d",
            _ if secs <= 5 * 86_400 => "5d",
            _ => "1mo",
        }
    }
}

impl fmt::Display for Timeframe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn yahoo_range_grows_with_lookback() {
        assert_eq!(Timeframe::M1.yahoo_range(60), "1d");
        assert_eq!(Timeframe::M1.yahoo_range(5000), "5d");
        assert_eq!(Timeframe::M5.yahoo_range(200), "1d");
        assert_eq!(Timeframe::M5.yahoo_range(1000), "5d");
        assert_eq!(Timeframe::H1.yahoo_range(500), "1mo");
    }
}
