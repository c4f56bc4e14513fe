use chrono::{DateTime, NaiveTime, TimeZone, Utc};
use chrono_tz::US::Eastern;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::config::{default_sessions, Config, SessionTime};
use crate::models::CandleSeries;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SilverBullet {
    Am,
    Pm,
    OffHours,
}

impl SilverBullet {
    pub fn is_active(&self) -> bool {
        !matches!(self, SilverBullet::OffHours)
    }
}

impl fmt::Display for SilverBullet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SilverBullet::Am => write!(f, "AM SILVER BULLET"),
            SilverBullet::Pm => write!(f, "PM SILVER BULLET"),
            SilverBullet::OffHours => write!(f, "OFF HOURS"),
        }
    }
}

/// High/low/mid of one session window.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SessionRange {
    pub high: f64,
    pub low: f64,
    pub mid: f64,
}

/// Named New York time windows: the RDR range and the two silver bullets.
pub struct SessionWindows {
    rdr: SessionTime,
    am_silver_bullet: SessionTime,
    pm_silver_bullet: SessionTime,
}

impl SessionWindows {
    pub fn new(cfg: &Config) -> Self {
        let defaults = default_sessions();
        let pick = |name: &str| {
            cfg.sessions
                .get(name)
                .or_else(|| defaults.get(name))
                .cloned()
                .unwrap_or(SessionTime {
                    start: (0, 0),
                    end: (0, 0),
                })
        };
        Self {
            rdr: pick("rdr"),
            am_silver_bullet: pick("am_silver_bullet"),
            pm_silver_bullet: pick("pm_silver_bullet"),
        }
    }

    /// Silver bullet window at `utc_now`; both window edges are inclusive.
    pub fn silver_bullet(&self, utc_now: DateTime<Utc>) -> SilverBullet {
        let et_time = utc_now.with_timezone(&Eastern).time();
        if in_window(&self.am_silver_bullet, et_time) {
            SilverBullet::Am
        } else if in_window(&self.pm_silver_bullet, et_time) {
            SilverBullet::Pm
        } else {
            SilverBullet::OffHours
        }
    }

    /// RDR range for the New York trading day containing `utc_now`.
    /// `None` when no candle falls inside the window.
    pub fn rdr_range(&self, candles: &CandleSeries, utc_now: DateTime<Utc>) -> Option<SessionRange> {
        let today = utc_now.with_timezone(&Eastern).date_naive();
        let at = |(h, m): (u32, u32)| {
            let naive = today.and_hms_opt(h, m, 0)?;
            Eastern
                .from_local_datetime(&naive)
                .single()
                .map(|t| t.with_timezone(&Utc))
        };
        let start = at(self.rdr.start)?;
        let end = at(self.rdr.end)?;

        let (high, low) = candles.between(start, end).high_low()?;
        let (high, low) = (round2(high), round2(low));
        Some(SessionRange {
            high,
            low,
            mid: round2((high + low) / 2.0),
        })
    }
}

fn in_window(window: &SessionTime, t: NaiveTime) -> bool {
    let (Some(start), Some(end)) = (
        NaiveTime::from_hms_opt(window.start.0, window.start.1, 0),
        NaiveTime::from_hms_opt(window.end.0, window.end.1, 0),
    ) else {
        return false;
    };
    start <= t && t <= end
}

fn round2(x: f64) -> f64 {
    (x * 100.0).round_ties_even() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Candle;
    use crate::test_helpers::default_test_config;
    use chrono::{Duration, NaiveDate};

    fn make_utc_for_et(et_hour: u32, et_minute: u32, et_second: u32) -> DateTime<Utc> {
        // ET is UTC-5 (standard time) in January.
        let date = NaiveDate::from_ymd_opt(2024, 1, 15).unwrap();
        let naive = date.and_hms_opt(et_hour + 5, et_minute, et_second).unwrap();
        Utc.from_utc_datetime(&naive)
    }

    fn five_minute_bars(from: DateTime<Utc>, prices: &[(f64, f64)]) -> CandleSeries {
        let candles = prices
            .iter()
            .enumerate()
            .map(|(i, &(high, low))| Candle {
                timestamp: from + Duration::minutes(5 * i as i64),
                open: (high + low) / 2.0,
                high,
                low,
                close: (high + low) / 2.0,
                volume: 100.0,
            })
            .collect();
        CandleSeries::new(candles)
    }

    #[test]
    fn am_silver_bullet_inclusive_edges() {
        let w = SessionWindows::new(&default_test_config());
        assert_eq!(w.silver_bullet(make_utc_for_et(10, 0, 0)), SilverBullet::Am);
        assert_eq!(w.silver_bullet(make_utc_for_et(10, 30, 0)), SilverBullet::Am);
        assert_eq!(w.silver_bullet(make_utc_for_et(11, 0, 0)), SilverBullet::Am);
        assert_eq!(w.silver_bullet(make_utc_for_et(11, 0, 1)), SilverBullet::OffHours);
        assert_eq!(w.silver_bullet(make_utc_for_et(9, 59, 59)), SilverBullet::OffHours);
    }

    #[test]
    fn pm_silver_bullet() {
        let w = SessionWindows::new(&default_test_config());
        assert_eq!(w.silver_bullet(make_utc_for_et(14, 15, 0)), SilverBullet::Pm);
        assert!(w.silver_bullet(make_utc_for_et(14, 15, 0)).is_active());
        assert_eq!(w.silver_bullet(make_utc_for_et(16, 0, 0)), SilverBullet::OffHours);
        assert!(!SilverBullet::OffHours.is_active());
    }

    #[test]
    fn rdr_range_uses_only_window_candles() {
        let w = SessionWindows::new(&default_test_config());
        // 09:00 ET .. 11:00 ET in 5 minute bars (25 bars)
        let start = make_utc_for_et(9, 0, 0);
        let mut bars: Vec<(f64, f64)> = vec![(100.0, 99.0); 25];
        bars[0] = (500.0, 1.0); // 09:00, outside the window
        bars[6] = (120.0, 110.0); // 09:30, first bar inside
        bars[12] = (130.0, 95.5); // 10:00
        bars[18] = (101.0, 90.25); // 10:30, last bar inside
        bars[19] = (900.0, 10.0); // 10:35, outside
        let candles = five_minute_bars(start, &bars);

        let range = w.rdr_range(&candles, make_utc_for_et(12, 0, 0)).unwrap();
        assert_eq!(range.high, 130.0);
        assert_eq!(range.low, 90.25);
        assert_eq!(range.mid, 110.12);
    }

    #[test]
    fn rdr_range_none_without_window_candles() {
        let w = SessionWindows::new(&default_test_config());
        let candles = five_minute_bars(make_utc_for_et(12, 0, 0), &[(100.0, 99.0); 6]);
        assert!(w.rdr_range(&candles, make_utc_for_et(13, 0, 0)).is_none());
        assert!(w
            .rdr_range(&CandleSeries::default(), make_utc_for_et(13, 0, 0))
            .is_none());
    }

    #[test]
    fn rdr_range_is_for_the_current_new_york_day() {
        let w = SessionWindows::new(&default_test_config());
        let yesterday = make_utc_for_et(9, 30, 0) - Duration::days(1);
        let candles = five_minute_bars(yesterday, &[(100.0, 99.0); 12]);
        assert!(w.rdr_range(&candles, make_utc_for_et(10, 0, 0)).is_none());
    }
}
