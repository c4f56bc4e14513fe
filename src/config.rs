use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Wall-clock window in America/New_York, inclusive at both ends.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionTime {
    pub start: (u32, u32),
    pub end: (u32, u32),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    // Market data
    pub symbol: String,
    pub fallback_symbol: String,
    pub market_data_timeout_secs: u64,

    // Instrument
    pub instrument_root: String,

    // Account
    pub initial_balance: f64,

    // Risk
    pub risk_per_trade: f64,
    pub max_daily_loss: f64,
    pub max_daily_trades: u32,
    pub stop_distance: f64,
    pub min_stop_distance: f64,

    // Execution
    pub commission_per_contract: f64,
    pub slippage_steps: Vec<f64>,
    pub win_probability: f64,
    pub reward_multiple_min: f64,
    pub reward_multiple_max: f64,

    // Reporting
    pub recent_history_len: usize,

    // Sessions (hour, minute in America/New_York)
    pub sessions: HashMap<String, SessionTime>,

    // Logging
    pub log_dir: String,
    pub log_level: String,
}

impl Config {
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        let env = |key: &str, default: &str| -> String {
            std::env::var(key).unwrap_or_else(|_| default.to_string())
        };

        Config {
            symbol: env("SYMBOL", "NQ=F"),
            fallback_symbol: env("FALLBACK_SYMBOL", "QQQ"),
            market_data_timeout_secs: env("MARKET_DATA_TIMEOUT", "10").parse().unwrap_or(10),
            instrument_root: env("INSTRUMENT", "NQ").to_uppercase(),
            initial_balance: env("INITIAL_BALANCE", "100000")
                .parse()
                .unwrap_or(100_000.0),
            risk_per_trade: env("RISK_PER_TRADE", "0.005").parse().unwrap_or(0.005), // 0.5% of balance
            max_daily_loss: env("MAX_DAILY_LOSS", "1000").parse().unwrap_or(1000.0),
            max_daily_trades: env("MAX_DAILY_TRADES", "5").parse().unwrap_or(5),
            stop_distance: env("STOP_DISTANCE", "20").parse().unwrap_or(20.0),
            min_stop_distance: 10.0,
            commission_per_contract: env("COMMISSION", "2.0").parse().unwrap_or(2.0),
            slippage_steps: vec![0.0, 0.25, 0.5],
            win_probability: env("WIN_PROBABILITY", "0.6667")
                .parse()
                .unwrap_or(2.0 / 3.0),
            reward_multiple_min: 1.5,
            reward_multiple_max: 3.0,
            recent_history_len: 10,
            sessions: default_sessions(),
            log_dir: env("LOG_DIR", "logs"),
            log_level: "INFO".to_string(),
        }
    }

    pub fn journal_file(&self) -> String {
        format!("{}/journal.json", self.log_dir)
    }
}

pub fn default_sessions() -> HashMap<String, SessionTime> {
    let mut sessions = HashMap::new();
    sessions.insert(
        "rdr".to_string(),
        SessionTime {
            start: (9, 30),
            end: (10, 30),
        },
    );
    sessions.insert(
        "am_silver_bullet".to_string(),
        SessionTime {
            start: (10, 0),
            end: (11, 0),
        },
    );
    sessions.insert(
        "pm_silver_bullet".to_string(),
        SessionTime {
            start: (14, 0),
            end: (15, 0),
        },
    );
    sessions
}
