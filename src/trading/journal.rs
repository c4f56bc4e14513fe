use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::error::Result;
use crate::trading::trade_record::TradeRecord;

/// Serializable desk state for carrying a journal between runs.
/// Balance, P&L and `trades_today` are informational; a restore recomputes
/// them from `initial_balance` and `history`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DeskSnapshot {
    pub initial_balance: f64,
    pub balance: f64,
    pub cumulative_pnl: f64,
    pub trades_today: u32,
    pub history: Vec<TradeRecord>,
    #[serde(default)]
    pub saved_at: Option<DateTime<Utc>>,
}

impl DeskSnapshot {
    /// Missing file loads as `None`.
    pub fn load_from_path(path: &Path) -> Result<Option<Self>> {
        if !path.exists() {
            return Ok(None);
        }
        let content = fs::read_to_string(path)?;
        Ok(Some(serde_json::from_str(&content)?))
    }

    pub fn save_to_path(&mut self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        self.saved_at = Some(Utc::now());
        let content = serde_json::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }
}
