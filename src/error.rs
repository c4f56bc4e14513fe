use crate::trading::gate::GateReason;

/// Errors surfaced by the paper desk.
#[derive(Debug, thiserror::Error)]
pub enum DeskError {
    #[error("market data unavailable for {symbol}: {reason}")]
    DataUnavailable { symbol: String, reason: String },

    #[error("trade rejected: {0}")]
    TradeRejected(GateReason),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, DeskError>;
