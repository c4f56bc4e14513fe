pub mod action;
pub mod candle;
pub mod timeframe;

pub use action::*;
pub use candle::{Candle, CandleSeries};
pub use timeframe::Timeframe;
