pub mod desk;
pub mod execution;
pub mod gate;
pub mod journal;
pub mod ledger;
pub mod randomness;
pub mod sizer;
pub mod trade_record;

pub use desk::{
    AccountStatus, AttemptResult, AttemptStatus, FillConfirmation, PaperDesk, ResetAck,
    TradeIntent,
};
pub use gate::{GateReason, RiskGate};
pub use journal::DeskSnapshot;
pub use ledger::AccountLedger;
pub use randomness::{FillRandomness, RngRandomness, ScriptedRandomness};
pub use sizer::{Instrument, PositionSizer, SizingDecision};
pub use trade_record::TradeRecord;
