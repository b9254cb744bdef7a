//! Risk management module
//!
//! Pre-trade gating against daily trade, loss and exposure limits

mod gate;
mod types;

pub use gate::RiskGate;
pub use types::{RiskError, RiskReport, RiskState, RiskStatus};
