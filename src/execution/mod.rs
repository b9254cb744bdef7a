//! Execution engine module
//!
//! Handles order submission (paper and live modes)

mod broker;
mod engine;
mod paper;
mod types;

pub use broker::{
    create_broker, Broker, BrokerError, BrokerKind, FyersBroker, KiteBroker, FYERS_API_URL,
    KITE_API_URL,
};
pub use engine::{ExecutionEngine, LiveOrderRouter, Venue};
pub use paper::PaperLedger;
pub use types::{
    ExecutionResult, ExecutionStatus, Order, OrderAck, OrderRequest, OrderSide, OrderSummary, OrderType,
    Position, PositionSummary,
};
