//! Strategy analysis module
//!
//! Converts tradeable signals into parametrized trade decisions

mod analyzer;
mod oracle;
mod sizing;
mod types;

pub use analyzer::{default_params, StrategyAnalyzer};
pub use oracle::{FixedPriceOracle, PriceError, PriceOracle};
pub use sizing::calculate_position_size;
pub use types::{
    HistoricalPerformance, Recommendation, StrategyMetadata, StrategyParams, TradeSignal,
};
