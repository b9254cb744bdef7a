//! Risk management types

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A failed pre-trade condition
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RiskError {
    /// Daily trade count at its maximum
    #[error("Daily trade limit reached: {count}/{max}")]
    DailyTradeLimit { count: u32, max: u32 },
    /// Proposed order value above the per-position cap
    #[error("Position value {value} exceeds limit {max}")]
    PositionTooLarge { value: Decimal, max: Decimal },
    /// Weekend or outside the configured hours
    #[error("Outside trading hours: {0}")]
    OutsideTradingHours(String),
    /// Daily P&L below the circuit breaker
    #[error("Daily loss limit breached: {pnl} < {limit}")]
    DailyLossLimit { pnl: Decimal, limit: Decimal },
    /// Confidence under the gate minimum
    #[error("Confidence {confidence} below minimum {min}")]
    LowConfidence { confidence: Decimal, min: Decimal },
}

/// Process-wide daily counters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskState {
    pub daily_trade_count: u32,
    pub daily_pnl: Decimal,
    /// Exchange-local date the counters belong to
    pub last_reset_date: NaiveDate,
}

impl RiskState {
    pub fn new(date: NaiveDate) -> Self {
        Self {
            daily_trade_count: 0,
            daily_pnl: Decimal::ZERO,
            last_reset_date: date,
        }
    }
}

/// Outcome of one gate evaluation
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RiskReport {
    pub failures: Vec<RiskError>,
}

impl RiskReport {
    /// True when every check passed
    pub fn passed(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Snapshot of daily risk usage
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskStatus {
    pub daily_trades: u32,
    pub daily_trades_remaining: u32,
    pub daily_pnl: Decimal,
    /// Negative P&L floor for the day
    pub daily_loss_limit: Decimal,
    /// `|daily_pnl|` as a fraction of the loss budget
    pub risk_capacity_used: Decimal,
    pub last_reset_date: NaiveDate,
}
