//! Execution types

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Normalized execution outcome
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ExecutionStatus {
    /// Filled in the paper ledger
    Completed,
    /// Accepted by a live broker
    Placed,
    /// Rejected by the ledger or broker
    Failed,
    /// Nothing to execute
    Skipped,
}

impl ExecutionStatus {
    /// Whether a trade now exists
    pub fn is_executed(&self) -> bool {
        matches!(self, ExecutionStatus::Completed | ExecutionStatus::Placed)
    }
}

impl fmt::Display for ExecutionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExecutionStatus::Completed => write!(f, "COMPLETED"),
            ExecutionStatus::Placed => write!(f, "PLACED"),
            ExecutionStatus::Failed => write!(f, "FAILED"),
            ExecutionStatus::Skipped => write!(f, "SKIPPED"),
        }
    }
}

/// Result of executing one trade signal
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionResult {
    pub status: ExecutionStatus,
    pub order_id: Option<String>,
    pub symbol: String,
    pub quantity: u64,
    pub price: Option<Decimal>,
    pub trade_value: Option<Decimal>,
    /// Paper balance after the debit
    pub remaining_balance: Option<Decimal>,
    pub reason: Option<String>,
    /// Raw broker payload for live orders
    pub broker_response: Option<serde_json::Value>,
    pub timestamp: DateTime<Utc>,
}

impl ExecutionResult {
    fn bare(status: ExecutionStatus, symbol: &str, quantity: u64) -> Self {
        Self {
            status,
            order_id: None,
            symbol: symbol.to_string(),
            quantity,
            price: None,
            trade_value: None,
            remaining_balance: None,
            reason: None,
            broker_response: None,
            timestamp: Utc::now(),
        }
    }

    pub fn skipped(symbol: &str, reason: impl Into<String>) -> Self {
        Self {
            reason: Some(reason.into()),
            ..Self::bare(ExecutionStatus::Skipped, symbol, 0)
        }
    }

    pub fn failed(symbol: &str, quantity: u64, reason: impl Into<String>) -> Self {
        Self {
            reason: Some(reason.into()),
            ..Self::bare(ExecutionStatus::Failed, symbol, quantity)
        }
    }

    pub fn completed(
        order_id: String,
        symbol: &str,
        quantity: u64,
        price: Decimal,
        remaining_balance: Decimal,
    ) -> Self {
        Self {
            order_id: Some(order_id),
            price: Some(price),
            trade_value: Some(price * Decimal::from(quantity)),
            remaining_balance: Some(remaining_balance),
            ..Self::bare(ExecutionStatus::Completed, symbol, quantity)
        }
    }

    pub fn placed(ack: OrderAck, symbol: &str, quantity: u64, price: Decimal) -> Self {
        Self {
            order_id: Some(ack.order_id),
            price: Some(price),
            trade_value: Some(price * Decimal::from(quantity)),
            broker_response: Some(ack.raw),
            ..Self::bare(ExecutionStatus::Placed, symbol, quantity)
        }
    }
}

/// Order side
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum OrderSide {
    Buy,
    Sell,
}

/// Order pricing type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum OrderType {
    /// Fill at the prevailing price
    Market,
    /// Fill at `price` or better
    Limit,
}

/// An open paper position; at most one per symbol
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub symbol: String,
    pub quantity: u64,
    pub entry_price: Decimal,
    pub entry_time: DateTime<Utc>,
    pub target_price: Decimal,
    pub stop_loss_price: Decimal,
    pub order_id: String,
}

/// An entry in the append-only paper order log
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub order_id: String,
    pub symbol: String,
    pub quantity: u64,
    pub price: Decimal,
    pub side: OrderSide,
    pub status: String,
    pub timestamp: DateTime<Utc>,
}

/// Bracket order submitted to a broker
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderRequest {
    pub symbol: String,
    pub side: OrderSide,
    pub quantity: u64,
    pub order_type: OrderType,
    /// Limit price, and the reference for bracket offsets
    pub price: Decimal,
    pub target_price: Decimal,
    pub stop_loss_price: Decimal,
}

/// Broker acknowledgement of a submitted order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderAck {
    pub order_id: String,
    pub status: String,
    pub raw: serde_json::Value,
}

/// Position as reported by any venue
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PositionSummary {
    pub symbol: String,
    /// Signed net quantity
    pub quantity: i64,
    pub average_price: Decimal,
    pub pnl: Option<Decimal>,
}

/// Order state as reported by any venue
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderSummary {
    pub order_id: String,
    pub symbol: String,
    pub quantity: u64,
    pub status: String,
}
