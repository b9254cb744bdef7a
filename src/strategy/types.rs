//! Strategy types

use crate::storage::TradeRecord;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// History-derived trade recommendation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Recommendation {
    /// Strong history for the symbol
    Proceed,
    /// No usable history, default parameters
    ProceedCautiously,
    /// Weak history
    Caution,
}

impl fmt::Display for Recommendation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Recommendation::Proceed => write!(f, "PROCEED"),
            Recommendation::ProceedCautiously => write!(f, "PROCEED_CAUTIOUSLY"),
            Recommendation::Caution => write!(f, "CAUTION"),
        }
    }
}

/// Per-symbol statistics over closed trades
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoricalPerformance {
    pub total_trades: usize,
    /// Winners over all closed trades, flat trades included in the denominator
    pub win_rate: Decimal,
    pub avg_profit: Decimal,
    /// Mean absolute loss
    pub avg_loss: Decimal,
    /// Mean whole days held; 1 when no exit times are known
    pub avg_holding_period_days: Decimal,
}

impl HistoricalPerformance {
    /// Summarize closed trades; open trades are ignored
    pub fn from_trades(trades: &[TradeRecord]) -> Self {
        let closed: Vec<&TradeRecord> = trades.iter().filter(|t| t.is_closed()).collect();
        let pnls: Vec<Decimal> = closed.iter().filter_map(|t| t.profit_loss).collect();

        let profits: Vec<Decimal> = pnls.iter().copied().filter(|p| *p > Decimal::ZERO).collect();
        let losses: Vec<Decimal> = pnls
            .iter()
            .copied()
            .filter(|p| *p < Decimal::ZERO)
            .map(|p| p.abs())
            .collect();
        let holding: Vec<Decimal> = closed
            .iter()
            .filter_map(|t| t.holding_days())
            .map(Decimal::from)
            .collect();

        let win_rate = if pnls.is_empty() {
            Decimal::ZERO
        } else {
            Decimal::from(profits.len()) / Decimal::from(pnls.len())
        };

        Self {
            total_trades: pnls.len(),
            win_rate,
            avg_profit: mean_or(&profits, Decimal::ZERO),
            avg_loss: mean_or(&losses, Decimal::ZERO),
            avg_holding_period_days: mean_or(&holding, Decimal::ONE),
        }
    }
}

fn mean_or(values: &[Decimal], fallback: Decimal) -> Decimal {
    if values.is_empty() {
        fallback
    } else {
        values.iter().sum::<Decimal>() / Decimal::from(values.len())
    }
}

/// Target/stop parameters for one trade
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrategyParams {
    /// Fractional move above entry, e.g. 0.05
    pub target_pct: Decimal,
    /// Fractional move below entry, e.g. 0.02
    pub stop_loss_pct: Decimal,
    pub holding_period_days: Decimal,
    pub recommendation: Recommendation,
    /// Present when enough history was available
    pub history: Option<HistoricalPerformance>,
}

/// Context attached to every trade signal
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StrategyMetadata {
    /// Unset when the analyzer stopped before choosing parameters
    pub params: Option<StrategyParams>,
    pub order_value: Option<Decimal>,
    pub extraction_reason: String,
    pub generated_at: DateTime<Utc>,
}

/// A parametrized trade/no-trade decision
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TradeSignal {
    pub announcement_hash: String,
    pub should_trade: bool,
    pub reason: String,
    pub symbol: String,
    pub entry_price: Decimal,
    pub target_price: Decimal,
    pub stop_loss_price: Decimal,
    /// Shares; zero exactly when the trade is rejected
    pub position_size: u64,
    pub confidence: Decimal,
    pub strategy_metadata: StrategyMetadata,
}

impl TradeSignal {
    /// Proposed order value, `entry_price × position_size`
    pub fn notional(&self) -> Decimal {
        self.entry_price * Decimal::from(self.position_size)
    }
}
