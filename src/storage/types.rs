//! Persistence rows

use crate::feed::Announcement;
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A stored announcement with its extraction outcome
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnnouncementRecord {
    #[serde(flatten)]
    pub announcement: Announcement,
    pub processed: bool,
    pub is_tradeable: bool,
    /// Serialized extraction result
    pub extracted_data: serde_json::Value,
}

/// Lifecycle of a persisted trade
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TradeStatus {
    /// Filled in the paper ledger, position open
    Open,
    /// Submitted to a broker
    Placed,
    /// Exit recorded
    Closed,
}

/// A stored trade
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TradeRecord {
    pub announcement_hash: String,
    pub symbol: String,
    pub entry_time: DateTime<Utc>,
    pub exit_time: Option<DateTime<Utc>>,
    pub entry_price: Decimal,
    pub exit_price: Option<Decimal>,
    pub quantity: u64,
    pub target_price: Decimal,
    pub stop_loss: Decimal,
    /// Realized P&L, set once the trade is closed
    pub profit_loss: Option<Decimal>,
    pub status: TradeStatus,
    pub order_id: Option<String>,
    pub strategy_data: serde_json::Value,
}

impl TradeRecord {
    /// Whether an exit has been recorded
    pub fn is_closed(&self) -> bool {
        self.profit_loss.is_some()
    }

    /// Whole days between entry and exit
    pub fn holding_days(&self) -> Option<i64> {
        self.exit_time.map(|exit| (exit - self.entry_time).num_days())
    }
}

/// Daily performance summary
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerformanceMetrics {
    pub date: NaiveDate,
    pub total_trades: u32,
    pub winning_trades: u32,
    pub losing_trades: u32,
    pub total_pnl: Decimal,
    pub win_rate: Decimal,
    pub avg_profit: Decimal,
    /// Mean absolute loss
    pub avg_loss: Decimal,
    /// Largest peak-to-trough decline of cumulative P&L
    pub max_drawdown: Decimal,
    /// Per-trade mean over sample standard deviation
    pub sharpe_ratio: Decimal,
}

impl PerformanceMetrics {
    /// Summary with every counter at zero
    pub fn empty(date: NaiveDate) -> Self {
        Self {
            date,
            total_trades: 0,
            winning_trades: 0,
            losing_trades: 0,
            total_pnl: Decimal::ZERO,
            win_rate: Decimal::ZERO,
            avg_profit: Decimal::ZERO,
            avg_loss: Decimal::ZERO,
            max_drawdown: Decimal::ZERO,
            sharpe_ratio: Decimal::ZERO,
        }
    }

    /// Summarize the closed trades in `trades`, in entry order
    pub fn from_trades(date: NaiveDate, trades: &[TradeRecord]) -> Self {
        let mut closed: Vec<&TradeRecord> = trades.iter().filter(|t| t.is_closed()).collect();
        closed.sort_by_key(|t| t.entry_time);
        let pnls: Vec<Decimal> = closed.iter().filter_map(|t| t.profit_loss).collect();

        if pnls.is_empty() {
            return Self::empty(date);
        }

        let profits: Vec<Decimal> = pnls.iter().copied().filter(|p| *p > Decimal::ZERO).collect();
        let losses: Vec<Decimal> = pnls
            .iter()
            .copied()
            .filter(|p| *p < Decimal::ZERO)
            .map(|p| p.abs())
            .collect();

        let total = Decimal::from(pnls.len());
        let total_pnl: Decimal = pnls.iter().sum();

        Self {
            date,
            total_trades: pnls.len() as u32,
            winning_trades: profits.len() as u32,
            losing_trades: losses.len() as u32,
            total_pnl,
            win_rate: Decimal::from(profits.len()) / total,
            avg_profit: mean(&profits),
            avg_loss: mean(&losses),
            max_drawdown: max_drawdown(&pnls),
            sharpe_ratio: sharpe_ratio(&pnls),
        }
    }
}

fn mean(values: &[Decimal]) -> Decimal {
    if values.is_empty() {
        return Decimal::ZERO;
    }
    values.iter().sum::<Decimal>() / Decimal::from(values.len())
}

/// Largest decline of the running P&L sum from its prior peak, as a positive amount
fn max_drawdown(pnls: &[Decimal]) -> Decimal {
    let mut equity = Decimal::ZERO;
    let mut peak = Decimal::ZERO;
    let mut max_dd = Decimal::ZERO;

    for pnl in pnls {
        equity += pnl;
        peak = peak.max(equity);
        max_dd = max_dd.max(peak - equity);
    }
    max_dd
}

/// Returns zero with fewer than two trades or no variance
fn sharpe_ratio(pnls: &[Decimal]) -> Decimal {
    if pnls.len() < 2 {
        return Decimal::ZERO;
    }
    let values: Vec<f64> = pnls.iter().filter_map(|p| p.to_f64()).collect();
    let n = values.len() as f64;
    let avg = values.iter().sum::<f64>() / n;
    let variance = values.iter().map(|v| (v - avg).powi(2)).sum::<f64>() / (n - 1.0);
    let std = variance.sqrt();
    if std < 1e-12 {
        return Decimal::ZERO;
    }
    Decimal::try_from(avg / std)
        .map(|s| s.round_dp(4))
        .unwrap_or(Decimal::ZERO)
}
