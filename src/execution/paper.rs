//! Paper trading ledger

use super::{ExecutionResult, Order, OrderSide, OrderSummary, Position, PositionSummary};
use crate::strategy::TradeSignal;
use chrono::Utc;
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

#[derive(Debug)]
struct LedgerState {
    balance: Decimal,
    positions: HashMap<String, Position>,
    orders: Vec<Order>,
}

/// In-memory balance, positions and order log
///
/// Each operation holds the write lock for its whole debit or credit, so the
/// balance never goes negative.
#[derive(Clone)]
pub struct PaperLedger {
    state: Arc<RwLock<LedgerState>>,
}

impl PaperLedger {
    pub fn new(initial_balance: Decimal) -> Self {
        Self {
            state: Arc::new(RwLock::new(LedgerState {
                balance: initial_balance,
                positions: HashMap::new(),
                orders: Vec::new(),
            })),
        }
    }

    pub async fn balance(&self) -> Decimal {
        self.state.read().await.balance
    }

    /// Open positions ordered by symbol
    pub async fn open_positions(&self) -> Vec<Position> {
        let state = self.state.read().await;
        let mut positions: Vec<Position> = state.positions.values().cloned().collect();
        positions.sort_by(|a, b| a.symbol.cmp(&b.symbol));
        positions
    }

    pub async fn orders(&self) -> Vec<Order> {
        self.state.read().await.orders.clone()
    }

    /// Fill a buy at the signal's entry price
    pub async fn execute(&self, signal: &TradeSignal) -> ExecutionResult {
        let mut state = self.state.write().await;

        if state.positions.contains_key(&signal.symbol) {
            return ExecutionResult::skipped(
                &signal.symbol,
                format!("position already open for {}", signal.symbol),
            );
        }

        let trade_value = signal.notional();
        if trade_value > state.balance {
            tracing::warn!(
                symbol = %signal.symbol,
                required = %trade_value,
                available = %state.balance,
                "Insufficient paper balance"
            );
            return ExecutionResult::failed(
                &signal.symbol,
                signal.position_size,
                "Insufficient paper trading balance",
            );
        }

        let order_id = Uuid::new_v4().to_string();
        let now = Utc::now();
        state.balance -= trade_value;
        state.positions.insert(
            signal.symbol.clone(),
            Position {
                symbol: signal.symbol.clone(),
                quantity: signal.position_size,
                entry_price: signal.entry_price,
                entry_time: now,
                target_price: signal.target_price,
                stop_loss_price: signal.stop_loss_price,
                order_id: order_id.clone(),
            },
        );
        state.orders.push(Order {
            order_id: order_id.clone(),
            symbol: signal.symbol.clone(),
            quantity: signal.position_size,
            price: signal.entry_price,
            side: OrderSide::Buy,
            status: "COMPLETED".to_string(),
            timestamp: now,
        });

        tracing::info!(
            order_id = %order_id,
            symbol = %signal.symbol,
            quantity = signal.position_size,
            price = %signal.entry_price,
            balance = %state.balance,
            "Paper order filled"
        );

        ExecutionResult::completed(
            order_id,
            &signal.symbol,
            signal.position_size,
            signal.entry_price,
            state.balance,
        )
    }

    /// Sell the open position for `symbol`, crediting the proceeds
    ///
    /// Returns the realized P&L, or `None` when nothing is open.
    pub async fn close_position(&self, symbol: &str, exit_price: Decimal) -> Option<Decimal> {
        let mut state = self.state.write().await;
        let position = state.positions.remove(symbol)?;

        let quantity = Decimal::from(position.quantity);
        let pnl = (exit_price - position.entry_price) * quantity;
        state.balance += exit_price * quantity;
        state.orders.push(Order {
            order_id: Uuid::new_v4().to_string(),
            symbol: symbol.to_string(),
            quantity: position.quantity,
            price: exit_price,
            side: OrderSide::Sell,
            status: "COMPLETED".to_string(),
            timestamp: Utc::now(),
        });

        tracing::info!(symbol, pnl = %pnl, balance = %state.balance, "Paper position closed");
        Some(pnl)
    }

    pub async fn position_summaries(&self) -> Vec<PositionSummary> {
        self.open_positions()
            .await
            .into_iter()
            .map(|p| PositionSummary {
                symbol: p.symbol,
                quantity: i64::try_from(p.quantity).unwrap_or(i64::MAX),
                average_price: p.entry_price,
                pnl: None,
            })
            .collect()
    }

    pub async fn order_summary(&self, order_id: &str) -> Option<OrderSummary> {
        let state = self.state.read().await;
        state
            .orders
            .iter()
            .find(|o| o.order_id == order_id)
            .map(|o| OrderSummary {
                order_id: o.order_id.clone(),
                symbol: o.symbol.clone(),
                quantity: o.quantity,
                status: o.status.clone(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::execution::ExecutionStatus;
    use crate::strategy::StrategyMetadata;
    use rust_decimal_macros::dec;

    fn signal(symbol: &str, size: u64, entry: Decimal) -> TradeSignal {
        TradeSignal {
            announcement_hash: "hash".to_string(),
            should_trade: true,
            reason: String::new(),
            symbol: symbol.to_string(),
            entry_price: entry,
            target_price: entry * dec!(1.05),
            stop_loss_price: entry * dec!(0.98),
            position_size: size,
            confidence: dec!(0.9),
            strategy_metadata: StrategyMetadata {
                params: None,
                order_value: None,
                extraction_reason: String::new(),
                generated_at: Utc::now(),
            },
        }
    }

    #[tokio::test]
    async fn test_paper_fill_debits_balance() {
        let ledger = PaperLedger::new(dec!(100000));
        let result = ledger.execute(&signal("XYZ", 500, dec!(100))).await;

        assert_eq!(result.status, ExecutionStatus::Completed);
        assert_eq!(result.remaining_balance, Some(dec!(50000)));
        assert_eq!(ledger.balance().await, dec!(50000));
        assert_eq!(ledger.open_positions().await.len(), 1);

        let orders = ledger.orders().await;
        assert_eq!(orders.len(), 1);
        assert_eq!(orders[0].side, OrderSide::Buy);
        assert_eq!(Some(orders[0].order_id.clone()), result.order_id);
    }

    #[tokio::test]
    async fn test_insufficient_balance_rejects_whole_trade() {
        let ledger = PaperLedger::new(dec!(1000));
        let result = ledger.execute(&signal("XYZ", 11, dec!(100))).await;

        assert_eq!(result.status, ExecutionStatus::Failed);
        assert_eq!(
            result.reason.as_deref(),
            Some("Insufficient paper trading balance")
        );
        assert_eq!(ledger.balance().await, dec!(1000));
        assert!(ledger.open_positions().await.is_empty());
        assert!(ledger.orders().await.is_empty());
    }

    #[tokio::test]
    async fn test_exact_balance_allowed() {
        let ledger = PaperLedger::new(dec!(1000));
        let result = ledger.execute(&signal("XYZ", 10, dec!(100))).await;
        assert_eq!(result.status, ExecutionStatus::Completed);
        assert_eq!(ledger.balance().await, dec!(0));
    }

    #[tokio::test]
    async fn test_open_symbol_skipped() {
        let ledger = PaperLedger::new(dec!(100000));
        ledger.execute(&signal("XYZ", 10, dec!(100))).await;
        let second = ledger.execute(&signal("XYZ", 10, dec!(100))).await;

        assert_eq!(second.status, ExecutionStatus::Skipped);
        assert_eq!(ledger.balance().await, dec!(99000));
        assert_eq!(ledger.orders().await.len(), 1);
    }

    #[tokio::test]
    async fn test_balance_conservation() {
        let ledger = PaperLedger::new(dec!(100000));
        let mut spent = Decimal::ZERO;
        for (i, size) in [100u64, 250, 75].iter().enumerate() {
            let result = ledger
                .execute(&signal(&format!("SYM{i}"), *size, dec!(120)))
                .await;
            spent += result.trade_value.unwrap();
        }
        assert_eq!(ledger.balance().await + spent, dec!(100000));
    }

    #[tokio::test]
    async fn test_close_position() {
        let ledger = PaperLedger::new(dec!(100000));
        ledger.execute(&signal("XYZ", 500, dec!(100))).await;

        let pnl = ledger.close_position("XYZ", dec!(106)).await;
        assert_eq!(pnl, Some(dec!(3000)));
        assert_eq!(ledger.balance().await, dec!(103000));
        assert!(ledger.open_positions().await.is_empty());
        assert_eq!(ledger.orders().await.len(), 2);

        assert_eq!(ledger.close_position("XYZ", dec!(106)).await, None);
    }

    #[tokio::test]
    async fn test_order_summary_lookup() {
        let ledger = PaperLedger::new(dec!(100000));
        let result = ledger.execute(&signal("XYZ", 5, dec!(100))).await;
        let order_id = result.order_id.unwrap();

        let summary = ledger.order_summary(&order_id).await.unwrap();
        assert_eq!(summary.symbol, "XYZ");
        assert_eq!(summary.status, "COMPLETED");
        assert!(ledger.order_summary("missing").await.is_none());
    }
}
