//! Routes approved trades to the paper ledger or a live broker

use super::broker::{create_broker, Broker, BrokerError};
use super::{
    ExecutionResult, OrderRequest, OrderSide, OrderSummary, OrderType, PaperLedger,
    PositionSummary,
};
use crate::config::{BrokerConfig, OperatingMode};
use crate::strategy::TradeSignal;
use rust_decimal::Decimal;

/// Submits bracket orders through a broker
pub struct LiveOrderRouter {
    broker: Box<dyn Broker>,
}

impl LiveOrderRouter {
    pub fn new(broker: Box<dyn Broker>) -> Self {
        Self { broker }
    }

    pub async fn execute(&self, signal: &TradeSignal) -> ExecutionResult {
        let request = OrderRequest {
            symbol: signal.symbol.clone(),
            side: OrderSide::Buy,
            quantity: signal.position_size,
            order_type: OrderType::Market,
            price: signal.entry_price,
            target_price: signal.target_price,
            stop_loss_price: signal.stop_loss_price,
        };

        match self.broker.place_order(&request).await {
            Ok(ack) => {
                ExecutionResult::placed(ack, &signal.symbol, signal.position_size, signal.entry_price)
            }
            Err(e) => {
                tracing::error!(
                    broker = self.broker.name(),
                    symbol = %signal.symbol,
                    error = %e,
                    "Order placement failed"
                );
                ExecutionResult::failed(
                    &signal.symbol,
                    signal.position_size,
                    format!("{} order failed: {}", self.broker.name(), e),
                )
            }
        }
    }
}

/// Where approved trades go
pub enum Venue {
    Paper(PaperLedger),
    Live(LiveOrderRouter),
}

/// Normalizes execution across venues
pub struct ExecutionEngine {
    venue: Venue,
}

impl ExecutionEngine {
    pub fn paper(initial_balance: Decimal) -> Self {
        Self {
            venue: Venue::Paper(PaperLedger::new(initial_balance)),
        }
    }

    pub fn live(broker: Box<dyn Broker>) -> Self {
        Self {
            venue: Venue::Live(LiveOrderRouter::new(broker)),
        }
    }

    /// Build the engine for `mode`; `None` in development
    ///
    /// Live mode resolves and initializes the broker, so unknown names, missing
    /// credentials and session failures surface here.
    pub async fn for_mode(
        mode: OperatingMode,
        config: &BrokerConfig,
    ) -> Result<Option<Self>, BrokerError> {
        match mode {
            OperatingMode::Development => Ok(None),
            OperatingMode::Paper => Ok(Some(Self::paper(config.paper.initial_balance))),
            OperatingMode::Live => {
                let broker = create_broker(config)?;
                broker.initialize().await?;
                Ok(Some(Self::live(broker)))
            }
        }
    }

    pub fn venue_name(&self) -> &'static str {
        match &self.venue {
            Venue::Paper(_) => "paper",
            Venue::Live(router) => router.broker.name(),
        }
    }

    /// Execute a trade signal; never fails, problems become `FAILED` or `SKIPPED`
    pub async fn execute(&self, signal: &TradeSignal) -> ExecutionResult {
        if !signal.should_trade {
            return ExecutionResult::skipped(&signal.symbol, "no trade signal");
        }
        if signal.symbol.trim().is_empty() {
            return ExecutionResult::skipped(&signal.symbol, "missing symbol");
        }
        if signal.position_size == 0 {
            return ExecutionResult::skipped(&signal.symbol, "zero position size");
        }

        let result = match &self.venue {
            Venue::Paper(ledger) => ledger.execute(signal).await,
            Venue::Live(router) => router.execute(signal).await,
        };

        tracing::info!(
            venue = self.venue_name(),
            symbol = %signal.symbol,
            status = %result.status,
            quantity = result.quantity,
            "Trade executed"
        );
        result
    }

    pub async fn positions(&self) -> Result<Vec<PositionSummary>, BrokerError> {
        match &self.venue {
            Venue::Paper(ledger) => Ok(ledger.position_summaries().await),
            Venue::Live(router) => router.broker.get_positions().await,
        }
    }

    pub async fn order_status(&self, order_id: &str) -> Result<Option<OrderSummary>, BrokerError> {
        match &self.venue {
            Venue::Paper(ledger) => Ok(ledger.order_summary(order_id).await),
            Venue::Live(router) => router.broker.get_order_status(order_id).await,
        }
    }

    /// Close a paper position; live positions are managed by the bracket order
    pub async fn close_position(&self, symbol: &str, exit_price: Decimal) -> Option<Decimal> {
        match &self.venue {
            Venue::Paper(ledger) => ledger.close_position(symbol, exit_price).await,
            Venue::Live(_) => {
                tracing::warn!(symbol, "Manual close is only supported in paper mode");
                None
            }
        }
    }

    /// Current paper balance; `None` for live venues
    pub async fn paper_balance(&self) -> Option<Decimal> {
        match &self.venue {
            Venue::Paper(ledger) => Some(ledger.balance().await),
            Venue::Live(_) => None,
        }
    }

    pub async fn shutdown(&self) {
        match &self.venue {
            Venue::Paper(ledger) => {
                let balance = ledger.balance().await;
                let open_positions = ledger.open_positions().await.len();
                tracing::info!(%balance, open_positions, "Paper trading session ended");
            }
            Venue::Live(router) => {
                tracing::info!(broker = router.broker.name(), "Live session ended");
            }
        }
    }
}
