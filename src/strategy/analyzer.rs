//! Trade parametrization from extracted signals and symbol history

use super::{
    calculate_position_size, HistoricalPerformance, PriceOracle, Recommendation, StrategyMetadata,
    StrategyParams, TradeSignal,
};
use crate::config::{RiskConfig, StrategyConfig};
use crate::signal::{ExtractedSignal, CRORE};
use crate::storage::Store;
use chrono::{Duration, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::sync::Arc;

const DEFAULT_TARGET_PCT: Decimal = dec!(0.05);
const DEFAULT_STOP_LOSS_PCT: Decimal = dec!(0.02);
const DEFAULT_HOLDING_DAYS: Decimal = dec!(3);
/// History win rate above which the symbol is a PROCEED
const PROCEED_WIN_RATE: Decimal = dec!(0.6);
const HIGH_CONFIDENCE: Decimal = dec!(0.8);
const GOOD_CONFIDENCE: Decimal = dec!(0.7);

/// Default parameters when history is too thin
pub fn default_params(order_value: Option<Decimal>) -> StrategyParams {
    let mut target_pct = DEFAULT_TARGET_PCT;
    if let Some(value) = order_value {
        if value > CRORE * dec!(50) {
            target_pct *= dec!(1.2);
        } else if value < CRORE * dec!(5) {
            target_pct *= dec!(0.8);
        }
    }

    StrategyParams {
        target_pct,
        stop_loss_pct: DEFAULT_STOP_LOSS_PCT,
        holding_period_days: DEFAULT_HOLDING_DAYS,
        recommendation: Recommendation::ProceedCautiously,
        history: None,
    }
}

/// Derives target, stop and size for tradeable signals
pub struct StrategyAnalyzer {
    config: StrategyConfig,
    max_position_value: Decimal,
    risk_per_trade: Decimal,
    store: Arc<dyn Store>,
    oracle: Arc<dyn PriceOracle>,
}

impl StrategyAnalyzer {
    pub fn new(
        config: StrategyConfig,
        risk: &RiskConfig,
        store: Arc<dyn Store>,
        oracle: Arc<dyn PriceOracle>,
    ) -> Self {
        Self {
            config,
            max_position_value: risk.max_position_size,
            risk_per_trade: risk.risk_per_trade,
            store,
            oracle,
        }
    }

    /// Choose parameters from the symbol's closed trades, or defaults
    pub async fn params_for(&self, symbol: &str, order_value: Option<Decimal>) -> StrategyParams {
        let since = Utc::now() - Duration::days(i64::from(self.config.lookback_days));
        let trades = match self.store.trades_for_symbol(symbol, since).await {
            Ok(trades) => trades,
            Err(e) => {
                tracing::warn!(symbol, error = %e, "Trade history unavailable, using defaults");
                Vec::new()
            }
        };

        let history = HistoricalPerformance::from_trades(&trades);
        if history.total_trades < self.config.min_historical_data_points {
            tracing::debug!(
                symbol,
                closed_trades = history.total_trades,
                "Insufficient history, using default parameters"
            );
            return default_params(order_value);
        }

        let recommendation = if history.win_rate > PROCEED_WIN_RATE {
            Recommendation::Proceed
        } else {
            Recommendation::Caution
        };
        let max_holding = Decimal::from(self.config.max_holding_period_days);

        StrategyParams {
            target_pct: DEFAULT_TARGET_PCT,
            stop_loss_pct: DEFAULT_STOP_LOSS_PCT,
            holding_period_days: history.avg_holding_period_days.min(max_holding),
            recommendation,
            history: Some(history),
        }
    }

    /// Turn an extracted signal into a trade decision
    pub async fn analyze(&self, signal: &ExtractedSignal) -> TradeSignal {
        let mut trade = TradeSignal {
            announcement_hash: signal.announcement_hash.clone(),
            should_trade: false,
            reason: String::new(),
            symbol: signal.symbol.clone(),
            entry_price: Decimal::ZERO,
            target_price: Decimal::ZERO,
            stop_loss_price: Decimal::ZERO,
            position_size: 0,
            confidence: signal.confidence,
            strategy_metadata: StrategyMetadata {
                params: None,
                order_value: signal.order_value,
                extraction_reason: signal.reason.clone(),
                generated_at: Utc::now(),
            },
        };

        if !signal.is_tradeable {
            trade.reason = format!("signal not tradeable: {}", signal.reason);
            return trade;
        }
        if signal.symbol.trim().is_empty() {
            trade.reason = "no symbol identified".to_string();
            return trade;
        }

        let params = self.params_for(&signal.symbol, signal.order_value).await;
        let recommendation = params.recommendation;
        trade.strategy_metadata.params = Some(params.clone());

        let approved = if signal.confidence >= HIGH_CONFIDENCE
            && matches!(
                recommendation,
                Recommendation::Proceed | Recommendation::ProceedCautiously
            ) {
            trade.reason = "high confidence and favorable history".to_string();
            true
        } else if signal.confidence >= GOOD_CONFIDENCE && recommendation == Recommendation::Proceed
        {
            trade.reason = "good confidence with strong history".to_string();
            true
        } else {
            trade.reason = format!(
                "insufficient confidence ({}) or unfavorable history ({})",
                signal.confidence, recommendation
            );
            false
        };

        let entry_price = match self.oracle.price(&signal.symbol).await {
            Ok(price) => price,
            Err(e) => {
                tracing::warn!(symbol = %signal.symbol, error = %e, "Entry price unavailable");
                trade.reason = format!("entry price unavailable: {e}");
                return trade;
            }
        };

        trade.entry_price = entry_price;
        trade.target_price = (entry_price * (Decimal::ONE + params.target_pct)).round_dp(2);
        trade.stop_loss_price = (entry_price * (Decimal::ONE - params.stop_loss_pct)).round_dp(2);

        if !approved {
            return trade;
        }

        let size = calculate_position_size(
            trade.entry_price,
            trade.stop_loss_price,
            self.max_position_value,
            self.risk_per_trade,
        );
        if size == 0 {
            trade.reason = "position size is zero".to_string();
            return trade;
        }

        trade.should_trade = true;
        trade.position_size = size;
        trade
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::signal::KeywordMatch;
    use crate::storage::{InMemoryStore, StoreError, TradeRecord, TradeStatus};
    use crate::strategy::FixedPriceOracle;
    use async_trait::async_trait;
    use chrono::{DateTime, NaiveDate};

    fn signal(confidence: Decimal, order_value: Option<Decimal>) -> ExtractedSignal {
        ExtractedSignal {
            announcement_hash: "hash".to_string(),
            is_tradeable: true,
            reason: "valid order announcement".to_string(),
            symbol: "XYZ".to_string(),
            company_name: "XYZ Limited".to_string(),
            keyword_match: KeywordMatch::Primary,
            order_value,
            order_value_text: None,
            confidence,
            enrichment: None,
            processed_at: Utc::now(),
        }
    }

    fn analyzer_with(store: Arc<dyn Store>, price: Decimal) -> StrategyAnalyzer {
        StrategyAnalyzer::new(
            StrategyConfig::default(),
            &RiskConfig::default(),
            store,
            Arc::new(FixedPriceOracle::new(price)),
        )
    }

    fn analyzer() -> StrategyAnalyzer {
        analyzer_with(Arc::new(InMemoryStore::new()), dec!(100))
    }

    async fn seed_history(store: &InMemoryStore, wins: usize, losses: usize) {
        let entry = Utc::now() - Duration::days(5);
        for i in 0..(wins + losses) {
            let pnl = if i < wins { dec!(50) } else { dec!(-20) };
            store
                .save_trade(TradeRecord {
                    announcement_hash: format!("h{i}"),
                    symbol: "XYZ".to_string(),
                    entry_time: entry,
                    exit_time: Some(entry + Duration::days(2)),
                    entry_price: dec!(100),
                    exit_price: Some(dec!(100)),
                    quantity: 10,
                    target_price: dec!(105),
                    stop_loss: dec!(98),
                    profit_loss: Some(pnl),
                    status: TradeStatus::Closed,
                    order_id: None,
                    strategy_data: serde_json::Value::Null,
                })
                .await
                .unwrap();
        }
    }

    #[test]
    fn test_default_params_scaling() {
        assert_eq!(default_params(Some(dec!(1200000000))).target_pct, dec!(0.06));
        assert_eq!(default_params(Some(dec!(20000000))).target_pct, dec!(0.04));
        assert_eq!(default_params(Some(dec!(100000000))).target_pct, dec!(0.05));
        assert_eq!(default_params(None).target_pct, dec!(0.05));
        assert_eq!(default_params(None).holding_period_days, dec!(3));
    }

    #[tokio::test]
    async fn test_approves_with_default_params() {
        let trade = analyzer()
            .analyze(&signal(dec!(0.9), Some(dec!(1200000000))))
            .await;

        assert!(trade.should_trade, "{}", trade.reason);
        assert_eq!(trade.entry_price, dec!(100));
        assert_eq!(trade.target_price, dec!(106));
        assert_eq!(trade.stop_loss_price, dec!(98));
        assert_eq!(trade.position_size, 500);
        let params = trade.strategy_metadata.params.unwrap();
        assert_eq!(params.recommendation, Recommendation::ProceedCautiously);
    }

    #[tokio::test]
    async fn test_zero_risk_budget_rejected() {
        let analyzer = StrategyAnalyzer::new(
            StrategyConfig::default(),
            &RiskConfig {
                risk_per_trade: Decimal::ZERO,
                ..RiskConfig::default()
            },
            Arc::new(InMemoryStore::new()),
            Arc::new(FixedPriceOracle::new(dec!(100))),
        );
        let trade = analyzer
            .analyze(&signal(dec!(0.9), Some(dec!(1200000000))))
            .await;

        assert!(!trade.should_trade);
        assert_eq!(trade.position_size, 0);
        assert_eq!(trade.reason, "position size is zero");
    }

    #[tokio::test]
    async fn test_rejects_below_high_confidence_without_history() {
        let trade = analyzer().analyze(&signal(dec!(0.75), None)).await;

        assert!(!trade.should_trade);
        assert_eq!(trade.position_size, 0);
        assert!(trade.reason.contains("0.75"));
        assert!(trade.reason.contains("PROCEED_CAUTIOUSLY"));
    }

    #[tokio::test]
    async fn test_strong_history_accepts_good_confidence() {
        let store = InMemoryStore::new();
        seed_history(&store, 8, 2).await;
        let trade = analyzer_with(Arc::new(store), dec!(100))
            .analyze(&signal(dec!(0.75), None))
            .await;

        assert!(trade.should_trade, "{}", trade.reason);
        let params = trade.strategy_metadata.params.unwrap();
        assert_eq!(params.recommendation, Recommendation::Proceed);
        assert_eq!(params.target_pct, dec!(0.05));
        assert_eq!(params.holding_period_days, dec!(2));
    }

    #[tokio::test]
    async fn test_weak_history_rejects() {
        let store = InMemoryStore::new();
        seed_history(&store, 5, 5).await;
        let trade = analyzer_with(Arc::new(store), dec!(100))
            .analyze(&signal(dec!(0.95), None))
            .await;

        assert!(!trade.should_trade);
        assert!(trade.reason.contains("CAUTION"));
        assert_eq!(trade.position_size, 0);
    }

    #[tokio::test]
    async fn test_empty_symbol_rejected() {
        let mut input = signal(dec!(0.9), None);
        input.symbol = String::new();
        let trade = analyzer().analyze(&input).await;

        assert!(!trade.should_trade);
        assert_eq!(trade.reason, "no symbol identified");
    }

    #[tokio::test]
    async fn test_price_failure_rejected() {
        let trade = analyzer_with(Arc::new(InMemoryStore::new()), dec!(0))
            .analyze(&signal(dec!(0.9), None))
            .await;

        assert!(!trade.should_trade);
        assert!(trade.reason.starts_with("entry price unavailable"));
    }

    struct FailingStore;

    #[async_trait]
    impl Store for FailingStore {
        async fn save_announcement(
            &self,
            _: crate::storage::AnnouncementRecord,
        ) -> Result<bool, StoreError> {
            Err(StoreError::Unavailable("down".to_string()))
        }
        async fn announcement(
            &self,
            _: &str,
        ) -> Result<Option<crate::storage::AnnouncementRecord>, StoreError> {
            Err(StoreError::Unavailable("down".to_string()))
        }
        async fn save_trade(&self, _: TradeRecord) -> Result<(), StoreError> {
            Err(StoreError::Unavailable("down".to_string()))
        }
        async fn close_trade(
            &self,
            _: &str,
            _: Decimal,
            _: DateTime<Utc>,
        ) -> Result<Option<Decimal>, StoreError> {
            Err(StoreError::Unavailable("down".to_string()))
        }
        async fn trades_for_symbol(
            &self,
            _: &str,
            _: DateTime<Utc>,
        ) -> Result<Vec<TradeRecord>, StoreError> {
            Err(StoreError::Unavailable("down".to_string()))
        }
        async fn trades_between(
            &self,
            _: DateTime<Utc>,
            _: DateTime<Utc>,
        ) -> Result<Vec<TradeRecord>, StoreError> {
            Err(StoreError::Unavailable("down".to_string()))
        }
        async fn save_performance(
            &self,
            _: crate::storage::PerformanceMetrics,
        ) -> Result<(), StoreError> {
            Err(StoreError::Unavailable("down".to_string()))
        }
        async fn performance(
            &self,
            _: NaiveDate,
        ) -> Result<Option<crate::storage::PerformanceMetrics>, StoreError> {
            Err(StoreError::Unavailable("down".to_string()))
        }
    }

    #[tokio::test]
    async fn test_history_failure_degrades_to_defaults() {
        let trade = analyzer_with(Arc::new(FailingStore), dec!(100))
            .analyze(&signal(dec!(0.9), Some(dec!(1200000000))))
            .await;

        assert!(trade.should_trade);
        assert_eq!(trade.position_size, 500);
    }
}
