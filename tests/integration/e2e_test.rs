//! End-to-end integration tests

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use momentum_alpha::config::{Config, OperatingMode};
use momentum_alpha::execution::{ExecutionEngine, ExecutionStatus};
use momentum_alpha::feed::{Announcement, AnnouncementFeed, RawAnnouncement};
use momentum_alpha::pipeline::Orchestrator;
use momentum_alpha::risk::{RiskError, RiskGate};
use momentum_alpha::signal::create_classifier;
use momentum_alpha::storage::{InMemoryStore, Store, TradeStatus};
use momentum_alpha::strategy::{FixedPriceOracle, StrategyAnalyzer, StrategyMetadata, TradeSignal};
use rust_decimal_macros::dec;
use std::sync::Arc;

fn monday_morning() -> DateTime<Utc> {
    // 10:30 IST
    Utc.with_ymd_and_hms(2024, 1, 15, 5, 0, 0).unwrap()
}

fn announcement(company: &str, title: &str) -> Announcement {
    Announcement::from_raw(
        RawAnnouncement {
            date: "15-01-2024".to_string(),
            time: "10:30:00".to_string(),
            company_name: company.to_string(),
            title: title.to_string(),
            category: "Company Update".to_string(),
            pdf_url: None,
        },
        monday_morning(),
    )
    .unwrap()
}

/// Serves a queue of pages, then empty pages
struct ScriptedFeed {
    pages: Vec<Vec<Announcement>>,
}

#[async_trait]
impl AnnouncementFeed for ScriptedFeed {
    async fn fetch(&mut self) -> Vec<Announcement> {
        if self.pages.is_empty() {
            vec![]
        } else {
            self.pages.remove(0)
        }
    }
}

#[test]
fn test_config_example_parses() {
    let config: Config = toml::from_str(include_str!("../../config.toml.example")).unwrap();

    assert_eq!(config.mode, OperatingMode::Paper);
    assert_eq!(config.risk.max_position_size, dec!(50000));
    assert_eq!(config.risk.utc_offset_minutes, 330);
    assert_eq!(config.extractor.min_order_value, dec!(10000000));
    assert_eq!(config.broker.paper.initial_balance, dec!(100000));
    assert!(config.validate().is_ok());
}

#[tokio::test]
async fn test_announcement_to_paper_fill() {
    let config = Config::default();
    let store = Arc::new(InMemoryStore::new());

    let classifier = create_classifier(&config.extractor);
    let signal = classifier.classify(&announcement(
        "XYZ Limited",
        "Company XYZ Secures Contract worth Rs. 120 crore",
    ));
    assert!(signal.is_tradeable);
    assert_eq!(signal.symbol, "XYZ");
    assert_eq!(signal.order_value, Some(dec!(1200000000)));
    assert_eq!(signal.confidence, dec!(0.9));

    let analyzer = StrategyAnalyzer::new(
        config.strategy.clone(),
        &config.risk,
        store.clone(),
        Arc::new(FixedPriceOracle::new(dec!(100))),
    );
    let trade = analyzer.analyze(&signal).await;
    assert!(trade.should_trade);
    assert_eq!(trade.entry_price, dec!(100));
    assert_eq!(trade.target_price, dec!(106));
    assert_eq!(trade.stop_loss_price, dec!(98));
    assert_eq!(trade.position_size, 500);

    let mut gate = RiskGate::new_at(config.risk.clone(), monday_morning());
    assert!(gate.evaluate_at(&trade, monday_morning()).passed());

    let engine = ExecutionEngine::paper(dec!(100000));
    let result = engine.execute(&trade).await;
    assert_eq!(result.status, ExecutionStatus::Completed);
    assert_eq!(result.quantity, 500);
    assert_eq!(result.trade_value, Some(dec!(50000)));
    assert_eq!(engine.paper_balance().await, Some(dec!(50000)));

    let pnl = engine.close_position("XYZ", dec!(106)).await;
    assert_eq!(pnl, Some(dec!(3000)));
    assert_eq!(engine.paper_balance().await, Some(dec!(103000)));
}

#[tokio::test]
async fn test_orchestrator_processes_each_announcement_once() {
    let config = Config {
        mode: OperatingMode::Paper,
        ..Config::default()
    };
    let store = Arc::new(InMemoryStore::new());
    let tradeable = announcement("XYZ Limited", "Company XYZ Secures Contract worth Rs. 120 crore");
    let board = announcement("ABC Ltd", "Outcome of Board Meeting");

    let feed = ScriptedFeed {
        pages: vec![
            vec![tradeable.clone(), board.clone()],
            vec![board, tradeable.clone()],
        ],
    };
    let mut orchestrator = Orchestrator::new(
        &config,
        feed,
        store.clone(),
        Arc::new(FixedPriceOracle::new(dec!(100))),
        Some(ExecutionEngine::paper(config.broker.paper.initial_balance)),
    )
    .with_risk_gate(RiskGate::new_at(config.risk.clone(), monday_morning()));

    let first = orchestrator.run_cycle_at(monday_morning()).await;
    assert_eq!(first.new, 2);
    assert_eq!(first.tradeable, 1);
    assert_eq!(first.executed, 1);

    let second = orchestrator.run_cycle_at(monday_morning()).await;
    assert_eq!(second.fetched, 2);
    assert_eq!(second.new, 0);
    assert_eq!(second.executed, 0);

    let trades = store.all_trades().await;
    assert_eq!(trades.len(), 1);
    assert_eq!(trades[0].symbol, "XYZ");
    assert_eq!(trades[0].quantity, 500);
    assert_eq!(trades[0].status, TradeStatus::Open);

    let record = store.announcement(&tradeable.hash).await.unwrap().unwrap();
    assert!(record.processed);
    assert!(record.is_tradeable);
}

#[test]
fn test_daily_limit_resets_on_next_exchange_day() {
    let config = Config::default();
    let mut gate = RiskGate::new_at(config.risk.clone(), monday_morning());
    let trade = TradeSignal {
        announcement_hash: "hash".to_string(),
        should_trade: true,
        reason: "approved".to_string(),
        symbol: "XYZ".to_string(),
        entry_price: dec!(100),
        target_price: dec!(106),
        stop_loss_price: dec!(98),
        position_size: 100,
        confidence: dec!(0.9),
        strategy_metadata: StrategyMetadata {
            params: None,
            order_value: None,
            extraction_reason: "valid order announcement".to_string(),
            generated_at: monday_morning(),
        },
    };

    for _ in 0..config.risk.max_daily_trades {
        gate.record_trade_at(dec!(0), monday_morning());
    }
    let blocked = gate.evaluate_at(&trade, monday_morning());
    assert!(blocked.failures.contains(&RiskError::DailyTradeLimit { count: 5, max: 5 }));

    let tuesday = Utc.with_ymd_and_hms(2024, 1, 16, 4, 0, 0).unwrap();
    let report = gate.evaluate_at(&trade, tuesday);
    assert!(report.passed());
    assert_eq!(gate.state().daily_trade_count, 0);
}
