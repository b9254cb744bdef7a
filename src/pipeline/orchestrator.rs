//! Fetch, dedup, extract, analyze, gate and execute on a fixed interval

use super::{CycleReport, StopHandle};
use crate::config::{Config, OperatingMode};
use crate::dedup::DeduplicationIndex;
use crate::execution::{ExecutionEngine, ExecutionStatus};
use crate::feed::{Announcement, AnnouncementFeed};
use crate::risk::RiskGate;
use crate::signal::{create_classifier, Classifier, ExtractedSignal};
use crate::storage::{AnnouncementRecord, PerformanceMetrics, Store, TradeRecord, TradeStatus};
use crate::strategy::{PriceOracle, StrategyAnalyzer, TradeSignal};
use crate::telemetry::{self, CounterMetric, GaugeMetric, LatencyMetric};
use chrono::{DateTime, Utc};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Runs the announcement pipeline until stopped
///
/// Owns the dedup index and risk state exclusively; one iteration runs at a
/// time and announcements are processed in feed order.
pub struct Orchestrator<F: AnnouncementFeed> {
    mode: OperatingMode,
    poll_interval: Duration,
    retention: Option<chrono::Duration>,
    feed: F,
    dedup: DeduplicationIndex,
    classifier: Box<dyn Classifier>,
    analyzer: StrategyAnalyzer,
    risk: RiskGate,
    engine: Option<ExecutionEngine>,
    store: Arc<dyn Store>,
    stop: StopHandle,
}

impl<F: AnnouncementFeed> Orchestrator<F> {
    pub fn new(
        config: &Config,
        feed: F,
        store: Arc<dyn Store>,
        oracle: Arc<dyn PriceOracle>,
        engine: Option<ExecutionEngine>,
    ) -> Self {
        Self {
            mode: config.mode,
            poll_interval: Duration::from_secs(config.feed.poll_interval_secs),
            retention: config
                .feed
                .dedup_retention_days
                .map(|days| chrono::Duration::days(i64::from(days))),
            feed,
            dedup: DeduplicationIndex::new(),
            classifier: create_classifier(&config.extractor),
            analyzer: StrategyAnalyzer::new(
                config.strategy.clone(),
                &config.risk,
                store.clone(),
                oracle,
            ),
            risk: RiskGate::new(config.risk.clone()),
            engine,
            store,
            stop: StopHandle::new(),
        }
    }

    /// Replace the risk gate, e.g. one dated for a fixed clock
    pub fn with_risk_gate(mut self, risk: RiskGate) -> Self {
        self.risk = risk;
        self
    }

    pub fn stop_handle(&self) -> StopHandle {
        self.stop.clone()
    }

    pub fn risk(&self) -> &RiskGate {
        &self.risk
    }

    pub fn risk_mut(&mut self) -> &mut RiskGate {
        &mut self.risk
    }

    pub fn engine(&self) -> Option<&ExecutionEngine> {
        self.engine.as_ref()
    }

    pub fn dedup(&self) -> &DeduplicationIndex {
        &self.dedup
    }

    /// Poll until the stop handle fires, then shut down
    pub async fn run(&mut self) {
        tracing::info!(
            mode = %self.mode,
            classifier = self.classifier.name(),
            interval_secs = self.poll_interval.as_secs(),
            "Pipeline started"
        );

        while !self.stop.is_stopped() {
            let report = self.run_cycle().await;
            tracing::info!(
                fetched = report.fetched,
                new = report.new,
                tradeable = report.tradeable,
                approved = report.approved,
                executed = report.executed,
                "Cycle complete"
            );

            let stop = self.stop.clone();
            tokio::select! {
                _ = tokio::time::sleep(self.poll_interval) => {}
                _ = stop.wait() => {}
            }
        }

        self.shutdown().await;
    }

    /// One iteration at the current time
    pub async fn run_cycle(&mut self) -> CycleReport {
        self.run_cycle_at(Utc::now()).await
    }

    /// One iteration with `now` used for risk checks and dedup bookkeeping
    pub async fn run_cycle_at(&mut self, now: DateTime<Utc>) -> CycleReport {
        let started = Instant::now();
        let mut report = CycleReport::default();

        let fetch_started = Instant::now();
        let batch = self.feed.fetch().await;
        telemetry::record_latency(LatencyMetric::FeedFetch, fetch_started.elapsed());
        report.fetched = batch.len();

        if let Some(retention) = self.retention {
            let evicted = self.dedup.evict_older_than(now - retention);
            if evicted > 0 {
                tracing::debug!(evicted, "Dedup hashes evicted");
            }
        }

        let fresh = self.dedup.filter_new_at(batch, now);
        report.new = fresh.len();
        telemetry::increment(CounterMetric::NewAnnouncements, fresh.len() as u64);
        telemetry::set_gauge(GaugeMetric::DedupIndexSize, self.dedup.len() as f64);

        for announcement in fresh {
            self.process(&announcement, now, &mut report).await;
        }

        let state = self.risk.state();
        telemetry::set_gauge(GaugeMetric::DailyTrades, f64::from(state.daily_trade_count));
        telemetry::set_gauge(
            GaugeMetric::DailyPnl,
            state.daily_pnl.to_f64().unwrap_or_default(),
        );
        if let Some(engine) = &self.engine {
            if let Some(balance) = engine.paper_balance().await {
                telemetry::set_gauge(
                    GaugeMetric::PaperBalance,
                    balance.to_f64().unwrap_or_default(),
                );
            }
        }
        telemetry::record_latency(LatencyMetric::Cycle, started.elapsed());
        report
    }

    async fn process(
        &mut self,
        announcement: &Announcement,
        now: DateTime<Utc>,
        report: &mut CycleReport,
    ) {
        let signal = self.classifier.classify(announcement);
        self.persist_announcement(announcement, &signal).await;

        if !signal.is_tradeable {
            tracing::debug!(
                company = %announcement.company_name,
                reason = %signal.reason,
                "Announcement not tradeable"
            );
            return;
        }
        report.tradeable += 1;
        telemetry::increment(CounterMetric::TradeableSignals, 1);
        tracing::info!(
            symbol = %signal.symbol,
            confidence = %signal.confidence,
            order_value = ?signal.order_value,
            title = %announcement.title,
            "Tradeable announcement"
        );

        let trade = self.analyzer.analyze(&signal).await;
        if !trade.should_trade {
            tracing::info!(symbol = %trade.symbol, reason = %trade.reason, "Trade not approved");
            return;
        }
        report.approved += 1;
        telemetry::increment(CounterMetric::ApprovedTrades, 1);

        let risk_report = self.risk.evaluate_at(&trade, now);
        if !risk_report.passed() {
            report.risk_rejected += 1;
            telemetry::increment(CounterMetric::RiskRejections, 1);
            return;
        }

        let engine = match (&self.engine, self.mode) {
            (Some(engine), OperatingMode::Paper | OperatingMode::Live) => engine,
            _ => {
                report.skipped += 1;
                tracing::info!(
                    symbol = %trade.symbol,
                    quantity = trade.position_size,
                    entry = %trade.entry_price,
                    target = %trade.target_price,
                    stop_loss = %trade.stop_loss_price,
                    "Development mode: trade not executed"
                );
                return;
            }
        };

        let result = engine.execute(&trade).await;
        telemetry::record_execution(result.status);
        match result.status {
            ExecutionStatus::Completed | ExecutionStatus::Placed => {
                report.executed += 1;
                self.risk.record_trade_at(Decimal::ZERO, now);

                let status = if result.status == ExecutionStatus::Completed {
                    TradeStatus::Open
                } else {
                    TradeStatus::Placed
                };
                let record = trade_record(&trade, status, result.order_id.clone(), result.timestamp);
                if let Err(e) = self.store.save_trade(record).await {
                    tracing::warn!(symbol = %trade.symbol, error = %e, "Failed to persist trade");
                }
            }
            ExecutionStatus::Failed => {
                report.failed += 1;
                tracing::warn!(symbol = %trade.symbol, reason = ?result.reason, "Trade failed");
            }
            ExecutionStatus::Skipped => {
                report.skipped += 1;
            }
        }
    }

    /// Close a paper position at `exit_price` now
    pub async fn close_position(&mut self, symbol: &str, exit_price: Decimal) -> Option<Decimal> {
        self.close_position_at(symbol, exit_price, Utc::now()).await
    }

    /// Close a paper position, settle its trade row and book the realized P&L
    ///
    /// Returns `None` when no engine is configured or nothing is open for
    /// `symbol`.
    pub async fn close_position_at(
        &mut self,
        symbol: &str,
        exit_price: Decimal,
        now: DateTime<Utc>,
    ) -> Option<Decimal> {
        let engine = self.engine.as_ref()?;
        let pnl = engine.close_position(symbol, exit_price).await?;

        match self.store.close_trade(symbol, exit_price, now).await {
            Ok(Some(_)) => {}
            Ok(None) => tracing::warn!(symbol, "No open trade row to close"),
            Err(e) => tracing::warn!(symbol, error = %e, "Failed to persist trade close"),
        }
        self.risk.record_pnl_at(pnl, now);
        Some(pnl)
    }

    async fn persist_announcement(&self, announcement: &Announcement, signal: &ExtractedSignal) {
        let extracted_data = match serde_json::to_value(signal) {
            Ok(value) => value,
            Err(e) => {
                tracing::warn!(error = %e, "Failed to encode extraction result");
                serde_json::Value::Null
            }
        };
        let record = AnnouncementRecord {
            announcement: announcement.clone(),
            processed: true,
            is_tradeable: signal.is_tradeable,
            extracted_data,
        };
        if let Err(e) = self.store.save_announcement(record).await {
            tracing::warn!(hash = %announcement.hash, error = %e, "Failed to persist announcement");
        }
    }

    /// Write today's performance row and release the engine
    pub async fn shutdown(&mut self) {
        let now = Utc::now();
        let date = now.date_naive();
        let start = date.and_hms_opt(0, 0, 0).map(|t| t.and_utc()).unwrap_or(now);

        match self.store.trades_between(start, now + chrono::Duration::seconds(1)).await {
            Ok(trades) => {
                let metrics = PerformanceMetrics::from_trades(date, &trades);
                tracing::info!(
                    date = %date,
                    total_trades = metrics.total_trades,
                    total_pnl = %metrics.total_pnl,
                    "Daily performance"
                );
                if let Err(e) = self.store.save_performance(metrics).await {
                    tracing::warn!(error = %e, "Failed to persist performance");
                }
            }
            Err(e) => tracing::warn!(error = %e, "Failed to load trades for performance"),
        }

        if let Some(engine) = &self.engine {
            engine.shutdown().await;
        }
        tracing::info!("Pipeline stopped");
    }
}

fn trade_record(
    trade: &TradeSignal,
    status: TradeStatus,
    order_id: Option<String>,
    entry_time: DateTime<Utc>,
) -> TradeRecord {
    TradeRecord {
        announcement_hash: trade.announcement_hash.clone(),
        symbol: trade.symbol.clone(),
        entry_time,
        exit_time: None,
        entry_price: trade.entry_price,
        exit_price: None,
        quantity: trade.position_size,
        target_price: trade.target_price,
        stop_loss: trade.stop_loss_price,
        profit_loss: None,
        status,
        order_id,
        strategy_data: serde_json::to_value(&trade.strategy_metadata)
            .unwrap_or(serde_json::Value::Null),
    }
}
