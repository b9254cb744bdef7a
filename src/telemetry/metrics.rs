//! Prometheus metrics

use crate::execution::ExecutionStatus;
use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;
use std::time::Duration;

/// Counter metric types
#[derive(Debug, Clone, Copy)]
pub enum CounterMetric {
    /// Feed pages fetched successfully
    FeedFetches,
    /// Feed fetches that exhausted retries
    FeedFailures,
    /// Announcements that passed deduplication
    NewAnnouncements,
    /// Signals classified as tradeable
    TradeableSignals,
    /// Trade signals approved by the analyzer
    ApprovedTrades,
    /// Trades blocked by the risk gate
    RiskRejections,
}

/// Gauge metric types
#[derive(Debug, Clone, Copy)]
pub enum GaugeMetric {
    /// Paper ledger balance
    PaperBalance,
    /// Trades counted against today's limit
    DailyTrades,
    /// Today's realized P&L
    DailyPnl,
    /// Hashes held by the dedup index
    DedupIndexSize,
}

/// Latency metric types
#[derive(Debug, Clone, Copy)]
pub enum LatencyMetric {
    /// Whole pipeline iteration
    Cycle,
    /// Feed fetch including retries
    FeedFetch,
}

fn counter_name(metric: CounterMetric) -> &'static str {
    match metric {
        CounterMetric::FeedFetches => "momentum_feed_fetches_total",
        CounterMetric::FeedFailures => "momentum_feed_failures_total",
        CounterMetric::NewAnnouncements => "momentum_new_announcements_total",
        CounterMetric::TradeableSignals => "momentum_tradeable_signals_total",
        CounterMetric::ApprovedTrades => "momentum_approved_trades_total",
        CounterMetric::RiskRejections => "momentum_risk_rejections_total",
    }
}

fn gauge_name(metric: GaugeMetric) -> &'static str {
    match metric {
        GaugeMetric::PaperBalance => "momentum_paper_balance_inr",
        GaugeMetric::DailyTrades => "momentum_daily_trades",
        GaugeMetric::DailyPnl => "momentum_daily_pnl_inr",
        GaugeMetric::DedupIndexSize => "momentum_dedup_index_size",
    }
}

/// Increment a counter
pub fn increment(metric: CounterMetric, value: u64) {
    metrics::counter!(counter_name(metric)).increment(value);
}

/// Count an execution outcome, labelled by status
pub fn record_execution(status: ExecutionStatus) {
    metrics::counter!("momentum_executions_total", "status" => status.to_string()).increment(1);
}

/// Set a gauge value
pub fn set_gauge(metric: GaugeMetric, value: f64) {
    metrics::gauge!(gauge_name(metric)).set(value);
}

/// Record a latency measurement
pub fn record_latency(metric: LatencyMetric, duration: Duration) {
    let name = match metric {
        LatencyMetric::Cycle => "momentum_cycle_latency_ms",
        LatencyMetric::FeedFetch => "momentum_feed_fetch_latency_ms",
    };
    metrics::histogram!(name).record(duration.as_secs_f64() * 1000.0);
}

/// Serve Prometheus metrics on `0.0.0.0:port`
pub fn init_metrics(port: u16) -> anyhow::Result<SocketAddr> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    PrometheusBuilder::new()
        .with_http_listener(addr)
        .install()
        .map_err(|e| anyhow::anyhow!("Failed to install Prometheus exporter: {}", e))?;

    tracing::info!(metrics_addr = %addr, "Prometheus metrics exporter enabled");
    Ok(addr)
}
