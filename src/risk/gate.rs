//! Pre-trade risk gate with daily counters

use super::{RiskError, RiskReport, RiskState, RiskStatus};
use crate::config::RiskConfig;
use crate::strategy::TradeSignal;
use chrono::{DateTime, Datelike, FixedOffset, NaiveDate, Offset, Timelike, Utc, Weekday};
use rust_decimal::Decimal;

/// Evaluates five independent pre-trade checks against daily state
pub struct RiskGate {
    config: RiskConfig,
    offset: FixedOffset,
    state: RiskState,
}

impl RiskGate {
    /// Create a gate with counters dated to the current exchange-local day
    pub fn new(config: RiskConfig) -> Self {
        Self::new_at(config, Utc::now())
    }

    /// Create a gate with counters dated to the exchange-local day of `now`
    pub fn new_at(config: RiskConfig, now: DateTime<Utc>) -> Self {
        let offset = FixedOffset::east_opt(config.utc_offset_minutes * 60)
            .unwrap_or_else(|| Utc.fix());
        let today = now.with_timezone(&offset).date_naive();
        Self {
            config,
            offset,
            state: RiskState::new(today),
        }
    }

    pub fn state(&self) -> &RiskState {
        &self.state
    }

    fn local_date(&self, now: DateTime<Utc>) -> NaiveDate {
        now.with_timezone(&self.offset).date_naive()
    }

    fn loss_limit(&self) -> Decimal {
        -self.config.circuit_breaker_threshold * self.config.max_position_size
    }

    fn reset_if_new_day(&mut self, now: DateTime<Utc>) {
        let today = self.local_date(now);
        if today != self.state.last_reset_date {
            tracing::info!(
                previous = %self.state.last_reset_date,
                today = %today,
                trades = self.state.daily_trade_count,
                pnl = %self.state.daily_pnl,
                "Daily risk counters reset"
            );
            self.state = RiskState::new(today);
        }
    }

    /// Whether the proposed trade passes every check now
    pub fn check(&mut self, signal: &TradeSignal) -> bool {
        self.evaluate_at(signal, Utc::now()).passed()
    }

    /// Evaluate every check at `now`, logging each failure
    pub fn evaluate_at(&mut self, signal: &TradeSignal, now: DateTime<Utc>) -> RiskReport {
        self.reset_if_new_day(now);

        let mut report = RiskReport::default();

        if self.state.daily_trade_count >= self.config.max_daily_trades {
            report.failures.push(RiskError::DailyTradeLimit {
                count: self.state.daily_trade_count,
                max: self.config.max_daily_trades,
            });
        }

        let value = signal.notional();
        if value > self.config.max_position_size {
            report.failures.push(RiskError::PositionTooLarge {
                value,
                max: self.config.max_position_size,
            });
        }

        let local = now.with_timezone(&self.offset);
        let weekend = matches!(local.weekday(), Weekday::Sat | Weekday::Sun);
        let hour = local.hour();
        if weekend || hour < self.config.trading_start_hour || hour > self.config.trading_end_hour {
            report
                .failures
                .push(RiskError::OutsideTradingHours(local.format("%a %H:%M").to_string()));
        }

        let limit = self.loss_limit();
        if self.state.daily_pnl < limit {
            report.failures.push(RiskError::DailyLossLimit {
                pnl: self.state.daily_pnl,
                limit,
            });
        }

        if signal.confidence < self.config.min_confidence {
            report.failures.push(RiskError::LowConfidence {
                confidence: signal.confidence,
                min: self.config.min_confidence,
            });
        }

        for failure in &report.failures {
            tracing::warn!(symbol = %signal.symbol, reason = %failure, "Risk check failed");
        }
        report
    }

    /// Count an executed trade and its realized P&L
    pub fn record_trade(&mut self, pnl: Decimal) {
        self.record_trade_at(pnl, Utc::now());
    }

    pub fn record_trade_at(&mut self, pnl: Decimal, now: DateTime<Utc>) {
        self.reset_if_new_day(now);
        self.state.daily_trade_count += 1;
        self.state.daily_pnl += pnl;
        tracing::info!(
            daily_trades = self.state.daily_trade_count,
            daily_pnl = %self.state.daily_pnl,
            "Trade recorded"
        );
    }

    /// Add realized P&L from a closed position without counting a new trade
    pub fn record_pnl(&mut self, pnl: Decimal) {
        self.record_pnl_at(pnl, Utc::now());
    }

    pub fn record_pnl_at(&mut self, pnl: Decimal, now: DateTime<Utc>) {
        self.reset_if_new_day(now);
        self.state.daily_pnl += pnl;
        tracing::info!(pnl = %pnl, daily_pnl = %self.state.daily_pnl, "Realized P&L recorded");
    }

    pub fn risk_status(&self) -> RiskStatus {
        let limit = self.loss_limit();
        let budget = limit.abs();
        let risk_capacity_used = if budget.is_zero() {
            Decimal::ZERO
        } else {
            self.state.daily_pnl.abs() / budget
        };

        RiskStatus {
            daily_trades: self.state.daily_trade_count,
            daily_trades_remaining: self
                .config
                .max_daily_trades
                .saturating_sub(self.state.daily_trade_count),
            daily_pnl: self.state.daily_pnl,
            daily_loss_limit: limit,
            risk_capacity_used,
            last_reset_date: self.state.last_reset_date,
        }
    }

    /// Block further trades until the next day
    pub fn emergency_stop(&mut self) {
        self.state.daily_trade_count = self
            .state
            .daily_trade_count
            .max(self.config.max_daily_trades);
        tracing::warn!("Emergency stop: trading disabled for the rest of the day");
    }
}
