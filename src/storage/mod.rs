//! Persistence module
//!
//! Announcements, trades and daily performance rows behind the `Store` trait

mod memory;
mod types;

pub use memory::InMemoryStore;
pub use types::{AnnouncementRecord, PerformanceMetrics, TradeRecord, TradeStatus};

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use thiserror::Error;

/// Store errors
#[derive(Debug, Error)]
pub enum StoreError {
    /// Backend could not be reached
    #[error("Store unavailable: {0}")]
    Unavailable(String),
    /// Row could not be encoded
    #[error("Serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Trait for persistence backends
#[async_trait]
pub trait Store: Send + Sync {
    /// Insert an announcement; `Ok(false)` when the hash is already stored
    async fn save_announcement(&self, record: AnnouncementRecord) -> Result<bool, StoreError>;

    /// Look up an announcement by hash
    async fn announcement(&self, hash: &str) -> Result<Option<AnnouncementRecord>, StoreError>;

    /// Append a trade row
    async fn save_trade(&self, trade: TradeRecord) -> Result<(), StoreError>;

    /// Record the exit of the newest open trade for `symbol`
    ///
    /// Returns the realized P&L, or `None` when no open trade exists.
    async fn close_trade(
        &self,
        symbol: &str,
        exit_price: Decimal,
        exit_time: DateTime<Utc>,
    ) -> Result<Option<Decimal>, StoreError>;

    /// Trades for `symbol` entered at or after `since`
    async fn trades_for_symbol(
        &self,
        symbol: &str,
        since: DateTime<Utc>,
    ) -> Result<Vec<TradeRecord>, StoreError>;

    /// Trades entered in `[start, end)`
    async fn trades_between(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<TradeRecord>, StoreError>;

    /// Insert or replace the row for `metrics.date`
    async fn save_performance(&self, metrics: PerformanceMetrics) -> Result<(), StoreError>;

    /// Performance row for a date
    async fn performance(&self, date: NaiveDate) -> Result<Option<PerformanceMetrics>, StoreError>;
}
