//! In-memory store

use super::{AnnouncementRecord, PerformanceMetrics, Store, StoreError, TradeRecord, TradeStatus};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use tokio::sync::RwLock;

#[derive(Default)]
struct Tables {
    announcements: HashMap<String, AnnouncementRecord>,
    trades: Vec<TradeRecord>,
    performance: BTreeMap<NaiveDate, PerformanceMetrics>,
}

/// Process-lifetime store; cheap to clone, clones share tables
#[derive(Clone, Default)]
pub struct InMemoryStore {
    tables: Arc<RwLock<Tables>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored announcements
    pub async fn announcement_count(&self) -> usize {
        self.tables.read().await.announcements.len()
    }

    /// Every stored trade in insertion order
    pub async fn all_trades(&self) -> Vec<TradeRecord> {
        self.tables.read().await.trades.clone()
    }
}

#[async_trait]
impl Store for InMemoryStore {
    async fn save_announcement(&self, record: AnnouncementRecord) -> Result<bool, StoreError> {
        let mut tables = self.tables.write().await;
        if tables.announcements.contains_key(&record.announcement.hash) {
            tracing::debug!(hash = %record.announcement.hash, "Announcement already stored");
            return Ok(false);
        }
        tables
            .announcements
            .insert(record.announcement.hash.clone(), record);
        Ok(true)
    }

    async fn announcement(&self, hash: &str) -> Result<Option<AnnouncementRecord>, StoreError> {
        Ok(self.tables.read().await.announcements.get(hash).cloned())
    }

    async fn save_trade(&self, trade: TradeRecord) -> Result<(), StoreError> {
        tracing::debug!(symbol = %trade.symbol, quantity = trade.quantity, "Trade stored");
        self.tables.write().await.trades.push(trade);
        Ok(())
    }

    async fn close_trade(
        &self,
        symbol: &str,
        exit_price: Decimal,
        exit_time: DateTime<Utc>,
    ) -> Result<Option<Decimal>, StoreError> {
        let mut tables = self.tables.write().await;
        let Some(trade) = tables
            .trades
            .iter_mut()
            .rev()
            .find(|t| t.symbol == symbol && !t.is_closed())
        else {
            return Ok(None);
        };

        let pnl = (exit_price - trade.entry_price) * Decimal::from(trade.quantity);
        trade.exit_price = Some(exit_price);
        trade.exit_time = Some(exit_time);
        trade.profit_loss = Some(pnl);
        trade.status = TradeStatus::Closed;
        Ok(Some(pnl))
    }

    async fn trades_for_symbol(
        &self,
        symbol: &str,
        since: DateTime<Utc>,
    ) -> Result<Vec<TradeRecord>, StoreError> {
        let tables = self.tables.read().await;
        Ok(tables
            .trades
            .iter()
            .filter(|t| t.symbol == symbol && t.entry_time >= since)
            .cloned()
            .collect())
    }

    async fn trades_between(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<TradeRecord>, StoreError> {
        let tables = self.tables.read().await;
        Ok(tables
            .trades
            .iter()
            .filter(|t| t.entry_time >= start && t.entry_time < end)
            .cloned()
            .collect())
    }

    async fn save_performance(&self, metrics: PerformanceMetrics) -> Result<(), StoreError> {
        self.tables
            .write()
            .await
            .performance
            .insert(metrics.date, metrics);
        Ok(())
    }

    async fn performance(&self, date: NaiveDate) -> Result<Option<PerformanceMetrics>, StoreError> {
        Ok(self.tables.read().await.performance.get(&date).cloned())
    }
}
