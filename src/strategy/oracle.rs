//! Entry price sources

use async_trait::async_trait;
use rust_decimal::Decimal;
use thiserror::Error;

/// Price lookup errors
#[derive(Debug, Error)]
pub enum PriceError {
    #[error("No price available for {0}")]
    Unavailable(String),
}

/// Trait for entry price sources
#[async_trait]
pub trait PriceOracle: Send + Sync {
    /// Current price estimate for `symbol`
    async fn price(&self, symbol: &str) -> Result<Decimal, PriceError>;
}

/// Returns the same configured price for every symbol
#[derive(Debug, Clone)]
pub struct FixedPriceOracle {
    price: Decimal,
}

impl FixedPriceOracle {
    pub fn new(price: Decimal) -> Self {
        Self { price }
    }
}

#[async_trait]
impl PriceOracle for FixedPriceOracle {
    async fn price(&self, symbol: &str) -> Result<Decimal, PriceError> {
        if self.price <= Decimal::ZERO {
            return Err(PriceError::Unavailable(symbol.to_string()));
        }
        tracing::warn!(symbol, price = %self.price, "Using placeholder entry price");
        Ok(self.price)
    }
}
