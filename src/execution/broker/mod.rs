//! Live broker adapters
//!
//! Thin REST clients behind the `Broker` trait, one per supported venue

mod fyers;
mod kite;

pub use fyers::{FyersBroker, FYERS_API_URL};
pub use kite::{KiteBroker, KITE_API_URL};

use super::{OrderAck, OrderRequest, OrderSummary, PositionSummary};
use crate::config::BrokerConfig;
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

/// Broker errors
#[derive(Debug, Error)]
pub enum BrokerError {
    /// Broker name not recognised
    #[error("Unsupported broker: {0}")]
    Unsupported(String),
    /// Required credential absent from config and environment
    #[error("Missing broker credential: {0}")]
    MissingCredentials(&'static str),
    /// Transport error or timeout
    #[error("Broker request failed: {0}")]
    Http(#[from] reqwest::Error),
    /// Broker answered with an error
    #[error("Broker rejected request: {0}")]
    Rejected(String),
    /// Response did not have the expected shape
    #[error("Unexpected broker response: {0}")]
    Decode(String),
}

/// Supported brokers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BrokerKind {
    /// Zerodha Kite Connect v3
    Kite,
    /// Fyers API v2
    Fyers,
}

impl FromStr for BrokerKind {
    type Err = BrokerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "zerodha" | "kite" => Ok(BrokerKind::Kite),
            "fyers" => Ok(BrokerKind::Fyers),
            other => Err(BrokerError::Unsupported(other.to_string())),
        }
    }
}

/// Trait for live order venues
#[async_trait]
pub trait Broker: Send + Sync {
    /// Short name for logs
    fn name(&self) -> &'static str;

    /// Verify the session; failure is fatal at startup
    async fn initialize(&self) -> Result<(), BrokerError>;

    /// Submit a bracket order
    async fn place_order(&self, request: &OrderRequest) -> Result<OrderAck, BrokerError>;

    async fn get_positions(&self) -> Result<Vec<PositionSummary>, BrokerError>;

    async fn get_order_status(&self, order_id: &str) -> Result<Option<OrderSummary>, BrokerError>;
}

/// Create the broker selected by `config.name`
pub fn create_broker(config: &BrokerConfig) -> Result<Box<dyn Broker>, BrokerError> {
    match config.name.parse::<BrokerKind>()? {
        BrokerKind::Kite => Ok(Box::new(KiteBroker::new(config)?)),
        BrokerKind::Fyers => Ok(Box::new(FyersBroker::new(config)?)),
    }
}

/// API key and access token, both required
fn credentials(config: &BrokerConfig) -> Result<(String, String), BrokerError> {
    let api_key = config
        .api_key
        .clone()
        .filter(|k| !k.is_empty())
        .ok_or(BrokerError::MissingCredentials("api_key"))?;
    let access_token = config
        .access_token
        .clone()
        .filter(|t| !t.is_empty())
        .ok_or(BrokerError::MissingCredentials("access_token"))?;
    Ok((api_key, access_token))
}

fn http_client(config: &BrokerConfig) -> Result<Client, BrokerError> {
    Ok(Client::builder()
        .timeout(Duration::from_secs(config.timeout_secs))
        .build()?)
}

/// Send a request and decode the JSON body, mapping non-2xx to `Rejected`
async fn send_json(request: RequestBuilder) -> Result<serde_json::Value, BrokerError> {
    let response = request.send().await?;
    let status = response.status();
    let body = response.text().await?;

    if !status.is_success() {
        return Err(BrokerError::Rejected(format!("{status} - {body}")));
    }
    serde_json::from_str(&body).map_err(|e| BrokerError::Decode(e.to_string()))
}
