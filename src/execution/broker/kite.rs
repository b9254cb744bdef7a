//! Zerodha Kite Connect v3 adapter

use super::{credentials, http_client, send_json, Broker, BrokerError};
use crate::config::BrokerConfig;
use crate::execution::{
    OrderAck, OrderRequest, OrderSide, OrderSummary, OrderType, PositionSummary,
};
use async_trait::async_trait;
use reqwest::Client;
use rust_decimal::Decimal;
use serde::de::DeserializeOwned;
use serde::Deserialize;

/// Kite Connect base URL
pub const KITE_API_URL: &str = "https://api.kite.trade";

/// Kite Connect REST client
pub struct KiteBroker {
    base_url: String,
    api_key: String,
    access_token: String,
    client: Client,
}

#[derive(Debug, Deserialize)]
struct Envelope<T> {
    status: String,
    data: Option<T>,
    message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct PlacedOrder {
    order_id: String,
}

#[derive(Debug, Deserialize)]
struct Positions {
    #[serde(default)]
    day: Vec<KitePosition>,
}

#[derive(Debug, Deserialize)]
struct KitePosition {
    tradingsymbol: String,
    quantity: i64,
    average_price: Decimal,
    pnl: Option<Decimal>,
}

#[derive(Debug, Deserialize)]
struct KiteOrder {
    order_id: String,
    tradingsymbol: String,
    quantity: u64,
    status: String,
}

/// Unwrap a Kite `{status, data, message}` envelope
fn unwrap_envelope<T: DeserializeOwned>(value: serde_json::Value) -> Result<T, BrokerError> {
    let envelope: Envelope<T> =
        serde_json::from_value(value).map_err(|e| BrokerError::Decode(e.to_string()))?;
    if envelope.status != "success" {
        return Err(BrokerError::Rejected(
            envelope.message.unwrap_or(envelope.status),
        ));
    }
    envelope
        .data
        .ok_or_else(|| BrokerError::Decode("missing data".to_string()))
}

impl KiteBroker {
    pub fn new(config: &BrokerConfig) -> Result<Self, BrokerError> {
        let (api_key, access_token) = credentials(config)?;
        Ok(Self {
            base_url: config
                .base_url
                .clone()
                .unwrap_or_else(|| KITE_API_URL.to_string()),
            api_key,
            access_token,
            client: http_client(config)?,
        })
    }

    fn authorized(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        builder
            .header("X-Kite-Version", "3")
            .header(
                "Authorization",
                format!("token {}:{}", self.api_key, self.access_token),
            )
    }

    /// Form fields for a BSE intraday bracket order
    ///
    /// Kite expects squareoff and stoploss as absolute distances from entry.
    pub fn order_params(request: &OrderRequest) -> Vec<(&'static str, String)> {
        let side = match request.side {
            OrderSide::Buy => "BUY",
            OrderSide::Sell => "SELL",
        };
        let squareoff = (request.target_price - request.price).abs();
        let stoploss = (request.price - request.stop_loss_price).abs();
        let order_type = match request.order_type {
            OrderType::Market => "MARKET",
            OrderType::Limit => "LIMIT",
        };

        let mut params = vec![
            ("exchange", "BSE".to_string()),
            ("tradingsymbol", request.symbol.clone()),
            ("transaction_type", side.to_string()),
            ("quantity", request.quantity.to_string()),
            ("order_type", order_type.to_string()),
            ("product", "MIS".to_string()),
            ("validity", "DAY".to_string()),
            ("squareoff", squareoff.normalize().to_string()),
            ("stoploss", stoploss.normalize().to_string()),
        ];
        if request.order_type == OrderType::Limit {
            params.push(("price", request.price.normalize().to_string()));
        }
        params
    }
}

#[async_trait]
impl Broker for KiteBroker {
    fn name(&self) -> &'static str {
        "kite"
    }

    async fn initialize(&self) -> Result<(), BrokerError> {
        let url = format!("{}/user/profile", self.base_url);
        let body = send_json(self.authorized(self.client.get(&url))).await?;
        let _profile: serde_json::Value = unwrap_envelope(body)?;
        tracing::info!(broker = self.name(), "Broker session verified");
        Ok(())
    }

    async fn place_order(&self, request: &OrderRequest) -> Result<OrderAck, BrokerError> {
        let url = format!("{}/orders/bo", self.base_url);
        let params = Self::order_params(request);
        let raw = send_json(self.authorized(self.client.post(&url)).form(&params)).await?;
        let placed: PlacedOrder = unwrap_envelope(raw.clone())?;

        tracing::info!(order_id = %placed.order_id, symbol = %request.symbol, "Kite order placed");
        Ok(OrderAck {
            order_id: placed.order_id,
            status: "PLACED".to_string(),
            raw,
        })
    }

    async fn get_positions(&self) -> Result<Vec<PositionSummary>, BrokerError> {
        let url = format!("{}/portfolio/positions", self.base_url);
        let body = send_json(self.authorized(self.client.get(&url))).await?;
        let positions: Positions = unwrap_envelope(body)?;

        Ok(positions
            .day
            .into_iter()
            .map(|p| PositionSummary {
                symbol: p.tradingsymbol,
                quantity: p.quantity,
                average_price: p.average_price,
                pnl: p.pnl,
            })
            .collect())
    }

    async fn get_order_status(&self, order_id: &str) -> Result<Option<OrderSummary>, BrokerError> {
        let url = format!("{}/orders/{}", self.base_url, order_id);
        let body = send_json(self.authorized(self.client.get(&url))).await?;
        let history: Vec<KiteOrder> = unwrap_envelope(body)?;

        // Order history is chronological; the last entry is current
        Ok(history.into_iter().last().map(|o| OrderSummary {
            order_id: o.order_id,
            symbol: o.tradingsymbol,
            quantity: o.quantity,
            status: o.status,
        }))
    }
}
