//! Fyers API v2 adapter

use super::{credentials, http_client, send_json, Broker, BrokerError};
use crate::config::BrokerConfig;
use crate::execution::{
    OrderAck, OrderRequest, OrderSide, OrderSummary, OrderType, PositionSummary,
};
use async_trait::async_trait;
use reqwest::Client;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::json;

/// Fyers API base URL
pub const FYERS_API_URL: &str = "https://api.fyers.in/api/v2";

/// Fyers REST client
pub struct FyersBroker {
    base_url: String,
    app_id: String,
    access_token: String,
    client: Client,
}

#[derive(Debug, Deserialize)]
struct FyersPosition {
    symbol: String,
    #[serde(rename = "netQty")]
    net_qty: i64,
    #[serde(rename = "netAvg")]
    net_avg: Decimal,
    pl: Option<Decimal>,
}

#[derive(Debug, Deserialize)]
struct FyersOrder {
    id: String,
    symbol: String,
    qty: u64,
    status: i64,
}

/// `BSE:XYZ-EQ` for `XYZ`
pub fn exchange_symbol(symbol: &str) -> String {
    format!("BSE:{symbol}-EQ")
}

/// `XYZ` for `BSE:XYZ-EQ`
fn plain_symbol(symbol: &str) -> String {
    let without_exchange = symbol.split_once(':').map_or(symbol, |(_, s)| s);
    without_exchange
        .strip_suffix("-EQ")
        .unwrap_or(without_exchange)
        .to_string()
}

fn status_name(code: i64) -> &'static str {
    match code {
        1 => "CANCELLED",
        2 => "FILLED",
        4 => "TRANSIT",
        5 => "REJECTED",
        6 => "PENDING",
        _ => "UNKNOWN",
    }
}

/// Fail unless the `s` field is `ok`
fn ensure_ok(value: &serde_json::Value) -> Result<(), BrokerError> {
    if value.get("s").and_then(|s| s.as_str()) == Some("ok") {
        return Ok(());
    }
    let message = value
        .get("message")
        .and_then(|m| m.as_str())
        .map(str::to_string)
        .unwrap_or_else(|| value.to_string());
    Err(BrokerError::Rejected(message))
}

/// Order id from either `{id}` or `{data: {id}}`
fn order_id(value: &serde_json::Value) -> Option<String> {
    value
        .get("id")
        .or_else(|| value.get("data").and_then(|d| d.get("id")))
        .and_then(|id| id.as_str())
        .map(str::to_string)
}

impl FyersBroker {
    pub fn new(config: &BrokerConfig) -> Result<Self, BrokerError> {
        let (app_id, access_token) = credentials(config)?;
        Ok(Self {
            base_url: config
                .base_url
                .clone()
                .unwrap_or_else(|| FYERS_API_URL.to_string()),
            app_id,
            access_token,
            client: http_client(config)?,
        })
    }

    fn authorized(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        builder.header(
            "Authorization",
            format!("{}:{}", self.app_id, self.access_token),
        )
    }

    /// JSON body for an intraday order with stop and target
    pub fn order_body(request: &OrderRequest) -> serde_json::Value {
        let side = match request.side {
            OrderSide::Buy => 1,
            OrderSide::Sell => -1,
        };
        let (order_type, limit_price) = match request.order_type {
            OrderType::Limit => (1, request.price.to_f64()),
            OrderType::Market => (2, Some(0.0)),
        };
        json!({
            "symbol": exchange_symbol(&request.symbol),
            "qty": request.quantity,
            "type": order_type,
            "side": side,
            "productType": "INTRADAY",
            "limitPrice": limit_price,
            "stopPrice": 0,
            "validity": "DAY",
            "disclosedQty": 0,
            "offlineOrder": "False",
            "stopLoss": request.stop_loss_price.to_f64(),
            "takeProfit": request.target_price.to_f64(),
        })
    }
}

#[async_trait]
impl Broker for FyersBroker {
    fn name(&self) -> &'static str {
        "fyers"
    }

    async fn initialize(&self) -> Result<(), BrokerError> {
        let url = format!("{}/profile", self.base_url);
        let body = send_json(self.authorized(self.client.get(&url))).await?;
        ensure_ok(&body)?;
        tracing::info!(broker = self.name(), "Broker session verified");
        Ok(())
    }

    async fn place_order(&self, request: &OrderRequest) -> Result<OrderAck, BrokerError> {
        let url = format!("{}/orders", self.base_url);
        let raw = send_json(
            self.authorized(self.client.post(&url))
                .json(&Self::order_body(request)),
        )
        .await?;
        ensure_ok(&raw)?;
        let id = order_id(&raw).ok_or_else(|| BrokerError::Decode("missing order id".to_string()))?;

        tracing::info!(order_id = %id, symbol = %request.symbol, "Fyers order placed");
        Ok(OrderAck {
            order_id: id,
            status: "PLACED".to_string(),
            raw,
        })
    }

    async fn get_positions(&self) -> Result<Vec<PositionSummary>, BrokerError> {
        let url = format!("{}/positions", self.base_url);
        let body = send_json(self.authorized(self.client.get(&url))).await?;
        ensure_ok(&body)?;

        let positions: Vec<FyersPosition> = match body.get("netPositions") {
            Some(list) => serde_json::from_value(list.clone())
                .map_err(|e| BrokerError::Decode(e.to_string()))?,
            None => Vec::new(),
        };

        Ok(positions
            .into_iter()
            .map(|p| PositionSummary {
                symbol: plain_symbol(&p.symbol),
                quantity: p.net_qty,
                average_price: p.net_avg,
                pnl: p.pl,
            })
            .collect())
    }

    async fn get_order_status(&self, order_id: &str) -> Result<Option<OrderSummary>, BrokerError> {
        let url = format!("{}/orders", self.base_url);
        let body = send_json(self.authorized(self.client.get(&url))).await?;
        ensure_ok(&body)?;

        let orders: Vec<FyersOrder> = match body.get("orderBook") {
            Some(list) => serde_json::from_value(list.clone())
                .map_err(|e| BrokerError::Decode(e.to_string()))?,
            None => Vec::new(),
        };

        Ok(orders
            .into_iter()
            .find(|o| o.id == order_id)
            .map(|o| OrderSummary {
                order_id: o.id,
                symbol: plain_symbol(&o.symbol),
                quantity: o.qty,
                status: status_name(o.status).to_string(),
            }))
    }
}
