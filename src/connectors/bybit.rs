// src/connectors/bybit.rs
use crate::connectors::messages::{
    BybitEnvelope, ListResult, OrderAck, OrderEntry, PositionEntry, TickerEntry, WalletEntry,
};
use crate::connectors::traits::ExchangeClient;
use crate::errors::ExchangeError;
use crate::types::{Order, OrderResponse, OrderStatus, OrderType, PositionSnapshot, Side, TimeInForce};
use async_trait::async_trait;
use chrono::Utc;
use hmac::{Hmac, Mac};
use reqwest::Client;
use rust_decimal::Decimal;
use serde::de::DeserializeOwned;
use serde_json::json;
use sha2::Sha256;
use std::str::FromStr;
use tracing::debug;
use uuid::Uuid;

type HmacSha256 = Hmac<Sha256>;

const CATEGORY: &str = "linear";
const RECV_WINDOW: &str = "5000";

/// Bybit v5 REST client for linear perpetuals, pointed at the demo trading
/// host. Signature scheme: HMAC-SHA256 over
/// `timestamp + api_key + recv_window + payload`.
pub struct BybitClient {
    api_key: String,
    secret_key: String,
    http_client: Client,
    base_rest_url: String,
}

impl BybitClient {
    pub fn new(api_key: String, secret_key: String) -> Self {
        Self {
            api_key,
            secret_key,
            http_client: Client::new(),
            base_rest_url: "https://api-demo.bybit.com".to_string(),
        }
    }

    /// Startup probe: a signed wallet-balance read, so both reachability and
    /// bad credentials fail here, before any order is placed. Fatal on error.
    pub async fn ping(&self) -> Result<(), ExchangeError> {
        let result: ListResult<WalletEntry> = self
            .signed_get(
                "/v5/account/wallet-balance",
                vec![("accountType", "UNIFIED".to_string())],
            )
            .await?;
        for account in &result.list {
            debug!(
                account_type = %account.account_type,
                equity = %account.total_equity,
                "account reachable"
            );
        }
        Ok(())
    }

    fn sign(&self, timestamp: &str, payload: &str) -> Result<String, ExchangeError> {
        let mut mac = HmacSha256::new_from_slice(self.secret_key.as_bytes())
            .map_err(|e| ExchangeError::Sign(e.to_string()))?;
        mac.update(timestamp.as_bytes());
        mac.update(self.api_key.as_bytes());
        mac.update(RECV_WINDOW.as_bytes());
        mac.update(payload.as_bytes());
        Ok(hex::encode(mac.finalize().into_bytes()))
    }

    async fn signed_get<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        params: Vec<(&str, String)>,
    ) -> Result<T, ExchangeError> {
        let query = serde_urlencoded::to_string(&params)
            .map_err(|e| ExchangeError::Sign(e.to_string()))?;
        let timestamp = Utc::now().timestamp_millis().to_string();
        let signature = self.sign(&timestamp, &query)?;
        let url = format!("{}{}?{}", self.base_rest_url, endpoint, query);

        let resp = self
            .http_client
            .get(&url)
            .header("X-BAPI-API-KEY", &self.api_key)
            .header("X-BAPI-TIMESTAMP", &timestamp)
            .header("X-BAPI-RECV-WINDOW", RECV_WINDOW)
            .header("X-BAPI-SIGN", signature)
            .send()
            .await?
            .error_for_status()?;

        Self::unwrap_envelope(resp.json::<BybitEnvelope<T>>().await?)
    }

    async fn signed_post<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        body: serde_json::Value,
    ) -> Result<T, ExchangeError> {
        let payload = body.to_string();
        let timestamp = Utc::now().timestamp_millis().to_string();
        let signature = self.sign(&timestamp, &payload)?;
        let url = format!("{}{}", self.base_rest_url, endpoint);

        debug!(endpoint, %payload, "sending signed request");

        let resp = self
            .http_client
            .post(&url)
            .header("X-BAPI-API-KEY", &self.api_key)
            .header("X-BAPI-TIMESTAMP", &timestamp)
            .header("X-BAPI-RECV-WINDOW", RECV_WINDOW)
            .header("Content-Type", "application/json")
            .body(payload)
            .header("X-BAPI-SIGN", signature)
            .send()
            .await?
            .error_for_status()?;

        Self::unwrap_envelope(resp.json::<BybitEnvelope<T>>().await?)
    }

    fn unwrap_envelope<T>(envelope: BybitEnvelope<T>) -> Result<T, ExchangeError> {
        if envelope.ret_code != 0 {
            return Err(ExchangeError::Api {
                code: envelope.ret_code,
                msg: envelope.ret_msg,
            });
        }
        envelope
            .result
            .ok_or_else(|| ExchangeError::Parse("success envelope without a result".to_string()))
    }

    fn map_order(entry: OrderEntry) -> Order {
        let order_type = match entry.order_type.as_str() {
            "Market" => OrderType::Market,
            _ => OrderType::Limit,
        };
        let side = match entry.side.as_str() {
            "Sell" => Side::Sell,
            _ => Side::Buy,
        };
        // Bybit has a wider status vocabulary than we track; anything not
        // terminal maps to New.
        let status = match entry.order_status.as_str() {
            "Filled" => OrderStatus::Filled,
            "PartiallyFilled" => OrderStatus::PartiallyFilled,
            "Cancelled" | "Deactivated" | "PartiallyFilledCanceled" => OrderStatus::Cancelled,
            "Rejected" => OrderStatus::Rejected,
            _ => OrderStatus::New,
        };
        Order {
            id: entry.order_id,
            order_type,
            side,
            price: Decimal::from_str(&entry.price).ok(),
            qty: entry.qty,
            status,
        }
    }

    fn map_position(entry: PositionEntry) -> PositionSnapshot {
        PositionSnapshot {
            symbol: entry.symbol,
            size: entry.size,
            // avgPrice comes back as "" for a flat position slot.
            avg_price: Decimal::from_str(&entry.avg_price).unwrap_or(Decimal::ZERO),
            unrealized_pnl: Decimal::from_str(&entry.unrealised_pnl).unwrap_or(Decimal::ZERO),
        }
    }
}

#[async_trait]
impl ExchangeClient for BybitClient {
    async fn get_ticker_price(&self, symbol: &str) -> Result<Decimal, ExchangeError> {
        let url = format!(
            "{}/v5/market/tickers?category={}&symbol={}",
            self.base_rest_url, CATEGORY, symbol
        );
        let resp = self.http_client.get(&url).send().await?.error_for_status()?;
        let result: ListResult<TickerEntry> =
            Self::unwrap_envelope(resp.json::<BybitEnvelope<_>>().await?)?;

        result
            .list
            .into_iter()
            .find(|t| t.symbol == symbol)
            .map(|t| t.last_price)
            .ok_or_else(|| ExchangeError::Parse(format!("no ticker entry for {symbol}")))
    }

    async fn set_leverage(&self, symbol: &str, leverage: u32) -> Result<(), ExchangeError> {
        // set-leverage returns an empty result object; retCode carries the
        // outcome (110043 = already set).
        let body = json!({
            "category": CATEGORY,
            "symbol": symbol,
            "buyLeverage": leverage.to_string(),
            "sellLeverage": leverage.to_string(),
        });
        self.signed_post::<serde_json::Value>("/v5/position/set-leverage", body)
            .await?;
        Ok(())
    }

    async fn place_order(
        &self,
        symbol: &str,
        side: Side,
        order_type: OrderType,
        qty: Decimal,
        price: Option<Decimal>,
        time_in_force: TimeInForce,
    ) -> Result<OrderResponse, ExchangeError> {
        let mut body = json!({
            "category": CATEGORY,
            "symbol": symbol,
            "side": side.as_str(),
            "orderType": order_type.as_str(),
            "qty": qty.to_string(),
            "timeInForce": time_in_force.as_str(),
            "orderLinkId": Uuid::new_v4().to_string(),
        });
        if let Some(p) = price {
            body["price"] = json!(p.to_string());
        }

        let ack: OrderAck = self.signed_post("/v5/order/create", body).await?;
        debug!(order_id = %ack.order_id, order_link_id = %ack.order_link_id, "order accepted");
        Ok(OrderResponse {
            id: ack.order_id,
            status: "New".to_string(),
        })
    }

    async fn cancel_order(&self, symbol: &str, order_id: &str) -> Result<(), ExchangeError> {
        let body = json!({
            "category": CATEGORY,
            "symbol": symbol,
            "orderId": order_id,
        });
        self.signed_post::<OrderAck>("/v5/order/cancel", body).await?;
        Ok(())
    }

    async fn get_open_orders(&self, symbol: &str) -> Result<Vec<Order>, ExchangeError> {
        let result: ListResult<OrderEntry> = self
            .signed_get(
                "/v5/order/realtime",
                vec![("category", CATEGORY.to_string()), ("symbol", symbol.to_string())],
            )
            .await?;
        Ok(result.list.into_iter().map(Self::map_order).collect())
    }

    async fn get_positions(&self, symbol: &str) -> Result<Vec<PositionSnapshot>, ExchangeError> {
        let result: ListResult<PositionEntry> = self
            .signed_get(
                "/v5/position/list",
                vec![("category", CATEGORY.to_string()), ("symbol", symbol.to_string())],
            )
            .await?;
        Ok(result.list.into_iter().map(Self::map_position).collect())
    }

    async fn get_order_history(
        &self,
        symbol: &str,
        limit: u32,
    ) -> Result<Vec<Order>, ExchangeError> {
        let result: ListResult<OrderEntry> = self
            .signed_get(
                "/v5/order/history",
                vec![
                    ("category", CATEGORY.to_string()),
                    ("symbol", symbol.to_string()),
                    ("limit", limit.to_string()),
                ],
            )
            .await?;
        Ok(result.list.into_iter().map(Self::map_order).collect())
    }
}
