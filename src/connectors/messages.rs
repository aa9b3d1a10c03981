// src/connectors/messages.rs
use rust_decimal::Decimal;
use serde::Deserialize;

/// Bybit v5 wraps every response in this envelope; retCode 0 is success.
#[derive(Debug, Deserialize)]
pub struct BybitEnvelope<T> {
    #[serde(rename = "retCode")]
    pub ret_code: i64,

    #[serde(rename = "retMsg")]
    pub ret_msg: String,

    pub result: Option<T>,
}

#[derive(Debug, Deserialize)]
pub struct ListResult<T> {
    pub list: Vec<T>,
}

#[derive(Debug, Deserialize)]
pub struct TickerEntry {
    pub symbol: String,

    #[serde(rename = "lastPrice")]
    pub last_price: Decimal,
}

#[derive(Debug, Deserialize)]
pub struct OrderAck {
    #[serde(rename = "orderId")]
    pub order_id: String,

    #[serde(rename = "orderLinkId")]
    pub order_link_id: String,
}

#[derive(Debug, Deserialize)]
pub struct OrderEntry {
    #[serde(rename = "orderId")]
    pub order_id: String,

    #[serde(rename = "orderType")]
    pub order_type: String,

    pub side: String,

    /// Empty string for market orders.
    pub price: String,

    pub qty: Decimal,

    #[serde(rename = "orderStatus")]
    pub order_status: String,
}

#[derive(Debug, Deserialize)]
pub struct PositionEntry {
    pub symbol: String,

    /// "0" when flat.
    pub size: Decimal,

    /// Empty string when flat.
    #[serde(rename = "avgPrice")]
    pub avg_price: String,

    #[serde(rename = "unrealisedPnl")]
    pub unrealised_pnl: String,
}

/// One account slot from /v5/account/wallet-balance, the startup probe.
#[derive(Debug, Deserialize)]
pub struct WalletEntry {
    #[serde(rename = "accountType")]
    pub account_type: String,

    #[serde(rename = "totalEquity")]
    pub total_equity: String,
}
