// src/connectors/traits.rs
use crate::errors::ExchangeError;
use crate::types::{Order, OrderResponse, OrderType, PositionSnapshot, Side, TimeInForce};
use async_trait::async_trait;
use rust_decimal::Decimal;

/// The exchange gateway contract the engine is written against. One concrete
/// client per venue; the engine never sees anything venue-specific.
#[async_trait]
pub trait ExchangeClient: Send + Sync {
    /// Last traded price for the symbol.
    async fn get_ticker_price(&self, symbol: &str) -> Result<Decimal, ExchangeError>;

    /// Sets position leverage. "Leverage already set" comes back as a
    /// distinct error code the caller can demote (see `ExchangeError`).
    async fn set_leverage(&self, symbol: &str, leverage: u32) -> Result<(), ExchangeError>;

    async fn place_order(
        &self,
        symbol: &str,
        side: Side,
        order_type: OrderType,
        qty: Decimal,
        price: Option<Decimal>,
        time_in_force: TimeInForce,
    ) -> Result<OrderResponse, ExchangeError>;

    async fn cancel_order(&self, symbol: &str, order_id: &str) -> Result<(), ExchangeError>;

    async fn get_open_orders(&self, symbol: &str) -> Result<Vec<Order>, ExchangeError>;

    /// Open positions for the symbol. Empty or zero-size means flat.
    async fn get_positions(&self, symbol: &str)
        -> Result<Vec<PositionSnapshot>, ExchangeError>;

    /// Recent order history, newest first. Used for informational fill
    /// inspection only; fill detection itself keys off position size.
    async fn get_order_history(
        &self,
        symbol: &str,
        limit: u32,
    ) -> Result<Vec<Order>, ExchangeError>;
}
