// src/config.rs

use crate::types::PositionSide;
use anyhow::{bail, Context, Result};
use config::{Config, File, FileFormat};
use rust_decimal::Decimal;
use serde::Deserialize;

/// One take-profit leg: how far from the basis price and how much of the
/// notional it closes.
#[derive(Debug, Deserialize, Clone, Copy)]
pub struct TpLeg {
    pub price_percent: Decimal,
    pub quantity_percent: Decimal,
}

/// DCA ladder shape: how wide the window is and how many legs fill it.
#[derive(Debug, Deserialize, Clone, Copy)]
pub struct LimitOrdersConfig {
    pub range_percent: Decimal,
    pub orders_count: u32,
}

/// Which notional seeds TP replanning after the position has grown.
///
/// `InitialNotional` reuses the opening `market_order_amount`, so TP
/// coverage may drift from the live size after DCA fills. `PositionNotional`
/// sizes against `size * avg_price` at recompute time instead.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum TpSizing {
    #[default]
    InitialNotional,
    PositionNotional,
}

#[derive(Debug, Deserialize, Clone)]
pub struct StrategyConfig {
    /// Slash-separated pair, e.g. "BTC/USDT".
    pub symbol: String,
    pub side: PositionSide,
    /// Quote-currency notional of the opening market order.
    pub market_order_amount: Decimal,
    pub leverage: u32,
    /// Ordered TP ladder, closest leg first.
    pub tp_orders: Vec<TpLeg>,
    pub limit_orders: LimitOrdersConfig,
    /// Quote-currency notional spread across the DCA legs.
    pub limit_orders_amount: Decimal,
    #[serde(default)]
    pub tp_sizing: TpSizing,
}

impl StrategyConfig {
    /// Loads and validates the strategy config from a JSON file. Any problem
    /// here aborts startup before the first exchange call.
    pub fn load(path: &str) -> Result<Self> {
        let builder = Config::builder().add_source(File::new(path, FileFormat::Json));

        let config: StrategyConfig = builder
            .build()
            .with_context(|| format!("failed to read config file {path}"))?
            .try_deserialize()
            .context("config does not match the expected schema")?;

        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if !self.symbol.contains('/') {
            bail!("symbol must be a slash-separated pair, got {:?}", self.symbol);
        }
        if self.market_order_amount <= Decimal::ZERO {
            bail!("market_order_amount must be positive");
        }
        if self.limit_orders_amount <= Decimal::ZERO {
            bail!("limit_orders_amount must be positive");
        }
        if self.leverage == 0 {
            bail!("leverage must be at least 1");
        }
        if self.tp_orders.is_empty() {
            bail!("tp_orders must be a non-empty list");
        }
        if self.limit_orders.orders_count < 2 {
            bail!("limit_orders.orders_count must be at least 2");
        }
        if self.limit_orders.range_percent <= Decimal::ZERO {
            bail!("limit_orders.range_percent must be positive");
        }
        Ok(())
    }

    /// Symbol in the form the exchange API expects ("BTC/USDT" -> "BTCUSDT").
    pub fn api_symbol(&self) -> String {
        self.symbol.replace('/', "")
    }
}
