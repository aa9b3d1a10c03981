// src/core/engine.rs
use crate::config::{StrategyConfig, TpSizing};
use crate::connectors::traits::ExchangeClient;
use crate::core::planner::{plan_dca, plan_tp};
use crate::core::tracker::PositionTracker;
use crate::types::{OrderType, PlannedOrder, PositionSnapshot, Side, TimeInForce};
use crate::utils::precision::normalize_quantity;
use anyhow::Result;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use std::time::Duration;
use tokio::sync::watch;
use tracing::{error, info, warn};

/// Poll interval between reconciliation ticks.
const MONITORING_INTERVAL: Duration = Duration::from_secs(10);

/// How many history entries to pull when logging recent fills.
const FILL_HISTORY_LIMIT: u32 = 10;

#[derive(Debug, Default)]
struct EngineState {
    is_running: bool,
    start_time: Option<DateTime<Utc>>,
}

/// The reconciliation engine. Owns all mutable state; one logical task runs
/// the open → ladder → monitor lifecycle, and a watch channel delivers the
/// stop request, observed at the top of each tick.
pub struct TradingEngine<C> {
    config: StrategyConfig,
    client: C,
    tracker: PositionTracker,
    state: EngineState,
    stop_rx: watch::Receiver<bool>,
}

impl<C> TradingEngine<C>
where
    C: ExchangeClient,
{
    pub fn new(config: StrategyConfig, client: C, stop_rx: watch::Receiver<bool>) -> Self {
        Self {
            config,
            client,
            tracker: PositionTracker::new(),
            state: EngineState::default(),
            stop_rx,
        }
    }

    /// Runs the full lifecycle: open the position, place both ladders, then
    /// poll until stopped. Startup failures abort the run before laddering
    /// and bubble up so the process exits non-zero; once the monitor loop is
    /// entered, no single failed call ends it.
    pub async fn run(&mut self) -> Result<()> {
        if self.state.is_running {
            warn!("engine already running");
            return Ok(());
        }
        self.state.is_running = true;
        self.state.start_time = Some(Utc::now());

        let symbol = self.config.api_symbol();
        info!(%symbol, side = ?self.config.side, "engine starting");

        let current_price = match self.client.get_ticker_price(&symbol).await {
            Ok(price) => {
                info!(%price, "current price");
                price
            }
            Err(e) => {
                error!(error = %e, "failed to fetch price, aborting run");
                self.state.is_running = false;
                return Err(anyhow::Error::new(e).context("failed to fetch price"));
            }
        };

        if let Err(e) = self.open_position(&symbol, current_price).await {
            error!(error = %e, "failed to open position, aborting run");
            self.state.is_running = false;
            return Err(anyhow::Error::new(e).context("failed to open position"));
        }

        // Ladder phase. Basis for the initial TP ladder is the price observed
        // just before the market order. Per-leg failures are tolerated.
        self.place_tp_ladder(&symbol, current_price, self.config.market_order_amount)
            .await;
        self.place_dca_ladder(&symbol, current_price).await;

        info!("entering monitor loop");
        let mut interval = tokio::time::interval(MONITORING_INTERVAL);
        loop {
            tokio::select! {
                _ = interval.tick() => {}
                changed = self.stop_rx.changed() => {
                    if changed.is_err() {
                        warn!("stop channel closed, shutting down");
                        break;
                    }
                }
            }
            if *self.stop_rx.borrow() {
                info!("stop requested");
                break;
            }
            self.monitor_tick(&symbol).await;
        }

        self.stop().await;
        Ok(())
    }

    /// Stops the engine: flattens the position, cancels everything resting,
    /// and marks the engine not-running. Idempotent; never propagates errors.
    pub async fn stop(&mut self) {
        if !self.state.is_running {
            return;
        }
        info!("stopping engine, closing position");
        let symbol = self.config.api_symbol();
        self.flatten(&symbol).await;
        self.state.is_running = false;
        if let Some(start) = self.state.start_time {
            info!(uptime_secs = (Utc::now() - start).num_seconds(), "engine stopped");
        }
    }

    /// Sets leverage and submits the opening market order. A leverage
    /// rejection other than "already set" is logged and tolerated; a failed
    /// market order aborts the run.
    async fn open_position(
        &mut self,
        symbol: &str,
        current_price: Decimal,
    ) -> Result<(), crate::errors::ExchangeError> {
        let side = self.config.side;
        let amount = self.config.market_order_amount;
        let leverage = self.config.leverage;

        info!(?side, %amount, leverage, "opening position");

        match self.client.set_leverage(symbol, leverage).await {
            Ok(()) => info!(leverage, "leverage set"),
            Err(e) if e.is_leverage_not_modified() => {
                info!(leverage, "leverage already set")
            }
            Err(e) => warn!(error = %e, "failed to set leverage"),
        }

        let qty = normalize_quantity(amount / current_price);
        info!(%amount, %current_price, %qty, "submitting market order");

        let order = self
            .client
            .place_order(
                symbol,
                side.entry_side(),
                OrderType::Market,
                qty,
                None,
                TimeInForce::Ioc,
            )
            .await?;

        info!(order_id = %order.id, status = %order.status, "position opened");
        Ok(())
    }

    async fn place_tp_ladder(&mut self, symbol: &str, basis_price: Decimal, notional: Decimal) {
        let plan = plan_tp(basis_price, self.config.side, &self.config.tp_orders, notional);
        info!(legs = plan.len(), %basis_price, "placing TP ladder");

        let side = self.config.side.exit_side();
        for (i, leg) in plan.iter().enumerate() {
            match self.place_limit(symbol, side, leg).await {
                Ok(id) => {
                    info!(leg = i + 1, price = %leg.price, qty = %leg.qty, order_id = %id, "TP order placed")
                }
                Err(e) => error!(leg = i + 1, error = %e, "TP order failed"),
            }
        }
    }

    async fn place_dca_ladder(&mut self, symbol: &str, current_price: Decimal) {
        let limits = self.config.limit_orders;
        let plan = plan_dca(
            current_price,
            limits.range_percent,
            limits.orders_count,
            self.config.side,
            self.config.limit_orders_amount,
        );
        info!(
            legs = plan.len(),
            range_percent = %limits.range_percent,
            "placing DCA ladder"
        );

        let side = self.config.side.entry_side();
        for (i, leg) in plan.iter().enumerate() {
            match self.place_limit(symbol, side, leg).await {
                Ok(id) => {
                    info!(leg = i + 1, price = %leg.price, qty = %leg.qty, order_id = %id, "DCA order placed")
                }
                Err(e) => error!(leg = i + 1, error = %e, "DCA order failed"),
            }
        }
    }

    async fn place_limit(
        &self,
        symbol: &str,
        side: Side,
        leg: &PlannedOrder,
    ) -> Result<String, crate::errors::ExchangeError> {
        self.client
            .place_order(
                symbol,
                side,
                OrderType::Limit,
                leg.qty,
                Some(leg.price),
                TimeInForce::Gtc,
            )
            .await
            .map(|resp| resp.id)
    }

    /// One reconciliation tick: poll the position, detect growth against the
    /// tracker baseline, and replan the TP ladder when a DCA leg has filled.
    /// A failed poll makes the tick a no-op; the baseline is left untouched.
    async fn monitor_tick(&mut self, symbol: &str) {
        let snapshot = match self.client.get_positions(symbol).await {
            Ok(list) => list.into_iter().find(|p| p.size > Decimal::ZERO),
            Err(e) => {
                warn!(error = %e, "position poll failed, skipping tick");
                return;
            }
        };

        let snap = match snapshot {
            Some(snap) => snap,
            None => {
                info!("no open position");
                self.tracker.record(Decimal::ZERO);
                return;
            }
        };

        info!(
            symbol = %snap.symbol,
            size = %snap.size,
            avg_price = %snap.avg_price,
            pnl = %snap.unrealized_pnl,
            "position active"
        );

        let baseline = self.tracker.last_observed_size();
        let grown = self.tracker.has_grown(&snap);
        self.tracker.record(snap.size);

        if grown {
            info!(size = %snap.size, %baseline, "position grew, recomputing TP ladder");
            self.log_recent_fills(symbol).await;
            self.reconcile_tp(symbol).await;
        }
    }

    /// Cancel-before-replace for the TP ladder. Cancels every open limit
    /// order for the symbol (the open-orders list does not distinguish DCA
    /// from TP legs, so both go), re-reads the exchange's average entry
    /// price, and places a fresh TP ladder against it. Not atomic: a failure
    /// between cancel and place leaves the position briefly uncovered.
    async fn reconcile_tp(&mut self, symbol: &str) {
        self.cancel_open_limit_orders(symbol).await;

        let position = match self.client.get_positions(symbol).await {
            Ok(list) => list.into_iter().find(|p| p.size > Decimal::ZERO),
            Err(e) => {
                error!(error = %e, "failed to re-read position, TP ladder not replaced");
                return;
            }
        };
        let snap = match position {
            Some(snap) if snap.avg_price > Decimal::ZERO => snap,
            _ => {
                warn!("position gone before TP replacement");
                return;
            }
        };

        info!(avg_price = %snap.avg_price, "new average entry price");
        let notional = self.tp_notional(&snap);
        self.place_tp_ladder(symbol, snap.avg_price, notional).await;
    }

    /// Notional the TP ladder is sized from. The default reuses the original
    /// market order amount even after DCA fills have grown the position, so
    /// coverage can drift from the live size; see `TpSizing`.
    fn tp_notional(&self, snap: &PositionSnapshot) -> Decimal {
        match self.config.tp_sizing {
            TpSizing::InitialNotional => self.config.market_order_amount,
            TpSizing::PositionNotional => snap.size * snap.avg_price,
        }
    }

    async fn cancel_open_limit_orders(&self, symbol: &str) {
        let orders = match self.client.get_open_orders(symbol).await {
            Ok(orders) => orders,
            Err(e) => {
                error!(error = %e, "failed to list open orders");
                return;
            }
        };

        for order in orders.iter().filter(|o| o.order_type == OrderType::Limit) {
            match self.client.cancel_order(symbol, &order.id).await {
                Ok(()) => info!(order_id = %order.id, "order cancelled"),
                Err(e) => error!(order_id = %order.id, error = %e, "cancel failed"),
            }
        }
    }

    /// Informational only: surfaces which orders filled recently. History
    /// semantics are not trusted for detection, and a failure here never
    /// affects the tick.
    async fn log_recent_fills(&self, symbol: &str) {
        match self.client.get_order_history(symbol, FILL_HISTORY_LIMIT).await {
            Ok(orders) => {
                for order in orders
                    .iter()
                    .filter(|o| o.status == crate::types::OrderStatus::Filled)
                {
                    info!(order_id = %order.id, side = ?order.side, qty = %order.qty, "order filled");
                }
            }
            Err(e) => warn!(error = %e, "order history unavailable"),
        }
    }

    /// Closes the position with an opposing market order and cancels every
    /// remaining open order, regardless of type. Each failure is logged on
    /// its own; flattening always runs to completion.
    async fn flatten(&mut self, symbol: &str) {
        let position = match self.client.get_positions(symbol).await {
            Ok(list) => list.into_iter().find(|p| p.size > Decimal::ZERO),
            Err(e) => {
                error!(error = %e, "failed to fetch position while flattening");
                None
            }
        };

        if let Some(snap) = position {
            let close_side = self.config.side.exit_side();
            info!(size = %snap.size, ?close_side, "closing position");
            match self
                .client
                .place_order(
                    symbol,
                    close_side,
                    OrderType::Market,
                    snap.size,
                    None,
                    TimeInForce::Ioc,
                )
                .await
            {
                Ok(order) => info!(order_id = %order.id, "position closed"),
                Err(e) => error!(error = %e, "failed to close position"),
            }
        } else {
            info!("no open position to close");
        }

        self.cancel_all_orders(symbol).await;
        self.tracker.record(Decimal::ZERO);
    }

    async fn cancel_all_orders(&self, symbol: &str) {
        let orders = match self.client.get_open_orders(symbol).await {
            Ok(orders) => orders,
            Err(e) => {
                error!(error = %e, "failed to list open orders while flattening");
                return;
            }
        };

        if orders.is_empty() {
            info!("no open orders to cancel");
            return;
        }

        info!(count = orders.len(), "cancelling remaining orders");
        for order in &orders {
            match self.client.cancel_order(symbol, &order.id).await {
                Ok(()) => info!(order_id = %order.id, "order cancelled"),
                Err(e) => warn!(order_id = %order.id, error = %e, "cancel failed"),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{LimitOrdersConfig, TpLeg};
    use crate::errors::ExchangeError;
    use crate::types::{Order, OrderResponse, OrderStatus, PositionSide};
    use async_trait::async_trait;
    use rust_decimal_macros::dec;
    use std::sync::Mutex;

    #[derive(Debug, Clone, PartialEq)]
    struct PlacedOrder {
        side: Side,
        order_type: OrderType,
        qty: Decimal,
        price: Option<Decimal>,
        time_in_force: TimeInForce,
    }

    /// Recording stub for the gateway: serves canned positions and open
    /// orders, records placements and cancels. The failure knobs reject
    /// specific calls so containment paths can be exercised.
    #[derive(Default)]
    struct MockExchange {
        positions: Mutex<Vec<PositionSnapshot>>,
        open_orders: Mutex<Vec<Order>>,
        placed: Mutex<Vec<PlacedOrder>>,
        cancelled: Mutex<Vec<String>>,
        fail_ticker: bool,
        reject_market_orders: bool,
        reject_limit_prices: Vec<Decimal>,
    }

    impl MockExchange {
        fn set_position(&self, size: Decimal, avg_price: Decimal) {
            *self.positions.lock().unwrap() = vec![PositionSnapshot {
                symbol: "BTCUSDT".to_string(),
                size,
                avg_price,
                unrealized_pnl: Decimal::ZERO,
            }];
        }

        fn set_open_orders(&self, orders: Vec<Order>) {
            *self.open_orders.lock().unwrap() = orders;
        }

        fn placed(&self) -> Vec<PlacedOrder> {
            self.placed.lock().unwrap().clone()
        }

        fn cancelled(&self) -> Vec<String> {
            self.cancelled.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl ExchangeClient for MockExchange {
        async fn get_ticker_price(&self, _symbol: &str) -> Result<Decimal, ExchangeError> {
            if self.fail_ticker {
                return Err(ExchangeError::Api {
                    code: 10016,
                    msg: "server error".to_string(),
                });
            }
            Ok(dec!(50000))
        }

        async fn set_leverage(&self, _symbol: &str, _leverage: u32) -> Result<(), ExchangeError> {
            Ok(())
        }

        async fn place_order(
            &self,
            _symbol: &str,
            side: Side,
            order_type: OrderType,
            qty: Decimal,
            price: Option<Decimal>,
            time_in_force: TimeInForce,
        ) -> Result<OrderResponse, ExchangeError> {
            let rejected = match price {
                None => self.reject_market_orders,
                Some(p) => self.reject_limit_prices.contains(&p),
            };
            if rejected {
                return Err(ExchangeError::Api {
                    code: 110007,
                    msg: "insufficient available balance".to_string(),
                });
            }
            let mut placed = self.placed.lock().unwrap();
            placed.push(PlacedOrder {
                side,
                order_type,
                qty,
                price,
                time_in_force,
            });
            Ok(OrderResponse {
                id: format!("order-{}", placed.len()),
                status: "New".to_string(),
            })
        }

        async fn cancel_order(&self, _symbol: &str, order_id: &str) -> Result<(), ExchangeError> {
            self.cancelled.lock().unwrap().push(order_id.to_string());
            Ok(())
        }

        async fn get_open_orders(&self, _symbol: &str) -> Result<Vec<Order>, ExchangeError> {
            Ok(self.open_orders.lock().unwrap().clone())
        }

        async fn get_positions(
            &self,
            _symbol: &str,
        ) -> Result<Vec<PositionSnapshot>, ExchangeError> {
            Ok(self.positions.lock().unwrap().clone())
        }

        async fn get_order_history(
            &self,
            _symbol: &str,
            _limit: u32,
        ) -> Result<Vec<Order>, ExchangeError> {
            Ok(vec![])
        }
    }

    fn test_config(side: PositionSide) -> StrategyConfig {
        StrategyConfig {
            symbol: "BTC/USDT".to_string(),
            side,
            market_order_amount: dec!(1000),
            leverage: 10,
            tp_orders: vec![
                TpLeg {
                    price_percent: dec!(5),
                    quantity_percent: dec!(50),
                },
                TpLeg {
                    price_percent: dec!(10),
                    quantity_percent: dec!(50),
                },
            ],
            limit_orders: LimitOrdersConfig {
                range_percent: dec!(5),
                orders_count: 3,
            },
            limit_orders_amount: dec!(300),
            tp_sizing: TpSizing::default(),
        }
    }

    fn engine(side: PositionSide, client: MockExchange) -> TradingEngine<MockExchange> {
        let (_tx, rx) = watch::channel(false);
        let mut engine = TradingEngine::new(test_config(side), client, rx);
        engine.state.is_running = true;
        engine
    }

    fn resting_limit(id: &str, side: Side, price: Decimal) -> Order {
        Order {
            id: id.to_string(),
            order_type: OrderType::Limit,
            side,
            price: Some(price),
            qty: dec!(0.010),
            status: OrderStatus::New,
        }
    }

    #[tokio::test]
    async fn growth_cancels_limits_and_replans_tp_against_new_average() {
        let client = MockExchange::default();
        client.set_position(dec!(0.03), dec!(49000));
        client.set_open_orders(vec![
            resting_limit("tp-1", Side::Sell, dec!(52500)),
            resting_limit("tp-2", Side::Sell, dec!(55000)),
            resting_limit("dca-1", Side::Buy, dec!(47500)),
        ]);

        let mut engine = engine(PositionSide::Long, client);
        engine.tracker.record(dec!(0.02)); // baseline before the DCA fill

        engine.monitor_tick("BTCUSDT").await;

        // All resting limit orders went, DCA legs included.
        assert_eq!(engine.client.cancelled(), vec!["tp-1", "tp-2", "dca-1"]);

        // Fresh TP ladder priced off the new 49000 average, sized from the
        // original notional.
        let placed = engine.client.placed();
        assert_eq!(placed.len(), 2);
        assert_eq!(placed[0].price, Some(dec!(51450.00)));
        assert_eq!(placed[1].price, Some(dec!(53900.00)));
        for order in &placed {
            assert_eq!(order.side, Side::Sell);
            assert_eq!(order.order_type, OrderType::Limit);
            assert_eq!(order.time_in_force, TimeInForce::Gtc);
            assert_eq!(order.qty, normalize_quantity(dec!(500) / dec!(49000)));
        }

        // Baseline caught up; the same size no longer reads as growth.
        assert_eq!(engine.tracker.last_observed_size(), dec!(0.03));
    }

    #[tokio::test]
    async fn first_observation_does_not_trigger_recompute() {
        let client = MockExchange::default();
        client.set_position(dec!(0.02), dec!(50000));
        client.set_open_orders(vec![resting_limit("tp-1", Side::Sell, dec!(52500))]);

        let mut engine = engine(PositionSide::Long, client);
        engine.monitor_tick("BTCUSDT").await;

        assert!(engine.client.cancelled().is_empty());
        assert!(engine.client.placed().is_empty());
        assert_eq!(engine.tracker.last_observed_size(), dec!(0.02));
    }

    #[tokio::test]
    async fn unchanged_size_is_an_idle_tick() {
        let client = MockExchange::default();
        client.set_position(dec!(0.02), dec!(50000));

        let mut engine = engine(PositionSide::Long, client);
        engine.tracker.record(dec!(0.02));
        engine.monitor_tick("BTCUSDT").await;

        assert!(engine.client.cancelled().is_empty());
        assert!(engine.client.placed().is_empty());
    }

    #[tokio::test]
    async fn position_notional_sizing_tracks_the_live_position() {
        let client = MockExchange::default();
        client.set_position(dec!(0.03), dec!(49000));

        let mut engine = engine(PositionSide::Long, client);
        engine.config.tp_sizing = TpSizing::PositionNotional;
        engine.tracker.record(dec!(0.02));

        engine.monitor_tick("BTCUSDT").await;

        // notional = 0.03 * 49000 = 1470; each leg closes 50% of it.
        let placed = engine.client.placed();
        assert_eq!(placed.len(), 2);
        let expected_qty = normalize_quantity(dec!(735) / dec!(49000));
        assert_eq!(placed[0].qty, expected_qty);
    }

    #[tokio::test]
    async fn flatten_closes_short_with_buy_market_ioc_then_cancels_everything() {
        let client = MockExchange::default();
        client.set_position(dec!(0.05), dec!(50000));
        client.set_open_orders(vec![
            resting_limit("tp-1", Side::Buy, dec!(47500)),
            resting_limit("dca-1", Side::Sell, dec!(51250)),
        ]);

        let mut engine = engine(PositionSide::Short, client);
        engine.flatten("BTCUSDT").await;

        let placed = engine.client.placed();
        assert_eq!(placed.len(), 1);
        assert_eq!(
            placed[0],
            PlacedOrder {
                side: Side::Buy,
                order_type: OrderType::Market,
                qty: dec!(0.05),
                price: None,
                time_in_force: TimeInForce::Ioc,
            }
        );
        assert_eq!(engine.client.cancelled(), vec!["tp-1", "dca-1"]);
        assert_eq!(engine.tracker.last_observed_size(), Decimal::ZERO);
    }

    #[tokio::test]
    async fn rejected_tp_leg_does_not_block_siblings() {
        let mut client = MockExchange::default();
        // First TP leg off the 49000 average prices at 51450; reject it.
        client.reject_limit_prices = vec![dec!(51450.00)];
        client.set_position(dec!(0.03), dec!(49000));
        client.set_open_orders(vec![resting_limit("tp-1", Side::Sell, dec!(52500))]);

        let mut engine = engine(PositionSide::Long, client);
        engine.tracker.record(dec!(0.02));

        engine.monitor_tick("BTCUSDT").await;

        // Cancel still happened, and the surviving leg was still placed.
        assert_eq!(engine.client.cancelled(), vec!["tp-1"]);
        let placed = engine.client.placed();
        assert_eq!(placed.len(), 1);
        assert_eq!(placed[0].price, Some(dec!(53900.00)));
    }

    #[tokio::test]
    async fn rejected_dca_leg_does_not_block_siblings() {
        let mut client = MockExchange::default();
        client.reject_limit_prices = vec![dec!(48750.00)];

        let mut engine = engine(PositionSide::Long, client);
        engine.place_dca_ladder("BTCUSDT", dec!(50000)).await;

        let prices: Vec<_> = engine.client.placed().iter().map(|o| o.price).collect();
        assert_eq!(prices, vec![Some(dec!(47500.00)), Some(dec!(50000.00))]);
    }

    #[tokio::test]
    async fn startup_price_failure_aborts_run_with_error() {
        let mut client = MockExchange::default();
        client.fail_ticker = true;

        let (_tx, rx) = watch::channel(false);
        let mut engine = TradingEngine::new(test_config(PositionSide::Long), client, rx);

        assert!(engine.run().await.is_err());
        assert!(!engine.state.is_running);
        assert!(engine.client.placed().is_empty());
    }

    #[tokio::test]
    async fn startup_order_failure_aborts_run_with_error() {
        let mut client = MockExchange::default();
        client.reject_market_orders = true;

        let (_tx, rx) = watch::channel(false);
        let mut engine = TradingEngine::new(test_config(PositionSide::Long), client, rx);

        assert!(engine.run().await.is_err());
        assert!(!engine.state.is_running);
        // No ladder legs were attempted after the failed entry.
        assert!(engine.client.placed().is_empty());
    }

    #[tokio::test]
    async fn stop_is_idempotent() {
        let client = MockExchange::default();
        let (_tx, rx) = watch::channel(false);
        let mut engine = TradingEngine::new(test_config(PositionSide::Long), client, rx);

        // Not running: nothing should happen.
        engine.stop().await;
        assert!(engine.client.placed().is_empty());

        engine.state.is_running = true;
        engine.stop().await;
        assert!(!engine.state.is_running);

        // Second stop is a no-op.
        engine.stop().await;
        assert!(!engine.state.is_running);
    }

    #[tokio::test]
    async fn poll_failure_leaves_baseline_untouched() {
        struct FailingPoll;

        #[async_trait]
        impl ExchangeClient for FailingPoll {
            async fn get_ticker_price(&self, _s: &str) -> Result<Decimal, ExchangeError> {
                Ok(dec!(50000))
            }
            async fn set_leverage(&self, _s: &str, _l: u32) -> Result<(), ExchangeError> {
                Ok(())
            }
            async fn place_order(
                &self,
                _s: &str,
                _side: Side,
                _t: OrderType,
                _q: Decimal,
                _p: Option<Decimal>,
                _tif: TimeInForce,
            ) -> Result<OrderResponse, ExchangeError> {
                panic!("no orders expected on a failed poll");
            }
            async fn cancel_order(&self, _s: &str, _id: &str) -> Result<(), ExchangeError> {
                panic!("no cancels expected on a failed poll");
            }
            async fn get_open_orders(&self, _s: &str) -> Result<Vec<Order>, ExchangeError> {
                Ok(vec![])
            }
            async fn get_positions(
                &self,
                _s: &str,
            ) -> Result<Vec<PositionSnapshot>, ExchangeError> {
                Err(ExchangeError::Api {
                    code: 10002,
                    msg: "request expired".to_string(),
                })
            }
            async fn get_order_history(
                &self,
                _s: &str,
                _l: u32,
            ) -> Result<Vec<Order>, ExchangeError> {
                Ok(vec![])
            }
        }

        let (_tx, rx) = watch::channel(false);
        let mut engine = TradingEngine::new(test_config(PositionSide::Long), FailingPoll, rx);
        engine.tracker.record(dec!(0.02));

        engine.monitor_tick("BTCUSDT").await;
        assert_eq!(engine.tracker.last_observed_size(), dec!(0.02));
    }
}
