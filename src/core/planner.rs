// src/core/planner.rs
//! Pure ladder planners. Both take the live price/basis plus config numbers
//! and return the legs to place; nothing here talks to the exchange.

use crate::config::TpLeg;
use crate::types::{PlannedOrder, PositionSide};
use crate::utils::precision::{normalize_price, normalize_quantity};
use rust_decimal::Decimal;

const HUNDRED: Decimal = Decimal::from_parts(100, 0, 0, false, 0);

/// Computes the DCA ladder: `orders_count` limit legs spread evenly across a
/// window on the adverse side of `current_price` (below it for longs, above
/// it for shorts). One leg lands exactly on the current price and one on the
/// window boundary.
pub fn plan_dca(
    current_price: Decimal,
    range_percent: Decimal,
    orders_count: u32,
    side: PositionSide,
    total_amount: Decimal,
) -> Vec<PlannedOrder> {
    let range = range_percent / HUNDRED;
    let (min_price, max_price) = match side {
        PositionSide::Long => (current_price * (Decimal::ONE - range), current_price),
        PositionSide::Short => (current_price, current_price * (Decimal::ONE + range)),
    };

    let step = (max_price - min_price) / Decimal::from(orders_count - 1);
    let amount_per_leg = total_amount / Decimal::from(orders_count);

    (0..orders_count)
        .map(|i| {
            let price = normalize_price(min_price + step * Decimal::from(i));
            PlannedOrder {
                price,
                qty: normalize_quantity(amount_per_leg / price),
            }
        })
        .collect()
}

/// Computes the TP ladder against `basis_price`, which must be the
/// exchange-reported average entry price at recompute time, never a locally
/// derived value. Prices move in the position's profit direction; quantities
/// are carved out of `notional` per leg percentage.
pub fn plan_tp(
    basis_price: Decimal,
    side: PositionSide,
    legs: &[TpLeg],
    notional: Decimal,
) -> Vec<PlannedOrder> {
    legs.iter()
        .map(|leg| {
            let offset = leg.price_percent / HUNDRED;
            let raw_price = match side {
                PositionSide::Long => basis_price * (Decimal::ONE + offset),
                PositionSide::Short => basis_price * (Decimal::ONE - offset),
            };
            let leg_notional = notional * leg.quantity_percent / HUNDRED;
            PlannedOrder {
                price: normalize_price(raw_price),
                qty: normalize_quantity(leg_notional / basis_price),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn leg(price_percent: Decimal, quantity_percent: Decimal) -> TpLeg {
        TpLeg {
            price_percent,
            quantity_percent,
        }
    }

    #[test]
    fn tp_ladder_for_long_matches_hand_computed_values() {
        let legs = [leg(dec!(5), dec!(50)), leg(dec!(10), dec!(50))];
        let plan = plan_tp(dec!(50000), PositionSide::Long, &legs, dec!(1000));

        assert_eq!(plan.len(), 2);
        assert_eq!(plan[0].price, dec!(52500.00));
        assert_eq!(plan[0].qty, dec!(0.010));
        assert_eq!(plan[1].price, dec!(55000.00));
        assert_eq!(plan[1].qty, dec!(0.010));
    }

    #[test]
    fn tp_prices_move_in_profit_direction() {
        let legs = [leg(dec!(1.5), dec!(25)), leg(dec!(4), dec!(75))];
        let basis = dec!(2345.67);

        for p in plan_tp(basis, PositionSide::Long, &legs, dec!(500)) {
            assert!(p.price > basis);
        }
        for p in plan_tp(basis, PositionSide::Short, &legs, dec!(500)) {
            assert!(p.price < basis);
        }
    }

    #[test]
    fn dca_ladder_for_long_spans_below_current_price() {
        let plan = plan_dca(dec!(50000), dec!(5), 3, PositionSide::Long, dec!(300));

        let prices: Vec<_> = plan.iter().map(|p| p.price).collect();
        assert_eq!(prices, vec![dec!(47500.00), dec!(48750.00), dec!(50000.00)]);
        for p in &plan {
            assert_eq!(p.qty, normalize_quantity(dec!(100) / p.price));
        }
    }

    #[test]
    fn dca_ladder_for_short_spans_above_current_price() {
        let plan = plan_dca(dec!(50000), dec!(5), 3, PositionSide::Short, dec!(300));

        let prices: Vec<_> = plan.iter().map(|p| p.price).collect();
        assert_eq!(prices, vec![dec!(50000.00), dec!(51250.00), dec!(52500.00)]);
    }

    #[test]
    fn dca_ladder_has_count_legs_monotonic_with_window_bounds() {
        let current = dec!(1234.56);
        let range = dec!(7.5);
        let count = 6u32;
        let plan = plan_dca(current, range, count, PositionSide::Long, dec!(600));

        assert_eq!(plan.len(), count as usize);
        for pair in plan.windows(2) {
            assert!(pair[0].price < pair[1].price);
        }

        let tolerance = dec!(0.01);
        let expected_min = current * (Decimal::ONE - range / dec!(100));
        assert!((plan[0].price - expected_min).abs() <= tolerance);
        assert!((plan[count as usize - 1].price - current).abs() <= tolerance);
    }

    #[test]
    fn tiny_legs_clamp_to_minimum_quantity() {
        let plan = plan_dca(dec!(50000), dec!(2), 4, PositionSide::Long, dec!(20));
        for p in plan {
            assert_eq!(p.qty, dec!(0.001));
        }
    }
}
