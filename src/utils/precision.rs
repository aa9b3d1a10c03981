// src/utils/precision.rs
use rust_decimal::Decimal;

/// Smallest tradeable contract quantity on the venue.
pub const MIN_QUANTITY: Decimal = Decimal::from_parts(1, 0, 0, false, 3); // 0.001

/// Decimal places the venue accepts for quantities.
pub const QTY_DECIMALS: u32 = 3;

/// Decimal places the venue accepts for limit prices.
pub const PRICE_DECIMALS: u32 = 2;

/// Rounds a raw quantity to the venue's precision and clamps it up to the
/// minimum tradeable quantity. Clamping can make the filled notional exceed
/// the requested one; callers tolerate that.
pub fn normalize_quantity(raw: Decimal) -> Decimal {
    let qty = raw.round_dp(QTY_DECIMALS);
    if qty < MIN_QUANTITY {
        MIN_QUANTITY
    } else {
        qty
    }
}

/// Rounds a raw price to the venue's tick precision.
pub fn normalize_price(raw: Decimal) -> Decimal {
    raw.round_dp(PRICE_DECIMALS)
}
