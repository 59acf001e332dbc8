//! Net/VAT decomposition of gross (VAT-inclusive) prices.
//!
//! All monetary values are exact decimals; results are rounded half-up at
//! two fractional digits, so `net + vat == total` always holds at that scale.

use bigdecimal::{BigDecimal, One, RoundingMode};

const SCALE: i64 = 2;

/// Net (VAT-exclusive) part of a gross price at the given VAT rate.
pub fn compute_net_price(total_price: &BigDecimal, vat_rate: &BigDecimal) -> BigDecimal {
    (total_price / (BigDecimal::one() + vat_rate)).with_scale_round(SCALE, RoundingMode::HalfUp)
}

/// VAT contained in a gross price: the gross price minus its net part.
pub fn compute_vat_amount(total_price: &BigDecimal, vat_rate: &BigDecimal) -> BigDecimal {
    total_price - compute_net_price(total_price, vat_rate)
}
