//! Money arithmetic shared by the cart, checkout and coupon paths.
//!
//! Every amount is in minor units (cents).

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

pub const TAX_RATE_PERCENT: i64 = 8;
pub const FREE_SHIPPING_THRESHOLD: i64 = 5_000;
pub const SHIPPING_FEE: i64 = 1_000;

/// Discount price when present and strictly below list price.
pub fn effective_price(price: i64, discount_price: Option<i64>) -> i64 {
    match discount_price {
        Some(discount) if discount < price => discount,
        _ => price,
    }
}

pub fn is_on_sale(price: i64, discount_price: Option<i64>) -> bool {
    effective_price(price, discount_price) < price
}

/// Percentage off list price, rounded to two decimals.
pub fn discount_percentage(price: i64, discount_price: Option<i64>) -> f64 {
    if price <= 0 || !is_on_sale(price, discount_price) {
        return 0.0;
    }
    let saved = (price - effective_price(price, discount_price)) as f64;
    round2(saved / price as f64 * 100.0)
}

pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Tax on a subtotal, half-up to the cent.
pub fn tax_for(subtotal: i64) -> i64 {
    subtotal
        .saturating_mul(TAX_RATE_PERCENT)
        .saturating_add(50)
        / 100
}

pub fn shipping_for(subtotal: i64) -> i64 {
    if subtotal <= 0 || subtotal > FREE_SHIPPING_THRESHOLD {
        0
    } else {
        SHIPPING_FEE
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct CartSummary {
    pub total_items: i64,
    pub subtotal: i64,
    pub tax: i64,
    pub shipping: i64,
    pub total: i64,
}

impl CartSummary {
    /// Summarise `(unit_price, quantity)` lines.
    pub fn from_lines<I>(lines: I) -> Self
    where
        I: IntoIterator<Item = (i64, i32)>,
    {
        let (total_items, subtotal) = lines
            .into_iter()
            .fold((0i64, 0i64), |(items, sum), (unit, qty)| {
                (
                    items.saturating_add(i64::from(qty)),
                    sum.saturating_add(unit.saturating_mul(i64::from(qty))),
                )
            });
        let tax = tax_for(subtotal);
        let shipping = shipping_for(subtotal);
        Self {
            total_items,
            subtotal,
            tax,
            shipping,
            total: subtotal.saturating_add(tax).saturating_add(shipping),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiscountKind {
    /// Whole percent of the subtotal.
    Percentage(i64),
    /// Fixed amount in cents.
    Fixed(i64),
}

/// Coupon discount for an order. Percentages apply to the subtotal and are
/// capped by `max_discount`; the result never exceeds `order_total`.
pub fn coupon_discount(
    kind: DiscountKind,
    subtotal: i64,
    order_total: i64,
    max_discount: Option<i64>,
) -> i64 {
    let raw = match kind {
        DiscountKind::Percentage(percent) => {
            let amount = subtotal.saturating_mul(percent).saturating_add(50) / 100;
            match max_discount {
                Some(cap) => amount.min(cap),
                None => amount,
            }
        }
        DiscountKind::Fixed(amount) => amount,
    };
    raw.clamp(0, order_total.max(0))
}
