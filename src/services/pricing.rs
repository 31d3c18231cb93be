//! Cart and checkout totals.

use rust_decimal::{Decimal, RoundingStrategy};

use crate::{
    config::PricingConfig,
    models::{Cart, OrderTotals},
};

/// Free shipping at or above the threshold, a flat rate below it, and nothing
/// for an empty cart.
pub fn shipping_for(subtotal: Decimal, pricing: &PricingConfig) -> Decimal {
    if subtotal <= Decimal::ZERO || subtotal >= pricing.free_shipping_threshold {
        Decimal::ZERO
    } else {
        pricing.flat_shipping_rate
    }
}

pub fn tax_for(subtotal: Decimal, pricing: &PricingConfig) -> Decimal {
    round_cents(subtotal * pricing.tax_rate)
}

/// Amount still needed to unlock free shipping, if any.
pub fn free_shipping_remaining(subtotal: Decimal, pricing: &PricingConfig) -> Option<Decimal> {
    (subtotal > Decimal::ZERO && subtotal < pricing.free_shipping_threshold)
        .then(|| pricing.free_shipping_threshold - subtotal)
}

/// Totals for an arbitrary subtotal. The total never goes below zero.
pub fn totals_for(subtotal: Decimal, discount: Decimal, pricing: &PricingConfig) -> OrderTotals {
    let subtotal = round_cents(subtotal);
    let shipping = shipping_for(subtotal, pricing);
    let tax = tax_for(subtotal, pricing);
    let total = (subtotal + shipping + tax - discount).max(Decimal::ZERO);

    OrderTotals {
        subtotal,
        tax,
        shipping,
        discount,
        total,
    }
}

pub fn compute(cart: &Cart, discount: Decimal, pricing: &PricingConfig) -> OrderTotals {
    totals_for(cart.subtotal(), discount, pricing)
}

fn round_cents(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}
