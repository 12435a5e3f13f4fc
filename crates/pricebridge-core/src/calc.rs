//! # Price Calculators
//!
//! The three stateless calculators, one per promotion type. Selection is an
//! explicit `match` on [`PromotionType`] in the resolution driver, a closed
//! set, never dynamic dispatch.
//!
//! All three follow the same ladder where applicable:
//! percent rate → absolute amount → flat offer price.

use crate::error::{EngineError, EngineResult};
use crate::money::Money;
use crate::types::DiscountRule;

/// Resolves a special (simple discount) price.
///
/// - `discount_rate > 0` → `base − rate × base`
/// - else `discount_amount > 0` → `base − amount`
/// - else → flat `offer_price`
///
/// Inert flat-zero rules are filtered out before this runs; see
/// [`DiscountRule::is_inert`].
pub fn special_price(base: Money, rule: &DiscountRule) -> Money {
    if rule.discount_rate.is_positive() {
        base.apply_percent_discount(rule.discount_rate)
    } else if rule.discount_amount.is_positive() {
        base - rule.discount_amount
    } else {
        rule.offer_price
    }
}

/// Resolves a tier (quantity discount) price.
///
/// Same ladder as the special price, except the amount branch spreads the
/// discount across the minimum quantity: `base − amount / lowest_qty`.
/// A non-positive `lowest_qty` in that branch is corrupt upstream data and
/// fails the pass.
pub fn tier_price(base: Money, rule: &DiscountRule) -> EngineResult<Money> {
    if rule.discount_rate.is_positive() {
        Ok(base.apply_percent_discount(rule.discount_rate))
    } else if rule.discount_amount.is_positive() {
        if rule.lowest_qty <= 0.0 {
            return Err(EngineError::InvalidTierQuantity {
                offer_id: rule.offer_id.clone(),
                lowest_qty: rule.lowest_qty,
            });
        }
        Ok(base - rule.discount_amount.div_quantity(rule.lowest_qty))
    } else {
        Ok(rule.offer_price)
    }
}

/// Resolves a deal (mix-and-match bundle) price: always the offer price.
/// The product's base price is carried through for the per-offer merge.
pub fn deal_price(rule: &DiscountRule) -> Money {
    rule.offer_price
}

/// Renders a tier quantity for the feed: rounded to 2 decimals, trailing
/// zeros trimmed ("5", "2.5", "2.55").
pub fn format_quantity(qty: f64) -> String {
    let rounded = (qty * 100.0).round() / 100.0;
    let mut text = format!("{rounded:.2}");

    while text.ends_with('0') {
        text.pop();
    }
    if text.ends_with('.') {
        text.pop();
    }

    text
}

// =============================================================================
// Unit Tests
// =============================================================================
