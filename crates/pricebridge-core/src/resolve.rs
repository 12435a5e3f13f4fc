//! # Price Resolution
//!
//! The per-promotion-type resolution drivers and the aggregation step.
//!
//! ## Data Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Resolution Pass                                   │
//! │                                                                         │
//! │  catalog + categories + rules + params                                  │
//! │        │                                                                │
//! │        ▼                                                                │
//! │  group_by_offer ──► per offer: OfferExclusions (once)                   │
//! │        │                                                                │
//! │        ▼                                                                │
//! │  per Include rule: ScopeExpander ──► eligible products                  │
//! │        │                                                                │
//! │        ▼                                                                │
//! │  calculator (special | tier | deal) ──► one row per product             │
//! │        │                                                                │
//! │        ▼                                                                │
//! │  aggregation: special/tier pass through; deal rows merge per offer;     │
//! │  base rows dedupe by (sku, price)                                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Each driver is a pure function over its snapshots: identical inputs
//! produce byte-identical output ordering and values.

use std::collections::{HashMap, HashSet};

use chrono::{DateTime, Utc};

use crate::calc::{deal_price, format_quantity, special_price, tier_price};
use crate::catalog::ProductCatalog;
use crate::category::CategoryIndex;
use crate::error::EngineResult;
use crate::money::Money;
use crate::rules::{group_by_offer, OfferExclusions};
use crate::scope::{ScopeExpander, UomMatchMode};
use crate::types::{
    BasePrice, DealPrice, DiscountRule, PromotionType, ResolutionParams, ResolvedPrices,
    SpecialPrice, TierPrice, DEAL_STATUS, ELIGIBLE_FOR_PROMO, TIER_CUSTOMER_GROUP,
    TIER_VALUE_TYPE,
};

/// Resolves one promotion type against the pass snapshots.
///
/// Dispatch is a `match` on the closed [`PromotionType`] set.
pub fn resolve_prices(
    catalog: &ProductCatalog,
    categories: &CategoryIndex,
    rules: &[DiscountRule],
    params: &ResolutionParams,
    promotion: PromotionType,
) -> EngineResult<ResolvedPrices> {
    match promotion {
        PromotionType::Special => {
            resolve_special_prices(catalog, categories, rules, params).map(ResolvedPrices::Special)
        }
        PromotionType::Tier => {
            resolve_tier_prices(catalog, categories, rules, params).map(ResolvedPrices::Tier)
        }
        PromotionType::Deal => {
            resolve_deal_prices(catalog, categories, rules, params).map(ResolvedPrices::Deal)
        }
        PromotionType::Base => Ok(ResolvedPrices::Base(resolve_base_prices(catalog, params))),
    }
}

/// Renders a validity date for the feed.
fn format_feed_date(date: &DateTime<Utc>) -> String {
    date.format("%Y-%m-%d").to_string()
}

// =============================================================================
// Special Prices
// =============================================================================

/// Resolves special (simple discount) prices: one row per eligible product
/// per Include rule. Inert flat-zero rules are skipped before expansion.
pub fn resolve_special_prices(
    catalog: &ProductCatalog,
    categories: &CategoryIndex,
    rules: &[DiscountRule],
    params: &ResolutionParams,
) -> EngineResult<Vec<SpecialPrice>> {
    let expander = ScopeExpander::new(
        catalog,
        categories,
        UomMatchMode::for_promotion(PromotionType::Special),
    );
    let mut resolved = Vec::new();

    for offer in group_by_offer(rules) {
        let exclusions = OfferExclusions::from_offer(&offer.rules);
        let mut emitted: HashSet<i64> = HashSet::new();

        for rule in &offer.rules {
            if !rule.is_include() || rule.is_inert() {
                continue;
            }

            for product in expander.expand(rule, &exclusions)? {
                if params.dedupe_overlapping && !emitted.insert(product.record_id) {
                    continue;
                }

                let price = special_price(product.base_price, rule);
                resolved.push(SpecialPrice {
                    sku: product.sku.clone(),
                    special_price: price,
                    special_price_feed: price,
                    eligible_for_promo: ELIGIBLE_FOR_PROMO.to_string(),
                    valid_from: format_feed_date(&rule.valid_from),
                    valid_to: format_feed_date(&rule.valid_to),
                    store_view_code: params.store_view_code.clone(),
                });
            }
        }
    }

    Ok(resolved)
}

// =============================================================================
// Tier Prices
// =============================================================================

/// Resolves tier (quantity discount) prices: one row per eligible product
/// per Include rule, with the minimum quantity rendered for the feed.
pub fn resolve_tier_prices(
    catalog: &ProductCatalog,
    categories: &CategoryIndex,
    rules: &[DiscountRule],
    params: &ResolutionParams,
) -> EngineResult<Vec<TierPrice>> {
    let expander = ScopeExpander::new(
        catalog,
        categories,
        UomMatchMode::for_promotion(PromotionType::Tier),
    );
    let mut resolved = Vec::new();

    for offer in group_by_offer(rules) {
        let exclusions = OfferExclusions::from_offer(&offer.rules);
        let mut emitted: HashSet<i64> = HashSet::new();

        for rule in &offer.rules {
            if !rule.is_include() {
                continue;
            }

            for product in expander.expand(rule, &exclusions)? {
                if params.dedupe_overlapping && !emitted.insert(product.record_id) {
                    continue;
                }

                resolved.push(TierPrice {
                    sku: product.sku.clone(),
                    quantity: format_quantity(rule.lowest_qty),
                    tier_price: tier_price(product.base_price, rule)?,
                    website: params.website.clone(),
                    customer_group: TIER_CUSTOMER_GROUP.to_string(),
                    value_type: TIER_VALUE_TYPE.to_string(),
                });
            }
        }
    }

    Ok(resolved)
}

// =============================================================================
// Deal Prices
// =============================================================================

/// One matched product before the per-offer merge.
#[derive(Debug)]
struct DealRow<'a> {
    offer_id: &'a str,
    sku: &'a str,
    base_price: Money,
    deal_price: Money,
    name: &'a str,
    description: &'a str,
}

/// Resolves deal (mix-and-match bundle) prices and merges them per offer:
/// one output row per offer with the comma-joined SKU list (duplicates
/// included, encounter order), the offer-level deal price, and the
/// aggregate savings Σ base prices − deal price.
pub fn resolve_deal_prices(
    catalog: &ProductCatalog,
    categories: &CategoryIndex,
    rules: &[DiscountRule],
    params: &ResolutionParams,
) -> EngineResult<Vec<DealPrice>> {
    let expander = ScopeExpander::new(
        catalog,
        categories,
        UomMatchMode::for_promotion(PromotionType::Deal),
    );
    let mut rows: Vec<DealRow<'_>> = Vec::new();

    for offer in group_by_offer(rules) {
        let exclusions = OfferExclusions::from_offer(&offer.rules);
        let mut emitted: HashSet<i64> = HashSet::new();

        for rule in &offer.rules {
            if !rule.is_include() {
                continue;
            }

            for product in expander.expand(rule, &exclusions)? {
                if params.dedupe_overlapping && !emitted.insert(product.record_id) {
                    continue;
                }

                rows.push(DealRow {
                    offer_id: offer.offer_id,
                    sku: &product.sku,
                    base_price: product.base_price,
                    deal_price: deal_price(rule),
                    name: &rule.name,
                    description: &rule.description,
                });
            }
        }
    }

    Ok(merge_deal_rows(&rows, params))
}

/// Merges matched deal rows into one row per offer, in first-encounter
/// order of offers.
fn merge_deal_rows(rows: &[DealRow<'_>], params: &ResolutionParams) -> Vec<DealPrice> {
    let mut merged: Vec<DealPrice> = Vec::new();
    let mut index_by_offer: HashMap<&str, usize> = HashMap::new();
    let mut totals: Vec<Money> = Vec::new();

    for row in rows {
        match index_by_offer.get(row.offer_id) {
            Some(idx) => {
                let entry = &mut merged[*idx];
                entry.skus.push(',');
                entry.skus.push_str(row.sku);
                totals[*idx] += row.base_price;
            }
            None => {
                index_by_offer.insert(row.offer_id, merged.len());
                totals.push(row.base_price);
                merged.push(DealPrice {
                    offer_id: row.offer_id.to_string(),
                    skus: row.sku.to_string(),
                    discount: Money::zero(),
                    deal_price: row.deal_price,
                    name: row.name.to_string(),
                    description: row.description.to_string(),
                    status: DEAL_STATUS,
                    website: params.website.clone(),
                });
            }
        }
    }

    // Aggregate savings across the whole bundle, not per SKU.
    for (entry, total) in merged.iter_mut().zip(totals) {
        entry.discount = total - entry.deal_price;
    }

    merged
}

// =============================================================================
// Base Prices
// =============================================================================

/// Emits the plain base-price feed, deduplicated by (sku, base price) in
/// first-encounter order.
pub fn resolve_base_prices(catalog: &ProductCatalog, params: &ResolutionParams) -> Vec<BasePrice> {
    let mut seen: HashSet<(&str, i64)> = HashSet::new();
    let mut resolved = Vec::new();

    for product in catalog.iter() {
        if !seen.insert((product.sku.as_str(), product.base_price.cents())) {
            continue;
        }

        resolved.push(BasePrice {
            sku: product.sku.clone(),
            base_price: product.base_price,
            store_view_code: params.store_view_code.clone(),
            uom: product.uom.clone(),
        });
    }

    resolved
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::EngineError;
    use crate::types::{Category, DiscountMethod, DiscountRate, LineType, PricedProduct};

    fn params() -> ResolutionParams {
        ResolutionParams {
            store_view_code: "default".to_string(),
            website: "base".to_string(),
            dedupe_overlapping: false,
        }
    }

    fn category(record_id: i64, parent: Option<i64>) -> Category {
        Category {
            record_id,
            parent_category: parent,
            name: format!("Category {record_id}"),
        }
    }

    fn product(record_id: i64, sku: &str, cents: i64, uom: &str, category_id: i64) -> PricedProduct {
        PricedProduct {
            record_id,
            sku: sku.to_string(),
            base_price: Money::from_cents(cents),
            uom: uom.to_string(),
            category_id,
        }
    }

    fn rule(offer_id: &str) -> DiscountRule {
        DiscountRule {
            offer_id: offer_id.to_string(),
            product: 0,
            variant: 0,
            category: 0,
            uom: String::new(),
            line_type: LineType::Include,
            discount_rate: DiscountRate::zero(),
            discount_amount: Money::zero(),
            offer_price: Money::zero(),
            discount_method: DiscountMethod::Standard,
            lowest_qty: 0.0,
            valid_from: DateTime::<Utc>::UNIX_EPOCH,
            valid_to: DateTime::<Utc>::UNIX_EPOCH,
            name: String::new(),
            description: String::new(),
        }
    }

    #[test]
    fn test_special_percent_discount_end_to_end() {
        let catalog = ProductCatalog::build(vec![product(1, "SKU-A", 5000, "EA", 10)]);
        let index = CategoryIndex::build(&[category(10, None)]);

        let mut r = rule("OFFER-1");
        r.product = 1;
        r.discount_rate = DiscountRate::from_percent(20.0);

        let resolved = resolve_special_prices(&catalog, &index, &[r], &params()).unwrap();

        assert_eq!(resolved.len(), 1);
        assert_eq!(resolved[0].sku, "SKU-A");
        assert_eq!(resolved[0].special_price.cents(), 4000);
        assert_eq!(resolved[0].special_price_feed.cents(), 4000);
        assert_eq!(resolved[0].eligible_for_promo, "no");
        assert_eq!(resolved[0].valid_from, "1970-01-01");
        assert_eq!(resolved[0].store_view_code, "default");
    }

    #[test]
    fn test_subtree_pruning_excludes_descendants() {
        //   10
        //   ├── 20  (excluded)
        //   │    └── 30
        //   └── 40
        let index = CategoryIndex::build(&[
            category(10, None),
            category(20, Some(10)),
            category(30, Some(20)),
            category(40, Some(10)),
        ]);
        let catalog = ProductCatalog::build(vec![
            product(1, "ROOT", 1000, "EA", 10),
            product(2, "EXCLUDED", 1000, "EA", 20),
            product(3, "DESCENDANT", 1000, "EA", 30),
            product(4, "SIBLING", 1000, "EA", 40),
        ]);

        let mut include = rule("OFFER-1");
        include.category = 10;
        include.offer_price = Money::from_cents(500);

        let mut exclude = rule("OFFER-1");
        exclude.category = 20;
        exclude.line_type = LineType::Exclude;

        let resolved =
            resolve_special_prices(&catalog, &index, &[include, exclude], &params()).unwrap();

        let skus: Vec<&str> = resolved.iter().map(|r| r.sku.as_str()).collect();
        // Category 30 was never named in the exclusion, yet its products are
        // gone because ancestor 20 was excluded.
        assert_eq!(skus, vec!["ROOT", "SIBLING"]);
    }

    #[test]
    fn test_uom_asymmetry_between_special_and_tier() {
        let catalog = ProductCatalog::build(vec![product(1, "SKU-A", 5000, "ea", 10)]);
        let index = CategoryIndex::build(&[category(10, None)]);

        let mut r = rule("OFFER-1");
        r.product = 1;
        r.uom = "EA".to_string();
        r.discount_rate = DiscountRate::from_percent(10.0);

        // Special: case-insensitive UOM match includes the product.
        let special = resolve_special_prices(&catalog, &index, &[r.clone()], &params()).unwrap();
        assert_eq!(special.len(), 1);

        // Deal: same policy as special.
        let mut deal_rule = r.clone();
        deal_rule.offer_price = Money::from_cents(4000);
        let deals = resolve_deal_prices(&catalog, &index, &[deal_rule], &params()).unwrap();
        assert_eq!(deals.len(), 1);

        // Tier: exact match required, "EA" != "ea".
        let tiers = resolve_tier_prices(&catalog, &index, &[r], &params()).unwrap();
        assert!(tiers.is_empty());
    }

    #[test]
    fn test_deal_merge_correctness() {
        let catalog = ProductCatalog::build(vec![
            product(1, "A", 1000, "EA", 10),
            product(2, "B", 1500, "EA", 10),
            product(3, "C", 2000, "EA", 10),
        ]);
        let index = CategoryIndex::build(&[category(10, None)]);

        let mut r = rule("OFFER-1");
        r.category = 10;
        r.offer_price = Money::from_cents(3000);
        r.name = "Bundle".to_string();
        r.description = "Mix and match".to_string();

        let resolved = resolve_deal_prices(&catalog, &index, &[r], &params()).unwrap();

        assert_eq!(resolved.len(), 1);
        let merged = &resolved[0];
        assert_eq!(merged.offer_id, "OFFER-1");
        assert_eq!(merged.skus, "A,B,C");
        assert_eq!(merged.deal_price.cents(), 3000);
        // (10.00 + 15.00 + 20.00) − 30.00 = 15.00
        assert_eq!(merged.discount.cents(), 1500);
        assert_eq!(merged.name, "Bundle");
        assert_eq!(merged.status, DEAL_STATUS);
        assert_eq!(merged.website, "base");
    }

    #[test]
    fn test_tier_amount_division() {
        let catalog = ProductCatalog::build(vec![product(1, "SKU-A", 10000, "EA", 10)]);
        let index = CategoryIndex::build(&[category(10, None)]);

        let mut r = rule("OFFER-1");
        r.product = 1;
        r.discount_amount = Money::from_cents(1000);
        r.lowest_qty = 5.0;

        let resolved = resolve_tier_prices(&catalog, &index, &[r], &params()).unwrap();

        assert_eq!(resolved.len(), 1);
        // 100.00 − (10.00 / 5) = 98.00
        assert_eq!(resolved[0].tier_price.cents(), 9800);
        assert_eq!(resolved[0].quantity, "5");
        assert_eq!(resolved[0].customer_group, "ALL GROUPS");
        assert_eq!(resolved[0].value_type, "Fixed");
        assert_eq!(resolved[0].website, "base");
    }

    #[test]
    fn test_tier_zero_quantity_fails_the_pass() {
        let catalog = ProductCatalog::build(vec![product(1, "SKU-A", 10000, "EA", 10)]);
        let index = CategoryIndex::build(&[category(10, None)]);

        let mut r = rule("OFFER-1");
        r.product = 1;
        r.discount_amount = Money::from_cents(1000);
        r.lowest_qty = 0.0;

        let err = resolve_tier_prices(&catalog, &index, &[r], &params()).unwrap_err();
        assert!(matches!(err, EngineError::InvalidTierQuantity { .. }));
    }

    #[test]
    fn test_idempotence() {
        let catalog = ProductCatalog::build(vec![
            product(1, "SKU-A", 5000, "EA", 10),
            product(2, "SKU-B", 2500, "EA", 20),
        ]);
        let index = CategoryIndex::build(&[category(10, None), category(20, Some(10))]);

        let mut r1 = rule("OFFER-1");
        r1.category = 10;
        r1.discount_rate = DiscountRate::from_percent(15.0);

        let mut r2 = rule("OFFER-2");
        r2.product = 2;
        r2.offer_price = Money::from_cents(1999);

        let rules = vec![r1, r2];

        let first = resolve_special_prices(&catalog, &index, &rules, &params()).unwrap();
        let second = resolve_special_prices(&catalog, &index, &rules, &params()).unwrap();

        assert_eq!(first, second);
        assert_eq!(first.len(), 3);
    }

    #[test]
    fn test_empty_rules_resolve_to_empty_output() {
        let catalog = ProductCatalog::build(vec![product(1, "SKU-A", 5000, "EA", 10)]);
        let index = CategoryIndex::build(&[category(10, None)]);

        assert!(resolve_special_prices(&catalog, &index, &[], &params()).unwrap().is_empty());
        assert!(resolve_tier_prices(&catalog, &index, &[], &params()).unwrap().is_empty());
        assert!(resolve_deal_prices(&catalog, &index, &[], &params()).unwrap().is_empty());
    }

    #[test]
    fn test_missing_category_skips_rule_only() {
        let catalog = ProductCatalog::build(vec![product(1, "SKU-A", 5000, "EA", 10)]);
        let index = CategoryIndex::build(&[category(10, None)]);

        let mut dangling = rule("OFFER-1");
        dangling.category = 999;
        dangling.offer_price = Money::from_cents(100);

        let mut valid = rule("OFFER-1");
        valid.product = 1;
        valid.offer_price = Money::from_cents(4500);

        let resolved =
            resolve_special_prices(&catalog, &index, &[dangling, valid], &params()).unwrap();

        // The dangling rule contributed nothing; its sibling still resolved.
        assert_eq!(resolved.len(), 1);
        assert_eq!(resolved[0].special_price.cents(), 4500);
    }

    #[test]
    fn test_overlapping_rules_duplicate_by_default_and_dedupe_on_request() {
        let catalog = ProductCatalog::build(vec![product(1, "SKU-A", 5000, "EA", 20)]);
        let index = CategoryIndex::build(&[category(10, None), category(20, Some(10))]);

        // Two Include rules in the same offer covering overlapping subtrees.
        let mut wide = rule("OFFER-1");
        wide.category = 10;
        wide.offer_price = Money::from_cents(4000);

        let mut narrow = rule("OFFER-1");
        narrow.category = 20;
        narrow.offer_price = Money::from_cents(4000);

        let rules = vec![wide, narrow];

        let default_run = resolve_special_prices(&catalog, &index, &rules, &params()).unwrap();
        assert_eq!(default_run.len(), 2, "default emits one row per covering rule");

        let mut dedupe_params = params();
        dedupe_params.dedupe_overlapping = true;
        let deduped = resolve_special_prices(&catalog, &index, &rules, &dedupe_params).unwrap();
        assert_eq!(deduped.len(), 1);
    }

    #[test]
    fn test_dedupe_never_collapses_across_offers() {
        let catalog = ProductCatalog::build(vec![product(1, "SKU-A", 5000, "EA", 10)]);
        let index = CategoryIndex::build(&[category(10, None)]);

        let mut first = rule("OFFER-1");
        first.category = 10;
        first.offer_price = Money::from_cents(4000);

        let mut second = rule("OFFER-2");
        second.category = 10;
        second.offer_price = Money::from_cents(3500);

        let mut dedupe_params = params();
        dedupe_params.dedupe_overlapping = true;

        let resolved =
            resolve_special_prices(&catalog, &index, &[first, second], &dedupe_params).unwrap();

        assert_eq!(resolved.len(), 2, "exclusion state is offer-scoped, so is dedupe");
    }

    #[test]
    fn test_inert_flat_zero_special_rules_are_skipped() {
        let catalog = ProductCatalog::build(vec![product(1, "SKU-A", 5000, "EA", 10)]);
        let index = CategoryIndex::build(&[category(10, None)]);

        let mut inert = rule("OFFER-1");
        inert.product = 1;
        inert.discount_method = DiscountMethod::FlatZero;
        inert.offer_price = Money::from_cents(4999);

        assert!(resolve_special_prices(&catalog, &index, &[inert.clone()], &params())
            .unwrap()
            .is_empty());

        // The same shape is NOT inert for tier resolution.
        let tiers = resolve_tier_prices(&catalog, &index, &[inert], &params()).unwrap();
        assert_eq!(tiers.len(), 1);
    }

    #[test]
    fn test_deal_skus_keep_duplicates_in_encounter_order() {
        let catalog = ProductCatalog::build(vec![product(1, "SKU-A", 1000, "EA", 10)]);
        let index = CategoryIndex::build(&[category(10, None)]);

        // Two Include rules covering the same product in one offer.
        let mut r1 = rule("OFFER-1");
        r1.category = 10;
        r1.offer_price = Money::from_cents(800);

        let mut r2 = rule("OFFER-1");
        r2.product = 1;
        r2.offer_price = Money::from_cents(800);

        let resolved = resolve_deal_prices(&catalog, &index, &[r1, r2], &params()).unwrap();

        assert_eq!(resolved.len(), 1);
        assert_eq!(resolved[0].skus, "SKU-A,SKU-A");
        // Both base prices count toward the aggregate savings.
        assert_eq!(resolved[0].discount.cents(), 2000 - 800);
    }

    #[test]
    fn test_base_prices_dedupe_by_sku_and_price() {
        let catalog = ProductCatalog::build(vec![
            product(1, "SKU-A", 1000, "EA", 10),
            product(2, "SKU-A", 1000, "CS", 10), // same sku+price: dropped
            product(3, "SKU-A", 1200, "EA", 10), // same sku, new price: kept
            product(4, "SKU-B", 1000, "EA", 10),
        ]);

        let resolved = resolve_base_prices(&catalog, &params());

        assert_eq!(resolved.len(), 3);
        assert_eq!(resolved[0].sku, "SKU-A");
        assert_eq!(resolved[0].base_price.cents(), 1000);
        assert_eq!(resolved[0].uom, "EA");
        assert_eq!(resolved[1].base_price.cents(), 1200);
        assert_eq!(resolved[2].sku, "SKU-B");
    }

    #[test]
    fn test_resolve_prices_dispatch() {
        let catalog = ProductCatalog::build(vec![product(1, "SKU-A", 5000, "EA", 10)]);
        let index = CategoryIndex::build(&[category(10, None)]);

        let mut r = rule("OFFER-1");
        r.product = 1;
        r.discount_rate = DiscountRate::from_percent(20.0);

        let resolved =
            resolve_prices(&catalog, &index, &[r], &params(), PromotionType::Special).unwrap();
        assert_eq!(resolved.promotion_type(), PromotionType::Special);
        assert_eq!(resolved.len(), 1);

        let base = resolve_prices(&catalog, &index, &[], &params(), PromotionType::Base).unwrap();
        assert_eq!(base.promotion_type(), PromotionType::Base);
        assert_eq!(base.len(), 1);
    }
}
