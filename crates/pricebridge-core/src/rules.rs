//! # Discount Rule Grouping
//!
//! Partitions raw discount rules of one promotion type into per-offer
//! groups, and derives each offer's exclusion sets: the scope every
//! Include rule of that offer must subtract.
//!
//! Exclusions are offer-scoped, not rule-scoped: the three sets are derived
//! once per offer and shared read-only by every Include expansion in it.

use std::collections::{HashMap, HashSet};

use crate::types::{DiscountRule, PricedProduct};

// =============================================================================
// Offer Group
// =============================================================================

/// All rules of one offer, in snapshot encounter order.
#[derive(Debug)]
pub struct OfferGroup<'a> {
    /// The offer identifier shared by the grouped rules.
    pub offer_id: &'a str,

    /// The offer's rules (Include and Exclude lines alike).
    pub rules: Vec<&'a DiscountRule>,
}

/// Groups rules by offer id, preserving first-encounter order of offers and
/// the snapshot order of rules within each offer.
pub fn group_by_offer(rules: &[DiscountRule]) -> Vec<OfferGroup<'_>> {
    let mut groups: Vec<OfferGroup<'_>> = Vec::new();
    let mut index_by_offer: HashMap<&str, usize> = HashMap::new();

    for rule in rules {
        match index_by_offer.get(rule.offer_id.as_str()) {
            Some(idx) => groups[*idx].rules.push(rule),
            None => {
                index_by_offer.insert(rule.offer_id.as_str(), groups.len());
                groups.push(OfferGroup {
                    offer_id: rule.offer_id.as_str(),
                    rules: vec![rule],
                });
            }
        }
    }

    groups
}

// =============================================================================
// Offer Exclusions
// =============================================================================

/// The scope one offer's Exclude lines remove, at three granularities.
///
/// - `categories`: `Exclude ∧ category > 0 ∧ product == 0`; prunes whole
///   subtrees during expansion
/// - `products`: `Exclude ∧ product > 0 ∧ variant == 0`
/// - `variants`: `Exclude ∧ product > 0 ∧ variant > 0`
#[derive(Debug, Default)]
pub struct OfferExclusions {
    pub categories: HashSet<i64>,
    pub products: HashSet<i64>,
    pub variants: HashSet<i64>,
}

impl OfferExclusions {
    /// Derives the exclusion sets from one offer's rules.
    pub fn from_offer(rules: &[&DiscountRule]) -> Self {
        let mut exclusions = OfferExclusions::default();

        for rule in rules.iter().filter(|r| r.is_exclude()) {
            if rule.category > 0 && rule.product == 0 {
                exclusions.categories.insert(rule.category);
            } else if rule.product > 0 && rule.variant == 0 {
                exclusions.products.insert(rule.product);
            } else if rule.product > 0 && rule.variant > 0 {
                exclusions.variants.insert(rule.variant);
            }
        }

        exclusions
    }

    /// A category whose whole subtree is pruned from expansion.
    #[inline]
    pub fn excludes_category(&self, category_id: i64) -> bool {
        self.categories.contains(&category_id)
    }

    /// A product removed from expansion, whether it was excluded as a
    /// master product or as a specific variant.
    #[inline]
    pub fn excludes_product(&self, product: &PricedProduct) -> bool {
        self.products.contains(&product.record_id) || self.variants.contains(&product.record_id)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::money::Money;
    use crate::types::{DiscountMethod, DiscountRate, LineType};
    use chrono::{DateTime, Utc};

    fn rule(offer_id: &str, line_type: LineType) -> DiscountRule {
        DiscountRule {
            offer_id: offer_id.to_string(),
            product: 0,
            variant: 0,
            category: 0,
            uom: String::new(),
            line_type,
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
    fn test_group_by_offer_preserves_encounter_order() {
        let rules = vec![
            rule("B", LineType::Include),
            rule("A", LineType::Include),
            rule("B", LineType::Exclude),
            rule("C", LineType::Include),
        ];

        let groups = group_by_offer(&rules);

        let ids: Vec<&str> = groups.iter().map(|g| g.offer_id).collect();
        assert_eq!(ids, vec!["B", "A", "C"]);
        assert_eq!(groups[0].rules.len(), 2);
        assert_eq!(groups[1].rules.len(), 1);
    }

    #[test]
    fn test_exclusions_partition_by_granularity() {
        let mut category_excl = rule("X", LineType::Exclude);
        category_excl.category = 10;

        let mut product_excl = rule("X", LineType::Exclude);
        product_excl.product = 20;

        let mut variant_excl = rule("X", LineType::Exclude);
        variant_excl.product = 30;
        variant_excl.variant = 31;

        // Include lines never contribute to exclusions.
        let mut include = rule("X", LineType::Include);
        include.category = 40;

        let rules = [&category_excl, &product_excl, &variant_excl, &include];
        let exclusions = OfferExclusions::from_offer(&rules);

        assert!(exclusions.excludes_category(10));
        assert!(!exclusions.excludes_category(40));
        assert_eq!(exclusions.products, HashSet::from([20]));
        assert_eq!(exclusions.variants, HashSet::from([31]));
    }

    #[test]
    fn test_excludes_product_matches_either_granularity() {
        let mut product_excl = rule("X", LineType::Exclude);
        product_excl.product = 20;

        let mut variant_excl = rule("X", LineType::Exclude);
        variant_excl.product = 30;
        variant_excl.variant = 31;

        let exclusions = OfferExclusions::from_offer(&[&product_excl, &variant_excl]);

        let as_master = PricedProduct {
            record_id: 20,
            sku: "SKU-M".into(),
            base_price: Money::from_cents(1000),
            uom: "EA".into(),
            category_id: 1,
        };
        let as_variant = PricedProduct { record_id: 31, ..as_master.clone() };
        let untouched = PricedProduct { record_id: 99, ..as_master.clone() };

        assert!(exclusions.excludes_product(&as_master));
        assert!(exclusions.excludes_product(&as_variant));
        assert!(!exclusions.excludes_product(&untouched));
    }

    #[test]
    fn test_empty_rules_yield_empty_groups() {
        assert!(group_by_offer(&[]).is_empty());
        let exclusions = OfferExclusions::from_offer(&[]);
        assert!(exclusions.categories.is_empty());
    }
}
