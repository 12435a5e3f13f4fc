//! # Scope Expansion
//!
//! Resolves an Include rule's target (a single product/variant or a
//! category subtree) into the concrete set of eligible priced products.
//!
//! ## Expansion Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Scope Expansion                                  │
//! │                                                                         │
//! │  Include rule                                                           │
//! │     │                                                                   │
//! │     ├── product > 0 ──► single catalog lookup (variant id wins)        │
//! │     │                   + UOM filter ──► 0 or 1 product                │
//! │     │                                                                   │
//! │     └── category > 0 ──► worklist traversal from the target:           │
//! │           pop category ── collect its products                         │
//! │           │               (UOM filter, product/variant exclusions)     │
//! │           └── push children not in excluded categories                 │
//! │               (an excluded category prunes its whole subtree)          │
//! │                                                                         │
//! │  Traversal is iterative with an explicit visited set: a category       │
//! │  seen twice means the hierarchy has a cycle ──► CategoryCycle error    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! A rule that resolves nothing (absent category, no catalog match) yields
//! an empty set, never an error.

use std::collections::HashSet;

use crate::catalog::ProductCatalog;
use crate::category::CategoryIndex;
use crate::error::{EngineError, EngineResult};
use crate::rules::OfferExclusions;
use crate::types::{DiscountRule, PricedProduct, PromotionType};

// =============================================================================
// UOM Matching
// =============================================================================

/// Unit-of-measure comparison policy.
///
/// Special and deal resolution compare case-insensitively; tier resolution
/// compares exactly. Downstream imports depend on this asymmetry, so it
/// must not be normalized away.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UomMatchMode {
    /// Case-insensitive equality (special, deal).
    CaseInsensitive,
    /// Exact string equality (tier).
    Exact,
}

impl UomMatchMode {
    /// The comparison policy for a promotion type.
    pub fn for_promotion(promotion: PromotionType) -> Self {
        match promotion {
            PromotionType::Tier => UomMatchMode::Exact,
            PromotionType::Special | PromotionType::Deal | PromotionType::Base => {
                UomMatchMode::CaseInsensitive
            }
        }
    }
}

/// Applies the UOM filter. An empty rule UOM matches every product.
pub fn uom_matches(rule_uom: &str, product_uom: &str, mode: UomMatchMode) -> bool {
    if rule_uom.is_empty() {
        return true;
    }

    match mode {
        UomMatchMode::CaseInsensitive => rule_uom.eq_ignore_ascii_case(product_uom),
        UomMatchMode::Exact => rule_uom == product_uom,
    }
}

// =============================================================================
// Scope Expander
// =============================================================================

/// Expands Include rules against one catalog + category snapshot.
///
/// Holds only shared references; one expander serves every rule of a
/// resolution pass.
#[derive(Debug, Clone, Copy)]
pub struct ScopeExpander<'a> {
    catalog: &'a ProductCatalog,
    categories: &'a CategoryIndex,
    uom_mode: UomMatchMode,
}

impl<'a> ScopeExpander<'a> {
    /// Creates an expander over the pass snapshots.
    pub fn new(
        catalog: &'a ProductCatalog,
        categories: &'a CategoryIndex,
        uom_mode: UomMatchMode,
    ) -> Self {
        ScopeExpander {
            catalog,
            categories,
            uom_mode,
        }
    }

    /// Expands one Include rule into its eligible products, in
    /// deterministic catalog/traversal order.
    ///
    /// Product/variant exclusions apply to category expansions only; a
    /// directly targeted product is matched as-is.
    pub fn expand(
        &self,
        rule: &DiscountRule,
        exclusions: &OfferExclusions,
    ) -> EngineResult<Vec<&'a PricedProduct>> {
        if rule.targets_product() {
            Ok(self.expand_product_target(rule))
        } else if rule.targets_category() {
            self.expand_category_target(rule, exclusions)
        } else {
            // Neither side populated: nothing to expand.
            Ok(Vec::new())
        }
    }

    /// Resolves a product/variant-targeted rule to at most one product.
    fn expand_product_target(&self, rule: &DiscountRule) -> Vec<&'a PricedProduct> {
        let target_id = if rule.variant > 0 { rule.variant } else { rule.product };

        self.catalog
            .by_record_id(target_id)
            .filter(|product| uom_matches(&rule.uom, &product.uom, self.uom_mode))
            .into_iter()
            .collect()
    }

    /// Walks the target category's subtree collecting eligible products,
    /// pruning excluded subtrees and excluded product/variant ids.
    fn expand_category_target(
        &self,
        rule: &DiscountRule,
        exclusions: &OfferExclusions,
    ) -> EngineResult<Vec<&'a PricedProduct>> {
        if !self.categories.contains(rule.category) {
            // Dangling category reference: the rule yields nothing.
            return Ok(Vec::new());
        }

        let mut eligible = Vec::new();
        let mut visited: HashSet<i64> = HashSet::new();
        // LIFO worklist; children pushed in reverse so traversal reproduces
        // depth-first encounter order.
        let mut worklist = vec![rule.category];

        while let Some(category_id) = worklist.pop() {
            if !visited.insert(category_id) {
                return Err(EngineError::CategoryCycle {
                    category_id,
                    offer_id: rule.offer_id.clone(),
                });
            }

            for product in self.catalog.in_category(category_id) {
                if exclusions.excludes_product(product) {
                    continue;
                }
                if uom_matches(&rule.uom, &product.uom, self.uom_mode) {
                    eligible.push(product);
                }
            }

            for child_id in self.categories.children_of(category_id).iter().rev() {
                if !exclusions.excludes_category(*child_id) {
                    worklist.push(*child_id);
                }
            }
        }

        Ok(eligible)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
