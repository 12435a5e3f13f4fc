//! # Domain Types
//!
//! Core domain types for the price resolution engine.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                          Domain Types                                   │
//! │                                                                         │
//! │  INPUT SNAPSHOTS                      OUTPUT FEED RECORDS               │
//! │  ┌─────────────────┐                  ┌─────────────────┐              │
//! │  │    Category     │                  │  SpecialPrice   │              │
//! │  │  PricedProduct  │   resolution     │  TierPrice      │              │
//! │  │  DiscountRule   │  ───────────►    │  DealPrice      │              │
//! │  └─────────────────┘                  │  BasePrice      │              │
//! │                                       └─────────────────┘              │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐      │
//! │  │  DiscountRate   │   │    LineType     │   │  PromotionType  │      │
//! │  │  bps (u32)      │   │  Include        │   │  Special | Tier │      │
//! │  │  2000 = 20%     │   │  Exclude        │   │  Deal | Base    │      │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Input types deserialize from the backend wire format (PascalCase field
//! names, decimal prices and percentages); feed records serialize the same
//! way for the downstream catalog import.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::money::Money;

// =============================================================================
// Discount Rate
// =============================================================================

/// A discount percentage represented in basis points (bps).
///
/// 1 basis point = 0.01% = 1/10000, so 2000 bps = 20%. The backend wire
/// format carries plain percent values (`20` = 20%); conversion to basis
/// points happens once at deserialization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DiscountRate(u32);

impl DiscountRate {
    /// Creates a discount rate from basis points.
    #[inline]
    pub const fn from_bps(bps: u32) -> Self {
        DiscountRate(bps)
    }

    /// Creates a discount rate from a percentage value.
    pub fn from_percent(pct: f64) -> Self {
        DiscountRate((pct * 100.0).round() as u32)
    }

    /// Returns the rate in basis points.
    #[inline]
    pub const fn bps(&self) -> u32 {
        self.0
    }

    /// Returns the rate as a percentage (for display only).
    #[inline]
    pub fn percent(&self) -> f64 {
        self.0 as f64 / 100.0
    }

    /// Zero rate.
    #[inline]
    pub const fn zero() -> Self {
        DiscountRate(0)
    }

    /// Checks if the rate is zero.
    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Checks if the rate is greater than zero.
    #[inline]
    pub const fn is_positive(&self) -> bool {
        self.0 > 0
    }
}

/// Wire format is a plain percent value, mirroring the backend contract.
impl Serialize for DiscountRate {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(self.percent())
    }
}

impl<'de> Deserialize<'de> for DiscountRate {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let pct = f64::deserialize(deserializer)?;
        Ok(DiscountRate::from_percent(pct))
    }
}

// =============================================================================
// Promotion Type
// =============================================================================

/// The promotion variant a resolution run computes.
///
/// Selects the calculator and the aggregation policy. A closed set, so
/// dispatch is always an explicit `match`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PromotionType {
    /// Simple discount: per-product special price with a validity window.
    Special,
    /// Quantity discount: price break from a minimum purchase quantity.
    Tier,
    /// Mix-and-match bundle: one offer-level price across several SKUs.
    Deal,
    /// No promotion: the plain base-price feed.
    Base,
}

impl std::fmt::Display for PromotionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PromotionType::Special => write!(f, "special"),
            PromotionType::Tier => write!(f, "tier"),
            PromotionType::Deal => write!(f, "deal"),
            PromotionType::Base => write!(f, "base"),
        }
    }
}

impl std::str::FromStr for PromotionType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "special" => Ok(PromotionType::Special),
            "tier" => Ok(PromotionType::Tier),
            "deal" => Ok(PromotionType::Deal),
            "base" => Ok(PromotionType::Base),
            other => Err(format!(
                "Unknown promotion type: '{}'. Valid options: special, tier, deal, base",
                other
            )),
        }
    }
}

// =============================================================================
// Line Type
// =============================================================================

/// Whether a discount rule adds or removes scope within its offer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LineType {
    /// Adds eligible scope (a product, variant or category subtree).
    Include,
    /// Removes scope from every Include expansion in the same offer.
    Exclude,
}

// =============================================================================
// Discount Method
// =============================================================================

/// Backend discount-method marker.
///
/// Only one value matters to the engine: a `flat-zero` rule whose percent
/// rate is also zero is inert and skipped before special-price calculation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum DiscountMethod {
    /// Flat offer price carrying no percentage.
    FlatZero,
    /// Any other method; the percent/amount/offer-price ladder decides.
    #[default]
    Standard,
}

/// Methods this engine does not distinguish all map to `Standard`.
impl<'de> Deserialize<'de> for DiscountMethod {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = String::deserialize(deserializer)?;
        Ok(match value.as_str() {
            "flat-zero" => DiscountMethod::FlatZero,
            _ => DiscountMethod::Standard,
        })
    }
}

// =============================================================================
// Category
// =============================================================================

/// A node in the backend category hierarchy (a forest).
///
/// `parent_category` of `None` or `Some(0)` marks a root. A node whose
/// parent id is absent from the snapshot is treated as its own root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Category {
    /// Backend record id.
    pub record_id: i64,

    /// Parent category record id, if any.
    pub parent_category: Option<i64>,

    /// Display name.
    pub name: String,
}

impl Category {
    /// Returns the parent id when it points at a real node (non-zero).
    #[inline]
    pub fn parent_id(&self) -> Option<i64> {
        self.parent_category.filter(|id| *id > 0)
    }
}

// =============================================================================
// Priced Product
// =============================================================================

/// One sellable unit (a master product or a resolved variant) with its
/// ingested base price.
///
/// `record_id` is unique within one resolution pass. The base price has
/// already been through trade-agreement selection and cent rounding at
/// ingestion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct PricedProduct {
    /// Backend record id (variant id for variants).
    pub record_id: i64,

    /// Stock keeping unit for the feed.
    pub sku: String,

    /// Ingested base price.
    pub base_price: Money,

    /// Unit of measure, as delivered by the backend.
    pub uom: String,

    /// Owning category record id.
    pub category_id: i64,
}

// =============================================================================
// Discount Rule
// =============================================================================

/// A raw discount rule from the backend, scoped to a product, a variant or
/// a category subtree.
///
/// A rule targets exactly one of {product (+ optional variant), category};
/// the unused side is zero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct DiscountRule {
    /// Offer this rule belongs to.
    pub offer_id: String,

    /// Target product record id (0 = not product-targeted).
    pub product: i64,

    /// Target variant record id (0 = the master product).
    pub variant: i64,

    /// Target category record id (0 = not category-targeted).
    pub category: i64,

    /// Unit-of-measure filter; empty matches every product.
    #[serde(rename = "UOM")]
    pub uom: String,

    /// Include adds scope, Exclude removes it (offer-wide).
    pub line_type: LineType,

    /// Percentage discount (wire: percent, memory: basis points).
    #[serde(rename = "Discount")]
    pub discount_rate: DiscountRate,

    /// Absolute discount amount.
    pub discount_amount: Money,

    /// Flat offer price (fallback when rate and amount are zero; the deal
    /// price for deal rules).
    pub offer_price: Money,

    /// Backend discount-method marker.
    #[serde(default)]
    pub discount_method: DiscountMethod,

    /// Minimum purchase quantity (tier rules).
    #[serde(default)]
    pub lowest_qty: f64,

    /// Validity window start.
    pub valid_from: DateTime<Utc>,

    /// Validity window end.
    pub valid_to: DateTime<Utc>,

    /// Offer display name.
    #[serde(default)]
    pub name: String,

    /// Offer description.
    #[serde(default)]
    pub description: String,
}

impl DiscountRule {
    /// Rule adds scope.
    #[inline]
    pub fn is_include(&self) -> bool {
        self.line_type == LineType::Include
    }

    /// Rule removes scope.
    #[inline]
    pub fn is_exclude(&self) -> bool {
        self.line_type == LineType::Exclude
    }

    /// Rule targets a single product or variant.
    #[inline]
    pub fn targets_product(&self) -> bool {
        self.product > 0
    }

    /// Rule targets a category subtree.
    #[inline]
    pub fn targets_category(&self) -> bool {
        self.category > 0 && self.product == 0
    }

    /// Inert special rule: flat-zero method with a zero percent rate.
    /// Skipped before calculation.
    #[inline]
    pub fn is_inert(&self) -> bool {
        self.discount_method == DiscountMethod::FlatZero && self.discount_rate.is_zero()
    }
}

// =============================================================================
// Resolution Parameters
// =============================================================================

/// Store-scoped parameters threaded through one resolution pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolutionParams {
    /// Store view code stamped on special/base price rows.
    pub store_view_code: String,

    /// Website code stamped on tier/deal price rows.
    pub website: String,

    /// Collapse duplicate products emitted by overlapping Include rules
    /// within one offer. Default `false`: one row per covering rule, which
    /// downstream consumers may rely on.
    pub dedupe_overlapping: bool,
}

// =============================================================================
// Feed Records
// =============================================================================

/// Promo-eligibility marker stamped on every special price row.
pub const ELIGIBLE_FOR_PROMO: &str = "no";

/// Customer group stamped on every tier price row.
pub const TIER_CUSTOMER_GROUP: &str = "ALL GROUPS";

/// Value type stamped on every tier price row.
pub const TIER_VALUE_TYPE: &str = "Fixed";

/// Status stamped on merged deal rows (imported disabled, enabled manually).
pub const DEAL_STATUS: i32 = 0;

/// A resolved special (simple discount) price row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct SpecialPrice {
    pub sku: String,
    pub special_price: Money,
    pub special_price_feed: Money,
    pub eligible_for_promo: String,
    pub valid_from: String,
    pub valid_to: String,
    pub store_view_code: String,
}

/// A resolved tier (quantity discount) price row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct TierPrice {
    pub sku: String,
    /// Minimum quantity, rounded to 2 decimals and rendered for the feed.
    pub quantity: String,
    pub tier_price: Money,
    pub website: String,
    pub customer_group: String,
    pub value_type: String,
}

/// A merged deal (mix-and-match bundle) price row, one per offer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct DealPrice {
    pub offer_id: String,
    /// Comma-joined SKUs in encounter order, duplicates included.
    pub skus: String,
    /// Aggregate savings: Σ base prices − deal price.
    pub discount: Money,
    pub deal_price: Money,
    pub name: String,
    pub description: String,
    pub status: i32,
    pub website: String,
}

/// A base price row (no promotion applied).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct BasePrice {
    pub sku: String,
    pub base_price: Money,
    pub store_view_code: String,
    #[serde(rename = "UOM")]
    pub uom: String,
}

/// Feed envelope expected by the downstream import.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceFeed<T> {
    #[serde(rename = "Prices")]
    pub prices: Vec<T>,
}

// =============================================================================
// Resolved Prices
// =============================================================================

/// The output of one resolution pass, tagged by promotion type.
#[derive(Debug, Clone, PartialEq)]
pub enum ResolvedPrices {
    Special(Vec<SpecialPrice>),
    Tier(Vec<TierPrice>),
    Deal(Vec<DealPrice>),
    Base(Vec<BasePrice>),
}

impl ResolvedPrices {
    /// The promotion type this output was resolved for.
    pub fn promotion_type(&self) -> PromotionType {
        match self {
            ResolvedPrices::Special(_) => PromotionType::Special,
            ResolvedPrices::Tier(_) => PromotionType::Tier,
            ResolvedPrices::Deal(_) => PromotionType::Deal,
            ResolvedPrices::Base(_) => PromotionType::Base,
        }
    }

    /// Number of resolved rows.
    pub fn len(&self) -> usize {
        match self {
            ResolvedPrices::Special(rows) => rows.len(),
            ResolvedPrices::Tier(rows) => rows.len(),
            ResolvedPrices::Deal(rows) => rows.len(),
            ResolvedPrices::Base(rows) => rows.len(),
        }
    }

    /// True when no rows were resolved.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Serializes the rows inside the `{"Prices": [...]}` feed envelope.
    pub fn to_feed_json(&self) -> serde_json::Result<String> {
        match self {
            ResolvedPrices::Special(rows) => {
                serde_json::to_string(&PriceFeed { prices: rows.clone() })
            }
            ResolvedPrices::Tier(rows) => {
                serde_json::to_string(&PriceFeed { prices: rows.clone() })
            }
            ResolvedPrices::Deal(rows) => {
                serde_json::to_string(&PriceFeed { prices: rows.clone() })
            }
            ResolvedPrices::Base(rows) => {
                serde_json::to_string(&PriceFeed { prices: rows.clone() })
            }
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_discount_rate_from_percent() {
        let rate = DiscountRate::from_percent(20.0);
        assert_eq!(rate.bps(), 2000);
        assert!((rate.percent() - 20.0).abs() < 1e-9);

        let fractional = DiscountRate::from_percent(12.5);
        assert_eq!(fractional.bps(), 1250);
    }

    #[test]
    fn test_discount_rate_wire_is_percent() {
        let rate: DiscountRate = serde_json::from_str("20").unwrap();
        assert_eq!(rate.bps(), 2000);
        assert_eq!(serde_json::to_string(&rate).unwrap(), "20.0");
    }

    #[test]
    fn test_promotion_type_round_trip() {
        for (s, t) in [
            ("special", PromotionType::Special),
            ("tier", PromotionType::Tier),
            ("deal", PromotionType::Deal),
            ("base", PromotionType::Base),
        ] {
            assert_eq!(s.parse::<PromotionType>().unwrap(), t);
            assert_eq!(t.to_string(), s);
        }

        assert!("bogus".parse::<PromotionType>().is_err());
        assert_eq!("SPECIAL".parse::<PromotionType>().unwrap(), PromotionType::Special);
    }

    #[test]
    fn test_category_parent_id_filters_zero() {
        let root = Category {
            record_id: 1,
            parent_category: None,
            name: "Root".into(),
        };
        assert_eq!(root.parent_id(), None);

        let zero_parent = Category {
            record_id: 2,
            parent_category: Some(0),
            name: "Also root".into(),
        };
        assert_eq!(zero_parent.parent_id(), None);

        let child = Category {
            record_id: 3,
            parent_category: Some(1),
            name: "Child".into(),
        };
        assert_eq!(child.parent_id(), Some(1));
    }

    #[test]
    fn test_feed_envelope_field_names() {
        let feed = PriceFeed {
            prices: vec![BasePrice {
                sku: "SKU-1".into(),
                base_price: Money::from_cents(1099),
                store_view_code: "default".into(),
                uom: "EA".into(),
            }],
        };

        let json = serde_json::to_string(&feed).unwrap();
        assert!(json.contains("\"Prices\""));
        assert!(json.contains("\"Sku\":\"SKU-1\""));
        assert!(json.contains("\"BasePrice\":10.99"));
        assert!(json.contains("\"UOM\":\"EA\""));
    }

    #[test]
    fn test_discount_rule_target_helpers() {
        let mut rule = test_rule();
        rule.product = 42;
        assert!(rule.targets_product());
        assert!(!rule.targets_category());

        rule.product = 0;
        rule.category = 7;
        assert!(rule.targets_category());
        assert!(!rule.targets_product());
    }

    #[test]
    fn test_inert_rule_detection() {
        let mut rule = test_rule();
        rule.discount_method = DiscountMethod::FlatZero;
        rule.discount_rate = DiscountRate::zero();
        assert!(rule.is_inert());

        rule.discount_rate = DiscountRate::from_percent(10.0);
        assert!(!rule.is_inert());

        rule.discount_method = DiscountMethod::Standard;
        rule.discount_rate = DiscountRate::zero();
        assert!(!rule.is_inert());
    }

    #[test]
    fn test_discount_method_unknown_deserializes_as_standard() {
        let method: DiscountMethod = serde_json::from_str("\"flat-zero\"").unwrap();
        assert_eq!(method, DiscountMethod::FlatZero);

        let method: DiscountMethod = serde_json::from_str("\"percentage\"").unwrap();
        assert_eq!(method, DiscountMethod::Standard);
    }

    fn test_rule() -> DiscountRule {
        DiscountRule {
            offer_id: "OFFER-1".into(),
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
            valid_from: chrono::DateTime::<Utc>::UNIX_EPOCH,
            valid_to: chrono::DateTime::<Utc>::UNIX_EPOCH,
            name: String::new(),
            description: String::new(),
        }
    }
}
