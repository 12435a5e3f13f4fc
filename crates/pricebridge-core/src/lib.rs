//! # pricebridge-core: Pure Promotional Price Resolution
//!
//! This crate is the **heart** of PriceBridge. It turns a catalog of priced
//! products, a category hierarchy and a set of raw discount rules into flat
//! lists of resolved price records, as pure functions with zero I/O
//! dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      PriceBridge Architecture                           │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                 pricebridge-sync (pipeline layer)               │   │
//! │  │   RetailBackend ──► base-price ingestion ──► FeedPublisher      │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │ in-memory snapshots                    │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ pricebridge-core (THIS CRATE) ★                 │   │
//! │  │                                                                 │   │
//! │  │   ┌──────────┐  ┌──────────┐  ┌──────────┐  ┌──────────────┐   │   │
//! │  │   │  types   │  │  money   │  │ category │  │   catalog    │   │   │
//! │  │   │  rules   │  │  calc    │  │  scope   │  │   resolve    │   │   │
//! │  │   └──────────┘  └──────────┘  └──────────┘  └──────────────┘   │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS            │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Category, PricedProduct, DiscountRule, feed records)
//! - [`money`] - Money type with integer-cent arithmetic (no floating point!)
//! - [`error`] - Engine error types
//! - [`category`] - Category hierarchy index with cached display paths
//! - [`catalog`] - Priced-product index (by record id, by category)
//! - [`rules`] - Per-offer grouping and exclusion sets
//! - [`scope`] - Exclusion-aware scope expansion (iterative subtree walk)
//! - [`calc`] - The three price calculators
//! - [`resolve`] - Resolution drivers and aggregation
//!
//! ## Design Principles
//!
//! 1. **Pure Functions**: identical snapshots produce byte-identical output
//! 2. **No I/O**: fetching and publishing live in `pricebridge-sync`
//! 3. **Integer Money**: all price math runs on cents (i64)
//! 4. **Graceful Degradation**: dangling rule references yield zero rows;
//!    typed errors are reserved for corrupt data (cycles, zero quantities)
//!
//! ## Example
//!
//! ```rust
//! use pricebridge_core::catalog::ProductCatalog;
//! use pricebridge_core::category::CategoryIndex;
//! use pricebridge_core::resolve::resolve_prices;
//! use pricebridge_core::types::{PromotionType, ResolutionParams};
//!
//! let catalog = ProductCatalog::build(vec![]);
//! let categories = CategoryIndex::build(&[]);
//! let params = ResolutionParams {
//!     store_view_code: "default".into(),
//!     website: "base".into(),
//!     dedupe_overlapping: false,
//! };
//!
//! let resolved =
//!     resolve_prices(&catalog, &categories, &[], &params, PromotionType::Special).unwrap();
//! assert!(resolved.is_empty());
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod calc;
pub mod catalog;
pub mod category;
pub mod error;
pub mod money;
pub mod resolve;
pub mod rules;
pub mod scope;
pub mod types;

// =============================================================================
// Re-exports for Convenience
// =============================================================================
// These allow users to do `use pricebridge_core::Money` instead of
// `use pricebridge_core::money::Money`

pub use catalog::ProductCatalog;
pub use category::CategoryIndex;
pub use error::{EngineError, EngineResult};
pub use money::Money;
pub use resolve::{
    resolve_base_prices, resolve_deal_prices, resolve_prices, resolve_special_prices,
    resolve_tier_prices,
};
pub use scope::{ScopeExpander, UomMatchMode};
pub use types::*;
