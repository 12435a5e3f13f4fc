//! # Retail Backend Seam
//!
//! The collaborator trait through which the pipeline reaches the ERP/retail
//! backend, plus the slim wire types it returns. Connection management,
//! paging and authentication live behind implementations of this trait;
//! the pipeline only sees already-fetched collections.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use pricebridge_core::money::Money;
use pricebridge_core::types::{Category, DiscountRule, PromotionType};

use crate::error::SyncResult;

// =============================================================================
// Wire Types
// =============================================================================

/// A catalog product reference: everything the feed needs except the price.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ProductRef {
    /// Backend record id (variant id for variants).
    #[serde(rename = "Id")]
    pub record_id: i64,

    /// Stock keeping unit.
    #[serde(rename = "SKU")]
    pub sku: String,

    /// Default unit of measure.
    #[serde(rename = "UOM")]
    pub uom: String,

    /// Owning category record id.
    pub category_id: i64,
}

/// One product's active price as returned by the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ActivePrice {
    /// Product record id the price belongs to.
    pub product_id: i64,

    /// Negotiated trade-agreement price, if one applies.
    pub trade_agreement_price: Option<Money>,

    /// Plain list price.
    pub base_price: Option<Money>,
}

impl ActivePrice {
    /// Selects the effective base price: a positive trade-agreement price
    /// wins, otherwise the list price (zero when the backend sent neither).
    /// Cent rounding already happened when the wire value was deserialized.
    pub fn effective_base_price(&self) -> Money {
        match self.trade_agreement_price.filter(Money::is_positive) {
            Some(price) => price,
            None => self.base_price.unwrap_or_default(),
        }
    }
}

// =============================================================================
// Retail Backend Trait
// =============================================================================

/// The upstream retail backend the pipeline fetches from.
///
/// Implementations own connection/retry concerns for their transport;
/// methods return complete collections for one store channel.
#[async_trait]
pub trait RetailBackend: Send + Sync {
    /// Fetches the product references of the sync channel's assortment.
    async fn fetch_product_refs(&self) -> SyncResult<Vec<ProductRef>>;

    /// Fetches the channel category hierarchy.
    async fn fetch_categories(&self) -> SyncResult<Vec<Category>>;

    /// Fetches the raw discount rules of one promotion type for a store.
    async fn fetch_discount_rules(
        &self,
        promotion: PromotionType,
        store: &str,
    ) -> SyncResult<Vec<DiscountRule>>;

    /// Fetches active prices for a batch of product ids. The response may
    /// omit ids the backend has no price row for; the ingestion layer
    /// retries those.
    async fn fetch_active_prices(&self, product_ids: &[i64]) -> SyncResult<Vec<ActivePrice>>;
}

// =============================================================================
// Unit Tests
// =============================================================================
