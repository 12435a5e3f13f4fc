//! # Sync Pipeline
//!
//! One pipeline run resolves and transmits a single promotion type for a
//! single store, end to end.
//!
//! ## Run Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Pipeline Run                                    │
//! │                                                                         │
//! │  fetch product refs ──► ingest base prices (batched, parallel)          │
//! │        │                                                                │
//! │        ├── empty priced catalog ──► stop (nothing to transmit)          │
//! │        ▼                                                                │
//! │  price type?                                                            │
//! │    base ──────────────► base-price feed (dedupe by sku+price)           │
//! │    special/tier/deal ─► fetch categories + discount rules               │
//! │        │                                                                │
//! │        ├── zero rules ──► stop (no downstream transmission)             │
//! │        ▼                                                                │
//! │  resolve via pricebridge-core ──► publish(feed, correlation id)         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every stage is traced; the correlation id ties the published feed to the
//! caller's audit records.

use std::sync::Arc;

use tracing::{info, warn};
use uuid::Uuid;

use pricebridge_core::catalog::ProductCatalog;
use pricebridge_core::category::CategoryIndex;
use pricebridge_core::resolve::{resolve_base_prices, resolve_prices};
use pricebridge_core::types::{PromotionType, ResolvedPrices};

use crate::backend::RetailBackend;
use crate::config::SyncConfig;
use crate::error::SyncResult;
use crate::ingest::fetch_base_prices;
use crate::publish::FeedPublisher;

// =============================================================================
// Run Summary
// =============================================================================

/// What one pipeline run did, for the caller's bookkeeping.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    /// The promotion type this run resolved.
    pub price_type: PromotionType,

    /// Products that received a base price.
    pub priced_products: usize,

    /// Base-price batches that failed and were skipped.
    pub failed_batches: usize,

    /// Discount rules fetched (0 for base runs).
    pub rule_count: usize,

    /// Rows in the resolved feed.
    pub resolved_rows: usize,

    /// Correlation id of the published feed; `None` when the run
    /// short-circuited before publishing.
    pub correlation_id: Option<String>,
}

// =============================================================================
// Price Sync Pipeline
// =============================================================================

/// Orchestrates one store's price sync against the collaborator seams.
pub struct PriceSyncPipeline {
    backend: Arc<dyn RetailBackend>,
    publisher: Arc<dyn FeedPublisher>,
    config: SyncConfig,
}

impl PriceSyncPipeline {
    /// Creates a pipeline over the given collaborators.
    pub fn new(
        backend: Arc<dyn RetailBackend>,
        publisher: Arc<dyn FeedPublisher>,
        config: SyncConfig,
    ) -> Self {
        PriceSyncPipeline {
            backend,
            publisher,
            config,
        }
    }

    /// Executes one run for the configured price type.
    pub async fn run(&self) -> SyncResult<RunSummary> {
        let price_type = self.config.sync.price_type;

        info!(
            %price_type,
            store = %self.config.store.operating_unit,
            "Starting price sync run"
        );

        let product_refs = self.backend.fetch_product_refs().await?;
        info!(count = product_refs.len(), "Fetched product references");

        let outcome = fetch_base_prices(
            Arc::clone(&self.backend),
            product_refs,
            self.config.sync.batch_size,
            self.config.sync.max_parallelism,
        )
        .await?;

        if outcome.failed_batches > 0 {
            warn!(
                failed_batches = outcome.failed_batches,
                "Continuing with a partial catalog"
            );
        }

        let mut summary = RunSummary {
            price_type,
            priced_products: outcome.products.len(),
            failed_batches: outcome.failed_batches,
            rule_count: 0,
            resolved_rows: 0,
            correlation_id: None,
        };

        if outcome.products.is_empty() {
            info!("No priced products; skipping transmission");
            return Ok(summary);
        }

        let catalog = ProductCatalog::build(outcome.products);
        let params = self.config.resolution_params();

        let resolved = match price_type {
            PromotionType::Base => ResolvedPrices::Base(resolve_base_prices(&catalog, &params)),
            promotional => {
                let categories = self.backend.fetch_categories().await?;
                let index = CategoryIndex::build(&categories);
                info!(count = index.len(), "Indexed categories");

                let rules = self
                    .backend
                    .fetch_discount_rules(promotional, &self.config.store.operating_unit)
                    .await?;
                summary.rule_count = rules.len();

                if rules.is_empty() {
                    info!(%price_type, "No discount rules found; skipping transmission");
                    return Ok(summary);
                }
                info!(count = rules.len(), %price_type, "Fetched discount rules");

                resolve_prices(&catalog, &index, &rules, &params, promotional)?
            }
        };

        summary.resolved_rows = resolved.len();

        if resolved.is_empty() {
            info!(%price_type, "Resolution produced no rows; skipping transmission");
            return Ok(summary);
        }

        let correlation_id = Uuid::new_v4().to_string();
        self.publisher.publish(&resolved, &correlation_id).await?;

        info!(
            rows = resolved.len(),
            %correlation_id,
            "Published price feed"
        );

        summary.correlation_id = Some(correlation_id);
        Ok(summary)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    use async_trait::async_trait;
    use chrono::{DateTime, Utc};

    use pricebridge_core::money::Money;
    use pricebridge_core::types::{
        Category, DiscountMethod, DiscountRate, DiscountRule, LineType,
    };

    use crate::backend::{ActivePrice, ProductRef};
    use crate::error::SyncError;

    /// Canned backend serving one small store snapshot.
    struct CannedBackend {
        refs: Vec<ProductRef>,
        categories: Vec<Category>,
        rules: Vec<DiscountRule>,
        category_fetches: Mutex<usize>,
        rule_fetches: Mutex<Vec<(PromotionType, String)>>,
    }

    impl CannedBackend {
        fn new(refs: Vec<ProductRef>, categories: Vec<Category>, rules: Vec<DiscountRule>) -> Self {
            CannedBackend {
                refs,
                categories,
                rules,
                category_fetches: Mutex::new(0),
                rule_fetches: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl RetailBackend for CannedBackend {
        async fn fetch_product_refs(&self) -> SyncResult<Vec<ProductRef>> {
            Ok(self.refs.clone())
        }

        async fn fetch_categories(&self) -> SyncResult<Vec<Category>> {
            *self.category_fetches.lock().unwrap() += 1;
            Ok(self.categories.clone())
        }

        async fn fetch_discount_rules(
            &self,
            promotion: PromotionType,
            store: &str,
        ) -> SyncResult<Vec<DiscountRule>> {
            self.rule_fetches
                .lock()
                .unwrap()
                .push((promotion, store.to_string()));
            Ok(self.rules.clone())
        }

        async fn fetch_active_prices(&self, product_ids: &[i64]) -> SyncResult<Vec<ActivePrice>> {
            Ok(product_ids
                .iter()
                .map(|id| ActivePrice {
                    product_id: *id,
                    trade_agreement_price: None,
                    base_price: Some(Money::from_cents(5000)),
                })
                .collect())
        }
    }

    /// Publisher that records every publish call.
    #[derive(Default)]
    struct RecordingPublisher {
        published: Mutex<Vec<(usize, String)>>,
    }

    #[async_trait]
    impl FeedPublisher for RecordingPublisher {
        async fn publish(&self, prices: &ResolvedPrices, correlation_id: &str) -> SyncResult<()> {
            self.published
                .lock()
                .unwrap()
                .push((prices.len(), correlation_id.to_string()));
            Ok(())
        }
    }

    /// Publisher that always fails, for surfacing transport errors.
    struct FailingPublisher;

    #[async_trait]
    impl FeedPublisher for FailingPublisher {
        async fn publish(&self, _prices: &ResolvedPrices, _cid: &str) -> SyncResult<()> {
            Err(SyncError::PublishFailed("topic unavailable".into()))
        }
    }

    fn product_ref(id: i64) -> ProductRef {
        ProductRef {
            record_id: id,
            sku: format!("SKU-{id}"),
            uom: "EA".to_string(),
            category_id: 10,
        }
    }

    fn special_rule() -> DiscountRule {
        DiscountRule {
            offer_id: "OFFER-1".to_string(),
            product: 1,
            variant: 0,
            category: 0,
            uom: String::new(),
            line_type: LineType::Include,
            discount_rate: DiscountRate::from_percent(20.0),
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

    fn config(price_type: PromotionType) -> SyncConfig {
        let mut config = SyncConfig::default();
        config.store.operating_unit = "052".to_string();
        config.sync.price_type = price_type;
        config
    }

    #[tokio::test]
    async fn test_special_run_resolves_and_publishes() {
        let backend = Arc::new(CannedBackend::new(
            vec![product_ref(1)],
            vec![Category {
                record_id: 10,
                parent_category: None,
                name: "Root".into(),
            }],
            vec![special_rule()],
        ));
        let publisher = Arc::new(RecordingPublisher::default());
        let pipeline = PriceSyncPipeline::new(
            backend.clone(),
            publisher.clone(),
            config(PromotionType::Special),
        );

        let summary = pipeline.run().await.unwrap();

        assert_eq!(summary.priced_products, 1);
        assert_eq!(summary.rule_count, 1);
        assert_eq!(summary.resolved_rows, 1);
        let correlation_id = summary.correlation_id.expect("run should publish");

        let published = publisher.published.lock().unwrap();
        assert_eq!(published.len(), 1);
        assert_eq!(published[0].0, 1);
        assert_eq!(published[0].1, correlation_id);
        // The correlation id is a real UUID.
        assert!(Uuid::parse_str(&correlation_id).is_ok());

        // The store scope was forwarded to the rule fetch.
        let rule_fetches = backend.rule_fetches.lock().unwrap();
        assert_eq!(rule_fetches[0], (PromotionType::Special, "052".to_string()));
    }

    #[tokio::test]
    async fn test_empty_rules_short_circuit_without_publishing() {
        let backend = Arc::new(CannedBackend::new(
            vec![product_ref(1)],
            vec![],
            vec![],
        ));
        let publisher = Arc::new(RecordingPublisher::default());
        let pipeline =
            PriceSyncPipeline::new(backend, publisher.clone(), config(PromotionType::Special));

        let summary = pipeline.run().await.unwrap();

        assert_eq!(summary.rule_count, 0);
        assert_eq!(summary.resolved_rows, 0);
        assert!(summary.correlation_id.is_none());
        assert!(publisher.published.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_empty_catalog_short_circuits_without_rule_fetch() {
        let backend = Arc::new(CannedBackend::new(vec![], vec![], vec![special_rule()]));
        let publisher = Arc::new(RecordingPublisher::default());
        let pipeline = PriceSyncPipeline::new(
            backend.clone(),
            publisher.clone(),
            config(PromotionType::Special),
        );

        let summary = pipeline.run().await.unwrap();

        assert_eq!(summary.priced_products, 0);
        assert!(summary.correlation_id.is_none());
        assert!(publisher.published.lock().unwrap().is_empty());
        assert_eq!(*backend.category_fetches.lock().unwrap(), 0);
        assert!(backend.rule_fetches.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_base_run_never_fetches_categories_or_rules() {
        let backend = Arc::new(CannedBackend::new(
            vec![product_ref(1), product_ref(2)],
            vec![],
            vec![],
        ));
        let publisher = Arc::new(RecordingPublisher::default());
        let pipeline = PriceSyncPipeline::new(
            backend.clone(),
            publisher.clone(),
            config(PromotionType::Base),
        );

        let summary = pipeline.run().await.unwrap();

        assert_eq!(summary.resolved_rows, 2);
        assert!(summary.correlation_id.is_some());
        assert_eq!(*backend.category_fetches.lock().unwrap(), 0);
        assert!(backend.rule_fetches.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_publish_failure_surfaces_as_error() {
        let backend = Arc::new(CannedBackend::new(
            vec![product_ref(1)],
            vec![],
            vec![special_rule()],
        ));
        let pipeline = PriceSyncPipeline::new(
            backend,
            Arc::new(FailingPublisher),
            config(PromotionType::Special),
        );

        let err = pipeline.run().await.unwrap_err();
        assert!(matches!(err, SyncError::PublishFailed(_)));
        assert!(err.is_retryable());
    }
}
