//! # Base-Price Ingestion
//!
//! Turns the backend product-reference list into the priced-product
//! snapshot the engine resolves against.
//!
//! ## Ingestion Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     Base-Price Ingestion                                │
//! │                                                                         │
//! │  product refs ── chunk(batch_size) ──► batches                         │
//! │                                          │                              │
//! │              semaphore(max_parallelism)  ▼                              │
//! │  ┌───────────────────────────────────────────────────────────────────┐ │
//! │  │ per batch (tokio task):                                           │ │
//! │  │   1. fetch_active_prices(ids)                                     │ │
//! │  │   2. ids still missing a price? refetch just those ids,           │ │
//! │  │      at most MAX_MISSING_ID_RETRIES extra passes                  │ │
//! │  │   3. map refs -> PricedProduct (trade agreement preferred)        │ │
//! │  └───────────────────────────────────────────────────────────────────┘ │
//! │                                          │                              │
//! │  errors: counted + logged, run continues ▼                              │
//! │  results reassembled in batch order ──► deterministic snapshot         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! A backend that never returns the missing ids cannot spin the retry loop
//! forever: the pass count is capped, and an empty response ends the loop
//! early.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, error, warn};

use pricebridge_core::types::PricedProduct;

use crate::backend::{ActivePrice, ProductRef, RetailBackend};
use crate::error::{SyncError, SyncResult};

// =============================================================================
// Constants
// =============================================================================

/// Extra missing-id passes per batch after the initial fetch.
pub const MAX_MISSING_ID_RETRIES: usize = 3;

// =============================================================================
// Ingest Outcome
// =============================================================================

/// The result of one ingestion run.
///
/// Failed batches are counted, not fatal: the pipeline proceeds with the
/// products that did price and reports the gap.
#[derive(Debug)]
pub struct IngestOutcome {
    /// Priced products in input order (failed batches omitted).
    pub products: Vec<PricedProduct>,

    /// Number of batches that failed after their fetch errored.
    pub failed_batches: usize,
}

// =============================================================================
// Ingestion
// =============================================================================

/// Fetches base prices for every product reference, `batch_size` ids per
/// request with at most `max_parallelism` requests in flight.
pub async fn fetch_base_prices(
    backend: Arc<dyn RetailBackend>,
    product_refs: Vec<ProductRef>,
    batch_size: usize,
    max_parallelism: usize,
) -> SyncResult<IngestOutcome> {
    if product_refs.is_empty() {
        return Ok(IngestOutcome {
            products: Vec::new(),
            failed_batches: 0,
        });
    }

    let batch_size = batch_size.max(1);
    let semaphore = Arc::new(Semaphore::new(max_parallelism.max(1)));
    let mut tasks: JoinSet<(usize, SyncResult<Vec<PricedProduct>>)> = JoinSet::new();

    let batches: Vec<Vec<ProductRef>> = product_refs
        .chunks(batch_size)
        .map(|chunk| chunk.to_vec())
        .collect();
    let batch_count = batches.len();

    for (batch_index, batch) in batches.into_iter().enumerate() {
        let backend = Arc::clone(&backend);
        let semaphore = Arc::clone(&semaphore);

        tasks.spawn(async move {
            let _permit = match semaphore.acquire_owned().await {
                Ok(permit) => permit,
                Err(_) => {
                    return (
                        batch_index,
                        Err(SyncError::TaskFailed("ingestion semaphore closed".into())),
                    );
                }
            };
            let result = price_batch(backend.as_ref(), &batch, batch_index).await;
            (batch_index, result)
        });
    }

    // Reassemble in batch order so the snapshot is deterministic regardless
    // of completion order.
    let mut slots: Vec<Option<Vec<PricedProduct>>> = vec![None; batch_count];
    let mut failed_batches = 0;

    while let Some(joined) = tasks.join_next().await {
        match joined {
            Ok((batch_index, Ok(products))) => {
                slots[batch_index] = Some(products);
            }
            Ok((batch_index, Err(err))) => {
                warn!(batch = batch_index, %err, "Base-price batch failed");
                failed_batches += 1;
            }
            Err(join_err) => {
                error!(%join_err, "Base-price batch task did not complete");
                failed_batches += 1;
            }
        }
    }

    let products: Vec<PricedProduct> = slots.into_iter().flatten().flatten().collect();

    debug!(
        priced = products.len(),
        failed_batches,
        "Base-price ingestion finished"
    );

    Ok(IngestOutcome {
        products,
        failed_batches,
    })
}

/// Prices one batch: initial fetch plus a bounded number of passes over the
/// ids the backend left unpriced.
async fn price_batch(
    backend: &dyn RetailBackend,
    batch: &[ProductRef],
    batch_index: usize,
) -> SyncResult<Vec<PricedProduct>> {
    let mut prices: HashMap<i64, ActivePrice> = HashMap::with_capacity(batch.len());
    let mut remaining: Vec<i64> = batch.iter().map(|p| p.record_id).collect();

    for pass in 0..=MAX_MISSING_ID_RETRIES {
        let fetched = backend
            .fetch_active_prices(&remaining)
            .await
            .map_err(|err| SyncError::PriceFetchFailed {
                batch: batch_index,
                reason: err.to_string(),
            })?;

        if fetched.is_empty() {
            break;
        }

        for price in fetched {
            prices.entry(price.product_id).or_insert(price);
        }

        remaining.retain(|id| !prices.contains_key(id));
        if remaining.is_empty() {
            break;
        }

        debug!(
            batch = batch_index,
            pass,
            missing = remaining.len(),
            "Retrying ids the backend left unpriced"
        );
    }

    if !remaining.is_empty() {
        warn!(
            batch = batch_index,
            missing = remaining.len(),
            "Products left without a base price after bounded retries"
        );
    }

    // Products the backend never priced are dropped from the snapshot.
    Ok(batch
        .iter()
        .filter_map(|product| {
            prices.get(&product.record_id).map(|price| PricedProduct {
                record_id: product.record_id,
                sku: product.sku.clone(),
                base_price: price.effective_base_price(),
                uom: product.uom.clone(),
                category_id: product.category_id,
            })
        })
        .collect())
}

// =============================================================================
// Unit Tests
// =============================================================================
