//! # Feed Publisher Seam
//!
//! The collaborator trait the pipeline hands resolved prices to. Transport
//! (queue publish, blob archival, status bookkeeping) is owned by
//! implementations; the pipeline only supplies the feed and a correlation
//! id for audit trails.

use async_trait::async_trait;
use tracing::info;

use pricebridge_core::types::ResolvedPrices;

use crate::error::SyncResult;

// =============================================================================
// Feed Publisher Trait
// =============================================================================

/// Downstream transmission seam.
///
/// `correlation_id` is a fresh UUID per publish; implementations stamp it on
/// whatever audit records they keep so a feed can be traced end to end.
#[async_trait]
pub trait FeedPublisher: Send + Sync {
    /// Publishes one resolved feed.
    async fn publish(&self, prices: &ResolvedPrices, correlation_id: &str) -> SyncResult<()>;
}

// =============================================================================
// Log Publisher
// =============================================================================

/// A publisher that only logs: the default for dry runs and local
/// development, where no transport is wired up.
#[derive(Debug, Default)]
pub struct LogPublisher;

#[async_trait]
impl FeedPublisher for LogPublisher {
    async fn publish(&self, prices: &ResolvedPrices, correlation_id: &str) -> SyncResult<()> {
        let payload = prices.to_feed_json()?;

        info!(
            price_type = %prices.promotion_type(),
            rows = prices.len(),
            bytes = payload.len(),
            correlation_id,
            "Resolved price feed (log-only publisher)"
        );

        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
