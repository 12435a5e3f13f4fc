//! # Sync Error Types
//!
//! Error types for the sync pipeline.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Sync Error Categories                             │
//! │                                                                         │
//! │  ┌─────────────────┐  ┌─────────────────┐  ┌─────────────────────────┐ │
//! │  │  Configuration  │  │    Backend      │  │       Engine            │ │
//! │  │                 │  │                 │  │                         │ │
//! │  │  InvalidConfig  │  │  BackendFailed  │  │  Engine (from core:     │ │
//! │  │                 │  │  PriceFetch-    │  │  cycles, zero tier      │ │
//! │  │                 │  │    Failed       │  │  quantities)            │ │
//! │  └─────────────────┘  └─────────────────┘  └─────────────────────────┘ │
//! │                                                                         │
//! │  ┌─────────────────┐  ┌─────────────────────────────────────────────┐  │
//! │  │    Publish      │  │    Internal                                 │  │
//! │  │                 │  │                                             │  │
//! │  │  PublishFailed  │  │  SerializationFailed, TaskFailed            │  │
//! │  └─────────────────┘  └─────────────────────────────────────────────┘  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use thiserror::Error;

use pricebridge_core::EngineError;

/// Result type alias for sync operations.
pub type SyncResult<T> = Result<T, SyncError>;

/// Sync error type covering all pipeline failures.
///
/// Per-batch ingestion failures are collected and counted rather than
/// surfaced here; a `SyncError` means the run (or a stage of it) could not
/// proceed at all.
#[derive(Debug, Error)]
pub enum SyncError {
    // =========================================================================
    // Configuration Errors
    // =========================================================================
    /// Invalid sync configuration.
    #[error("Invalid sync configuration: {0}")]
    InvalidConfig(String),

    // =========================================================================
    // Backend Errors
    // =========================================================================
    /// A backend fetch (product refs, categories, discount rules) failed.
    #[error("Retail backend request failed: {0}")]
    BackendFailed(String),

    /// A base-price batch fetch failed.
    #[error("Base-price fetch failed for batch {batch}: {reason}")]
    PriceFetchFailed { batch: usize, reason: String },

    // =========================================================================
    // Engine Errors
    // =========================================================================
    /// The resolution engine rejected the pass (corrupt upstream data).
    #[error("Resolution failed: {0}")]
    Engine(#[from] EngineError),

    // =========================================================================
    // Publish Errors
    // =========================================================================
    /// The downstream publisher rejected the feed.
    #[error("Feed publish failed: {0}")]
    PublishFailed(String),

    // =========================================================================
    // Internal Errors
    // =========================================================================
    /// Failed to serialize a feed payload.
    #[error("Serialization failed: {0}")]
    SerializationFailed(String),

    /// A spawned ingestion task failed to complete.
    #[error("Ingestion task failed: {0}")]
    TaskFailed(String),
}

// =============================================================================
// Error Conversions
// =============================================================================

impl From<serde_json::Error> for SyncError {
    fn from(err: serde_json::Error) -> Self {
        SyncError::SerializationFailed(err.to_string())
    }
}

// =============================================================================
// Error Categorization (for retry logic)
// =============================================================================

impl SyncError {
    /// Returns true if this error is transient and the run can be retried
    /// as a whole.
    ///
    /// Configuration and engine errors are not retryable: re-running on the
    /// same inputs fails the same way.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            SyncError::BackendFailed(_)
                | SyncError::PriceFetchFailed { .. }
                | SyncError::PublishFailed(_)
        )
    }
}
