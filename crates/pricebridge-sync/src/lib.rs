//! # pricebridge-sync: Sync Pipeline for PriceBridge
//!
//! This crate wraps the pure resolution engine (`pricebridge-core`) with
//! everything one sync run needs: configuration, collaborator seams,
//! concurrent base-price ingestion and pipeline orchestration.
//!
//! ## Architecture Overview
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Sync Pipeline Architecture                         │
//! │                                                                         │
//! │  ┌────────────────┐   ┌────────────────┐   ┌────────────────────────┐  │
//! │  │ RetailBackend  │   │   Ingestion    │   │  PriceSyncPipeline     │  │
//! │  │ (trait seam)   │──►│                │──►│                        │  │
//! │  │                │   │ Batched price  │   │ Per-run orchestration: │  │
//! │  │ product refs   │   │ fetch, bounded │   │ short-circuits,        │  │
//! │  │ categories     │   │ parallelism +  │   │ resolution dispatch,   │  │
//! │  │ discount rules │   │ missing-id     │   │ correlation ids        │  │
//! │  │ active prices  │   │ retries        │   │                        │  │
//! │  └────────────────┘   └────────────────┘   └───────────┬────────────┘  │
//! │                                                        │               │
//! │                                            ┌───────────▼────────────┐  │
//! │                                            │  FeedPublisher         │  │
//! │                                            │  (trait seam)          │  │
//! │                                            │  queue/blob transport  │  │
//! │                                            │  owned by implementors │  │
//! │                                            └────────────────────────┘  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`backend`] - `RetailBackend` trait + wire types
//! - [`config`] - Environment-driven sync configuration
//! - [`error`] - Sync error types
//! - [`ingest`] - Concurrent base-price ingestion
//! - [`pipeline`] - `PriceSyncPipeline` orchestrator
//! - [`publish`] - `FeedPublisher` trait + log-only default
//!
//! ## Usage
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use pricebridge_sync::{LogPublisher, PriceSyncPipeline, SyncConfig};
//!
//! let config = SyncConfig::from_env()?;
//! let pipeline = PriceSyncPipeline::new(backend, Arc::new(LogPublisher), config);
//!
//! let summary = pipeline.run().await?;
//! println!("resolved {} rows", summary.resolved_rows);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod backend;
pub mod config;
pub mod error;
pub mod ingest;
pub mod pipeline;
pub mod publish;

// =============================================================================
// Re-exports
// =============================================================================

pub use backend::{ActivePrice, ProductRef, RetailBackend};
pub use config::{FeedConfig, StoreConfig, SyncConfig, SyncSettings};
pub use error::{SyncError, SyncResult};
pub use ingest::{fetch_base_prices, IngestOutcome, MAX_MISSING_ID_RETRIES};
pub use pipeline::{PriceSyncPipeline, RunSummary};
pub use publish::{FeedPublisher, LogPublisher};
