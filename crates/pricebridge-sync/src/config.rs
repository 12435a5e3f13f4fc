//! # Sync Configuration
//!
//! Configuration for one sync deployment.
//!
//! ## Configuration Sources
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Configuration Priority                               │
//! │                                                                         │
//! │  1. Environment Variables (highest priority)                           │
//! │     PRICEBRIDGE_PRICE_TYPE=special                                     │
//! │     PRICEBRIDGE_STORE_VIEW_CODE=default                                │
//! │     PRICEBRIDGE_WEBSITE=base                                           │
//! │     PRICEBRIDGE_OPERATING_UNIT=052                                     │
//! │     PRICEBRIDGE_BATCH_SIZE=200                                         │
//! │     PRICEBRIDGE_MAX_PARALLELISM=4                                      │
//! │     PRICEBRIDGE_DEDUPE_OVERLAPPING=false                               │
//! │                                                                         │
//! │  2. Default Values (lowest priority)                                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Deployments run one pipeline instance per store and price type, so the
//! whole configuration is flat environment variables; no config files.

use serde::{Deserialize, Serialize};

use pricebridge_core::types::{PromotionType, ResolutionParams};

use crate::error::{SyncError, SyncResult};

// =============================================================================
// Defaults
// =============================================================================

fn default_store_view_code() -> String {
    "default".to_string()
}

fn default_website() -> String {
    "base".to_string()
}

fn default_batch_size() -> usize {
    200
}

fn default_max_parallelism() -> usize {
    4
}

// =============================================================================
// Store Configuration
// =============================================================================

/// The backend store (channel) this deployment syncs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Backend operating-unit number identifying the retail channel whose
    /// discounts are fetched.
    pub operating_unit: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        StoreConfig {
            operating_unit: String::new(),
        }
    }
}

// =============================================================================
// Feed Configuration
// =============================================================================

/// Identifiers stamped on outgoing feed rows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedConfig {
    /// Store view code on special/base price rows.
    #[serde(default = "default_store_view_code")]
    pub store_view_code: String,

    /// Website code on tier/deal price rows.
    #[serde(default = "default_website")]
    pub website: String,
}

impl Default for FeedConfig {
    fn default() -> Self {
        FeedConfig {
            store_view_code: default_store_view_code(),
            website: default_website(),
        }
    }
}

// =============================================================================
// Sync Settings
// =============================================================================

/// Per-run behavior settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncSettings {
    /// Which price variant this run resolves and transmits.
    pub price_type: PromotionType,

    /// Number of product ids per base-price fetch batch.
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,

    /// Maximum base-price batches in flight at once.
    #[serde(default = "default_max_parallelism")]
    pub max_parallelism: usize,

    /// Collapse duplicate rows from overlapping Include rules within one
    /// offer. Off by default: the upstream system emitted one row per
    /// covering rule, and downstream consumers may rely on that.
    #[serde(default)]
    pub dedupe_overlapping: bool,
}

impl Default for SyncSettings {
    fn default() -> Self {
        SyncSettings {
            price_type: PromotionType::Special,
            batch_size: default_batch_size(),
            max_parallelism: default_max_parallelism(),
            dedupe_overlapping: false,
        }
    }
}

// =============================================================================
// Sync Configuration
// =============================================================================

/// Complete configuration for one pipeline instance.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SyncConfig {
    /// Backend store scope.
    #[serde(default)]
    pub store: StoreConfig,

    /// Feed identifiers.
    #[serde(default)]
    pub feed: FeedConfig,

    /// Run behavior.
    #[serde(default)]
    pub sync: SyncSettings,
}

impl SyncConfig {
    /// Loads configuration from `PRICEBRIDGE_*` environment variables,
    /// falling back to defaults for anything unset.
    pub fn from_env() -> SyncResult<Self> {
        let mut config = SyncConfig::default();

        if let Some(value) = env_var("PRICEBRIDGE_OPERATING_UNIT") {
            config.store.operating_unit = value;
        }
        if let Some(value) = env_var("PRICEBRIDGE_STORE_VIEW_CODE") {
            config.feed.store_view_code = value;
        }
        if let Some(value) = env_var("PRICEBRIDGE_WEBSITE") {
            config.feed.website = value;
        }
        if let Some(value) = env_var("PRICEBRIDGE_PRICE_TYPE") {
            config.sync.price_type = value
                .parse::<PromotionType>()
                .map_err(SyncError::InvalidConfig)?;
        }
        if let Some(value) = env_var("PRICEBRIDGE_BATCH_SIZE") {
            config.sync.batch_size = parse_env("PRICEBRIDGE_BATCH_SIZE", &value)?;
        }
        if let Some(value) = env_var("PRICEBRIDGE_MAX_PARALLELISM") {
            config.sync.max_parallelism = parse_env("PRICEBRIDGE_MAX_PARALLELISM", &value)?;
        }
        if let Some(value) = env_var("PRICEBRIDGE_DEDUPE_OVERLAPPING") {
            config.sync.dedupe_overlapping = parse_env("PRICEBRIDGE_DEDUPE_OVERLAPPING", &value)?;
        }

        config.validate()?;
        Ok(config)
    }

    /// Validates the settings a run depends on.
    pub fn validate(&self) -> SyncResult<()> {
        if self.sync.batch_size == 0 {
            return Err(SyncError::InvalidConfig(
                "batch_size must be greater than zero".to_string(),
            ));
        }
        if self.sync.max_parallelism == 0 {
            return Err(SyncError::InvalidConfig(
                "max_parallelism must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }

    /// The parameter bundle handed to the resolution engine.
    pub fn resolution_params(&self) -> ResolutionParams {
        ResolutionParams {
            store_view_code: self.feed.store_view_code.clone(),
            website: self.feed.website.clone(),
            dedupe_overlapping: self.sync.dedupe_overlapping,
        }
    }
}

/// Reads a non-empty environment variable.
fn env_var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|value| !value.is_empty())
}

/// Parses an environment value, naming the variable on failure.
fn parse_env<T: std::str::FromStr>(name: &str, value: &str) -> SyncResult<T> {
    value
        .parse::<T>()
        .map_err(|_| SyncError::InvalidConfig(format!("{name} has invalid value '{value}'")))
}

// =============================================================================
// Unit Tests
// =============================================================================
