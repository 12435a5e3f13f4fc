//! # Error Types
//!
//! Typed errors for the resolution engine.
//!
//! The engine degrades gracefully on missing reference data: a dangling
//! rule yields zero rows, never an error. Errors are reserved for corrupt
//! upstream data that must stop the pass: a cycle in the category hierarchy
//! or a zero quantity in the tier amount branch.

use thiserror::Error;

/// Result type alias for engine operations.
pub type EngineResult<T> = Result<T, EngineError>;

/// Resolution engine errors.
///
/// Every variant indicates corrupt upstream data, not a recoverable
/// condition; the caller decides whether to abort or report the pass.
#[derive(Debug, Error, PartialEq)]
pub enum EngineError {
    /// The category hierarchy contains a cycle.
    ///
    /// ## When This Occurs
    /// - A category is reachable twice during one subtree expansion
    /// - Only possible when the backend delivered a malformed parent chain
    #[error("Category hierarchy cycle detected at category {category_id} (offer {offer_id})")]
    CategoryCycle { category_id: i64, offer_id: String },

    /// A tier rule uses the amount-based branch with a non-positive
    /// minimum quantity, which would divide by zero.
    #[error("Tier rule in offer {offer_id} has non-positive minimum quantity {lowest_qty}")]
    InvalidTierQuantity { offer_id: String, lowest_qty: f64 },
}
