use thiserror::Error;

use crate::spec::SpecError;

/// Errors raised by the predicate catalog.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// The catalog was queried before `load()` completed.
    #[error("Predicate catalog not loaded. Call load() before querying it.")]
    NotLoaded,

    #[error("Duplicate predicate declaration: {0}")]
    DuplicatePredicate(String),

    #[error("Invalid predicate '{predicate}': {reason}")]
    InvalidPredicate { predicate: String, reason: String },

    #[error("Failed to read predicate declarations: {0}")]
    Spec(#[from] SpecError),
}
