//! Failure types for operations that can legitimately return errors.
//!
//! Builder misuse (blank fields, reserved keys) is a programmer error
//! and panics at the call site instead; see [`crate::builder`].

use thiserror::Error;

/// Errors raised by aggregation and other fallible operations.
#[derive(Debug, Error)]
pub enum ProblemError {
    #[error("cannot aggregate an empty problem list")]
    EmptyAggregation,

    #[error("invalid problem at index {index}: {reason}")]
    InvalidElement { index: usize, reason: String },

    #[error("catalog load failed: {0}")]
    CatalogLoad(#[from] serde_json::Error),
}
