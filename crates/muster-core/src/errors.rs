//! Cross-cutting error types for Muster.
//!
//! This module defines errors that can originate from any crate in the system.
//! Domain-specific errors (e.g., `StoreError`, `DeliveryError`) are defined in
//! their respective crates and converge into `anyhow` at the `muster` binary.

use thiserror::Error;

use crate::enums::Category;

/// Errors that can be raised by any Muster crate.
#[derive(Debug, Error)]
pub enum CoreError {
    /// An event or drill entry references a person absent from the roster.
    #[error("Unknown {category} identifier: {id}")]
    InvalidPerson { category: Category, id: String },

    /// A record set failed validation and was not applied.
    #[error("Malformed input: {0}")]
    MalformedInput(String),

    /// Entity lookup returned no result.
    #[error("Entity not found: {entity_type} {id}")]
    NotFound { entity_type: String, id: String },

    /// A value failed to parse or validate.
    #[error("Validation error: {0}")]
    Validation(String),

    /// Catch-all for unexpected errors.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}
