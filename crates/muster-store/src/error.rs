//! Store error types for muster-store.

use std::path::PathBuf;

use muster_core::enums::{Category, RecoveryState};
use thiserror::Error;

/// Errors from roster, event log, and durability operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// An event or drill entry references a person absent from the roster.
    #[error("Unknown {category} identifier: {id}")]
    InvalidPerson { category: Category, id: String },

    /// Lookup of a person absent from the active roster.
    #[error("No {category} with identifier {id} on the roster")]
    NotFound { category: Category, id: String },

    /// A roster replacement was rejected; the previous roster is still active.
    #[error("Malformed input: {0}")]
    MalformedInput(String),

    /// The durable snapshot could not be replayed.
    #[error("Snapshot {} is corrupt at line {line}: {reason}", path.display())]
    RecoveryCorruption {
        path: PathBuf,
        line: usize,
        reason: String,
    },

    /// The settings file exists but cannot be parsed.
    #[error("Settings file {} is unreadable: {reason}", path.display())]
    SettingsCorruption { path: PathBuf, reason: String },

    /// The log is not in a state that accepts appends.
    #[error("Event log is not accepting appends (state: {state})")]
    NotReady { state: RecoveryState },

    /// A lifecycle transition that the recovery state machine forbids.
    #[error("Invalid state: {0}")]
    InvalidState(String),

    /// A durability write failed. In-memory state is unaffected.
    #[error("Durability write failed: {0}")]
    Persist(String),

    /// Underlying filesystem error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON encode/decode error outside snapshot replay.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl StoreError {
    /// Data-integrity errors indicate an operator or caller mistake, never a
    /// transient condition.
    #[must_use]
    pub const fn is_integrity_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidPerson { .. }
                | Self::MalformedInput(_)
                | Self::RecoveryCorruption { .. }
                | Self::SettingsCorruption { .. }
        )
    }
}
