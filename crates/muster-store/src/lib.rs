//! # muster-store
//!
//! The attendance engine: roster, append-only event log, reconciliation,
//! fire-drill sessions, and JSONL durability.
//!
//! All state is owned by [`AttendanceService`]. Reads and appends go through
//! it; a background flusher persists each appended event to the runtime
//! directory's `events.jsonl`, which is replayed at startup.

pub mod drill;
pub mod error;
pub mod event_log;
pub mod reconcile;
pub mod roster;
pub mod runtime;
pub mod service;
pub mod settings;
pub mod snapshot;

mod test_support;

pub use drill::DrillSession;
pub use error::StoreError;
pub use runtime::{RosterFile, RuntimeDir};
pub use service::{Appended, AttendanceService};
pub use snapshot::{FlushTicket, RecoveryMode};
