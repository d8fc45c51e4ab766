//! Durable JSONL snapshot of the event log.
//!
//! `events.jsonl` in the runtime directory holds one `SnapshotRecord` per
//! appended event. The in-memory log is rebuilt from it at startup; appends
//! reach it through the background flusher.

pub mod archive;
pub mod flusher;
pub mod replayer;
pub mod writer;

pub use flusher::FlushTicket;
pub use replayer::{RecoveryMode, SnapshotReplayer};
pub use writer::SnapshotWriter;

use chrono::{DateTime, Utc};

/// Timestamp suffix used for archive and quarantine file names.
pub(crate) fn file_stamp(now: DateTime<Utc>) -> String {
    now.format("%Y%m%dT%H%M%SZ").to_string()
}
