//! JSONL snapshot record envelope.
//!
//! Every appended sign event is persisted as one `SnapshotRecord` line in the
//! runtime directory's `events.jsonl`. The in-memory log is rebuildable from
//! these lines alone.
//!
//! The `v` field supports schema versioning: records written without a `v`
//! field deserialize with `v == 1` via `#[serde(default)]`.

use chrono::{DateTime, FixedOffset};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::entities::SignEvent;
use crate::enums::{Category, SignAction};

/// Current snapshot record version.
pub const SNAPSHOT_VERSION: u32 = 1;

/// Default version for backward compatibility with unversioned lines.
const fn default_snapshot_version() -> u32 {
    1
}

/// A single sign event as stored on disk.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct SnapshotRecord {
    /// Schema version. Defaults to 1 for records without this field.
    #[serde(default = "default_snapshot_version")]
    pub v: u32,

    /// Monotonic sequence assigned at append time.
    pub seq: u64,

    pub category: Category,
    pub id: String,
    pub action: SignAction,
    pub site: String,

    /// RFC 3339 instant, offset preserved.
    pub timestamp: DateTime<FixedOffset>,

    #[serde(default)]
    pub recorded_by: Option<String>,
}

impl From<&SignEvent> for SnapshotRecord {
    fn from(event: &SignEvent) -> Self {
        Self {
            v: SNAPSHOT_VERSION,
            seq: event.seq,
            category: event.category,
            id: event.id.clone(),
            action: event.action,
            site: event.site.clone(),
            timestamp: event.timestamp,
            recorded_by: event.recorded_by.clone(),
        }
    }
}

impl From<SnapshotRecord> for SignEvent {
    fn from(record: SnapshotRecord) -> Self {
        Self {
            seq: record.seq,
            category: record.category,
            id: record.id,
            action: record.action,
            site: record.site,
            timestamp: record.timestamp,
            recorded_by: record.recorded_by,
        }
    }
}
