//! Report types returned by the store and rendered by `muster` commands.
//!
//! These structs define the shape of JSON output for commands like
//! `muster status`, `muster schedule`, `muster health`, and `muster recover`.

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveTime};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::entities::Person;
use crate::enums::{AttendanceMark, Category, PresenceStatus, RecoveryState};

/// A scheduled person whose latest action is a sign-in.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct PresentPerson {
    pub person: Person,
    pub signed_in_at: DateTime<FixedOffset>,
    pub signed_in_site: String,
}

/// A scheduled person who is not signed in.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct MissingPerson {
    pub person: Person,
    /// Sites this person is scheduled at for the reconciled day and filter.
    pub scheduled_sites: Vec<String>,
    /// `sign_out` (left early), `no_event` (never arrived), or `sign_in` when the
    /// standing sign-in was recorded at a different site than the filter.
    pub last_status: PresenceStatus,
}

/// Present/missing partition of the people scheduled for one day.
///
/// Each list is sorted by category, then name, then id.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct Reconciliation {
    pub date: NaiveDate,
    pub site: Option<String>,
    pub present: Vec<PresentPerson>,
    pub missing: Vec<MissingPerson>,
}

impl Reconciliation {
    #[must_use]
    pub fn scheduled_count(&self) -> usize {
        self.present.len() + self.missing.len()
    }

    #[must_use]
    pub fn all_accounted_for(&self) -> bool {
        self.missing.is_empty()
    }
}

/// One row of the daily schedule matrix.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct ScheduleRow {
    pub category: Category,
    pub id: String,
    pub name: String,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub site: String,
    pub status: AttendanceMark,
    pub sign_time: Option<DateTime<FixedOffset>>,
}

/// Size of the active roster generation.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct RosterSummary {
    pub staff: usize,
    pub clients: usize,
    pub schedule_entries: usize,
}

/// The most recent durability failure.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct FlushFailure {
    pub seq: u64,
    pub error: String,
    pub at: DateTime<FixedOffset>,
}

/// Durability health, surfaced on read rather than only at flush time.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct HealthReport {
    pub state: RecoveryState,
    pub events: usize,
    pub last_flushed_seq: Option<u64>,
    pub pending_flushes: u64,
    pub flush_failures: u64,
    pub last_flush_error: Option<FlushFailure>,
}

impl HealthReport {
    #[must_use]
    pub const fn is_healthy(&self) -> bool {
        self.last_flush_error.is_none() && self.state.accepts_appends()
    }
}

/// Outcome of loading the durable snapshot at startup.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct RecoveryReport {
    pub source: String,
    pub events_replayed: u32,
    pub next_seq: u64,
    /// Where a corrupt snapshot was moved when a clean-slate start was chosen.
    pub quarantined: Option<String>,
    /// Where an unterminated final line was saved before the snapshot was
    /// cut back to its last complete record.
    #[serde(default)]
    pub torn_tail: Option<String>,
    pub duration_ms: u64,
}

/// Outcome of archiving the live snapshot.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct ArchiveReport {
    pub archived_to: String,
    pub pruned: Vec<String>,
}
