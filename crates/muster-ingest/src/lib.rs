//! # muster-ingest
//!
//! The tabular edge of Muster: strict CSV readers for the staff, client, and
//! schedule files, and the CSV writer for fire-drill reports.
//!
//! Loading is all-or-nothing. Any malformed row rejects the whole set with
//! [`IngestError::MalformedInput`], so the store is only ever handed a fully
//! valid roster.

mod columns;
pub mod drill_report;
mod error;
pub mod roster;

pub use drill_report::{report_filename, save_report, write_report};
pub use error::IngestError;
pub use roster::{load_people, load_schedule, read_people, read_schedule};

use std::path::Path;

use muster_core::entities::{Person, ScheduleEntry};
use muster_core::enums::Category;

/// The three source files of a roster load.
#[derive(Debug, Clone, Copy)]
pub struct RosterFiles<'a> {
    pub staff: &'a Path,
    pub clients: &'a Path,
    pub schedule: &'a Path,
}

/// A parsed roster, not yet cross-checked against the schedule.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadedRoster {
    pub people: Vec<Person>,
    pub schedule: Vec<ScheduleEntry>,
}

/// Read all three files. Stops at the first failure.
///
/// # Errors
///
/// The first [`IngestError`] from any of the files.
pub fn load_roster(files: RosterFiles<'_>) -> Result<LoadedRoster, IngestError> {
    let mut people = load_people(files.staff, Category::Staff)?;
    people.extend(load_people(files.clients, Category::Client)?);
    let schedule = load_schedule(files.schedule)?;
    tracing::info!(
        people = people.len(),
        schedule = schedule.len(),
        "roster files loaded"
    );
    Ok(LoadedRoster { people, schedule })
}
