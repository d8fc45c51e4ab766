//! Staff, client, and schedule CSV readers.
//!
//! Every reader is all-or-nothing: the first bad row aborts the load with
//! [`IngestError::MalformedInput`] naming the file and line, so callers only
//! ever see a complete record set.

use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use chrono::{NaiveDate, NaiveTime};
use csv::{ReaderBuilder, StringRecord, Trim};
use muster_core::entities::{Person, ScheduleEntry};
use muster_core::enums::Category;

use crate::columns::{Columns, Row};
use crate::error::IngestError;

const PEOPLE_REQUIRED: [&str; 3] = ["id", "name", "site"];
const SCHEDULE_REQUIRED: [&str; 6] = [
    "person_type",
    "id",
    "date",
    "start_time",
    "end_time",
    "site",
];

/// Read staff or client records from `path`.
///
/// # Errors
///
/// `Io` if the file cannot be opened, `MalformedInput` for a missing column,
/// a blank required field, or a duplicate id.
pub fn load_people(path: &Path, category: Category) -> Result<Vec<Person>, IngestError> {
    let file = File::open(path)?;
    read_people(file, &path.display().to_string(), category)
}

/// Read staff or client records from any reader. `file` names the source in
/// error messages.
///
/// # Errors
///
/// See [`load_people`].
pub fn read_people<R: Read>(
    reader: R,
    file: &str,
    category: Category,
) -> Result<Vec<Person>, IngestError> {
    let mut people = Vec::new();
    let mut first_seen: HashMap<String, u64> = HashMap::new();
    for_each_row(reader, file, &PEOPLE_REQUIRED, |row| {
        let id = row.required("id")?.to_string();
        if let Some(line) = first_seen.get(&id) {
            return Err(row.malformed(format!("duplicate id '{id}' (first seen on line {line})")));
        }
        first_seen.insert(id.clone(), row.line());
        people.push(Person {
            id,
            name: row.required("name")?.to_string(),
            category,
            site: row.required("site")?.to_string(),
            contact_name: row.optional("contact_name"),
            contact_phone: row.optional("contact_phone"),
            email: row.optional("email"),
            phone: row.optional("phone"),
        });
        Ok(())
    })?;
    tracing::debug!(file, %category, count = people.len(), "people parsed");
    Ok(people)
}

/// Read schedule entries from `path`.
///
/// # Errors
///
/// `Io` if the file cannot be opened, `MalformedInput` for a missing column,
/// a blank field, an unknown `person_type`, or an unparseable date or time.
pub fn load_schedule(path: &Path) -> Result<Vec<ScheduleEntry>, IngestError> {
    let file = File::open(path)?;
    read_schedule(file, &path.display().to_string())
}

/// Read schedule entries from any reader.
///
/// # Errors
///
/// See [`load_schedule`].
pub fn read_schedule<R: Read>(reader: R, file: &str) -> Result<Vec<ScheduleEntry>, IngestError> {
    let mut entries = Vec::new();
    for_each_row(reader, file, &SCHEDULE_REQUIRED, |row| {
        let raw_type = row.required("person_type")?;
        let category = raw_type.parse::<Category>().map_err(|_| {
            row.malformed(format!(
                "unsupported person_type '{raw_type}' (expected staff or client)"
            ))
        })?;
        let raw_date = row.required("date")?;
        let date = NaiveDate::parse_from_str(raw_date, "%Y-%m-%d")
            .map_err(|e| row.malformed(format!("date '{raw_date}' is not YYYY-MM-DD: {e}")))?;
        entries.push(ScheduleEntry {
            category,
            id: row.required("id")?.to_string(),
            date,
            start_time: parse_time(row, "start_time")?,
            end_time: parse_time(row, "end_time")?,
            site: row.required("site")?.to_string(),
        });
        Ok(())
    })?;
    tracing::debug!(file, count = entries.len(), "schedule parsed");
    Ok(entries)
}

/// `HH:MM`, with seconds tolerated.
fn parse_time(row: &Row<'_>, column: &str) -> Result<NaiveTime, IngestError> {
    let raw = row.required(column)?;
    NaiveTime::parse_from_str(raw, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(raw, "%H:%M:%S"))
        .map_err(|_| row.malformed(format!("{column} '{raw}' is not HH:MM")))
}

fn for_each_row<R, F>(
    reader: R,
    file: &str,
    required: &[&str],
    mut visit: F,
) -> Result<(), IngestError>
where
    R: Read,
    F: FnMut(&Row<'_>) -> Result<(), IngestError>,
{
    let mut csv = ReaderBuilder::new()
        .trim(Trim::All)
        .flexible(true)
        .from_reader(reader);
    let columns = Columns::from_headers(file, csv.headers()?, required)?;

    let mut record = StringRecord::new();
    let mut fallback_line = 1;
    while csv.read_record(&mut record)? {
        fallback_line += 1;
        if record.iter().all(|field| field.trim().is_empty()) {
            continue;
        }
        let line = record.position().map_or(fallback_line, csv::Position::line);
        visit(&columns.row(&record, line))?;
    }
    Ok(())
}
