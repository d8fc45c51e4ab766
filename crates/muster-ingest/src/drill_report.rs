//! Fire-drill report CSV.
//!
//! Layout: a four-row header block (title, generated-at, drill date/time,
//! location), one blank line, then one row per person.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use chrono::NaiveDateTime;
use csv::WriterBuilder;
use muster_core::entities::{DrillExportRecord, DrillMeta};

use crate::error::IngestError;

const TITLE: &str = "Fire Drill Report";
const COLUMNS: [&str; 6] = ["Person Type", "ID", "Name", "Site", "Status", "Details"];
const ACCOUNTED_FOR: &str = "Accounted For";
const NOT_ACCOUNTED_FOR: &str = "Not Accounted For";
const NO_REASON: &str = "Reason not provided";

/// `firedrill_{YYYYMMDD-HHMM}_{location}.csv`, with every character of the
/// location outside `[A-Za-z0-9_-]` replaced by `_`.
#[must_use]
pub fn report_filename(meta: &DrillMeta) -> String {
    let location = meta.location.trim();
    let safe: String = if location.is_empty() {
        "location".into()
    } else {
        location
            .chars()
            .map(|ch| {
                if ch.is_alphanumeric() || ch == '-' || ch == '_' {
                    ch
                } else {
                    '_'
                }
            })
            .collect()
    };
    format!("firedrill_{}_{safe}.csv", meta.drill_at.format("%Y%m%d-%H%M"))
}

/// Write the report to `out`.
///
/// # Errors
///
/// `Csv` or `Io` if the sink rejects a write.
pub fn write_report<W: Write>(
    mut out: W,
    meta: &DrillMeta,
    generated_at: NaiveDateTime,
    records: &[DrillExportRecord],
) -> Result<(), IngestError> {
    {
        let mut header = WriterBuilder::new().flexible(true).from_writer(&mut out);
        header.write_record([TITLE])?;
        header.write_record([
            "Generated At",
            &generated_at.format("%Y-%m-%dT%H:%M:%S").to_string(),
        ])?;
        header.write_record([
            "Fire Drill Date/Time",
            &meta.drill_at.format("%Y-%m-%dT%H:%M").to_string(),
        ])?;
        header.write_record(["Location", meta.location.as_str()])?;
        header.flush()?;
    }
    out.write_all(b"\n")?;

    let mut table = WriterBuilder::new().from_writer(&mut out);
    table.write_record(COLUMNS)?;
    for record in records {
        let (status, details) = if record.present {
            (ACCOUNTED_FOR, "")
        } else {
            (
                NOT_ACCOUNTED_FOR,
                record.reason.as_deref().unwrap_or(NO_REASON),
            )
        };
        table.write_record([
            record.category.label(),
            record.id.as_str(),
            record.name.as_str(),
            record.site.as_str(),
            status,
            details,
        ])?;
    }
    table.flush()?;
    Ok(())
}

/// Write the report into `dir` under [`report_filename`] and return its path.
///
/// # Errors
///
/// `Io` if the directory or file cannot be created.
pub fn save_report(
    dir: &Path,
    meta: &DrillMeta,
    generated_at: NaiveDateTime,
    records: &[DrillExportRecord],
) -> Result<PathBuf, IngestError> {
    std::fs::create_dir_all(dir)?;
    let path = dir.join(report_filename(meta));
    let mut out = BufWriter::new(File::create(&path)?);
    write_report(&mut out, meta, generated_at, records)?;
    out.flush()?;
    tracing::info!(path = %path.display(), rows = records.len(), "drill report written");
    Ok(path)
}
