//! Archive copies of the live snapshot and their retention.
//!
//! Archives are named `events-<YYYYmmddTHHMMSSZ>.jsonl`; the stamp in the
//! name, not the file's mtime, decides its age.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Duration, NaiveDateTime, Utc};
use muster_core::responses::ArchiveReport;

use crate::error::StoreError;
use crate::snapshot::file_stamp;

const ARCHIVE_PREFIX: &str = "events-";
const ARCHIVE_EXT: &str = ".jsonl";
const STAMP_FORMAT: &str = "%Y%m%dT%H%M%SZ";
const STAMP_LEN: usize = 16;

/// Copy `live` into `archive_dir` and prune copies older than
/// `retention_days`. A retention of zero keeps every archive.
///
/// # Errors
///
/// Returns `StoreError::Io` if the copy or a deletion fails.
pub fn archive_snapshot(
    live: &Path,
    archive_dir: &Path,
    now: DateTime<Utc>,
    retention_days: u32,
) -> Result<ArchiveReport, StoreError> {
    std::fs::create_dir_all(archive_dir)?;

    let stamp = file_stamp(now);
    let mut target = archive_dir.join(format!("{ARCHIVE_PREFIX}{stamp}{ARCHIVE_EXT}"));
    let mut attempt = 1;
    while target.exists() {
        target = archive_dir.join(format!("{ARCHIVE_PREFIX}{stamp}-{attempt}{ARCHIVE_EXT}"));
        attempt += 1;
    }

    if live.exists() {
        std::fs::copy(live, &target)?;
    } else {
        std::fs::File::create(&target)?;
    }

    let mut pruned = Vec::new();
    if retention_days > 0 {
        let cutoff = now.naive_utc() - Duration::days(i64::from(retention_days));
        for path in list_archives(archive_dir)? {
            if path == target {
                continue;
            }
            if archive_stamp(&path).is_some_and(|taken| taken < cutoff) {
                std::fs::remove_file(&path)?;
                tracing::debug!(path = %path.display(), "pruned archived snapshot");
                pruned.push(path.display().to_string());
            }
        }
    }

    Ok(ArchiveReport {
        archived_to: target.display().to_string(),
        pruned,
    })
}

/// Archive files in `archive_dir`, oldest first. A missing directory is empty.
///
/// # Errors
///
/// Returns `StoreError::Io` if the directory exists but cannot be read.
pub fn list_archives(archive_dir: &Path) -> Result<Vec<PathBuf>, StoreError> {
    if !archive_dir.exists() {
        return Ok(Vec::new());
    }
    let mut archives = Vec::new();
    for entry in std::fs::read_dir(archive_dir)? {
        let path = entry?.path();
        if archive_stamp(&path).is_some() {
            archives.push(path);
        }
    }
    archives.sort();
    Ok(archives)
}

fn archive_stamp(path: &Path) -> Option<NaiveDateTime> {
    let name = path.file_name()?.to_str()?;
    let rest = name.strip_prefix(ARCHIVE_PREFIX)?;
    if !rest.ends_with(ARCHIVE_EXT) {
        return None;
    }
    let stamp = rest.get(..STAMP_LEN)?;
    NaiveDateTime::parse_from_str(stamp, STAMP_FORMAT).ok()
}
