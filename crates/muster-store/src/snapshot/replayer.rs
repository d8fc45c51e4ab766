//! JSONL snapshot replayer.
//!
//! Reads `events.jsonl` back into an [`EventLog`] at startup. Every line must
//! parse as a supported `SnapshotRecord` with a unique sequence number; the
//! only repair made without being asked is cutting off a torn final line
//! left by a crash mid-append. Anything else is `RecoveryCorruption`, and
//! [`RecoveryMode`] decides what happens next.

use std::collections::HashMap;
use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, ErrorKind, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use muster_core::entities::SignEvent;
use muster_core::responses::RecoveryReport;
use muster_core::snapshot::{SNAPSHOT_VERSION, SnapshotRecord};

use crate::error::StoreError;
use crate::event_log::EventLog;
use crate::snapshot::file_stamp;

/// What to do when the live snapshot cannot be replayed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum RecoveryMode {
    /// Corruption is fatal; the operator must choose explicitly.
    #[default]
    Strict,
    /// Move the corrupt file aside and start with an empty log.
    CleanSlate,
    /// Replay an archived copy, which then becomes the live snapshot.
    FromArchive(PathBuf),
}

/// A replayed log plus the report describing how it was obtained.
#[derive(Debug)]
pub struct Recovered {
    pub log: EventLog,
    pub report: RecoveryReport,
}

pub struct SnapshotReplayer;

impl SnapshotReplayer {
    /// Read every record from a snapshot file, in file order.
    ///
    /// A missing file is an empty snapshot. Blank lines are skipped.
    ///
    /// # Errors
    ///
    /// `RecoveryCorruption` for unparseable lines, unsupported versions, or
    /// duplicate sequence numbers; `Io` if the file cannot be opened.
    pub fn load(path: &Path) -> Result<Vec<SignEvent>, StoreError> {
        let file = match File::open(path) {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let corrupt = |line: usize, reason: String| StoreError::RecoveryCorruption {
            path: path.to_path_buf(),
            line,
            reason,
        };

        let mut seen: HashMap<u64, usize> = HashMap::new();
        let mut events = Vec::new();
        for (idx, line) in BufReader::new(file).lines().enumerate() {
            let line_no = idx + 1;
            let text = line.map_err(|e| corrupt(line_no, e.to_string()))?;
            if text.trim().is_empty() {
                continue;
            }

            let record: SnapshotRecord =
                serde_json::from_str(&text).map_err(|e| corrupt(line_no, e.to_string()))?;
            if record.v != SNAPSHOT_VERSION {
                return Err(corrupt(
                    line_no,
                    format!("unsupported snapshot version {}", record.v),
                ));
            }
            if record.seq == u64::MAX {
                return Err(corrupt(
                    line_no,
                    format!("sequence {} leaves no room for further appends", record.seq),
                ));
            }
            if let Some(first) = seen.insert(record.seq, line_no) {
                return Err(corrupt(
                    line_no,
                    format!("duplicate sequence {} (first on line {first})", record.seq),
                ));
            }
            events.push(SignEvent::from(record));
        }
        Ok(events)
    }

    /// Load the live snapshot according to `mode` and replay it.
    ///
    /// Replay bypasses roster validation: history may name people that a
    /// later roster no longer contains. In every mode a torn final line in
    /// the live file is saved aside and cut off first.
    ///
    /// # Errors
    ///
    /// Returns `RecoveryCorruption` in strict mode, or for a corrupt archive,
    /// and `Io` for filesystem failures.
    pub fn recover(
        live: &Path,
        mode: &RecoveryMode,
        now: DateTime<Utc>,
    ) -> Result<Recovered, StoreError> {
        let start = std::time::Instant::now();
        let mut quarantined = None;
        let torn_tail = match mode {
            RecoveryMode::Strict | RecoveryMode::CleanSlate => salvage_torn_tail(live, now)?,
            RecoveryMode::FromArchive(_) => None,
        };

        let (source, events) = match mode {
            RecoveryMode::Strict => (live.to_path_buf(), Self::load(live)?),
            RecoveryMode::CleanSlate => match Self::load(live) {
                Ok(events) => (live.to_path_buf(), events),
                Err(StoreError::RecoveryCorruption { line, reason, .. }) => {
                    let moved = quarantine(live, "corrupt", now)?;
                    tracing::warn!(
                        line,
                        %reason,
                        moved_to = %moved.display(),
                        "snapshot corrupt, starting with an empty log"
                    );
                    quarantined = Some(moved);
                    (live.to_path_buf(), Vec::new())
                }
                Err(e) => return Err(e),
            },
            RecoveryMode::FromArchive(archive) => {
                let events = Self::load(archive)?;
                if live.exists() {
                    quarantined = Some(quarantine(live, "replaced", now)?);
                }
                std::fs::copy(archive, live)?;
                tracing::info!(archive = %archive.display(), "restored snapshot from archive");
                (archive.clone(), events)
            }
        };

        let log = EventLog::replay(events).map_err(|e| StoreError::RecoveryCorruption {
            path: source.clone(),
            line: 0,
            reason: e.to_string(),
        })?;

        let report = RecoveryReport {
            source: source.display().to_string(),
            events_replayed: u32::try_from(log.len()).unwrap_or(u32::MAX),
            next_seq: log.next_seq(),
            quarantined: quarantined.map(|path| path.display().to_string()),
            torn_tail: torn_tail.map(|path| path.display().to_string()),
            duration_ms: u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX),
        };
        Ok(Recovered { log, report })
    }
}

/// `<name>.<label>-<stamp>` beside `path`.
fn sidecar(path: &Path, label: &str, now: DateTime<Utc>) -> PathBuf {
    let name = path
        .file_name()
        .map_or_else(|| "events.jsonl".into(), |n| n.to_string_lossy().into_owned());
    path.with_file_name(format!("{name}.{label}-{}", file_stamp(now)))
}

/// Rename `path` to its `label` sidecar. Never deletes.
fn quarantine(path: &Path, label: &str, now: DateTime<Utc>) -> Result<PathBuf, StoreError> {
    let target = sidecar(path, label, now);
    std::fs::rename(path, &target)?;
    Ok(target)
}

/// Repair a snapshot whose last line has no terminating newline.
///
/// A record that parses only lost its newline and gets one back. Otherwise
/// the partial bytes are copied to a `torn` sidecar and the file is truncated
/// to the end of its last complete line; the sidecar path is returned.
fn salvage_torn_tail(path: &Path, now: DateTime<Utc>) -> Result<Option<PathBuf>, StoreError> {
    let bytes = match std::fs::read(path) {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(e.into()),
    };
    if bytes.is_empty() || bytes.ends_with(b"\n") {
        return Ok(None);
    }

    let cut = bytes.iter().rposition(|&b| b == b'\n').map_or(0, |idx| idx + 1);
    let tail = &bytes[cut..];
    let mut file = OpenOptions::new().write(true).open(path)?;

    let complete = std::str::from_utf8(tail)
        .is_ok_and(|text| serde_json::from_str::<SnapshotRecord>(text).is_ok());
    if complete {
        file.seek(SeekFrom::End(0))?;
        file.write_all(b"\n")?;
        file.sync_all()?;
        return Ok(None);
    }

    let saved = if tail.iter().all(u8::is_ascii_whitespace) {
        None
    } else {
        let target = sidecar(path, "torn", now);
        std::fs::write(&target, tail)?;
        Some(target)
    };
    let keep = u64::try_from(cut).map_err(|e| StoreError::Persist(e.to_string()))?;
    file.set_len(keep)?;
    file.sync_all()?;
    tracing::warn!(
        path = %path.display(),
        dropped_bytes = tail.len(),
        saved_to = ?saved.as_ref().map(|p| p.display().to_string()),
        "snapshot ended in a torn line, truncated to the last complete record"
    );
    Ok(saved)
}
