//! JSONL snapshot writer.
//!
//! Appends `SnapshotRecord` lines to the runtime directory's `events.jsonl`.
//! Uses `serde_jsonlines::append_json_lines` for per-line appends. After a
//! failed append the file may end mid-line, so the next append terminates
//! that line first.

use std::fs::OpenOptions;
use std::io::{ErrorKind, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use muster_core::snapshot::SnapshotRecord;

use crate::error::StoreError;

/// Appends snapshot records to a single JSONL file.
///
/// Only the flusher task writes through this; the service never touches the
/// file directly.
#[derive(Debug)]
pub struct SnapshotWriter {
    path: PathBuf,
    enabled: bool,
    unterminated: bool,
}

impl SnapshotWriter {
    /// Create a writer for `path`, creating its parent directory.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Io` if the directory cannot be created.
    pub fn new(path: PathBuf) -> Result<Self, StoreError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        Ok(Self {
            path,
            enabled: true,
            unterminated: false,
        })
    }

    /// Create a disabled writer (in-memory services and tests).
    #[must_use]
    pub const fn disabled() -> Self {
        Self {
            path: PathBuf::new(),
            enabled: false,
            unterminated: false,
        }
    }

    #[must_use]
    pub const fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Append one record.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Persist` if the line cannot be written.
    pub fn append(&mut self, record: &SnapshotRecord) -> Result<(), StoreError> {
        if !self.enabled {
            return Ok(());
        }
        if self.unterminated {
            self.terminate_last_line()
                .map_err(|e| StoreError::Persist(format!("{}: {e}", self.path.display())))?;
            self.unterminated = false;
        }
        let outcome = serde_jsonlines::append_json_lines(&self.path, [record])
            .map_err(|e| StoreError::Persist(format!("{}: {e}", self.path.display())));
        self.unterminated = outcome.is_err();
        outcome
    }

    /// Append `\n` unless the file is empty or already ends with one.
    fn terminate_last_line(&self) -> std::io::Result<()> {
        let mut file = match OpenOptions::new().read(true).append(true).open(&self.path) {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(()),
            Err(e) => return Err(e),
        };
        if file.seek(SeekFrom::End(0))? == 0 {
            return Ok(());
        }
        file.seek(SeekFrom::End(-1))?;
        let mut last = [0_u8; 1];
        file.read_exact(&mut last)?;
        if last[0] != b'\n' {
            file.write_all(b"\n")?;
        }
        Ok(())
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}
