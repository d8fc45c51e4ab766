//! Runtime directory layout and the persisted roster snapshot.
//!
//! ```text
//! <runtime_dir>/
//!   events.jsonl      durable event log
//!   settings.json     operator settings
//!   roster.json       last loaded people + schedule
//!   archive/          events-<stamp>.jsonl copies
//! ```

use std::path::{Path, PathBuf};

use muster_core::entities::{Person, ScheduleEntry};
use serde::{Deserialize, Serialize};

use crate::error::StoreError;

pub const EVENTS_FILE: &str = "events.jsonl";
pub const SETTINGS_FILE: &str = "settings.json";
pub const ROSTER_FILE: &str = "roster.json";
pub const ARCHIVE_DIR: &str = "archive";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuntimeDir {
    root: PathBuf,
}

impl RuntimeDir {
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Create the directory tree if it does not exist.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Io` if a directory cannot be created.
    pub fn ensure(&self) -> Result<(), StoreError> {
        std::fs::create_dir_all(self.archive_dir())?;
        Ok(())
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    #[must_use]
    pub fn events(&self) -> PathBuf {
        self.root.join(EVENTS_FILE)
    }

    #[must_use]
    pub fn settings(&self) -> PathBuf {
        self.root.join(SETTINGS_FILE)
    }

    #[must_use]
    pub fn roster(&self) -> PathBuf {
        self.root.join(ROSTER_FILE)
    }

    #[must_use]
    pub fn archive_dir(&self) -> PathBuf {
        self.root.join(ARCHIVE_DIR)
    }
}

/// The record set behind the active roster, as stored in `roster.json`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct RosterFile {
    pub people: Vec<Person>,
    pub schedule: Vec<ScheduleEntry>,
}

impl RosterFile {
    /// Read `path`, or `None` if no roster has been saved yet.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::MalformedInput` if the file cannot be parsed.
    pub fn load(path: &Path) -> Result<Option<Self>, StoreError> {
        let raw = match std::fs::read(path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        serde_json::from_slice(&raw)
            .map(Some)
            .map_err(|e| StoreError::MalformedInput(format!("{}: {e}", path.display())))
    }

    /// Replace `path` atomically.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Persist` if the file cannot be written.
    pub fn save(&self, path: &Path) -> Result<(), StoreError> {
        write_atomic(path, &serde_json::to_vec_pretty(self)?)
    }
}

/// Write to a sibling temp file, then rename over `path`.
pub(crate) fn write_atomic(path: &Path, bytes: &[u8]) -> Result<(), StoreError> {
    let persist = |e: std::io::Error| StoreError::Persist(format!("{}: {e}", path.display()));
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(persist)?;
    }
    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    let tmp = PathBuf::from(tmp);
    std::fs::write(&tmp, bytes).map_err(persist)?;
    std::fs::rename(&tmp, path).map_err(persist)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::helpers::sample_records;
    use pretty_assertions::assert_eq;

    #[test]
    fn layout_paths() {
        let dir = RuntimeDir::new("/srv/muster");
        assert_eq!(dir.events(), PathBuf::from("/srv/muster/events.jsonl"));
        assert_eq!(dir.settings(), PathBuf::from("/srv/muster/settings.json"));
        assert_eq!(dir.archive_dir(), PathBuf::from("/srv/muster/archive"));
    }

    #[test]
    fn roster_file_roundtrip() {
        let tmp = tempfile::TempDir::new().unwrap();
        let dir = RuntimeDir::new(tmp.path().join("runtime"));
        dir.ensure().unwrap();
        assert_eq!(RosterFile::load(&dir.roster()).unwrap(), None);

        let (people, schedule) = sample_records();
        let file = RosterFile { people, schedule };
        file.save(&dir.roster()).unwrap();
        assert_eq!(RosterFile::load(&dir.roster()).unwrap(), Some(file));
        assert!(!dir.root().join("roster.json.tmp").exists());
    }

    #[test]
    fn unparseable_roster_is_malformed() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("roster.json");
        std::fs::write(&path, "[").unwrap();
        assert!(matches!(
            RosterFile::load(&path).unwrap_err(),
            StoreError::MalformedInput(_)
        ));
    }
}
