//! `settings.json` persistence.

use std::path::{Path, PathBuf};

use muster_core::entities::Settings;

use crate::error::StoreError;
use crate::runtime::write_atomic;

/// Reads and writes the operator settings file. An in-memory store has no
/// path and never touches disk.
#[derive(Debug, Clone, Default)]
pub struct SettingsStore {
    path: Option<PathBuf>,
}

impl SettingsStore {
    #[must_use]
    pub const fn new(path: PathBuf) -> Self {
        Self { path: Some(path) }
    }

    #[must_use]
    pub const fn in_memory() -> Self {
        Self { path: None }
    }

    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Load settings, falling back to defaults when the file does not exist.
    ///
    /// # Errors
    ///
    /// Returns `SettingsCorruption` if the file exists but cannot be parsed.
    pub fn load(&self) -> Result<Settings, StoreError> {
        let Some(path) = &self.path else {
            return Ok(Settings::default());
        };
        let raw = match std::fs::read_to_string(path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Settings::default()),
            Err(e) => return Err(e.into()),
        };
        serde_json::from_str::<Settings>(&raw)
            .map(Settings::normalized)
            .map_err(|e| StoreError::SettingsCorruption {
                path: path.clone(),
                reason: e.to_string(),
            })
    }

    /// Write settings via temp file and rename.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Persist` if the write fails.
    pub fn save(&self, settings: &Settings) -> Result<(), StoreError> {
        match &self.path {
            Some(path) => write_atomic(path, &serde_json::to_vec_pretty(settings)?),
            None => Ok(()),
        }
    }
}
