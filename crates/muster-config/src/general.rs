//! General application configuration.

use std::path::PathBuf;

use chrono::{FixedOffset, Local, NaiveDate, Offset, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

fn default_runtime_dir() -> PathBuf {
    PathBuf::from(".muster/runtime")
}

fn default_utc_offset() -> String {
    "+00:00".to_string()
}

fn default_environment() -> String {
    "development".to_string()
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GeneralConfig {
    /// Directory holding `events.jsonl`, `settings.json`, `roster.json`, and archives.
    #[serde(default = "default_runtime_dir")]
    pub runtime_dir: PathBuf,

    /// UTC offset (`+HH:MM`, `-HH:MM`, or `local`) used to stamp new sign
    /// events and to decide which calendar day is "today".
    #[serde(default = "default_utc_offset")]
    pub utc_offset: String,

    /// `development`, `staging`, or `production`.
    #[serde(default = "default_environment")]
    pub environment: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            runtime_dir: default_runtime_dir(),
            utc_offset: default_utc_offset(),
            environment: default_environment(),
        }
    }
}

impl GeneralConfig {
    #[must_use]
    pub fn is_production(&self) -> bool {
        self.environment.eq_ignore_ascii_case("production")
    }

    /// Parse the configured offset.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` if `utc_offset` is not `local` or a
    /// `±HH:MM` offset.
    pub fn offset(&self) -> Result<FixedOffset, ConfigError> {
        let raw = self.utc_offset.trim();
        if raw.eq_ignore_ascii_case("local") {
            return Ok(*Local::now().offset());
        }
        if raw.eq_ignore_ascii_case("z") || raw.eq_ignore_ascii_case("utc") {
            return Ok(Utc.fix());
        }
        parse_offset(raw).ok_or_else(|| ConfigError::InvalidValue {
            field: "general.utc_offset".into(),
            reason: format!("'{raw}' is not local or a ±HH:MM offset"),
        })
    }

    /// Today's calendar date at the configured offset.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` if the offset is invalid.
    pub fn today(&self) -> Result<NaiveDate, ConfigError> {
        Ok(Utc::now().with_timezone(&self.offset()?).date_naive())
    }
}

fn parse_offset(raw: &str) -> Option<FixedOffset> {
    let (sign, rest) = match raw.as_bytes().first()? {
        b'+' => (1, &raw[1..]),
        b'-' => (-1, &raw[1..]),
        _ => return None,
    };
    let (hours, minutes) = rest.split_once(':')?;
    let hours: i32 = hours.parse().ok()?;
    let minutes: i32 = minutes.parse().ok()?;
    if !(0..=23).contains(&hours) || !(0..=59).contains(&minutes) {
        return None;
    }
    FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60))
}
