//! # muster-config
//!
//! Layered configuration loading for Muster using figment.
//!
//! Configuration sources (in priority order, highest wins):
//! 1. Environment variables (`MUSTER_*` prefix, `__` as separator)
//! 2. Project-level `.muster/config.toml`
//! 3. User-level `~/.config/muster/config.toml`
//! 4. Built-in defaults
//!
//! # Environment Variable Mapping
//!
//! Figment maps `MUSTER_GENERAL__RUNTIME_DIR` -> `general.runtime_dir`,
//! `MUSTER_NOTIFY__DEFAULT_TIMEOUT_SECS` -> `notify.default_timeout_secs`, etc.
//! The `__` (double underscore) separates nested config sections.
//!
//! # Usage
//!
//! ```no_run
//! use muster_config::MusterConfig;
//!
//! let config = MusterConfig::load_with_dotenv().expect("config");
//! println!("runtime dir: {}", config.general.runtime_dir.display());
//! ```

mod error;
mod general;
mod notify;
mod retention;

pub use error::ConfigError;
pub use general::GeneralConfig;
pub use notify::NotifyConfig;
pub use retention::RetentionConfig;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct MusterConfig {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub notify: NotifyConfig,
    #[serde(default)]
    pub retention: RetentionConfig,
}

impl MusterConfig {
    /// Load configuration from all sources (TOML files + environment variables).
    ///
    /// Does NOT call `dotenvy` -- use [`Self::load_with_dotenv`] if you need `.env` file loading.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a source cannot be parsed or a value is invalid.
    pub fn load() -> Result<Self, ConfigError> {
        let config: Self = Self::figment().extract()?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration with `.env` file support.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a source cannot be parsed or a value is invalid.
    pub fn load_with_dotenv() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();
        Self::load()
    }

    /// Build the figment provider chain.
    ///
    /// This is public so tests can inspect the figment directly or add
    /// additional providers on top.
    #[must_use]
    pub fn figment() -> Figment {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        // Layer 1: User-global config
        if let Some(global_path) = Self::global_config_path() {
            if global_path.exists() {
                figment = figment.merge(Toml::file(global_path));
            }
        }

        // Layer 2: Project-local config
        let local_path = PathBuf::from(".muster/config.toml");
        if local_path.exists() {
            figment = figment.merge(Toml::file(local_path));
        }

        // Layer 3: Environment variables (highest priority)
        figment.merge(Env::prefixed("MUSTER_").split("__"))
    }

    /// Reject values that would only fail later, deep inside a command.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` for a bad offset or a zero timeout.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.general.offset()?;
        if self.notify.default_timeout_secs == 0 {
            return Err(ConfigError::InvalidValue {
                field: "notify.default_timeout_secs".into(),
                reason: "must be at least 1 second".into(),
            });
        }
        Ok(())
    }

    /// Path to the user-global config file.
    fn global_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("muster").join("config.toml"))
    }
}
