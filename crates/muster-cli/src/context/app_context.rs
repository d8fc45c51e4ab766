use std::path::PathBuf;

use anyhow::Context;
use chrono::{DateTime, FixedOffset, NaiveDate, Utc};
use muster_config::MusterConfig;
use muster_core::responses::RecoveryReport;
use muster_store::{AttendanceService, RecoveryMode, RosterFile, RuntimeDir, StoreError};

use crate::cli::GlobalFlags;

/// Shared application resources initialized once per invocation.
pub struct AppContext {
    pub service: AttendanceService,
    pub config: MusterConfig,
    pub runtime: RuntimeDir,
    pub offset: FixedOffset,
}

impl AppContext {
    /// Open the runtime directory, replay the event log, and load the saved
    /// roster.
    ///
    /// A first run seeds `settings.json` from the config file defaults; after
    /// that the saved settings win.
    pub async fn init(
        config: MusterConfig,
        flags: &GlobalFlags,
        mode: RecoveryMode,
    ) -> anyhow::Result<(Self, RecoveryReport)> {
        let runtime = Self::runtime_dir(&config, flags);
        let offset = config.general.offset()?;
        let settings_saved = runtime.settings().exists();

        let (service, report) = AttendanceService::open(runtime.clone(), mode)
            .await
            .map_err(|error| {
                let hint = match &error {
                    StoreError::RecoveryCorruption { .. } => {
                        "run 'muster recover --clean-slate' or 'muster recover --latest-archive'"
                    }
                    StoreError::SettingsCorruption { .. } => {
                        "fix or remove settings.json in the runtime directory"
                    }
                    _ => "failed to open the runtime directory",
                };
                anyhow::Error::new(error).context(hint)
            })?;

        if let Some(file) = RosterFile::load(&runtime.roster())? {
            service
                .replace_roster(file.people, file.schedule)
                .await
                .context("saved roster is invalid; reload it with 'muster load'")?;
        }

        if !settings_saved {
            let timeout = config.notify.default_timeout_secs;
            let retention = config.retention.days;
            service
                .update_settings(|settings| {
                    settings.timeout_seconds = timeout;
                    settings.retention_days = retention;
                })
                .await
                .context("failed to write initial settings")?;
        }

        tracing::debug!(
            runtime = %runtime.root().display(),
            events = report.events_replayed,
            "context ready"
        );

        Ok((
            Self {
                service,
                config,
                runtime,
                offset,
            },
            report,
        ))
    }

    /// `--runtime-dir` if given, else `general.runtime_dir` from config.
    #[must_use]
    pub fn runtime_dir(config: &MusterConfig, flags: &GlobalFlags) -> RuntimeDir {
        let root: PathBuf = flags
            .runtime_dir
            .clone()
            .unwrap_or_else(|| config.general.runtime_dir.clone());
        RuntimeDir::new(root)
    }

    /// Today in the configured offset.
    #[must_use]
    pub fn today(&self) -> NaiveDate {
        self.now().date_naive()
    }

    #[must_use]
    pub fn now(&self) -> DateTime<FixedOffset> {
        Utc::now().with_timezone(&self.offset)
    }

    /// Drain pending writes and stop the flusher.
    pub async fn close(self) -> anyhow::Result<()> {
        self.service
            .shutdown()
            .await
            .context("failed to flush the event snapshot")
    }
}
