//! Service layer owning the roster, event log, settings, and durability.
//!
//! `AttendanceService` is a cheap cloneable handle. Lock order is always
//! roster, then log. Settings are locked on their own and never while the
//! roster or log lock is held.

use std::collections::BTreeSet;
use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use muster_core::entities::{
    DrillMeta, NewSignEvent, Person, ScheduleEntry, Settings, SignEvent,
};
use muster_core::enums::{PresenceStatus, RecoveryState};
use muster_core::keys::PersonKey;
use muster_core::responses::{
    ArchiveReport, HealthReport, Reconciliation, RecoveryReport, RosterSummary, ScheduleRow,
};
use muster_core::snapshot::SnapshotRecord;
use tokio::sync::{Mutex, RwLock, mpsc, oneshot};
use tokio::task::JoinHandle;

use crate::drill::DrillSession;
use crate::error::StoreError;
use crate::event_log::EventLog;
use crate::reconcile;
use crate::roster::Roster;
use crate::runtime::RuntimeDir;
use crate::settings::SettingsStore;
use crate::snapshot::archive::archive_snapshot;
use crate::snapshot::flusher::{self, FlushHealth, FlushJob};
use crate::snapshot::{FlushTicket, RecoveryMode, SnapshotReplayer, SnapshotWriter};

/// An event accepted into the in-memory log, plus its durability ticket.
#[derive(Debug)]
pub struct Appended {
    pub event: SignEvent,
    pub ticket: FlushTicket,
}

impl Appended {
    /// Wait for the event to reach disk.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Persist` if the flush failed.
    pub async fn durable(self) -> Result<SignEvent, StoreError> {
        self.ticket.wait().await?;
        Ok(self.event)
    }
}

struct LogState {
    log: EventLog,
    state: RecoveryState,
    flush_tx: Option<mpsc::UnboundedSender<FlushJob>>,
}

impl LogState {
    fn advance(&mut self, next: RecoveryState) -> Result<(), StoreError> {
        if !self.state.can_transition_to(next) {
            return Err(StoreError::InvalidState(format!(
                "Cannot transition event log from {} to {next}",
                self.state
            )));
        }
        tracing::debug!(from = %self.state, to = %next, "event log state change");
        self.state = next;
        Ok(())
    }
}

struct Inner {
    roster: RwLock<Roster>,
    log: RwLock<LogState>,
    settings: RwLock<Settings>,
    settings_store: SettingsStore,
    runtime: Option<RuntimeDir>,
    health: Arc<FlushHealth>,
    flusher: Mutex<Option<JoinHandle<()>>>,
}

#[derive(Clone)]
pub struct AttendanceService {
    inner: Arc<Inner>,
}

impl AttendanceService {
    /// Open a service over a runtime directory, replaying its snapshot.
    ///
    /// The roster starts empty; callers load one with
    /// [`Self::replace_roster`]. Must run inside a tokio runtime.
    ///
    /// # Errors
    ///
    /// Returns `RecoveryCorruption` when the snapshot cannot be replayed under
    /// `mode`, `SettingsCorruption` for an unreadable settings file, and `Io`
    /// for filesystem failures.
    pub async fn open(
        runtime: RuntimeDir,
        mode: RecoveryMode,
    ) -> Result<(Self, RecoveryReport), StoreError> {
        runtime.ensure()?;
        let mut state = LogState {
            log: EventLog::new(),
            state: RecoveryState::Empty,
            flush_tx: None,
        };
        state.advance(RecoveryState::Loading)?;

        let settings_store = SettingsStore::new(runtime.settings());
        let events_path = runtime.events();
        let loaded = settings_store.load().and_then(|settings| {
            SnapshotReplayer::recover(&events_path, &mode, Utc::now())
                .map(|recovered| (settings, recovered))
        });
        let (settings, recovered) = match loaded {
            Ok(loaded) => loaded,
            Err(e) => {
                state.advance(RecoveryState::Failed)?;
                tracing::error!(error = %e, state = %state.state, "recovery failed");
                return Err(e);
            }
        };

        let health = Arc::new(FlushHealth::default());
        let (tx, handle) = flusher::spawn(SnapshotWriter::new(events_path)?, health.clone());
        state.log = recovered.log;
        state.flush_tx = Some(tx);
        state.advance(RecoveryState::Ready)?;

        tracing::info!(
            events = recovered.report.events_replayed,
            next_seq = recovered.report.next_seq,
            source = %recovered.report.source,
            "event log ready"
        );

        let service = Self::from_parts(
            state,
            settings,
            settings_store,
            Some(runtime),
            health,
            handle,
        );
        Ok((service, recovered.report))
    }

    /// A service with no runtime directory: nothing is read or written.
    ///
    /// Must be called inside a tokio runtime.
    #[must_use]
    pub fn in_memory() -> Self {
        let health = Arc::new(FlushHealth::default());
        let (tx, handle) = flusher::spawn(SnapshotWriter::disabled(), health.clone());
        let state = LogState {
            log: EventLog::new(),
            state: RecoveryState::Ready,
            flush_tx: Some(tx),
        };
        Self::from_parts(
            state,
            Settings::default(),
            SettingsStore::in_memory(),
            None,
            health,
            handle,
        )
    }

    fn from_parts(
        state: LogState,
        settings: Settings,
        settings_store: SettingsStore,
        runtime: Option<RuntimeDir>,
        health: Arc<FlushHealth>,
        flusher: JoinHandle<()>,
    ) -> Self {
        Self {
            inner: Arc::new(Inner {
                roster: RwLock::new(Roster::default()),
                log: RwLock::new(state),
                settings: RwLock::new(settings),
                settings_store,
                runtime,
                health,
                flusher: Mutex::new(Some(flusher)),
            }),
        }
    }

    #[must_use]
    pub fn runtime(&self) -> Option<&RuntimeDir> {
        self.inner.runtime.as_ref()
    }

    // -----------------------------------------------------------------------
    // Entity store
    // -----------------------------------------------------------------------

    /// Validate and atomically swap in a new roster generation.
    ///
    /// # Errors
    ///
    /// Returns `MalformedInput` and keeps the previous roster when the record
    /// set is invalid.
    pub async fn replace_roster(
        &self,
        people: Vec<Person>,
        schedule: Vec<ScheduleEntry>,
    ) -> Result<RosterSummary, StoreError> {
        let next = Roster::build(people, schedule).inspect_err(|e| {
            tracing::warn!(error = %e, "roster replacement rejected");
        })?;
        let summary = next.summary();
        *self.inner.roster.write().await = next;
        tracing::info!(
            staff = summary.staff,
            clients = summary.clients,
            schedule_entries = summary.schedule_entries,
            "roster replaced"
        );
        Ok(summary)
    }

    /// # Errors
    ///
    /// Returns `NotFound` if the person is not on the active roster.
    pub async fn lookup(&self, key: &PersonKey) -> Result<Person, StoreError> {
        self.inner
            .roster
            .read()
            .await
            .lookup(key)
            .cloned()
            .ok_or_else(|| StoreError::NotFound {
                category: key.category,
                id: key.id.clone(),
            })
    }

    pub async fn scheduled_on(&self, date: NaiveDate, site: Option<&str>) -> BTreeSet<PersonKey> {
        self.inner.roster.read().await.scheduled_on(date, site)
    }

    pub async fn roster_summary(&self) -> RosterSummary {
        self.inner.roster.read().await.summary()
    }

    pub async fn sites(&self) -> Vec<String> {
        self.inner.roster.read().await.sites()
    }

    pub async fn people(&self) -> Vec<Person> {
        self.inner
            .roster
            .read()
            .await
            .people()
            .into_iter()
            .cloned()
            .collect()
    }

    // -----------------------------------------------------------------------
    // Event log
    // -----------------------------------------------------------------------

    /// Record a sign event for a rostered person.
    ///
    /// A blank site is filled from the person's roster site. The event is
    /// visible to readers as soon as this returns; await the ticket for
    /// durability.
    ///
    /// # Errors
    ///
    /// `InvalidPerson` for people absent from the roster (the log is left
    /// untouched), `NotReady` before recovery finishes, and `Persist` after
    /// shutdown.
    pub async fn append(&self, event: NewSignEvent) -> Result<Appended, StoreError> {
        let roster = self.inner.roster.read().await;
        let key = event.key();
        let Some(person) = roster.lookup(&key) else {
            tracing::warn!(
                category = %key.category,
                id = %key.id,
                "rejected sign event for unknown person"
            );
            return Err(StoreError::InvalidPerson {
                category: key.category,
                id: key.id,
            });
        };
        let mut event = event;
        if event.site.trim().is_empty() {
            event.site.clone_from(&person.site);
        }

        let mut log = self.inner.log.write().await;
        if !log.state.accepts_appends() {
            return Err(StoreError::NotReady { state: log.state });
        }
        let Some(tx) = log.flush_tx.clone() else {
            return Err(StoreError::Persist("event log has been shut down".into()));
        };

        let appended = log.log.append(event);
        let (done, rx) = oneshot::channel();
        self.inner.health.enqueued();
        let job = FlushJob::Append {
            record: SnapshotRecord::from(&appended),
            done,
        };
        if tx.send(job).is_err() {
            self.inner.health.lost(appended.seq, "flusher stopped").await;
        }
        drop(log);
        drop(roster);

        tracing::info!(
            category = %appended.category,
            id = %appended.id,
            action = %appended.action,
            site = %appended.site,
            seq = appended.seq,
            "recorded sign event"
        );
        let ticket = FlushTicket::new(appended.seq, rx);
        Ok(Appended {
            event: appended,
            ticket,
        })
    }

    pub async fn latest_status(&self, key: &PersonKey, date: NaiveDate) -> PresenceStatus {
        self.inner.log.read().await.log.latest_status(key, date)
    }

    /// Up to `limit` events, most recent first.
    pub async fn recent_events(&self, limit: usize) -> Vec<SignEvent> {
        self.inner.log.read().await.log.recent(limit)
    }

    pub async fn events_on(&self, date: NaiveDate) -> Vec<SignEvent> {
        self.inner.log.read().await.log.events_on(date)
    }

    // -----------------------------------------------------------------------
    // Reconciliation and drills
    // -----------------------------------------------------------------------

    pub async fn reconcile(&self, date: NaiveDate, site: Option<&str>) -> Reconciliation {
        let roster = self.inner.roster.read().await;
        let log = self.inner.log.read().await;
        reconcile::reconcile(&roster, &log.log, date, site)
    }

    pub async fn schedule_matrix(&self, date: NaiveDate) -> Vec<ScheduleRow> {
        let roster = self.inner.roster.read().await;
        let log = self.inner.log.read().await;
        reconcile::schedule_matrix(&roster, &log.log, date)
    }

    /// Open a drill session seeded from the current reconciliation.
    pub async fn start_drill(
        &self,
        date: NaiveDate,
        site: Option<&str>,
        meta: DrillMeta,
    ) -> DrillSession {
        let recon = self.reconcile(date, site).await;
        tracing::info!(
            %date,
            location = %meta.location,
            present = recon.present.len(),
            missing = recon.missing.len(),
            "drill started"
        );
        DrillSession::seed(&recon, meta)
    }

    /// Override a person's status in a drill session. Never touches the log.
    ///
    /// # Errors
    ///
    /// Returns `InvalidPerson` if the person is not on the active roster.
    pub async fn set_drill_status(
        &self,
        session: &mut DrillSession,
        key: &PersonKey,
        present: bool,
        reason: Option<String>,
    ) -> Result<(), StoreError> {
        let roster = self.inner.roster.read().await;
        let person = roster.lookup(key).ok_or_else(|| StoreError::InvalidPerson {
            category: key.category,
            id: key.id.clone(),
        })?;
        session.set_status(person, present, reason);
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Durability, settings, lifecycle
    // -----------------------------------------------------------------------

    pub async fn health(&self) -> HealthReport {
        let (state, events) = {
            let log = self.inner.log.read().await;
            (log.state, log.log.len())
        };
        let flush = self.inner.health.snapshot().await;
        let state = if state == RecoveryState::Ready && flush.pending > 0 {
            RecoveryState::Flushing
        } else {
            state
        };
        HealthReport {
            state,
            events,
            last_flushed_seq: flush.last_flushed_seq,
            pending_flushes: flush.pending,
            flush_failures: flush.failures,
            last_flush_error: flush.last_error,
        }
    }

    pub async fn settings(&self) -> Settings {
        self.inner.settings.read().await.clone()
    }

    /// Apply `change` to a copy of the settings, persist it, then publish it.
    ///
    /// # Errors
    ///
    /// `MalformedInput` for a zero timeout, `Persist` if the file cannot be
    /// written. In both cases the previous settings stay active.
    pub async fn update_settings(
        &self,
        change: impl FnOnce(&mut Settings),
    ) -> Result<Settings, StoreError> {
        let mut current = self.inner.settings.write().await;
        let mut next = current.clone();
        change(&mut next);
        let next = next.normalized();
        if next.timeout_seconds == 0 {
            return Err(StoreError::MalformedInput(
                "timeout_seconds must be at least 1".into(),
            ));
        }
        self.inner.settings_store.save(&next).inspect_err(|e| {
            tracing::warn!(error = %e, "settings not saved");
        })?;
        current.clone_from(&next);
        tracing::info!(
            webhook_configured = next.webhook_configured(),
            timeout_seconds = next.timeout_seconds,
            retention_days = next.retention_days,
            "settings updated"
        );
        Ok(next)
    }

    /// Copy the live snapshot into the archive and prune old copies.
    ///
    /// Appends wait while the copy is taken so the archive is a complete
    /// prefix of the log.
    ///
    /// # Errors
    ///
    /// `InvalidState` for in-memory services, `Io` for filesystem failures.
    pub async fn archive(&self) -> Result<ArchiveReport, StoreError> {
        let Some(runtime) = &self.inner.runtime else {
            return Err(StoreError::InvalidState(
                "in-memory service has no snapshot to archive".into(),
            ));
        };
        let retention_days = self.inner.settings.read().await.retention_days;

        let log = self.inner.log.read().await;
        if let Some(tx) = &log.flush_tx {
            barrier(tx).await;
        }
        let report = archive_snapshot(
            &runtime.events(),
            &runtime.archive_dir(),
            Utc::now(),
            retention_days,
        )?;
        drop(log);

        tracing::info!(
            archived_to = %report.archived_to,
            pruned = report.pruned.len(),
            "snapshot archived"
        );
        Ok(report)
    }

    /// Wait until every event appended so far has been handled by the flusher.
    pub async fn sync(&self) {
        let tx = self.inner.log.read().await.flush_tx.clone();
        if let Some(tx) = tx {
            barrier(&tx).await;
        }
    }

    /// Stop accepting appends, drain the flusher, and wait for it to exit.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Persist` if the flusher task panicked.
    pub async fn shutdown(&self) -> Result<(), StoreError> {
        self.inner.log.write().await.flush_tx.take();
        let handle = self.inner.flusher.lock().await.take();
        if let Some(handle) = handle {
            handle
                .await
                .map_err(|e| StoreError::Persist(format!("flusher task failed: {e}")))?;
        }
        tracing::debug!("attendance service shut down");
        Ok(())
    }
}

async fn barrier(tx: &mpsc::UnboundedSender<FlushJob>) {
    let (done, rx) = oneshot::channel();
    if tx.send(FlushJob::Barrier(done)).is_ok() {
        // A closed flusher has nothing left to drain.
        let _ = rx.await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::helpers::{date, sample_records, sign};
    use muster_core::enums::SignAction;
    use pretty_assertions::assert_eq;

    async fn loaded() -> AttendanceService {
        let service = AttendanceService::in_memory();
        let (people, schedule) = sample_records();
        service.replace_roster(people, schedule).await.unwrap();
        service
    }

    #[tokio::test]
    async fn append_rejects_unknown_person_without_side_effects() {
        let service = loaded().await;
        let err = service
            .append(sign(
                &PersonKey::staff("NOPE"),
                SignAction::SignIn,
                "Main",
                "2025-11-01T08:00:00Z",
            ))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::InvalidPerson { .. }));
        assert!(service.recent_events(10).await.is_empty());
    }

    #[tokio::test]
    async fn blank_site_defaults_to_roster_site() {
        let service = loaded().await;
        let appended = service
            .append(sign(
                &PersonKey::staff("STF002"),
                SignAction::SignIn,
                " ",
                "2025-11-01T08:00:00Z",
            ))
            .await
            .unwrap();
        assert_eq!(appended.event.site, "East");
        appended.durable().await.unwrap();
    }

    #[tokio::test]
    async fn failed_replacement_keeps_previous_roster() {
        let service = loaded().await;
        let (mut people, schedule) = sample_records();
        people.push(people[0].clone());
        assert!(service.replace_roster(people, schedule).await.is_err());
        assert_eq!(service.roster_summary().await.staff, 2);
        assert!(service.lookup(&PersonKey::staff("STF001")).await.is_ok());
        assert!(matches!(
            service.lookup(&PersonKey::staff("STF404")).await,
            Err(StoreError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn zero_timeout_is_rejected() {
        let service = loaded().await;
        let err = service
            .update_settings(|s| s.timeout_seconds = 0)
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::MalformedInput(_)));
        assert_eq!(service.settings().await.timeout_seconds, 10);
    }

    #[tokio::test]
    async fn in_memory_service_cannot_archive() {
        let service = loaded().await;
        assert!(matches!(
            service.archive().await,
            Err(StoreError::InvalidState(_))
        ));
    }

    #[tokio::test]
    async fn appends_fail_after_shutdown() {
        let service = loaded().await;
        service.shutdown().await.unwrap();
        let err = service
            .append(sign(
                &PersonKey::staff("STF001"),
                SignAction::SignIn,
                "Main",
                "2025-11-01T08:00:00Z",
            ))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Persist(_)));
        assert_eq!(
            service.latest_status(&PersonKey::staff("STF001"), date("2025-11-01")).await,
            PresenceStatus::NoEvent
        );
    }
}
