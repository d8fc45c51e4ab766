//! Background durability task.
//!
//! Appends are acknowledged in memory first. The service enqueues one job per
//! appended event while still holding the log write lock, so jobs arrive in
//! sequence order and the file order matches `seq`. A single blocking task
//! drains the queue and writes each record.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{DateTime, FixedOffset, Utc};
use muster_core::responses::FlushFailure;
use muster_core::snapshot::SnapshotRecord;
use tokio::sync::{Mutex, mpsc, oneshot};
use tokio::task::JoinHandle;

use crate::error::StoreError;
use crate::snapshot::writer::SnapshotWriter;

pub(crate) enum FlushJob {
    Append {
        record: SnapshotRecord,
        done: oneshot::Sender<Result<(), String>>,
    },
    /// Resolves once every job queued before it has been handled.
    Barrier(oneshot::Sender<()>),
}

#[derive(Debug, Default)]
struct FlushStats {
    last_flushed_seq: Option<u64>,
    failures: u64,
    last_error: Option<FlushFailure>,
}

/// Flush outcomes shared between the flusher task and `Health()` readers.
#[derive(Debug, Default)]
pub(crate) struct FlushHealth {
    pending: AtomicU64,
    stats: Mutex<FlushStats>,
}

/// Point-in-time copy of [`FlushHealth`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct FlushSnapshot {
    pub pending: u64,
    pub last_flushed_seq: Option<u64>,
    pub failures: u64,
    pub last_error: Option<FlushFailure>,
}

impl FlushHealth {
    pub(crate) fn enqueued(&self) {
        self.pending.fetch_add(1, Ordering::SeqCst);
    }

    pub(crate) async fn snapshot(&self) -> FlushSnapshot {
        let stats = self.stats.lock().await;
        FlushSnapshot {
            pending: self.pending.load(Ordering::SeqCst),
            last_flushed_seq: stats.last_flushed_seq,
            failures: stats.failures,
            last_error: stats.last_error.clone(),
        }
    }

    /// Account for a job that never reached the flusher.
    pub(crate) async fn lost(&self, seq: u64, reason: &str) {
        let mut stats = self.stats.lock().await;
        stats.failures += 1;
        stats.last_error = Some(FlushFailure {
            seq,
            error: reason.to_string(),
            at: Utc::now().fixed_offset(),
        });
        drop(stats);
        self.pending.fetch_sub(1, Ordering::SeqCst);
        tracing::warn!(seq, reason, "snapshot write lost");
    }

    fn record(&self, seq: u64, outcome: &Result<(), StoreError>, at: DateTime<FixedOffset>) {
        let mut stats = self.stats.blocking_lock();
        match outcome {
            Ok(()) => {
                stats.last_flushed_seq = Some(stats.last_flushed_seq.map_or(seq, |s| s.max(seq)));
            }
            Err(e) => {
                stats.failures += 1;
                stats.last_error = Some(FlushFailure {
                    seq,
                    error: e.to_string(),
                    at,
                });
            }
        }
        drop(stats);
        self.pending.fetch_sub(1, Ordering::SeqCst);
    }
}

/// Durability acknowledgement for one appended event.
///
/// Dropping the ticket is fine; the write still happens.
#[derive(Debug)]
pub struct FlushTicket {
    seq: u64,
    done: oneshot::Receiver<Result<(), String>>,
}

impl FlushTicket {
    pub(crate) const fn new(seq: u64, done: oneshot::Receiver<Result<(), String>>) -> Self {
        Self { seq, done }
    }

    #[must_use]
    pub const fn seq(&self) -> u64 {
        self.seq
    }

    /// Wait until the event is on disk.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Persist` if the write failed or the flusher has
    /// stopped.
    pub async fn wait(self) -> Result<(), StoreError> {
        match self.done.await {
            Ok(Ok(())) => Ok(()),
            Ok(Err(reason)) => Err(StoreError::Persist(reason)),
            Err(_) => Err(StoreError::Persist(format!(
                "flusher stopped before sequence {} was written",
                self.seq
            ))),
        }
    }
}

/// Start the flusher on the blocking pool.
pub(crate) fn spawn(
    mut writer: SnapshotWriter,
    health: Arc<FlushHealth>,
) -> (mpsc::UnboundedSender<FlushJob>, JoinHandle<()>) {
    let (tx, mut rx) = mpsc::unbounded_channel::<FlushJob>();
    let handle = tokio::task::spawn_blocking(move || {
        while let Some(job) = rx.blocking_recv() {
            match job {
                FlushJob::Append { record, done } => {
                    let seq = record.seq;
                    let outcome = writer.append(&record);
                    if let Err(e) = &outcome {
                        tracing::warn!(seq, error = %e, "snapshot flush failed");
                    }
                    health.record(seq, &outcome, Utc::now().fixed_offset());
                    // The caller may have dropped its ticket.
                    let _ = done.send(outcome.map_err(|e| e.to_string()));
                }
                FlushJob::Barrier(done) => {
                    let _ = done.send(());
                }
            }
        }
        tracing::debug!("snapshot flusher stopped");
    });
    (tx, handle)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::helpers::sign;
    use muster_core::enums::SignAction;
    use muster_core::keys::PersonKey;
    use pretty_assertions::assert_eq;

    fn record(seq: u64) -> SnapshotRecord {
        let event = sign(
            &PersonKey::staff("STF001"),
            SignAction::SignIn,
            "Main",
            "2025-11-01T08:05:00Z",
        )
        .with_seq(seq);
        SnapshotRecord::from(&event)
    }

    fn submit(
        tx: &mpsc::UnboundedSender<FlushJob>,
        health: &FlushHealth,
        seq: u64,
    ) -> FlushTicket {
        let (done, rx) = oneshot::channel();
        health.enqueued();
        tx.send(FlushJob::Append {
            record: record(seq),
            done,
        })
        .unwrap();
        FlushTicket::new(seq, rx)
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn writes_in_order_and_tracks_progress() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("events.jsonl");
        let health = Arc::new(FlushHealth::default());
        let (tx, handle) = spawn(SnapshotWriter::new(path.clone()).unwrap(), health.clone());

        let first = submit(&tx, &health, 1);
        let second = submit(&tx, &health, 2);
        first.wait().await.unwrap();
        second.wait().await.unwrap();

        let snap = health.snapshot().await;
        assert_eq!(snap.pending, 0);
        assert_eq!(snap.last_flushed_seq, Some(2));
        assert_eq!(snap.failures, 0);

        drop(tx);
        handle.await.unwrap();
        let records: Vec<SnapshotRecord> = serde_jsonlines::json_lines(&path)
            .unwrap()
            .collect::<Result<_, _>>()
            .unwrap();
        let seqs: Vec<u64> = records.iter().map(|r| r.seq).collect();
        assert_eq!(seqs, vec![1, 2]);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn failures_reach_ticket_and_health() {
        let dir = tempfile::TempDir::new().unwrap();
        // A directory where the file should be makes every append fail.
        let path = dir.path().join("events.jsonl");
        std::fs::create_dir_all(&path).unwrap();
        let health = Arc::new(FlushHealth::default());
        let (tx, _handle) = spawn(SnapshotWriter::new(path).unwrap(), health.clone());

        let err = submit(&tx, &health, 7).wait().await.unwrap_err();
        assert!(matches!(err, StoreError::Persist(_)));

        let snap = health.snapshot().await;
        assert_eq!(snap.failures, 1);
        assert_eq!(snap.last_error.unwrap().seq, 7);
        assert_eq!(snap.last_flushed_seq, None);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn ticket_reports_stopped_flusher() {
        let (done, rx) = oneshot::channel::<Result<(), String>>();
        drop(done);
        let err = FlushTicket::new(3, rx).wait().await.unwrap_err();
        assert!(err.to_string().contains("sequence 3"));
    }
}
