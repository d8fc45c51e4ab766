//! Append-only sign event log with a latest-action index.
//!
//! The log never mutates or removes an event. Each append updates an index
//! from `(person, local day)` to the event with the greatest
//! `(timestamp, seq)`, so status lookups never rescan history.

use std::collections::{BTreeMap, HashMap};

use chrono::NaiveDate;
use muster_core::entities::{NewSignEvent, SignEvent};
use muster_core::enums::PresenceStatus;
use muster_core::keys::PersonKey;

/// First sequence number handed out by an empty log.
pub const FIRST_SEQ: u64 = 1;

type DayKey = (PersonKey, NaiveDate);

/// Why a persisted event sequence cannot become a log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ReplayError {
    #[error("duplicate sequence {0}")]
    DuplicateSeq(u64),

    #[error("sequence {0} leaves no room for further appends")]
    SeqExhausted(u64),
}

#[derive(Debug)]
pub struct EventLog {
    events: Vec<SignEvent>,
    latest: HashMap<DayKey, usize>,
    by_date: BTreeMap<NaiveDate, Vec<usize>>,
    next_seq: u64,
}

impl Default for EventLog {
    fn default() -> Self {
        Self {
            events: Vec::new(),
            latest: HashMap::new(),
            by_date: BTreeMap::new(),
            next_seq: FIRST_SEQ,
        }
    }
}

impl EventLog {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild a log from persisted events.
    ///
    /// Events are applied in `seq` order; the next sequence continues after
    /// the highest one seen.
    ///
    /// # Errors
    ///
    /// `DuplicateSeq` if two events share a sequence number, `SeqExhausted`
    /// if a sequence number is `u64::MAX`.
    pub fn replay(mut events: Vec<SignEvent>) -> Result<Self, ReplayError> {
        events.sort_by_key(|event| event.seq);
        let mut log = Self::new();
        for event in events {
            if log.events.last().is_some_and(|last| last.seq == event.seq) {
                return Err(ReplayError::DuplicateSeq(event.seq));
            }
            let after = event
                .seq
                .checked_add(1)
                .ok_or(ReplayError::SeqExhausted(event.seq))?;
            log.next_seq = log.next_seq.max(after);
            log.insert(event);
        }
        Ok(log)
    }

    /// Stamp `event` with the next sequence number and record it.
    ///
    /// Callers validate the person against the roster first; the log itself
    /// is roster-agnostic so replay never depends on the current roster.
    pub fn append(&mut self, event: NewSignEvent) -> SignEvent {
        let seq = self.next_seq;
        self.next_seq = seq.saturating_add(1);
        let event = event.with_seq(seq);
        self.insert(event.clone());
        event
    }

    fn insert(&mut self, event: SignEvent) {
        let idx = self.events.len();
        let date = event.local_date();
        let day_key = (event.key(), date);

        let newer = self
            .latest
            .get(&day_key)
            .is_none_or(|&current| event.order_key() > self.events[current].order_key());
        if newer {
            self.latest.insert(day_key, idx);
        }
        self.by_date.entry(date).or_default().push(idx);
        self.events.push(event);
    }

    /// The event that decides `key`'s status on `date`, if any.
    #[must_use]
    pub fn latest_event(&self, key: &PersonKey, date: NaiveDate) -> Option<&SignEvent> {
        self.latest
            .get(&(key.clone(), date))
            .map(|&idx| &self.events[idx])
    }

    #[must_use]
    pub fn latest_status(&self, key: &PersonKey, date: NaiveDate) -> PresenceStatus {
        self.latest_event(key, date)
            .map_or(PresenceStatus::NoEvent, |event| event.action.into())
    }

    /// Every `(person, day)` status the log currently resolves.
    #[must_use]
    pub fn latest_statuses(&self) -> BTreeMap<(PersonKey, NaiveDate), PresenceStatus> {
        self.latest
            .iter()
            .map(|(key, &idx)| (key.clone(), self.events[idx].action.into()))
            .collect()
    }

    /// Up to `limit` events, most recent `(timestamp, seq)` first.
    #[must_use]
    pub fn recent(&self, limit: usize) -> Vec<SignEvent> {
        let mut ordered: Vec<&SignEvent> = self.events.iter().collect();
        ordered.sort_by_key(|event| std::cmp::Reverse(event.order_key()));
        ordered.into_iter().take(limit).cloned().collect()
    }

    /// Events recorded on one local day, oldest first.
    #[must_use]
    pub fn events_on(&self, date: NaiveDate) -> Vec<SignEvent> {
        let mut day: Vec<&SignEvent> = self
            .by_date
            .get(&date)
            .into_iter()
            .flatten()
            .map(|&idx| &self.events[idx])
            .collect();
        day.sort_by_key(|event| event.order_key());
        day.into_iter().cloned().collect()
    }

    /// All events in append (sequence) order.
    #[must_use]
    pub fn events(&self) -> &[SignEvent] {
        &self.events
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.events.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    #[must_use]
    pub const fn next_seq(&self) -> u64 {
        self.next_seq
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::helpers::{date, sign};
    use muster_core::enums::SignAction;
    use pretty_assertions::assert_eq;

    fn jane() -> PersonKey {
        PersonKey::staff("STF001")
    }

    #[test]
    fn no_events_means_no_event_status() {
        let log = EventLog::new();
        assert_eq!(
            log.latest_status(&jane(), date("2025-11-01")),
            PresenceStatus::NoEvent
        );
    }

    #[test]
    fn sequences_are_monotonic_from_one() {
        let mut log = EventLog::new();
        let a = log.append(sign(&jane(), SignAction::SignIn, "Main", "2025-11-01T08:05:00Z"));
        let b = log.append(sign(&jane(), SignAction::SignOut, "Main", "2025-11-01T17:02:00Z"));
        assert_eq!((a.seq, b.seq), (1, 2));
        assert_eq!(log.next_seq(), 3);
    }

    #[test]
    fn later_timestamp_wins_even_when_appended_first() {
        let mut log = EventLog::new();
        log.append(sign(&jane(), SignAction::SignOut, "Main", "2025-11-01T17:02:00Z"));
        log.append(sign(&jane(), SignAction::SignIn, "Main", "2025-11-01T08:05:00Z"));
        assert_eq!(
            log.latest_status(&jane(), date("2025-11-01")),
            PresenceStatus::SignOut
        );
    }

    #[test]
    fn identical_timestamps_resolve_by_sequence() {
        let mut log = EventLog::new();
        log.append(sign(&jane(), SignAction::SignIn, "Main", "2025-11-01T08:05:00Z"));
        log.append(sign(&jane(), SignAction::SignOut, "Main", "2025-11-01T08:05:00Z"));
        assert_eq!(
            log.latest_status(&jane(), date("2025-11-01")),
            PresenceStatus::SignOut
        );
    }

    #[test]
    fn status_is_scoped_to_the_local_day() {
        let mut log = EventLog::new();
        log.append(sign(&jane(), SignAction::SignIn, "Main", "2025-10-31T22:00:00-05:00"));
        assert_eq!(
            log.latest_status(&jane(), date("2025-10-31")),
            PresenceStatus::SignIn
        );
        assert_eq!(
            log.latest_status(&jane(), date("2025-11-01")),
            PresenceStatus::NoEvent
        );
    }

    #[test]
    fn recent_is_newest_first_and_limited() {
        let mut log = EventLog::new();
        log.append(sign(&jane(), SignAction::SignIn, "Main", "2025-11-01T08:05:00Z"));
        log.append(sign(&jane(), SignAction::SignOut, "Main", "2025-11-01T17:02:00Z"));
        log.append(sign(&jane(), SignAction::SignIn, "Main", "2025-11-01T12:00:00Z"));

        let recent = log.recent(2);
        let seqs: Vec<u64> = recent.iter().map(|event| event.seq).collect();
        assert_eq!(seqs, vec![2, 3]);
        assert!(log.recent(0).is_empty());
    }

    #[test]
    fn events_on_returns_one_day_in_order() {
        let mut log = EventLog::new();
        log.append(sign(&jane(), SignAction::SignOut, "Main", "2025-11-01T17:02:00Z"));
        log.append(sign(&jane(), SignAction::SignIn, "Main", "2025-11-02T08:00:00Z"));
        log.append(sign(&jane(), SignAction::SignIn, "Main", "2025-11-01T08:05:00Z"));

        let day = log.events_on(date("2025-11-01"));
        let seqs: Vec<u64> = day.iter().map(|event| event.seq).collect();
        assert_eq!(seqs, vec![3, 1]);
        assert!(log.events_on(date("2025-11-03")).is_empty());
    }

    #[test]
    fn replay_reproduces_statuses_and_continues_sequence() {
        let mut log = EventLog::new();
        log.append(sign(&jane(), SignAction::SignIn, "Main", "2025-11-01T08:05:00Z"));
        log.append(sign(&jane(), SignAction::SignOut, "Main", "2025-11-01T08:05:00Z"));
        let client = PersonKey::client("CLI001");
        log.append(sign(&client, SignAction::SignIn, "East", "2025-11-01T09:00:00Z"));

        let mut shuffled = log.events().to_vec();
        shuffled.reverse();
        let replayed = EventLog::replay(shuffled).unwrap();

        assert_eq!(replayed.latest_statuses(), log.latest_statuses());
        assert_eq!(replayed.next_seq(), 4);
    }

    #[test]
    fn replay_rejects_duplicate_sequences() {
        let mut log = EventLog::new();
        let event = log.append(sign(&jane(), SignAction::SignIn, "Main", "2025-11-01T08:05:00Z"));
        assert_eq!(
            EventLog::replay(vec![event.clone(), event]).unwrap_err(),
            ReplayError::DuplicateSeq(1)
        );
    }

    #[test]
    fn replay_rejects_a_sequence_with_no_successor() {
        let last = sign(&jane(), SignAction::SignIn, "Main", "2025-11-01T08:05:00Z")
            .with_seq(u64::MAX);
        assert_eq!(
            EventLog::replay(vec![last]).unwrap_err(),
            ReplayError::SeqExhausted(u64::MAX)
        );
    }
}
