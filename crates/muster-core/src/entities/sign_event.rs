use chrono::{DateTime, FixedOffset, NaiveDate};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::enums::{Category, SignAction};
use crate::keys::PersonKey;

/// A sign event as submitted by a caller, before the log assigns its sequence.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct NewSignEvent {
    pub category: Category,
    pub id: String,
    pub action: SignAction,
    pub site: String,
    pub timestamp: DateTime<FixedOffset>,
    pub recorded_by: Option<String>,
}

impl NewSignEvent {
    #[must_use]
    pub fn key(&self) -> PersonKey {
        PersonKey::new(self.category, self.id.clone())
    }

    /// Stamp the event with its log sequence number.
    #[must_use]
    pub fn with_seq(self, seq: u64) -> SignEvent {
        SignEvent {
            seq,
            category: self.category,
            id: self.id,
            action: self.action,
            site: self.site,
            timestamp: self.timestamp,
            recorded_by: self.recorded_by,
        }
    }
}

/// An appended, immutable sign-in or sign-out.
///
/// `timestamp` keeps the offset it was recorded with; the event's calendar day
/// is the local date at that offset. Events are ordered by `(timestamp, seq)`.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct SignEvent {
    pub seq: u64,
    pub category: Category,
    pub id: String,
    pub action: SignAction,
    pub site: String,
    pub timestamp: DateTime<FixedOffset>,
    pub recorded_by: Option<String>,
}

impl SignEvent {
    #[must_use]
    pub fn key(&self) -> PersonKey {
        PersonKey::new(self.category, self.id.clone())
    }

    /// The calendar day at the offset the event was recorded in. Front ends
    /// stamp events in the site's configured offset.
    #[must_use]
    pub fn local_date(&self) -> NaiveDate {
        self.timestamp.date_naive()
    }

    /// Total order used for "most recent action wins".
    #[must_use]
    pub const fn order_key(&self) -> (DateTime<FixedOffset>, u64) {
        (self.timestamp, self.seq)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(ts: &str) -> NewSignEvent {
        NewSignEvent {
            category: Category::Staff,
            id: "STF001".into(),
            action: SignAction::SignIn,
            site: "Main".into(),
            timestamp: DateTime::parse_from_rfc3339(ts).unwrap(),
            recorded_by: None,
        }
    }

    #[test]
    fn local_date_uses_recorded_offset() {
        // 23:30 at -05:00 is already the next day in UTC.
        let event = at("2025-11-01T23:30:00-05:00").with_seq(1);
        assert_eq!(event.local_date(), NaiveDate::from_ymd_opt(2025, 11, 1).unwrap());
    }

    #[test]
    fn order_key_breaks_ties_by_seq() {
        let first = at("2025-11-01T08:05:00Z").with_seq(1);
        let second = at("2025-11-01T08:05:00Z").with_seq(2);
        assert!(second.order_key() > first.order_key());
    }

    #[test]
    fn order_key_compares_instants_across_offsets() {
        let utc = at("2025-11-01T13:00:00Z").with_seq(2);
        let local = at("2025-11-01T09:00:00-05:00").with_seq(1);
        assert!(local.order_key() > utc.order_key());
    }
}
