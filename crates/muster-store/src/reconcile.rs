//! Present/missing partition of a day's schedule.
//!
//! Both functions are pure over a borrowed roster and log; the service holds
//! the read locks (roster, then log) for the duration of the call.

use chrono::NaiveDate;
use muster_core::entities::Person;
use muster_core::enums::{AttendanceMark, PresenceStatus, SignAction};
use muster_core::responses::{MissingPerson, PresentPerson, Reconciliation, ScheduleRow};

use crate::event_log::EventLog;
use crate::roster::Roster;

/// Partition everyone scheduled on `date` (and at `site`, when given).
///
/// Unfiltered, a person is present when their latest action that day is a
/// sign-in anywhere. With a site filter the standing sign-in must also have
/// been recorded at that site.
#[must_use]
pub fn reconcile(
    roster: &Roster,
    log: &EventLog,
    date: NaiveDate,
    site: Option<&str>,
) -> Reconciliation {
    let mut present = Vec::new();
    let mut missing = Vec::new();

    for (key, sites) in roster.scheduled_sites_on(date, site) {
        // Schedule entries are validated against the roster at load time.
        let Some(person) = roster.lookup(&key) else {
            continue;
        };
        let latest = log.latest_event(&key, date);

        match latest {
            Some(event)
                if event.action == SignAction::SignIn
                    && site.is_none_or(|wanted| event.site == wanted) =>
            {
                present.push(PresentPerson {
                    person: person.clone(),
                    signed_in_at: event.timestamp,
                    signed_in_site: event.site.clone(),
                });
            }
            _ => missing.push(MissingPerson {
                person: person.clone(),
                scheduled_sites: sites.into_iter().collect(),
                last_status: latest.map_or(PresenceStatus::NoEvent, |event| event.action.into()),
            }),
        }
    }

    present.sort_by(|a, b| person_order(&a.person, &b.person));
    missing.sort_by(|a, b| person_order(&a.person, &b.person));

    Reconciliation {
        date,
        site: site.map(str::to_string),
        present,
        missing,
    }
}

/// One row per schedule entry on `date`, marked with the person's day status.
///
/// Rows follow reconciliation order, then shift start time.
#[must_use]
pub fn schedule_matrix(roster: &Roster, log: &EventLog, date: NaiveDate) -> Vec<ScheduleRow> {
    let mut rows: Vec<(&Person, ScheduleRow)> = roster
        .entries_on(date)
        .iter()
        .filter_map(|entry| {
            let key = entry.key();
            let person = roster.lookup(&key)?;
            let latest = log.latest_event(&key, date);
            let status: PresenceStatus =
                latest.map_or(PresenceStatus::NoEvent, |event| event.action.into());
            let (status, sign_time) = if status.is_present() {
                (AttendanceMark::Present, latest.map(|event| event.timestamp))
            } else {
                (AttendanceMark::Absent, None)
            };
            Some((
                person,
                ScheduleRow {
                    category: entry.category,
                    id: entry.id.clone(),
                    name: person.name.clone(),
                    start_time: entry.start_time,
                    end_time: entry.end_time,
                    site: entry.site.clone(),
                    status,
                    sign_time,
                },
            ))
        })
        .collect();

    rows.sort_by(|(pa, a), (pb, b)| {
        person_order(pa, pb).then_with(|| a.start_time.cmp(&b.start_time))
    });
    rows.into_iter().map(|(_, row)| row).collect()
}

fn person_order(a: &Person, b: &Person) -> std::cmp::Ordering {
    (a.category, &a.name, &a.id).cmp(&(b.category, &b.name, &b.id))
}
