use chrono::{DateTime, Duration, FixedOffset, NaiveDate, NaiveTime};
use proptest::prelude::*;

use muster_core::entities::{NewSignEvent, Person, ScheduleEntry};
use muster_core::enums::{Category, SignAction};
use muster_store::event_log::EventLog;
use muster_store::reconcile::reconcile;
use muster_store::roster::Roster;

const PEOPLE: usize = 6;
const SITES: [&str; 2] = ["Main", "East"];

fn day() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 11, 1).unwrap()
}

fn category(idx: usize) -> Category {
    if idx % 2 == 0 {
        Category::Staff
    } else {
        Category::Client
    }
}

/// Six people; everyone but the last is scheduled, alternating sites.
fn roster() -> Roster {
    let people = (0..PEOPLE)
        .map(|idx| Person {
            id: format!("P{idx}"),
            name: format!("Person {idx}"),
            category: category(idx),
            site: SITES[idx % 2].into(),
            contact_name: String::new(),
            contact_phone: String::new(),
            email: String::new(),
            phone: String::new(),
        })
        .collect();
    let schedule = (0..PEOPLE - 1)
        .map(|idx| ScheduleEntry {
            category: category(idx),
            id: format!("P{idx}"),
            date: day(),
            start_time: NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
            end_time: NaiveTime::from_hms_opt(17, 0, 0).unwrap(),
            site: SITES[idx % 2].into(),
        })
        .collect();
    Roster::build(people, schedule).unwrap()
}

fn event(person: usize, sign_in: bool, site: usize, minute: usize) -> NewSignEvent {
    let base: DateTime<FixedOffset> = DateTime::parse_from_rfc3339("2025-11-01T06:00:00Z").unwrap();
    NewSignEvent {
        category: category(person),
        id: format!("P{person}"),
        action: if sign_in {
            SignAction::SignIn
        } else {
            SignAction::SignOut
        },
        site: SITES[site].into(),
        timestamp: base + Duration::minutes(i64::try_from(minute).unwrap()),
        recorded_by: None,
    }
}

/// Events with distinct minutes, so arrival order never decides a tie.
fn events() -> impl Strategy<Value = Vec<NewSignEvent>> {
    prop::collection::vec((0..PEOPLE, any::<bool>(), 0..SITES.len()), 0..40).prop_flat_map(
        |raw| {
            let minutes: Vec<usize> = (0..raw.len()).collect();
            Just(minutes).prop_shuffle().prop_map(move |minutes| {
                raw.iter()
                    .zip(minutes)
                    .map(|(&(person, sign_in, site), minute)| event(person, sign_in, site, minute))
                    .collect()
            })
        },
    )
}

proptest! {
    #[test]
    fn every_scheduled_person_lands_in_exactly_one_list(
        events in events(),
        filter in prop::option::of(0..SITES.len()),
    ) {
        let roster = roster();
        let mut log = EventLog::new();
        for event in events {
            log.append(event);
        }
        let site = filter.map(|idx| SITES[idx]);
        let recon = reconcile(&roster, &log, day(), site);

        let mut seen: Vec<String> = recon
            .present
            .iter()
            .map(|p| p.person.key().to_string())
            .chain(recon.missing.iter().map(|m| m.person.key().to_string()))
            .collect();
        let total = seen.len();
        seen.sort();
        seen.dedup();
        prop_assert_eq!(seen.len(), total);

        let mut scheduled: Vec<String> = roster
            .scheduled_on(day(), site)
            .iter()
            .map(ToString::to_string)
            .collect();
        scheduled.sort();
        prop_assert_eq!(seen, scheduled);
    }

    #[test]
    fn arrival_order_does_not_change_statuses(events in events()) {
        let mut forward = EventLog::new();
        for event in events.iter().cloned() {
            forward.append(event);
        }
        let mut backward = EventLog::new();
        for event in events.into_iter().rev() {
            backward.append(event);
        }
        prop_assert_eq!(forward.latest_statuses(), backward.latest_statuses());

        let roster = roster();
        prop_assert_eq!(
            reconcile(&roster, &forward, day(), None),
            reconcile(&roster, &backward, day(), None)
        );
    }

    #[test]
    fn replay_reproduces_the_log(events in events()) {
        let mut log = EventLog::new();
        for event in events {
            log.append(event);
        }
        let replayed = EventLog::replay(log.events().to_vec()).unwrap();
        prop_assert_eq!(replayed.latest_statuses(), log.latest_statuses());
        prop_assert_eq!(replayed.next_seq(), log.next_seq());
    }
}
