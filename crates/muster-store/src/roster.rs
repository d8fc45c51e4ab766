//! Entity store: the active roster generation.
//!
//! A `Roster` is built once from a complete record set and never mutated.
//! Replacement swaps the whole value under the service's write lock, so a
//! reader sees either the old generation or the new one.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use chrono::NaiveDate;
use muster_core::entities::{Person, ScheduleEntry};
use muster_core::enums::Category;
use muster_core::keys::PersonKey;
use muster_core::responses::RosterSummary;

use crate::error::StoreError;

#[derive(Debug, Default)]
pub struct Roster {
    people: HashMap<PersonKey, Person>,
    by_date: HashMap<NaiveDate, Vec<ScheduleEntry>>,
    schedule_entries: usize,
}

impl Roster {
    /// Validate and index a full record set.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::MalformedInput` for blank ids or names, duplicate
    /// `(category, id)` pairs, or schedule entries naming an unknown person.
    pub fn build(people: Vec<Person>, schedule: Vec<ScheduleEntry>) -> Result<Self, StoreError> {
        let mut by_key = HashMap::with_capacity(people.len());
        for person in people {
            if person.id.trim().is_empty() {
                return Err(StoreError::MalformedInput(format!(
                    "{} record with an empty id",
                    person.category
                )));
            }
            if person.name.trim().is_empty() {
                return Err(StoreError::MalformedInput(format!(
                    "{} has an empty name",
                    person.key()
                )));
            }
            let key = person.key();
            if by_key.insert(key.clone(), person).is_some() {
                return Err(StoreError::MalformedInput(format!("duplicate person {key}")));
            }
        }

        let schedule_entries = schedule.len();
        let mut by_date: HashMap<NaiveDate, Vec<ScheduleEntry>> = HashMap::new();
        for entry in schedule {
            let key = entry.key();
            if !by_key.contains_key(&key) {
                return Err(StoreError::MalformedInput(format!(
                    "schedule entry on {} references unknown {key}",
                    entry.date
                )));
            }
            by_date.entry(entry.date).or_default().push(entry);
        }

        Ok(Self {
            people: by_key,
            by_date,
            schedule_entries,
        })
    }

    #[must_use]
    pub fn lookup(&self, key: &PersonKey) -> Option<&Person> {
        self.people.get(key)
    }

    #[must_use]
    pub fn contains(&self, key: &PersonKey) -> bool {
        self.people.contains_key(key)
    }

    /// Schedule entries for one day, in load order.
    #[must_use]
    pub fn entries_on(&self, date: NaiveDate) -> &[ScheduleEntry] {
        self.by_date
            .get(&date)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// People with at least one entry on `date` (and at `site`, when given).
    #[must_use]
    pub fn scheduled_on(&self, date: NaiveDate, site: Option<&str>) -> BTreeSet<PersonKey> {
        self.entries_on(date)
            .iter()
            .filter(|entry| entry.matches_site(site))
            .map(ScheduleEntry::key)
            .collect()
    }

    /// Like [`Self::scheduled_on`], keeping the matching sites for each person.
    #[must_use]
    pub fn scheduled_sites_on(
        &self,
        date: NaiveDate,
        site: Option<&str>,
    ) -> BTreeMap<PersonKey, BTreeSet<String>> {
        let mut scheduled: BTreeMap<PersonKey, BTreeSet<String>> = BTreeMap::new();
        for entry in self.entries_on(date) {
            if entry.matches_site(site) {
                scheduled
                    .entry(entry.key())
                    .or_default()
                    .insert(entry.site.clone());
            }
        }
        scheduled
    }

    /// Distinct, sorted site names mentioned by people and schedule entries.
    #[must_use]
    pub fn sites(&self) -> Vec<String> {
        let sites: BTreeSet<&str> = self
            .people
            .values()
            .map(|person| person.site.as_str())
            .chain(
                self.by_date
                    .values()
                    .flatten()
                    .map(|entry| entry.site.as_str()),
            )
            .filter(|site| !site.trim().is_empty())
            .collect();
        sites.into_iter().map(str::to_string).collect()
    }

    /// All people, staff first, then by name and id.
    #[must_use]
    pub fn people(&self) -> Vec<&Person> {
        let mut people: Vec<&Person> = self.people.values().collect();
        people.sort_by(|a, b| {
            (a.category, &a.name, &a.id).cmp(&(b.category, &b.name, &b.id))
        });
        people
    }

    #[must_use]
    pub fn summary(&self) -> RosterSummary {
        let staff = self
            .people
            .keys()
            .filter(|key| key.category == Category::Staff)
            .count();
        RosterSummary {
            staff,
            clients: self.people.len() - staff,
            schedule_entries: self.schedule_entries,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::helpers::{client, date, shift, staff};

    #[test]
    fn scheduled_on_filters_by_date_and_site() {
        let roster = Roster::build(
            vec![staff("STF001", "Jane Smith", "Main"), client("CLI001", "Ann Lee", "East")],
            vec![
                shift(Category::Staff, "STF001", "2025-11-01", "Main"),
                shift(Category::Staff, "STF001", "2025-11-01", "East"),
                shift(Category::Client, "CLI001", "2025-11-01", "East"),
                shift(Category::Client, "CLI001", "2025-11-02", "East"),
            ],
        )
        .unwrap();

        let all = roster.scheduled_on(date("2025-11-01"), None);
        assert_eq!(all.len(), 2);

        let main = roster.scheduled_on(date("2025-11-01"), Some("Main"));
        assert_eq!(main.into_iter().collect::<Vec<_>>(), vec![PersonKey::staff("STF001")]);

        let sites = roster.scheduled_sites_on(date("2025-11-01"), None);
        assert_eq!(sites[&PersonKey::staff("STF001")].len(), 2);

        assert!(roster.scheduled_on(date("2025-11-03"), None).is_empty());
    }

    #[test]
    fn split_shifts_count_once() {
        let roster = Roster::build(
            vec![staff("STF001", "Jane Smith", "Main")],
            vec![
                shift(Category::Staff, "STF001", "2025-11-01", "Main"),
                shift(Category::Staff, "STF001", "2025-11-01", "Main"),
            ],
        )
        .unwrap();
        assert_eq!(roster.scheduled_on(date("2025-11-01"), None).len(), 1);
        assert_eq!(roster.summary().schedule_entries, 2);
    }

    #[test]
    fn identical_ids_across_categories_coexist() {
        let roster = Roster::build(
            vec![staff("7", "Sam Staff", "Main"), client("7", "Cal Client", "Main")],
            Vec::new(),
        )
        .unwrap();
        assert_eq!(roster.lookup(&PersonKey::staff("7")).unwrap().name, "Sam Staff");
        assert_eq!(roster.lookup(&PersonKey::client("7")).unwrap().name, "Cal Client");
        assert_eq!(
            roster.summary(),
            RosterSummary {
                staff: 1,
                clients: 1,
                schedule_entries: 0
            }
        );
    }

    #[test]
    fn rejects_duplicate_people() {
        let err = Roster::build(
            vec![staff("STF001", "Jane Smith", "Main"), staff("STF001", "Jane Doe", "Main")],
            Vec::new(),
        )
        .unwrap_err();
        assert!(matches!(err, StoreError::MalformedInput(_)));
    }

    #[test]
    fn rejects_schedule_for_unknown_person() {
        let err = Roster::build(
            vec![staff("STF001", "Jane Smith", "Main")],
            vec![shift(Category::Client, "STF001", "2025-11-01", "Main")],
        )
        .unwrap_err();
        assert!(err.to_string().contains("client:STF001"));
    }

    #[test]
    fn sites_are_distinct_and_sorted() {
        let roster = Roster::build(
            vec![staff("STF001", "Jane Smith", "Main"), client("CLI001", "Ann Lee", "East")],
            vec![shift(Category::Staff, "STF001", "2025-11-01", "North")],
        )
        .unwrap();
        assert_eq!(roster.sites(), vec!["East", "Main", "North"]);
    }
}
