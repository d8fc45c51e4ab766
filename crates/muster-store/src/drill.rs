//! Fire-drill accountability sessions.
//!
//! A session is a private overlay seeded from one reconciliation. Edits only
//! touch the session; the event log and later reconciliations never see them.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use muster_core::entities::{DrillExportRecord, DrillMeta, Person};
use muster_core::keys::PersonKey;
use muster_core::responses::Reconciliation;

#[derive(Debug, Clone, PartialEq, Eq)]
struct DrillEntry {
    person: Person,
    site: String,
    present: bool,
    reason: Option<String>,
}

#[derive(Debug, Clone)]
pub struct DrillSession {
    meta: DrillMeta,
    date: NaiveDate,
    site: Option<String>,
    entries: BTreeMap<PersonKey, DrillEntry>,
    exported: bool,
}

impl DrillSession {
    /// Seed a session: present people start accounted for, missing people
    /// start absent with no reason.
    #[must_use]
    pub fn seed(recon: &Reconciliation, meta: DrillMeta) -> Self {
        let mut entries = BTreeMap::new();
        for present in &recon.present {
            entries.insert(
                present.person.key(),
                DrillEntry {
                    person: present.person.clone(),
                    site: present.signed_in_site.clone(),
                    present: true,
                    reason: None,
                },
            );
        }
        for missing in &recon.missing {
            let site = missing
                .scheduled_sites
                .first()
                .cloned()
                .unwrap_or_else(|| missing.person.site.clone());
            entries.insert(
                missing.person.key(),
                DrillEntry {
                    person: missing.person.clone(),
                    site,
                    present: false,
                    reason: None,
                },
            );
        }
        Self {
            meta,
            date: recon.date,
            site: recon.site.clone(),
            entries,
            exported: false,
        }
    }

    /// Override one person's drill status.
    ///
    /// People outside the seed are added with their roster site. A reason is
    /// kept only for absences; blank reasons are dropped.
    pub fn set_status(&mut self, person: &Person, present: bool, reason: Option<String>) {
        if self.exported {
            tracing::warn!(
                category = %person.category,
                id = %person.id,
                "drill session edited after export"
            );
        }
        let reason = reason
            .map(|text| text.trim().to_string())
            .filter(|text| !present && !text.is_empty());

        let fallback_site = self.site.clone().unwrap_or_else(|| person.site.clone());
        let entry = self
            .entries
            .entry(person.key())
            .or_insert_with(|| DrillEntry {
                person: person.clone(),
                site: fallback_site,
                present,
                reason: None,
            });
        entry.present = present;
        entry.reason = reason;
    }

    /// Flat records ordered like reconciliation output. Marks the session
    /// exported; later edits are still accepted.
    pub fn export(&mut self) -> Vec<DrillExportRecord> {
        self.exported = true;
        self.records()
    }

    /// Export and close the session.
    #[must_use]
    pub fn finish(mut self) -> Vec<DrillExportRecord> {
        self.export()
    }

    /// Current records without marking the session exported.
    #[must_use]
    pub fn records(&self) -> Vec<DrillExportRecord> {
        let mut entries: Vec<&DrillEntry> = self.entries.values().collect();
        entries.sort_by(|a, b| {
            (a.person.category, &a.person.name, &a.person.id).cmp(&(
                b.person.category,
                &b.person.name,
                &b.person.id,
            ))
        });
        entries
            .into_iter()
            .map(|entry| DrillExportRecord {
                category: entry.person.category,
                id: entry.person.id.clone(),
                name: entry.person.name.clone(),
                site: entry.site.clone(),
                present: entry.present,
                reason: entry.reason.clone(),
            })
            .collect()
    }

    /// Absent people with no recorded reason.
    #[must_use]
    pub fn unexplained_absences(&self) -> Vec<PersonKey> {
        self.entries
            .iter()
            .filter(|(_, entry)| !entry.present && entry.reason.is_none())
            .map(|(key, _)| key.clone())
            .collect()
    }

    #[must_use]
    pub const fn meta(&self) -> &DrillMeta {
        &self.meta
    }

    #[must_use]
    pub const fn date(&self) -> NaiveDate {
        self.date
    }

    #[must_use]
    pub fn site(&self) -> Option<&str> {
        self.site.as_deref()
    }

    #[must_use]
    pub const fn is_exported(&self) -> bool {
        self.exported
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
