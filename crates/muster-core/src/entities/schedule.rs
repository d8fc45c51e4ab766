use chrono::{NaiveDate, NaiveTime};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::enums::Category;
use crate::keys::PersonKey;

/// One expected shift for a person on a given day.
///
/// Several entries may exist for the same person and day (split shifts).
/// Shift geometry is never validated; only the presence of a match matters.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct ScheduleEntry {
    pub category: Category,
    pub id: String,
    pub date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub site: String,
}

impl ScheduleEntry {
    #[must_use]
    pub fn key(&self) -> PersonKey {
        PersonKey::new(self.category, self.id.clone())
    }

    /// Whether this entry matches an optional site filter.
    #[must_use]
    pub fn matches_site(&self, site: Option<&str>) -> bool {
        site.is_none_or(|wanted| self.site == wanted)
    }
}
