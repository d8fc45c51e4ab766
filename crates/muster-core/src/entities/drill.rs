use chrono::NaiveDateTime;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::enums::Category;

/// Standard absence reasons offered to the administrator during a drill.
pub const DRILL_ABSENCE_REASONS: [&str; 4] = [
    "Sick/Called off",
    "Staffed remotely",
    "Transport delay",
    "Other",
];

/// When and where a drill took place.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct DrillMeta {
    pub drill_at: NaiveDateTime,
    pub location: String,
}

/// One flat row of a fire-drill export.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct DrillExportRecord {
    pub category: Category,
    pub id: String,
    pub name: String,
    pub site: String,
    pub present: bool,
    pub reason: Option<String>,
}
