//! Entity structs for all Muster domain objects.
//!
//! All structs derive `Serialize`, `Deserialize`, and `JsonSchema` for JSON
//! roundtrip and schema validation of persisted records.

mod drill;
mod person;
mod schedule;
mod settings;
mod sign_event;

pub use drill::{DRILL_ABSENCE_REASONS, DrillExportRecord, DrillMeta};
pub use person::Person;
pub use schedule::ScheduleEntry;
pub use settings::Settings;
pub use sign_event::{NewSignEvent, SignEvent};
