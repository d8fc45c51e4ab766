//! JsonSchema validation for the types that cross a persistence boundary.

use chrono::{DateTime, NaiveDate};
use muster_core::entities::{Person, Settings, SignEvent};
use muster_core::enums::{Category, PresenceStatus, SignAction};
use muster_core::responses::{MissingPerson, PresentPerson, Reconciliation};
use muster_core::snapshot::SnapshotRecord;
use pretty_assertions::assert_eq;
use schemars::schema_for;

/// Validate a JSON value against a schemars-generated schema.
fn validate_against_schema(
    schema: &serde_json::Value,
    instance: &serde_json::Value,
) -> Vec<String> {
    let validator = jsonschema::validator_for(schema).expect("schema should be valid");
    validator
        .iter_errors(instance)
        .map(|e| format!("{e}"))
        .collect()
}

fn person(category: Category, id: &str, name: &str) -> Person {
    Person {
        id: id.into(),
        name: name.into(),
        category,
        site: "Main".into(),
        contact_name: "Pat".into(),
        contact_phone: "555-0101".into(),
        email: String::new(),
        phone: String::new(),
    }
}

#[test]
fn snapshot_record_matches_schema() {
    let event = SignEvent {
        seq: 1,
        category: Category::Staff,
        id: "STF001".into(),
        action: SignAction::SignIn,
        site: "Main".into(),
        timestamp: DateTime::parse_from_rfc3339("2025-11-01T08:05:00Z").unwrap(),
        recorded_by: None,
    };
    let schema = serde_json::to_value(schema_for!(SnapshotRecord)).unwrap();
    let instance = serde_json::to_value(SnapshotRecord::from(&event)).unwrap();
    let errors = validate_against_schema(&schema, &instance);
    assert!(errors.is_empty(), "snapshot record invalid: {errors:?}");
}

#[test]
fn snapshot_schema_rejects_unknown_action() {
    let schema = serde_json::to_value(schema_for!(SnapshotRecord)).unwrap();
    let instance = serde_json::json!({
        "v": 1,
        "seq": 1,
        "category": "staff",
        "id": "STF001",
        "action": "wave",
        "site": "Main",
        "timestamp": "2025-11-01T08:05:00Z",
    });
    assert!(!validate_against_schema(&schema, &instance).is_empty());
}

#[test]
fn settings_match_schema() {
    let schema = serde_json::to_value(schema_for!(Settings)).unwrap();
    let instance = serde_json::to_value(Settings::default()).unwrap();
    assert_eq!(validate_against_schema(&schema, &instance), Vec::<String>::new());
}

#[test]
fn reconciliation_matches_schema_and_roundtrips() {
    let recon = Reconciliation {
        date: NaiveDate::from_ymd_opt(2025, 11, 1).unwrap(),
        site: Some("Main".into()),
        present: vec![PresentPerson {
            person: person(Category::Staff, "STF001", "Jane Smith"),
            signed_in_at: DateTime::parse_from_rfc3339("2025-11-01T08:05:00Z").unwrap(),
            signed_in_site: "Main".into(),
        }],
        missing: vec![MissingPerson {
            person: person(Category::Client, "CLI001", "Ann Lee"),
            scheduled_sites: vec!["Main".into()],
            last_status: PresenceStatus::NoEvent,
        }],
    };

    let schema = serde_json::to_value(schema_for!(Reconciliation)).unwrap();
    let instance = serde_json::to_value(&recon).unwrap();
    let errors = validate_against_schema(&schema, &instance);
    assert!(errors.is_empty(), "reconciliation invalid: {errors:?}");

    let recovered: Reconciliation = serde_json::from_value(instance).unwrap();
    assert_eq!(recovered, recon);
    assert_eq!(recovered.scheduled_count(), 2);
    assert!(!recovered.all_accounted_for());
}
