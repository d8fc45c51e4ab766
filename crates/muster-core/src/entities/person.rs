use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::enums::Category;
use crate::keys::PersonKey;

/// A staff member or client on the current roster.
///
/// Immutable for the lifetime of a roster generation; a reload replaces the
/// whole set.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct Person {
    pub id: String,
    pub name: String,
    pub category: Category,
    pub site: String,
    #[serde(default)]
    pub contact_name: String,
    #[serde(default)]
    pub contact_phone: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: String,
}

impl Person {
    #[must_use]
    pub fn key(&self) -> PersonKey {
        PersonKey::new(self.category, self.id.clone())
    }

    /// Contact name and phone joined for display, skipping blanks.
    #[must_use]
    pub fn contact_details(&self) -> Option<String> {
        let parts: Vec<&str> = [self.contact_name.as_str(), self.contact_phone.as_str()]
            .into_iter()
            .map(str::trim)
            .filter(|part| !part.is_empty())
            .collect();
        if parts.is_empty() {
            None
        } else {
            Some(parts.join(", "))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn jane() -> Person {
        Person {
            id: "STF001".into(),
            name: "Jane Smith".into(),
            category: Category::Staff,
            site: "Main".into(),
            contact_name: "John Smith".into(),
            contact_phone: "555-0100".into(),
            email: String::new(),
            phone: String::new(),
        }
    }

    #[test]
    fn contact_details_join_non_blank_parts() {
        assert_eq!(jane().contact_details().as_deref(), Some("John Smith, 555-0100"));

        let phone_only = Person {
            contact_name: "  ".into(),
            ..jane()
        };
        assert_eq!(phone_only.contact_details().as_deref(), Some("555-0100"));

        let none = Person {
            contact_name: String::new(),
            contact_phone: String::new(),
            ..jane()
        };
        assert!(none.contact_details().is_none());
    }

    #[test]
    fn optional_fields_default_when_absent() {
        let json = r#"{"id":"CLI001","name":"Ann Lee","category":"client","site":"East"}"#;
        let person: Person = serde_json::from_str(json).unwrap();
        assert_eq!(person.key(), PersonKey::client("CLI001"));
        assert!(person.contact_name.is_empty());
    }
}
