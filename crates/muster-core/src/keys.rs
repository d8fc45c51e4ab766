//! Person identity.
//!
//! Identity is always `(category, id)`: the same id string may name a staff
//! member and a client at once without colliding.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::enums::Category;
use crate::errors::CoreError;

/// Separators accepted when parsing a key from text (`staff:STF001`, `staff|STF001`).
const KEY_SEPARATORS: [char; 2] = [':', '|'];

#[derive(
    Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, JsonSchema,
)]
pub struct PersonKey {
    pub category: Category,
    pub id: String,
}

impl PersonKey {
    #[must_use]
    pub fn new(category: Category, id: impl Into<String>) -> Self {
        Self {
            category,
            id: id.into(),
        }
    }

    #[must_use]
    pub fn staff(id: impl Into<String>) -> Self {
        Self::new(Category::Staff, id)
    }

    #[must_use]
    pub fn client(id: impl Into<String>) -> Self {
        Self::new(Category::Client, id)
    }
}

impl fmt::Display for PersonKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.category, self.id)
    }
}

impl FromStr for PersonKey {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (category, id) = s.split_once(KEY_SEPARATORS).ok_or_else(|| {
            CoreError::Validation(format!("person key '{s}' must look like staff:ID"))
        })?;
        let id = id.trim();
        if id.is_empty() {
            return Err(CoreError::Validation(format!(
                "person key '{s}' has an empty id"
            )));
        }
        Ok(Self::new(category.parse()?, id))
    }
}
