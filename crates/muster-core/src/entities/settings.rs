use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

const fn default_timeout_seconds() -> u64 {
    10
}

const fn default_retention_days() -> u32 {
    30
}

/// Operator-editable runtime settings, persisted on every change.
///
/// Missing fields in a stored file take their defaults.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct Settings {
    #[serde(default)]
    pub webhook_url: String,

    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,

    #[serde(default = "default_retention_days")]
    pub retention_days: u32,

    /// Known site names, trimmed and deduplicated in insertion order.
    #[serde(default)]
    pub locations: Vec<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            webhook_url: String::new(),
            timeout_seconds: default_timeout_seconds(),
            retention_days: default_retention_days(),
            locations: Vec::new(),
        }
    }
}

impl Settings {
    #[must_use]
    pub fn webhook_configured(&self) -> bool {
        !self.webhook_url.trim().is_empty()
    }

    /// Trim locations, drop blanks, and keep the first occurrence of each.
    #[must_use]
    pub fn normalized(mut self) -> Self {
        let mut cleaned: Vec<String> = Vec::with_capacity(self.locations.len());
        for location in self.locations.drain(..) {
            let text = location.trim();
            if !text.is_empty() && !cleaned.iter().any(|known| known == text) {
                cleaned.push(text.to_string());
            }
        }
        self.locations = cleaned;
        self.webhook_url = self.webhook_url.trim().to_string();
        self
    }
}
