//! Snapshot archive retention.

use serde::{Deserialize, Serialize};

const fn default_days() -> u32 {
    30
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RetentionConfig {
    /// Archived snapshot copies older than this are pruned by `muster archive`.
    #[serde(default = "default_days")]
    pub days: u32,
}

impl Default for RetentionConfig {
    fn default() -> Self {
        Self {
            days: default_days(),
        }
    }
}
