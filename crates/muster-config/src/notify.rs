//! Emergency notification configuration.

use serde::{Deserialize, Serialize};

const fn default_timeout_secs() -> u64 {
    10
}

fn default_user_agent() -> String {
    "muster/0.1".to_string()
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct NotifyConfig {
    /// Webhook timeout used until an operator saves one in `settings.json`.
    #[serde(default = "default_timeout_secs")]
    pub default_timeout_secs: u64,

    /// `User-Agent` sent with webhook calls.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl Default for NotifyConfig {
    fn default() -> Self {
        Self {
            default_timeout_secs: default_timeout_secs(),
            user_agent: default_user_agent(),
        }
    }
}
