use chrono::Duration;
use serde::{Deserialize, Serialize};

/// Tunable lifecycle timings.
///
/// Durations are stored as whole seconds so the config stays trivially
/// serializable; the defaults match the observed system (7-day draft window,
/// 30-second autosave cadence).
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct LifecycleConfig {
    #[serde(default = "LifecycleConfig::default_draft_ttl_secs")]
    pub draft_ttl_secs: i64,
    #[serde(default = "LifecycleConfig::default_autosave_interval_secs")]
    pub autosave_interval_secs: i64,
}

impl LifecycleConfig {
    pub fn default_draft_ttl_secs() -> i64 {
        7 * 24 * 60 * 60
    }

    pub fn default_autosave_interval_secs() -> i64 {
        30
    }

    pub fn draft_ttl(&self) -> Duration {
        Duration::seconds(self.draft_ttl_secs)
    }

    pub fn autosave_interval(&self) -> Duration {
        Duration::seconds(self.autosave_interval_secs)
    }
}

impl Default for LifecycleConfig {
    fn default() -> Self {
        Self {
            draft_ttl_secs: Self::default_draft_ttl_secs(),
            autosave_interval_secs: Self::default_autosave_interval_secs(),
        }
    }
}
