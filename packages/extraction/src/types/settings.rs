//! Pool-wide rotation settings.

use chrono::Duration;
use serde::{Deserialize, Serialize};

/// Settings read by every proxy acquisition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PoolSettings {
    /// Rotation interval in seconds.
    pub rotation_interval: u64,

    /// Maximum number of proxies expected to be in flight at once.
    pub max_concurrent: u32,

    /// Seconds a proxy must idle in `cooling_down` before it is eligible again.
    pub cooldown_period: u64,

    /// Failure count at which a proxy stops being selected.
    pub max_fail_count: u32,

    /// Master switch; a disabled pool never hands out proxies.
    pub enabled: bool,
}

impl Default for PoolSettings {
    fn default() -> Self {
        Self {
            rotation_interval: 300,
            max_concurrent: 10,
            cooldown_period: 600,
            max_fail_count: 3,
            enabled: true,
        }
    }
}

impl PoolSettings {
    pub fn cooldown(&self) -> Duration {
        Duration::seconds(i64::try_from(self.cooldown_period).unwrap_or(i64::MAX))
    }

    /// Apply a partial update; fields absent from the patch keep their value.
    pub fn apply(&mut self, patch: &PoolSettingsPatch) {
        if let Some(rotation_interval) = patch.rotation_interval {
            self.rotation_interval = rotation_interval;
        }
        if let Some(max_concurrent) = patch.max_concurrent {
            self.max_concurrent = max_concurrent;
        }
        if let Some(cooldown_period) = patch.cooldown_period {
            self.cooldown_period = cooldown_period;
        }
        if let Some(max_fail_count) = patch.max_fail_count {
            self.max_fail_count = max_fail_count;
        }
        if let Some(enabled) = patch.enabled {
            self.enabled = enabled;
        }
    }
}

/// Partial settings update.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PoolSettingsPatch {
    #[serde(default)]
    pub rotation_interval: Option<u64>,
    #[serde(default)]
    pub max_concurrent: Option<u32>,
    #[serde(default)]
    pub cooldown_period: Option<u64>,
    #[serde(default)]
    pub max_fail_count: Option<u32>,
    #[serde(default)]
    pub enabled: Option<bool>,
}

impl PoolSettingsPatch {
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }
}
