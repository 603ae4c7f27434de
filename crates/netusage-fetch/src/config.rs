//! Fetch configuration

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Coordinator configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FetchConfig {
    /// Quiet period before a debounced request fires
    pub debounce_ms: u64,
}

impl FetchConfig {
    /// Debounce window
    pub fn debounce_window(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self { debounce_ms: 300 }
    }
}

/// Wording of the usage label
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LabelConfig {
    /// Word after the size
    pub used_word: String,
    /// Suffix when on Wi-Fi
    pub wifi_suffix: String,
    /// Suffix when on mobile data
    pub mobile_suffix: String,
}

impl Default for LabelConfig {
    fn default() -> Self {
        Self {
            used_word: "used".into(),
            wifi_suffix: "Wi-Fi".into(),
            mobile_suffix: "Mobile data".into(),
        }
    }
}
