//! CLI Configuration

use netusage_common::{UsageError, UsageResult};
use netusage_fetch::{FetchConfig, LabelConfig};
use netusage_stats::AggregatorConfig;
use netusage_template::CacheConfig;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Full configuration, one section per library crate
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct NetUsageConfig {
    pub cache: CacheConfig,
    pub aggregator: AggregatorConfig,
    pub fetch: FetchConfig,
    pub label: LabelConfig,
}

impl NetUsageConfig {
    /// Load from a JSON file
    pub fn load(path: impl AsRef<Path>) -> UsageResult<Self> {
        let content = fs::read_to_string(path)?;
        serde_json::from_str(&content).map_err(|e| UsageError::Config(e.to_string()))
    }

    /// Load from `path`, or defaults when absent or unreadable
    pub fn load_or_default(path: Option<&Path>) -> Self {
        let Some(path) = path else {
            return Self::default();
        };
        Self::load(path).unwrap_or_else(|e| {
            tracing::warn!(path = %path.display(), error = %e, "Config not loaded, using defaults");
            Self::default()
        })
    }
}
