//! Platform snapshot - replayable subscription, network and usage state

use anyhow::Context;
use netusage_common::{SubscriptionId, SubscriptionInfo, Transport};
use netusage_stats::{InMemoryUsageSource, StaticNetworkInspector, UsageRecord};
use netusage_template::InMemorySubscriptionDirectory;
use serde::Deserialize;
use std::collections::BTreeSet;
use std::path::Path;
use std::sync::Arc;

#[derive(Debug, Deserialize)]
pub struct IdentityEntry {
    pub subscription_id: SubscriptionId,
    pub identity: String,
}

#[derive(Debug, Deserialize)]
pub struct MergedGroup {
    pub subscription_id: SubscriptionId,
    pub identities: Vec<String>,
}

/// Recorded platform state
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Snapshot {
    pub default_data_subscription: Option<SubscriptionId>,
    /// Active list; absent means the platform reported none
    pub subscriptions: Option<Vec<SubscriptionInfo>>,
    /// Identities of subscriptions that are not active
    pub identities: Vec<IdentityEntry>,
    pub merged_groups: Vec<MergedGroup>,
    pub active_transports: Option<BTreeSet<Transport>>,
    pub usage: Vec<UsageRecord>,
}

/// Collaborators backed by a snapshot
pub struct Platform {
    pub directory: Arc<InMemorySubscriptionDirectory>,
    pub source: Arc<InMemoryUsageSource>,
    pub inspector: Arc<StaticNetworkInspector>,
}

impl Snapshot {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("reading snapshot {}", path.display()))?;
        serde_json::from_str(&content)
            .with_context(|| format!("parsing snapshot {}", path.display()))
    }

    pub fn into_platform(self) -> Platform {
        let directory = Arc::new(InMemorySubscriptionDirectory::new());
        if let Some(id) = self.default_data_subscription {
            directory.set_default_data_subscription(id);
        }
        for info in self.subscriptions.into_iter().flatten() {
            directory.add_subscription(info);
        }
        for entry in self.identities {
            directory.set_identity(entry.subscription_id, entry.identity);
        }
        for group in self.merged_groups {
            directory.set_merged_identities(group.subscription_id, group.identities);
        }

        let source = Arc::new(InMemoryUsageSource::new());
        for record in self.usage {
            source.record(record);
        }

        let inspector = Arc::new(StaticNetworkInspector::new(self.active_transports));

        tracing::debug!("Snapshot platform ready");
        Platform {
            directory,
            source,
            inspector,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use netusage_stats::ActiveNetworkInspector;
    use netusage_template::SubscriptionDirectory;

    #[test]
    fn test_fixture_snapshot() {
        let snapshot: Snapshot = serde_json::from_str(include_str!("../fixtures/snapshot.json")).unwrap();
        assert_eq!(snapshot.usage.len(), 5);

        let platform = snapshot.into_platform();
        assert_eq!(
            platform.directory.default_data_subscription_id(),
            SubscriptionId::new(1)
        );
        assert_eq!(
            platform.directory.list_active_subscriptions().unwrap().unwrap().len(),
            2
        );
        assert_eq!(
            platform.directory.subscriber_identity(SubscriptionId::new(9)).as_deref(),
            Some("310260000000009")
        );
        assert!(!platform.inspector.is_wifi_active());
    }

    #[test]
    fn test_empty_snapshot_has_no_list() {
        let platform = serde_json::from_str::<Snapshot>("{}").unwrap().into_platform();
        assert!(platform.directory.list_active_subscriptions().unwrap().is_none());
        assert!(platform.inspector.active_network_transports().is_none());
    }
}
