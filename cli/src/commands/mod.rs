//! CLI Commands

pub mod subscriptions;
pub mod usage;

use crate::{config::NetUsageConfig, snapshot::Platform};
use netusage_fetch::{FetchCoordinator, UsageLabelRefresher};
use netusage_stats::UsageAggregator;
use netusage_template::SubscriptionResolver;
use std::sync::Arc;

/// Core services wired over a platform
pub struct Services {
    pub resolver: Arc<SubscriptionResolver>,
    pub aggregator: Arc<UsageAggregator>,
    pub coordinator: Arc<FetchCoordinator>,
    pub label: UsageLabelRefresher,
}

impl Services {
    /// Must be called from within the tokio runtime
    pub fn new(config: &NetUsageConfig, platform: Platform) -> anyhow::Result<Self> {
        let resolver = Arc::new(SubscriptionResolver::with_config(
            platform.directory,
            &config.cache,
        ));
        let aggregator = Arc::new(UsageAggregator::new(
            resolver.clone(),
            platform.source,
            platform.inspector,
            &config.aggregator,
        ));
        let coordinator = Arc::new(FetchCoordinator::current(&config.fetch)?);
        let label = UsageLabelRefresher::new(
            aggregator.clone(),
            coordinator.clone(),
            config.label.clone(),
        );

        Ok(Self {
            resolver,
            aggregator,
            coordinator,
            label,
        })
    }
}
