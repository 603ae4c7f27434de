//! Debounced usage label refresh

use crate::{
    config::LabelConfig,
    coordinator::{FetchCoordinator, PendingFetch},
};
use netusage_common::{Transport, UsageResult};
use netusage_stats::{format_size, UsageAggregator};
use std::sync::Arc;

const LABEL_KEY: &str = "usage-label";

/// Refreshes the one-line "today's usage" label.
///
/// Refreshes are debounced: a burst of calls computes the label once.
pub struct UsageLabelRefresher {
    aggregator: Arc<UsageAggregator>,
    coordinator: Arc<FetchCoordinator>,
    config: Arc<LabelConfig>,
}

impl UsageLabelRefresher {
    /// Create refresher
    pub fn new(
        aggregator: Arc<UsageAggregator>,
        coordinator: Arc<FetchCoordinator>,
        config: LabelConfig,
    ) -> Self {
        Self {
            aggregator,
            coordinator,
            config: Arc::new(config),
        }
    }

    /// Schedule a refresh; `on_label` gets `Ok(None)` when there is no data
    pub fn refresh<C>(&self, on_label: C)
    where
        C: FnOnce(UsageResult<Option<String>>) + Send + 'static,
    {
        let aggregator = Arc::clone(&self.aggregator);
        let config = Arc::clone(&self.config);
        self.coordinator.submit_debounced_with(
            LABEL_KEY.to_string(),
            move || async move { compute_label(&aggregator, &config).await },
            on_label,
        );
    }

    /// Schedule a refresh and await it
    pub fn refresh_pending(&self) -> PendingFetch<Option<String>> {
        let aggregator = Arc::clone(&self.aggregator);
        let config = Arc::clone(&self.config);
        self.coordinator.submit_debounced(LABEL_KEY.to_string(), move || async move {
            compute_label(&aggregator, &config).await
        })
    }

    /// Compute the label now, without debouncing
    pub async fn current_label(&self) -> UsageResult<Option<String>> {
        compute_label(&self.aggregator, &self.config).await
    }
}

async fn compute_label(
    aggregator: &UsageAggregator,
    config: &LabelConfig,
) -> UsageResult<Option<String>> {
    let (usage, suffix) = if aggregator.is_wifi_active() {
        let usage = aggregator.daily_usage_combined(Transport::Wifi).await?;
        (usage, &config.wifi_suffix)
    } else {
        let default_data = aggregator.resolver().directory().default_data_subscription_id();
        aggregator.set_subscription_id(default_data);
        let usage = aggregator.daily_usage_combined(Transport::Mobile).await?;
        (usage, &config.mobile_suffix)
    };

    Ok(usage.map(|info| {
        format!(
            "{} {} ({})",
            format_size(info.usage_level_bytes),
            config.used_word,
            suffix
        )
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::FetchConfig;
    use netusage_common::{Direction, SubscriptionId, SubscriptionInfo, UsageError};
    use netusage_stats::{AggregatorConfig, InMemoryUsageSource, StaticNetworkInspector, UsageRecord};
    use netusage_template::{InMemorySubscriptionDirectory, SubscriptionCache, SubscriptionResolver};

    struct Fixture {
        source: Arc<InMemoryUsageSource>,
        inspector: Arc<StaticNetworkInspector>,
        aggregator: Arc<UsageAggregator>,
        refresher: UsageLabelRefresher,
    }

    fn fixture() -> Fixture {
        let directory = Arc::new(InMemorySubscriptionDirectory::new());
        for raw in [1, 2] {
            let id = SubscriptionId::new(raw);
            directory.add_subscription(SubscriptionInfo::new(id).with_identity(format!("imsi-{raw}")));
        }
        directory.set_default_data_subscription(SubscriptionId::new(2));

        let source = Arc::new(InMemoryUsageSource::new());
        let inspector = Arc::new(StaticNetworkInspector::default());
        let resolver = Arc::new(SubscriptionResolver::new(
            directory,
            SubscriptionCache::default(),
        ));
        let aggregator = Arc::new(UsageAggregator::new(
            resolver,
            source.clone(),
            inspector.clone(),
            &AggregatorConfig::default(),
        ));
        let coordinator = Arc::new(FetchCoordinator::current(&FetchConfig::default()).unwrap());
        let refresher = UsageLabelRefresher::new(aggregator.clone(), coordinator, LabelConfig::default());

        Fixture {
            source,
            inspector,
            aggregator,
            refresher,
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_wifi_label() {
        let fx = fixture();
        fx.inspector.set_active(Some([Transport::Wifi].into_iter().collect()));
        fx.source.record(UsageRecord::wifi(Direction::Download, 2048));
        fx.source.record(UsageRecord::wifi(Direction::Upload, 1024));

        let label = fx.refresher.refresh_pending().await.unwrap();
        assert_eq!(label.as_deref(), Some("3.00 KB used (Wi-Fi)"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_mobile_label_uses_default_data_subscription() {
        let fx = fixture();
        fx.aggregator.set_subscription_id(SubscriptionId::new(1));
        fx.source.record(UsageRecord::mobile("imsi-1", Direction::Download, 5_000_000));
        fx.source.record(UsageRecord::mobile("imsi-2", Direction::Download, 700));

        let label = fx.refresher.refresh_pending().await.unwrap();
        assert_eq!(label.as_deref(), Some("700 B used (Mobile data)"));
        assert_eq!(fx.aggregator.subscription_id(), SubscriptionId::new(2));
    }

    #[tokio::test(start_paused = true)]
    async fn test_no_data_gives_no_label() {
        let fx = fixture();
        assert_eq!(fx.refresher.refresh_pending().await.unwrap(), None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_burst_computes_once() {
        let fx = fixture();
        fx.source.record(UsageRecord::mobile("imsi-2", Direction::Upload, 10));

        let burst: Vec<_> = (0..4).map(|_| fx.refresher.refresh_pending()).collect();
        let mut labels = Vec::new();
        for pending in burst {
            labels.push(pending.await);
        }

        // One label = one upload and one download query
        assert_eq!(fx.source.queries(), 2);
        assert_eq!(labels.iter().filter(|l| matches!(l, Err(UsageError::Superseded))).count(), 3);
        assert_eq!(labels[3].as_ref().unwrap().as_deref(), Some("10 B used (Mobile data)"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_source_failure_reaches_callback() {
        let fx = fixture();
        fx.source.set_failure(Some("netstats down".into()));
        let (tx, rx) = tokio::sync::oneshot::channel();

        fx.refresher.refresh(move |result| {
            let _ = tx.send(result);
        });

        assert!(matches!(rx.await.unwrap(), Err(UsageError::SourceUnavailable { .. })));
    }

    #[tokio::test]
    async fn test_current_label_skips_debounce() {
        let fx = fixture();
        fx.inspector.set_active(Some([Transport::Wifi].into_iter().collect()));
        fx.source.record(UsageRecord::wifi(Direction::Download, 3 * 1024 * 1024));
        assert_eq!(
            fx.refresher.current_label().await.unwrap().as_deref(),
            Some("3.00 MB used (Wi-Fi)")
        );
    }
}
