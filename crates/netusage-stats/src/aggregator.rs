//! Usage aggregator - daily usage per transport and totals

use crate::{format::format_size, network::ActiveNetworkInspector, source::UsageStatsSource};
use netusage_common::{
    Direction, SubscriptionId, Transport, UsageError, UsageInfo, UsageResult, UsageWindow,
};
use netusage_template::{NetworkTemplate, SubscriptionResolver};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

/// Aggregator configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AggregatorConfig {
    /// Upper bound for a single statistics query; unbounded when unset
    pub source_timeout_ms: Option<u64>,
}

impl AggregatorConfig {
    /// Query timeout, if configured
    pub fn source_timeout(&self) -> Option<Duration> {
        self.source_timeout_ms.map(Duration::from_millis)
    }
}

/// Daily usage aggregator
pub struct UsageAggregator {
    /// Mobile template resolution
    resolver: Arc<SubscriptionResolver>,
    /// Statistics backend
    source: Arc<dyn UsageStatsSource>,
    /// Active path detection
    inspector: Arc<dyn ActiveNetworkInspector>,
    /// Subscription mobile usage is reported for; default data sub when unset
    subscription: RwLock<Option<SubscriptionId>>,
    /// Statistics query bound
    timeout: Option<Duration>,
}

impl UsageAggregator {
    /// Create aggregator
    pub fn new(
        resolver: Arc<SubscriptionResolver>,
        source: Arc<dyn UsageStatsSource>,
        inspector: Arc<dyn ActiveNetworkInspector>,
        config: &AggregatorConfig,
    ) -> Self {
        Self {
            resolver,
            source,
            inspector,
            subscription: RwLock::new(None),
            timeout: config.source_timeout(),
        }
    }

    /// Report mobile usage for this subscription
    pub fn set_subscription_id(&self, id: SubscriptionId) {
        *self.subscription.write() = Some(id);
    }

    /// Subscription mobile usage is currently reported for
    pub fn subscription_id(&self) -> SubscriptionId {
        let explicit = *self.subscription.read();
        explicit.unwrap_or_else(|| self.resolver.directory().default_data_subscription_id())
    }

    /// Template resolution backing this aggregator
    pub fn resolver(&self) -> &Arc<SubscriptionResolver> {
        &self.resolver
    }

    /// Whether the active network path is Wi-Fi
    pub fn is_wifi_active(&self) -> bool {
        self.inspector.is_wifi_active()
    }

    /// Template queried for a transport
    pub fn template_for(&self, transport: Transport) -> NetworkTemplate {
        match transport {
            Transport::Mobile => self.resolver.resolve(self.subscription_id()),
            Transport::Wifi => NetworkTemplate::wifi(),
        }
    }

    /// Today's usage for one transport and direction
    pub async fn daily_usage(
        &self,
        transport: Transport,
        direction: Direction,
    ) -> UsageResult<Option<UsageInfo>> {
        let template = self.template_for(transport);
        self.query(&template, &UsageWindow::today(), direction).await
    }

    /// Today's upload + download for one transport; absent if both are
    pub async fn daily_usage_combined(&self, transport: Transport) -> UsageResult<Option<UsageInfo>> {
        let template = self.template_for(transport);
        let window = UsageWindow::today();
        let (up, down) = tokio::try_join!(
            self.query(&template, &window, Direction::Upload),
            self.query(&template, &window, Direction::Download),
        )?;
        Ok(UsageInfo::combine(up, down))
    }

    /// Today's mobile usage
    pub async fn mobile_usage(&self, direction: Direction) -> UsageResult<Option<UsageInfo>> {
        self.daily_usage(Transport::Mobile, direction).await
    }

    /// Today's Wi-Fi usage
    pub async fn wifi_usage(&self, direction: Direction) -> UsageResult<Option<UsageInfo>> {
        self.daily_usage(Transport::Wifi, direction).await
    }

    /// Mobile + Wi-Fi bytes for a direction, missing data counting as zero
    pub async fn total_usage(&self, direction: Direction) -> UsageResult<u64> {
        let (mobile, wifi) = tokio::try_join!(
            self.mobile_usage(direction),
            self.wifi_usage(direction),
        )?;
        Ok(UsageInfo::bytes_or_zero(mobile).saturating_add(UsageInfo::bytes_or_zero(wifi)))
    }

    /// Upload/download for every transport
    pub async fn summary(&self) -> UsageResult<UsageSummary> {
        let (mobile_up, mobile_down, wifi_up, wifi_down) = tokio::try_join!(
            self.mobile_usage(Direction::Upload),
            self.mobile_usage(Direction::Download),
            self.wifi_usage(Direction::Upload),
            self.wifi_usage(Direction::Download),
        )?;

        Ok(UsageSummary {
            mobile: TransportUsage::from_infos(mobile_up, mobile_down),
            wifi: TransportUsage::from_infos(wifi_up, wifi_down),
        })
    }

    async fn query(
        &self,
        template: &NetworkTemplate,
        window: &UsageWindow,
        direction: Direction,
    ) -> UsageResult<Option<UsageInfo>> {
        let request = self.source.query_usage(template, window, direction);
        let result = match self.timeout {
            Some(limit) => tokio::time::timeout(limit, request)
                .await
                .map_err(|_| UsageError::Timeout(limit))
                .and_then(|r| r),
            None => request.await,
        };

        if let Err(e) = &result {
            tracing::warn!(template = %template, direction = %direction, error = %e, "Usage query failed");
        }
        result
    }
}

/// Upload/download byte counts of one transport
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransportUsage {
    /// Uploaded bytes
    pub upload_bytes: u64,
    /// Downloaded bytes
    pub download_bytes: u64,
}

impl TransportUsage {
    fn from_infos(up: Option<UsageInfo>, down: Option<UsageInfo>) -> Self {
        Self {
            upload_bytes: UsageInfo::bytes_or_zero(up),
            download_bytes: UsageInfo::bytes_or_zero(down),
        }
    }

    /// Bytes for a direction
    pub fn get(&self, direction: Direction) -> u64 {
        match direction {
            Direction::Upload => self.upload_bytes,
            Direction::Download => self.download_bytes,
        }
    }
}

/// Today's usage panel
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UsageSummary {
    /// Cellular usage
    pub mobile: TransportUsage,
    /// Wi-Fi usage
    pub wifi: TransportUsage,
}

impl UsageSummary {
    /// Mobile + Wi-Fi
    pub fn total(&self) -> TransportUsage {
        TransportUsage {
            upload_bytes: self.mobile.upload_bytes.saturating_add(self.wifi.upload_bytes),
            download_bytes: self.mobile.download_bytes.saturating_add(self.wifi.download_bytes),
        }
    }
}

impl fmt::Display for UsageSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sections = [("Internet", self.total()), ("Mobile", self.mobile), ("Wi-Fi", self.wifi)];
        for (i, (title, usage)) in sections.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            writeln!(f, "{}", title)?;
            writeln!(f, "  Download: {}", format_size(usage.download_bytes))?;
            write!(f, "  Upload: {}", format_size(usage.upload_bytes))?;
        }
        Ok(())
    }
}
