//! Usage statistics source

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use netusage_common::{Direction, Transport, UsageError, UsageInfo, UsageResult, UsageWindow};
use netusage_template::NetworkTemplate;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

/// Platform usage statistics service
#[async_trait]
pub trait UsageStatsSource: Send + Sync {
    /// Bytes matched by `template` in `window` for one direction.
    ///
    /// `Ok(None)` means no data for the window; `Err` means the question
    /// could not be asked.
    async fn query_usage(
        &self,
        template: &NetworkTemplate,
        window: &UsageWindow,
        direction: Direction,
    ) -> UsageResult<Option<UsageInfo>>;
}

/// One observed traffic bucket
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UsageRecord {
    /// Transport the traffic used
    pub transport: Transport,
    /// Subscriber identity for mobile traffic
    #[serde(default)]
    pub subscriber_id: Option<String>,
    /// Network key for Wi-Fi traffic
    #[serde(default)]
    pub wifi_network_key: Option<String>,
    /// Direction
    pub direction: Direction,
    /// Byte count
    pub bytes: u64,
    /// Observation time
    #[serde(default = "Utc::now")]
    pub at: DateTime<Utc>,
}

impl UsageRecord {
    /// Mobile traffic of a subscriber, observed now
    pub fn mobile(subscriber_id: impl Into<String>, direction: Direction, bytes: u64) -> Self {
        Self {
            transport: Transport::Mobile,
            subscriber_id: Some(subscriber_id.into()),
            wifi_network_key: None,
            direction,
            bytes,
            at: Utc::now(),
        }
    }

    /// Wi-Fi traffic, observed now
    pub fn wifi(direction: Direction, bytes: u64) -> Self {
        Self {
            transport: Transport::Wifi,
            subscriber_id: None,
            wifi_network_key: None,
            direction,
            bytes,
            at: Utc::now(),
        }
    }

    /// Override observation time
    pub fn at(mut self, at: DateTime<Utc>) -> Self {
        self.at = at;
        self
    }
}

/// In-memory statistics source (for testing and snapshot replay)
#[derive(Debug, Default)]
pub struct InMemoryUsageSource {
    records: RwLock<Vec<UsageRecord>>,
    failure: RwLock<Option<String>>,
    delay: RwLock<Option<Duration>>,
    queries: AtomicU64,
}

impl InMemoryUsageSource {
    /// Empty source
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a traffic bucket
    pub fn record(&self, record: UsageRecord) {
        self.records.write().push(record);
    }

    /// Make queries fail until cleared with `None`
    pub fn set_failure(&self, reason: Option<String>) {
        *self.failure.write() = reason;
    }

    /// Delay every answer
    pub fn set_delay(&self, delay: Option<Duration>) {
        *self.delay.write() = delay;
    }

    /// Number of queries received
    pub fn queries(&self) -> u64 {
        self.queries.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl UsageStatsSource for InMemoryUsageSource {
    async fn query_usage(
        &self,
        template: &NetworkTemplate,
        window: &UsageWindow,
        direction: Direction,
    ) -> UsageResult<Option<UsageInfo>> {
        self.queries.fetch_add(1, Ordering::Relaxed);

        let delay = *self.delay.read();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        if let Some(reason) = self.failure.read().clone() {
            return Err(UsageError::stats(reason));
        }

        let records = self.records.read();
        let matched: Vec<u64> = records
            .iter()
            .filter(|r| r.direction == direction)
            .filter(|r| r.at >= window.start && r.at <= window.end)
            .filter(|r| {
                template.matches(
                    r.transport,
                    r.subscriber_id.as_deref(),
                    r.wifi_network_key.as_deref(),
                )
            })
            .map(|r| r.bytes)
            .collect();

        if matched.is_empty() {
            return Ok(None);
        }
        Ok(Some(UsageInfo::new(
            matched.into_iter().fold(0u64, u64::saturating_add),
        )))
    }
}
