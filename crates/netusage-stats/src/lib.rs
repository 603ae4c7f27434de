//! Daily Data Usage Aggregation
//!
//! Queries today's upload/download usage per transport and sums it.
//!
//! # Features
//!
//! - Pluggable usage-statistics source with an optional boundary timeout
//! - Active transport detection (Wi-Fi vs. mobile)
//! - Mobile + Wi-Fi totals where missing data counts as zero
//! - Binary-unit size formatting

#![warn(missing_docs)]

pub mod aggregator;
pub mod format;
pub mod network;
pub mod source;

pub use aggregator::{AggregatorConfig, TransportUsage, UsageAggregator, UsageSummary};
pub use format::format_size;
pub use network::{ActiveNetworkInspector, StaticNetworkInspector};
pub use source::{InMemoryUsageSource, UsageRecord, UsageStatsSource};
