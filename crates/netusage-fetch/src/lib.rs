//! Async Fetch Coordination
//!
//! Runs subscription and usage fetches off the caller's context and
//! delivers exactly one result per request.
//!
//! # Features
//!
//! - Plain submissions: every request runs and completes independently
//! - Debounced submissions: per-key cancel-and-reschedule timer, only the
//!   last request of a burst runs
//! - Results as futures (`PendingFetch`) or completion callbacks
//! - Subscription info lookup and usage label refresh built on top

#![warn(missing_docs)]

pub mod config;
pub mod coordinator;
pub mod label;
pub mod subscription;

pub use config::{FetchConfig, LabelConfig};
pub use coordinator::{FetchCoordinator, PendingFetch};
pub use label::UsageLabelRefresher;
pub use subscription::{fetch_subscription_info, fetch_subscription_info_async};
