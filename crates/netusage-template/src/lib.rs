//! Mobile Network Template Resolution
//!
//! Maps a cellular subscription to the template usage statistics are
//! queried against.
//!
//! # Features
//!
//! - Subscription lookup against the platform's active list
//! - Merged billing group expansion (multi-SIM, one plan)
//! - Bounded, TTL-evicted subscription cache
//! - Best-effort fallback to the default data subscription

#![warn(missing_docs)]

pub mod cache;
pub mod directory;
pub mod normalizer;
pub mod resolver;
pub mod template;

pub use cache::{CacheConfig, SubscriptionCache};
pub use directory::{InMemorySubscriptionDirectory, SubscriptionDirectory};
pub use normalizer::{normalize, template_for_subscription};
pub use resolver::SubscriptionResolver;
pub use template::{MatchRule, Meteredness, NetworkTemplate, TemplateBuilder};
