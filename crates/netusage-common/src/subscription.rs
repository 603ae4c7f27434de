//! Subscription identifiers and records

use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque cellular subscription identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
#[repr(transparent)]
pub struct SubscriptionId(i32);

impl SubscriptionId {
    /// "No subscription" sentinel
    pub const INVALID: Self = Self(-1);

    /// Wrap a raw platform id
    pub const fn new(raw: i32) -> Self {
        Self(raw)
    }

    /// Raw platform id
    #[inline(always)]
    pub const fn as_i32(&self) -> i32 {
        self.0
    }

    /// Whether this refers to an actual subscription
    #[inline(always)]
    pub const fn is_valid(&self) -> bool {
        self.0 >= 0
    }
}

impl Default for SubscriptionId {
    fn default() -> Self {
        Self::INVALID
    }
}

impl From<i32> for SubscriptionId {
    fn from(raw: i32) -> Self {
        Self(raw)
    }
}

impl fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Immutable subscription record as reported by the platform
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubscriptionInfo {
    /// Subscription id
    pub id: SubscriptionId,
    /// Subscriber identity (IMSI), when the platform exposes it
    #[serde(default)]
    pub subscriber_identity: Option<String>,
    /// Subscription group (shared plan), if any
    #[serde(default)]
    pub group_id: Option<String>,
}

impl SubscriptionInfo {
    /// Create record without identity or group
    pub fn new(id: SubscriptionId) -> Self {
        Self {
            id,
            subscriber_identity: None,
            group_id: None,
        }
    }

    /// Set subscriber identity
    pub fn with_identity(mut self, identity: impl Into<String>) -> Self {
        self.subscriber_identity = Some(identity.into());
        self
    }

    /// Set group id
    pub fn with_group(mut self, group_id: impl Into<String>) -> Self {
        self.group_id = Some(group_id.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sentinel() {
        assert!(!SubscriptionId::INVALID.is_valid());
        assert!(!SubscriptionId::default().is_valid());
        assert!(SubscriptionId::new(0).is_valid());
        assert_eq!(SubscriptionId::from(7).to_string(), "7");
    }

    #[test]
    fn test_info_serde_defaults() {
        let info: SubscriptionInfo = serde_json::from_str(r#"{"id": 3}"#).unwrap();
        assert_eq!(info, SubscriptionInfo::new(SubscriptionId::new(3)));

        let full = SubscriptionInfo::new(SubscriptionId::new(4))
            .with_identity("310260000000001")
            .with_group("family-plan");
        assert_eq!(full.subscriber_identity.as_deref(), Some("310260000000001"));
        assert_eq!(full.group_id.as_deref(), Some("family-plan"));
    }
}
