//! Subscription directory - the platform's view of installed subscriptions

use netusage_common::{SubscriptionId, SubscriptionInfo, UsageError, UsageResult};
use parking_lot::RwLock;
use std::collections::{BTreeSet, HashMap};
use std::sync::atomic::{AtomicU64, Ordering};

/// Platform subscription service.
///
/// Calls are assumed fast and local; they are made synchronously from the
/// resolver and from blocking workers for async fetches.
pub trait SubscriptionDirectory: Send + Sync {
    /// Active subscriptions; `Ok(None)` when the platform has no list
    fn list_active_subscriptions(&self) -> UsageResult<Option<Vec<SubscriptionInfo>>>;

    /// Subscriber identity (IMSI) of a subscription
    fn subscriber_identity(&self, id: SubscriptionId) -> Option<String>;

    /// Subscription used for mobile data by default
    fn default_data_subscription_id(&self) -> SubscriptionId;

    /// Identities billed together with this subscription
    fn merged_identities_for_group(&self, id: SubscriptionId) -> Option<BTreeSet<String>>;
}

#[derive(Debug, Default)]
struct DirectoryState {
    subscriptions: Option<Vec<SubscriptionInfo>>,
    identities: HashMap<SubscriptionId, String>,
    merged: HashMap<SubscriptionId, BTreeSet<String>>,
    default_data: SubscriptionId,
    failure: Option<String>,
}

/// In-memory directory (for testing and snapshot replay)
#[derive(Debug, Default)]
pub struct InMemorySubscriptionDirectory {
    state: RwLock<DirectoryState>,
    list_calls: AtomicU64,
}

impl InMemorySubscriptionDirectory {
    /// Empty directory with no active list
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an active subscription; its identity is registered too
    pub fn add_subscription(&self, info: SubscriptionInfo) {
        let mut state = self.state.write();
        if let Some(identity) = &info.subscriber_identity {
            state.identities.insert(info.id, identity.clone());
        }
        state.subscriptions.get_or_insert_with(Vec::new).push(info);
    }

    /// Remove a subscription from the active list (identity stays resolvable)
    pub fn remove_subscription(&self, id: SubscriptionId) {
        if let Some(list) = self.state.write().subscriptions.as_mut() {
            list.retain(|s| s.id != id);
        }
    }

    /// Drop the active list entirely
    pub fn clear_subscriptions(&self) {
        self.state.write().subscriptions = None;
    }

    /// Register an identity without an active subscription
    pub fn set_identity(&self, id: SubscriptionId, identity: impl Into<String>) {
        self.state.write().identities.insert(id, identity.into());
    }

    /// Register the merged group reported for a subscription
    pub fn set_merged_identities<I, S>(&self, id: SubscriptionId, identities: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let set = identities.into_iter().map(Into::into).collect();
        self.state.write().merged.insert(id, set);
    }

    /// Set the default data subscription
    pub fn set_default_data_subscription(&self, id: SubscriptionId) {
        self.state.write().default_data = id;
    }

    /// Make list queries fail until cleared with `None`
    pub fn set_failure(&self, reason: Option<String>) {
        self.state.write().failure = reason;
    }

    /// Number of list queries served
    pub fn list_calls(&self) -> u64 {
        self.list_calls.load(Ordering::Relaxed)
    }
}

impl SubscriptionDirectory for InMemorySubscriptionDirectory {
    fn list_active_subscriptions(&self) -> UsageResult<Option<Vec<SubscriptionInfo>>> {
        self.list_calls.fetch_add(1, Ordering::Relaxed);
        let state = self.state.read();
        if let Some(reason) = &state.failure {
            return Err(UsageError::directory(reason.clone()));
        }
        Ok(state.subscriptions.clone())
    }

    fn subscriber_identity(&self, id: SubscriptionId) -> Option<String> {
        self.state.read().identities.get(&id).cloned()
    }

    fn default_data_subscription_id(&self) -> SubscriptionId {
        self.state.read().default_data
    }

    fn merged_identities_for_group(&self, id: SubscriptionId) -> Option<BTreeSet<String>> {
        self.state.read().merged.get(&id).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_list_states() {
        let dir = InMemorySubscriptionDirectory::new();
        assert!(dir.list_active_subscriptions().unwrap().is_none());

        let id = SubscriptionId::new(1);
        dir.add_subscription(SubscriptionInfo::new(id).with_identity("imsi-1"));
        assert_eq!(dir.list_active_subscriptions().unwrap().unwrap().len(), 1);
        assert_eq!(dir.subscriber_identity(id).as_deref(), Some("imsi-1"));

        dir.remove_subscription(id);
        assert!(dir.list_active_subscriptions().unwrap().unwrap().is_empty());
        assert_eq!(dir.subscriber_identity(id).as_deref(), Some("imsi-1"));
        assert_eq!(dir.list_calls(), 3);
    }

    #[test]
    fn test_failure_injection() {
        let dir = InMemorySubscriptionDirectory::new();
        dir.set_failure(Some("service down".into()));
        assert!(matches!(
            dir.list_active_subscriptions(),
            Err(UsageError::SourceUnavailable { .. })
        ));
        dir.set_failure(None);
        assert!(dir.list_active_subscriptions().is_ok());
    }
}
