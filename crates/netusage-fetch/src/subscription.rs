//! Background subscription info fetch

use crate::coordinator::{FetchCoordinator, PendingFetch};
use netusage_common::{SubscriptionId, SubscriptionInfo, UsageResult};
use netusage_template::SubscriptionResolver;
use std::hash::Hash;
use std::sync::Arc;

/// Look up a subscription on the blocking pool and report to `on_complete`.
///
/// Delivers `Ok(Some(info))` on a match (which is also cached),
/// `Ok(None)` when the subscription is not active, and the directory error
/// otherwise.
pub fn fetch_subscription_info_async<K, C>(
    coordinator: &FetchCoordinator<K>,
    resolver: Arc<SubscriptionResolver>,
    id: SubscriptionId,
    on_complete: C,
) where
    K: Eq + Hash + Clone + Send + Sync + 'static,
    C: FnOnce(UsageResult<Option<SubscriptionInfo>>) + Send + 'static,
{
    coordinator.submit_blocking_with(move || resolver.lookup_subscription(id), on_complete);
}

/// Future-returning variant of [`fetch_subscription_info_async`]
pub fn fetch_subscription_info<K>(
    coordinator: &FetchCoordinator<K>,
    resolver: Arc<SubscriptionResolver>,
    id: SubscriptionId,
) -> PendingFetch<Option<SubscriptionInfo>>
where
    K: Eq + Hash + Clone + Send + Sync + 'static,
{
    coordinator.submit_blocking(move || resolver.lookup_subscription(id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::FetchConfig;
    use netusage_common::UsageError;
    use netusage_template::{InMemorySubscriptionDirectory, SubscriptionCache};
    use tokio::sync::oneshot;

    fn setup() -> (Arc<InMemorySubscriptionDirectory>, Arc<SubscriptionResolver>, FetchCoordinator) {
        let directory = Arc::new(InMemorySubscriptionDirectory::new());
        let resolver = Arc::new(SubscriptionResolver::new(
            directory.clone(),
            SubscriptionCache::default(),
        ));
        let coordinator = FetchCoordinator::current(&FetchConfig::default()).unwrap();
        (directory, resolver, coordinator)
    }

    #[tokio::test]
    async fn test_found_subscription_is_cached() {
        let (directory, resolver, coordinator) = setup();
        let id = SubscriptionId::new(4);
        directory.add_subscription(SubscriptionInfo::new(id).with_identity("imsi-4"));

        let info = fetch_subscription_info(&coordinator, resolver.clone(), id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(info.id, id);
        assert!(resolver.cache().contains(id));
    }

    #[tokio::test]
    async fn test_missing_subscription_is_none() {
        let (_directory, resolver, coordinator) = setup();
        let result = fetch_subscription_info(&coordinator, resolver, SubscriptionId::new(4)).await;
        assert!(result.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_directory_failure_reaches_callback() {
        let (directory, resolver, coordinator) = setup();
        directory.set_failure(Some("telephony crashed".into()));
        let (tx, rx) = oneshot::channel();

        fetch_subscription_info_async(&coordinator, resolver, SubscriptionId::new(1), move |result| {
            let _ = tx.send(result);
        });

        let result = rx.await.unwrap();
        assert!(matches!(result, Err(UsageError::SourceUnavailable { .. })));
    }
}
