//! Subscription resolver - subscription id to mobile template

use crate::{
    cache::{CacheConfig, SubscriptionCache},
    directory::SubscriptionDirectory,
    normalizer::{normalize, template_for_subscription},
    template::NetworkTemplate,
};
use netusage_common::{SubscriptionId, SubscriptionInfo, UsageResult};
use std::sync::Arc;

/// Resolves the template usage of a subscription is queried against
pub struct SubscriptionResolver {
    /// Platform subscription service
    directory: Arc<dyn SubscriptionDirectory>,
    /// Previously matched subscriptions
    cache: SubscriptionCache,
}

impl SubscriptionResolver {
    /// Create resolver over a directory and a (possibly shared) cache
    pub fn new(directory: Arc<dyn SubscriptionDirectory>, cache: SubscriptionCache) -> Self {
        Self { directory, cache }
    }

    /// Create resolver with its own cache
    pub fn with_config(directory: Arc<dyn SubscriptionDirectory>, config: &CacheConfig) -> Self {
        Self::new(directory, SubscriptionCache::new(config))
    }

    /// Underlying directory
    pub fn directory(&self) -> &Arc<dyn SubscriptionDirectory> {
        &self.directory
    }

    /// Subscription cache
    pub fn cache(&self) -> &SubscriptionCache {
        &self.cache
    }

    /// Mobile template for a subscription.
    ///
    /// Never fails: an unavailable or empty active list, or a subscription
    /// that is not active, resolves to the default data subscription's base
    /// template. A cached subscription skips the list scan and is not
    /// re-validated against it.
    pub fn resolve(&self, id: SubscriptionId) -> NetworkTemplate {
        let subscriptions = match self.directory.list_active_subscriptions() {
            Ok(Some(list)) if !list.is_empty() => list,
            Ok(_) => {
                tracing::info!(subscription_id = %id, "Subscription info list is empty");
                return self.default_template();
            }
            Err(e) => {
                tracing::warn!(subscription_id = %id, error = %e, "Subscription list unavailable");
                return self.default_template();
            }
        };

        if self.cache.contains(id) {
            tracing::debug!(subscription_id = %id, "Subscription cache hit");
            return self.normalized_template(id);
        }

        match subscriptions.into_iter().find(|s| s.id == id) {
            Some(info) => {
                self.cache.insert(info);
                self.normalized_template(id)
            }
            None => {
                tracing::info!(subscription_id = %id, "Subscription is not active");
                self.default_template()
            }
        }
    }

    /// Base (non-normalized) template for a subscription
    pub fn template_for_subscription(&self, id: SubscriptionId) -> NetworkTemplate {
        let identity = self.directory.subscriber_identity(id);
        template_for_subscription(identity.as_deref())
    }

    /// Look up an active subscription, caching it on a match.
    ///
    /// `Ok(None)` when the list is missing or has no such subscription;
    /// directory failures are returned.
    pub fn lookup_subscription(&self, id: SubscriptionId) -> UsageResult<Option<SubscriptionInfo>> {
        let subscriptions = self.directory.list_active_subscriptions().map_err(|e| {
            tracing::error!(subscription_id = %id, error = %e, "Error fetching subscription info");
            e
        })?;

        let found = subscriptions
            .unwrap_or_default()
            .into_iter()
            .find(|s| s.id == id)
            .map(|info| {
                self.cache.insert(info.clone());
                info
            });

        Ok(found)
    }

    /// Forget one cached subscription
    pub fn invalidate(&self, id: SubscriptionId) {
        self.cache.invalidate(id);
    }

    /// Forget all cached subscriptions
    pub fn invalidate_all(&self) {
        self.cache.invalidate_all();
    }

    fn normalized_template(&self, id: SubscriptionId) -> NetworkTemplate {
        let base = self.template_for_subscription(id);

        match self.directory.merged_identities_for_group(id) {
            Some(merged) if !merged.is_empty() => normalize(&base, &merged),
            _ => {
                tracing::info!(subscription_id = %id, "No merged subscriber ids");
                base
            }
        }
    }

    fn default_template(&self) -> NetworkTemplate {
        self.template_for_subscription(self.directory.default_data_subscription_id())
    }
}
