//! Network templates
//!
//! A template selects which traffic counts toward a usage query. Templates
//! are immutable values compared structurally.

use netusage_common::{Transport, UsageError, UsageResult};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// How a template selects traffic
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchRule {
    /// Cellular traffic of specific subscriber identities
    Carrier,
    /// Any cellular traffic
    Mobile,
    /// Wi-Fi traffic, optionally limited to network keys
    Wifi,
}

/// Whether matched traffic counts toward data caps
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Meteredness {
    /// Metered and unmetered
    #[default]
    All,
    /// Metered only
    Metered,
    /// Unmetered only
    Unmetered,
}

/// Immutable traffic selector
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "TemplateBuilder")]
pub struct NetworkTemplate {
    match_rule: MatchRule,
    subscriber_ids: BTreeSet<String>,
    wifi_network_keys: BTreeSet<String>,
    meteredness: Meteredness,
}

impl NetworkTemplate {
    /// Start a validated builder
    pub fn builder(match_rule: MatchRule) -> TemplateBuilder {
        TemplateBuilder::new(match_rule)
    }

    /// Metered carrier template over a single subscriber identity
    pub fn carrier(subscriber_id: impl Into<String>) -> Self {
        Self {
            match_rule: MatchRule::Carrier,
            subscriber_ids: BTreeSet::from([subscriber_id.into()]),
            wifi_network_keys: BTreeSet::new(),
            meteredness: Meteredness::Metered,
        }
    }

    /// Metered template over any cellular traffic
    pub fn mobile() -> Self {
        Self {
            match_rule: MatchRule::Mobile,
            subscriber_ids: BTreeSet::new(),
            wifi_network_keys: BTreeSet::new(),
            meteredness: Meteredness::Metered,
        }
    }

    /// Template over all Wi-Fi traffic
    pub fn wifi() -> Self {
        Self {
            match_rule: MatchRule::Wifi,
            subscriber_ids: BTreeSet::new(),
            wifi_network_keys: BTreeSet::new(),
            meteredness: Meteredness::All,
        }
    }

    /// Same template restricted to the given Wi-Fi network keys
    pub fn with_wifi_network_keys<I, S>(mut self, keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.wifi_network_keys = keys.into_iter().map(Into::into).collect();
        self
    }

    /// Matching rule
    #[inline]
    pub fn match_rule(&self) -> MatchRule {
        self.match_rule
    }

    /// Subscriber identities matched
    #[inline]
    pub fn subscriber_ids(&self) -> &BTreeSet<String> {
        &self.subscriber_ids
    }

    /// First subscriber identity, if any
    pub fn first_subscriber_id(&self) -> Option<&str> {
        self.subscriber_ids.iter().next().map(String::as_str)
    }

    /// Wi-Fi network keys matched
    #[inline]
    pub fn wifi_network_keys(&self) -> &BTreeSet<String> {
        &self.wifi_network_keys
    }

    /// Meteredness filter
    #[inline]
    pub fn meteredness(&self) -> Meteredness {
        self.meteredness
    }

    /// Whether only metered traffic is counted
    pub fn is_metered(&self) -> bool {
        self.meteredness == Meteredness::Metered
    }

    /// Whether traffic seen on `transport` is selected by this template.
    ///
    /// Meteredness is not considered; callers filter on it separately.
    pub fn matches(
        &self,
        transport: Transport,
        subscriber_id: Option<&str>,
        wifi_network_key: Option<&str>,
    ) -> bool {
        match (self.match_rule, transport) {
            (MatchRule::Carrier, Transport::Mobile) => {
                subscriber_id.is_some_and(|id| self.subscriber_ids.contains(id))
            }
            (MatchRule::Mobile, Transport::Mobile) => true,
            (MatchRule::Wifi, Transport::Wifi) => {
                self.wifi_network_keys.is_empty()
                    || wifi_network_key.is_some_and(|key| self.wifi_network_keys.contains(key))
            }
            _ => false,
        }
    }

    /// Copy with the identity set replaced by a merged group.
    ///
    /// Callers guarantee `merged` contains this template's identity, so the
    /// set only grows and a carrier template stays non-empty.
    pub(crate) fn widened_to(&self, merged: &BTreeSet<String>) -> Self {
        debug_assert!(merged.is_superset(&self.subscriber_ids));
        Self {
            match_rule: self.match_rule,
            subscriber_ids: merged.clone(),
            wifi_network_keys: self.wifi_network_keys.clone(),
            meteredness: Meteredness::Metered,
        }
    }
}

impl fmt::Display for NetworkTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self.match_rule)?;
        if !self.subscriber_ids.is_empty() {
            let ids: Vec<&str> = self.subscriber_ids.iter().map(String::as_str).collect();
            write!(f, " subscribers=[{}]", ids.join(","))?;
        }
        if !self.wifi_network_keys.is_empty() {
            let keys: Vec<&str> = self.wifi_network_keys.iter().map(String::as_str).collect();
            write!(f, " wifi_keys=[{}]", keys.join(","))?;
        }
        write!(f, " meteredness={:?}", self.meteredness)
    }
}

/// Builder that enforces the template invariants
#[derive(Debug, Clone, Deserialize)]
pub struct TemplateBuilder {
    match_rule: MatchRule,
    #[serde(default)]
    subscriber_ids: BTreeSet<String>,
    #[serde(default)]
    wifi_network_keys: BTreeSet<String>,
    #[serde(default)]
    meteredness: Meteredness,
}

impl TemplateBuilder {
    /// New builder for a rule
    pub fn new(match_rule: MatchRule) -> Self {
        Self {
            match_rule,
            subscriber_ids: BTreeSet::new(),
            wifi_network_keys: BTreeSet::new(),
            meteredness: Meteredness::All,
        }
    }

    /// Set subscriber identities
    pub fn subscriber_ids<I, S>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.subscriber_ids = ids.into_iter().map(Into::into).collect();
        self
    }

    /// Set Wi-Fi network keys
    pub fn wifi_network_keys<I, S>(mut self, keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.wifi_network_keys = keys.into_iter().map(Into::into).collect();
        self
    }

    /// Set meteredness
    pub fn meteredness(mut self, meteredness: Meteredness) -> Self {
        self.meteredness = meteredness;
        self
    }

    /// Validate and build
    pub fn build(self) -> UsageResult<NetworkTemplate> {
        match self.match_rule {
            MatchRule::Carrier if self.subscriber_ids.is_empty() => {
                return Err(UsageError::MalformedInput(
                    "carrier template requires at least one subscriber id".into(),
                ));
            }
            MatchRule::Mobile | MatchRule::Wifi if !self.subscriber_ids.is_empty() => {
                return Err(UsageError::MalformedInput(format!(
                    "{:?} template cannot carry subscriber ids",
                    self.match_rule
                )));
            }
            _ => {}
        }

        Ok(NetworkTemplate {
            match_rule: self.match_rule,
            subscriber_ids: self.subscriber_ids,
            wifi_network_keys: self.wifi_network_keys,
            meteredness: self.meteredness,
        })
    }
}

impl TryFrom<TemplateBuilder> for NetworkTemplate {
    type Error = UsageError;

    fn try_from(builder: TemplateBuilder) -> UsageResult<Self> {
        builder.build()
    }
}
