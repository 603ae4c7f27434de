//! Merged billing group normalization

use crate::template::NetworkTemplate;
use std::collections::BTreeSet;

/// Base template for a subscription's identity.
///
/// A known identity yields a metered carrier template over `{identity}`;
/// otherwise the metered generic mobile template.
pub fn template_for_subscription(subscriber_identity: Option<&str>) -> NetworkTemplate {
    match subscriber_identity {
        Some(identity) => NetworkTemplate::carrier(identity),
        None => NetworkTemplate::mobile(),
    }
}

/// Expand a template to its merged billing group.
///
/// Returns `base` unchanged when it has no identity or its identity is not
/// part of `merged`. Otherwise the identity set becomes `merged`, the rule
/// and Wi-Fi keys are kept and the template is forced metered.
pub fn normalize(base: &NetworkTemplate, merged: &BTreeSet<String>) -> NetworkTemplate {
    match base.first_subscriber_id() {
        Some(identity) if merged.contains(identity) => base.widened_to(merged),
        _ => base.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::template::{MatchRule, Meteredness};
    use proptest::prelude::*;

    fn set(ids: &[&str]) -> BTreeSet<String> {
        ids.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_base_template() {
        assert_eq!(
            template_for_subscription(Some("imsi-a")),
            NetworkTemplate::carrier("imsi-a")
        );
        assert_eq!(template_for_subscription(None), NetworkTemplate::mobile());
    }

    #[test]
    fn test_member_is_widened() {
        let base = NetworkTemplate::carrier("imsi-a");
        let merged = set(&["imsi-a", "imsi-b"]);
        let out = normalize(&base, &merged);

        assert_eq!(out.match_rule(), MatchRule::Carrier);
        assert_eq!(out.subscriber_ids(), &merged);
        assert!(out.is_metered());
    }

    #[test]
    fn test_non_member_unchanged() {
        let base = NetworkTemplate::carrier("imsi-z");
        assert_eq!(normalize(&base, &set(&["imsi-a", "imsi-b"])), base);
    }

    #[test]
    fn test_wifi_keys_carried_and_metered_forced() {
        let base = NetworkTemplate::builder(MatchRule::Carrier)
            .subscriber_ids(["imsi-a"])
            .wifi_network_keys(["key-1"])
            .meteredness(Meteredness::All)
            .build()
            .unwrap();
        let out = normalize(&base, &set(&["imsi-a", "imsi-c"]));

        assert_eq!(out.wifi_network_keys(), &set(&["key-1"]));
        assert_eq!(out.meteredness(), Meteredness::Metered);
    }

    proptest! {
        #[test]
        fn prop_empty_identity_is_fixed_point(merged in prop::collection::btree_set("[a-z0-9]{1,8}", 0..6)) {
            let mobile = NetworkTemplate::mobile();
            prop_assert_eq!(normalize(&mobile, &merged), mobile);
            let wifi = NetworkTemplate::wifi();
            prop_assert_eq!(normalize(&wifi, &merged), wifi);
        }

        #[test]
        fn prop_member_widens_to_merged_set(
            identity in "[a-z0-9]{1,8}",
            others in prop::collection::btree_set("[a-z0-9]{1,8}", 0..6),
        ) {
            let mut merged = others;
            merged.insert(identity.clone());
            let base = NetworkTemplate::carrier(identity);
            let out = normalize(&base, &merged);

            prop_assert_eq!(out.match_rule(), base.match_rule());
            prop_assert_eq!(out.subscriber_ids(), &merged);
            prop_assert!(out.subscriber_ids().is_superset(base.subscriber_ids()));
            prop_assert!(out.is_metered());
        }

        #[test]
        fn prop_never_narrows(
            identity in "[a-z0-9]{1,8}",
            merged in prop::collection::btree_set("[a-z0-9]{1,8}", 0..6),
        ) {
            let base = NetworkTemplate::carrier(identity);
            let out = normalize(&base, &merged);
            prop_assert!(out.subscriber_ids().is_superset(base.subscriber_ids()));
            prop_assert_eq!(out.match_rule(), MatchRule::Carrier);
        }
    }
}
