//! Active network inspection

use netusage_common::Transport;
use parking_lot::RwLock;
use std::collections::BTreeSet;

/// Reports the transports of the currently active network path
pub trait ActiveNetworkInspector: Send + Sync {
    /// Transports of the active network; `None` when there is no active network
    fn active_network_transports(&self) -> Option<BTreeSet<Transport>>;

    /// Whether the active path is Wi-Fi; no active network is not Wi-Fi
    fn is_wifi_active(&self) -> bool {
        self.active_network_transports()
            .is_some_and(|transports| transports.contains(&Transport::Wifi))
    }
}

/// Inspector returning a settable transport set
#[derive(Debug, Default)]
pub struct StaticNetworkInspector {
    active: RwLock<Option<BTreeSet<Transport>>>,
}

impl StaticNetworkInspector {
    /// Inspector with the given active transports
    pub fn new(active: Option<BTreeSet<Transport>>) -> Self {
        Self {
            active: RwLock::new(active),
        }
    }

    /// Inspector whose active path is the single transport given
    pub fn with_transport(transport: Transport) -> Self {
        Self::new(Some(BTreeSet::from([transport])))
    }

    /// Replace the active transport set
    pub fn set_active(&self, active: Option<BTreeSet<Transport>>) {
        *self.active.write() = active;
    }
}

impl ActiveNetworkInspector for StaticNetworkInspector {
    fn active_network_transports(&self) -> Option<BTreeSet<Transport>> {
        self.active.read().clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wifi_detection() {
        let inspector = StaticNetworkInspector::default();
        assert!(!inspector.is_wifi_active());

        inspector.set_active(Some(BTreeSet::new()));
        assert!(!inspector.is_wifi_active());

        inspector.set_active(Some(BTreeSet::from([Transport::Mobile])));
        assert!(!inspector.is_wifi_active());

        inspector.set_active(Some(BTreeSet::from([Transport::Wifi, Transport::Mobile])));
        assert!(inspector.is_wifi_active());

        assert!(StaticNetworkInspector::with_transport(Transport::Wifi).is_wifi_active());
    }
}
