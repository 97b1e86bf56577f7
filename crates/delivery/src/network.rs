//! Network state and delivery policy
//!
//! Background delivery must not burn mobile data: it requires Wi-Fi or
//! ethernet unless the cellular override is configured. The host supplies
//! the actual state through the `NetworkMonitor` trait; the pipeline only
//! asks "what transport is up right now".

use beacon_config::DeliveryConfig;

/// The transport currently carrying the device's traffic
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Transport {
    /// No connectivity
    Offline,
    /// Metered mobile data
    Cellular,
    /// Unmetered Wi-Fi
    Wifi,
    /// Wired connection (docked devices, emulators)
    Ethernet,
}

impl Transport {
    /// Get the string name of this transport
    #[inline]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Offline => "offline",
            Self::Cellular => "cellular",
            Self::Wifi => "wifi",
            Self::Ethernet => "ethernet",
        }
    }

    /// Check if this transport is unmetered
    #[inline]
    pub const fn is_unmetered(self) -> bool {
        matches!(self, Self::Wifi | Self::Ethernet)
    }
}

impl std::fmt::Display for Transport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Answers "what transport is available right now"
///
/// Supplied by the host application (connectivity manager, link watcher).
pub trait NetworkMonitor: Send + Sync {
    /// The transport currently available, `Offline` if none
    fn current_transport(&self) -> Transport;
}

/// Decides whether delivery may run on a transport
#[derive(Debug, Clone, Copy)]
pub struct DeliveryPolicy {
    /// Debug override admitting metered transports
    allow_cellular: bool,
}

impl DeliveryPolicy {
    /// Build the policy from configuration
    pub fn new(config: &DeliveryConfig) -> Self {
        Self {
            allow_cellular: config.allow_cellular,
        }
    }

    /// Check whether delivery may run on the given transport
    pub fn admits(&self, transport: Transport) -> bool {
        transport.is_unmetered() || (self.allow_cellular && transport == Transport::Cellular)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn policy(allow_cellular: bool) -> DeliveryPolicy {
        DeliveryPolicy::new(&DeliveryConfig { allow_cellular })
    }

    #[test]
    fn test_default_policy_requires_unmetered() {
        let p = policy(false);
        assert!(p.admits(Transport::Wifi));
        assert!(p.admits(Transport::Ethernet));
        assert!(!p.admits(Transport::Cellular));
        assert!(!p.admits(Transport::Offline));
    }

    #[test]
    fn test_cellular_override() {
        let p = policy(true);
        assert!(p.admits(Transport::Cellular));
        assert!(p.admits(Transport::Wifi));
        assert!(!p.admits(Transport::Offline));
    }

    #[test]
    fn test_transport_names() {
        assert_eq!(Transport::Wifi.to_string(), "wifi");
        assert_eq!(Transport::Offline.as_str(), "offline");
    }

    #[test]
    fn test_unmetered_classification() {
        assert!(Transport::Wifi.is_unmetered());
        assert!(Transport::Ethernet.is_unmetered());
        assert!(!Transport::Cellular.is_unmetered());
        assert!(!Transport::Offline.is_unmetered());
    }
}
