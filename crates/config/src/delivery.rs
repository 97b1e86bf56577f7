//! Delivery configuration
//!
//! Network policy for the background delivery worker. Delivery normally
//! requires Wi-Fi or ethernet; `allow_cellular` is a debug override that
//! also admits metered transports.

use serde::Deserialize;

/// Delivery worker configuration
///
/// # Example
///
/// ```toml
/// [delivery]
/// allow_cellular = true
/// ```
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DeliveryConfig {
    /// Permit delivery over cellular transports
    /// Default: false
    pub allow_cellular: bool,
}

impl Default for DeliveryConfig {
    fn default() -> Self {
        Self {
            allow_cellular: false,
        }
    }
}
