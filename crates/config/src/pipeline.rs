//! Pipeline configuration
//!
//! Admission caps for the event collector and the in-memory packet limit.
//!
//! # Defaults
//!
//! - `soft_cap`: 32 - above this, only high-priority events are admitted
//! - `hard_cap`: 64 - above this, everything is rejected
//! - `packet_limit`: 40 - buffered packets that trigger a flush to disk

use serde::Deserialize;

/// Event admission and packet buffering configuration
///
/// # Example
///
/// ```toml
/// [pipeline]
/// soft_cap = 16
/// hard_cap = 48
/// packet_limit = 25
/// ```
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Pending-dispatch count above which only high-priority events are admitted
    /// Default: 32
    pub soft_cap: usize,

    /// Pending-dispatch count above which all events are rejected
    /// Default: 64
    pub hard_cap: usize,

    /// Buffered packet count that triggers a flush to the store
    /// Default: 40
    pub packet_limit: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            soft_cap: 32,
            hard_cap: 64,
            packet_limit: 40,
        }
    }
}
