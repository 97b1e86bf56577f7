//! Beacon Configuration
//!
//! TOML-based configuration loading with sensible defaults.
//! Minimal config should just work - only specify what you need to change.
//!
//! # Parsing
//!
//! Use the `FromStr` trait to parse configuration:
//!
//! ```
//! use beacon_config::Config;
//! use std::str::FromStr;
//!
//! let config = Config::from_str("[pipeline]\nsoft_cap = 16").unwrap();
//! assert_eq!(config.pipeline.soft_cap, 16);
//! ```
//!
//! # Example Full Config
//!
//! ```toml
//! [pipeline]
//! soft_cap = 32
//! hard_cap = 64
//! packet_limit = 40
//!
//! [store]
//! directory = "beacon-cache"
//! max_cache_size = 2097152
//! max_files_per_destination = 5
//! max_file_name_len = 64
//!
//! [delivery]
//! allow_cellular = false
//! ```

mod delivery;
mod error;
mod pipeline;
mod store;
mod validation;

use std::fs;
use std::path::Path;
use std::str::FromStr;

pub use delivery::DeliveryConfig;
pub use error::{ConfigError, Result};
pub use pipeline::PipelineConfig;
pub use store::StoreConfig;

use serde::Deserialize;

/// Main configuration structure
///
/// All sections are optional with sensible defaults.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Event admission and packet buffering
    pub pipeline: PipelineConfig,

    /// Disk cache location and limits
    pub store: StoreConfig,

    /// Delivery network policy
    pub delivery: DeliveryConfig,
}

impl Config {
    /// Load configuration from a TOML file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::IoError {
            path: path.display().to_string(),
            source,
        })?;
        contents.parse()
    }

    /// Validate cross-field constraints
    pub fn validate(&self) -> Result<()> {
        validation::validate(self)
    }
}

impl FromStr for Config {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self> {
        Ok(toml::from_str(s)?)
    }
}
