//! Store configuration
//!
//! Disk cache location and growth limits for persisted packet batches.
//!
//! # Defaults
//!
//! - `directory`: "beacon-cache"
//! - `max_cache_size`: 2 MiB across all store files
//! - `max_files_per_destination`: 5 shard candidates per destination
//! - `max_file_name_len`: 64 characters

use serde::Deserialize;
use std::path::PathBuf;

/// Disk store configuration
///
/// # Example
///
/// ```toml
/// [store]
/// directory = "/data/beacon"
/// max_cache_size = 4194304
/// ```
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Directory holding the per-destination store files
    /// Default: "beacon-cache"
    pub directory: PathBuf,

    /// Total byte budget across all store files; over-budget writes are dropped
    /// Default: 2 MiB
    pub max_cache_size: u64,

    /// Shard file candidates per destination, suffixes 0..n
    /// Default: 5 (at most 9 - the suffix is one digit)
    pub max_files_per_destination: u32,

    /// Maximum store file name length; longer names are clamped
    /// Default: 64
    pub max_file_name_len: usize,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            directory: PathBuf::from("beacon-cache"),
            max_cache_size: 2 * 1024 * 1024,
            max_files_per_destination: 5,
            max_file_name_len: 64,
        }
    }
}

impl StoreConfig {
    /// Create config with a custom cache directory
    #[must_use]
    pub fn with_directory(mut self, directory: impl Into<PathBuf>) -> Self {
        self.directory = directory.into();
        self
    }

    /// Create config with a custom cache byte budget
    #[must_use]
    pub fn with_max_cache_size(mut self, bytes: u64) -> Self {
        self.max_cache_size = bytes;
        self
    }
}
