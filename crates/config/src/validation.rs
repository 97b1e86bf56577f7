//! Configuration validation
//!
//! Cross-field checks run after parsing. Parsing accepts any well-formed
//! TOML; validation rejects configurations the pipeline cannot run with.

use crate::error::{ConfigError, Result};
use crate::Config;

/// Smallest accepted store file name clamp
///
/// Below this, destination names could no longer be told apart after
/// clamping.
const MIN_FILE_NAME_LEN: usize = 16;

/// Validate a parsed configuration
pub fn validate(config: &Config) -> Result<()> {
    validate_pipeline(config)?;
    validate_store(config)?;
    Ok(())
}

fn validate_pipeline(config: &Config) -> Result<()> {
    let pipeline = &config.pipeline;

    if pipeline.hard_cap == 0 {
        return Err(ConfigError::invalid_value(
            "pipeline",
            "hard_cap",
            "must be greater than zero",
        ));
    }

    if pipeline.soft_cap > pipeline.hard_cap {
        return Err(ConfigError::invalid_value(
            "pipeline",
            "soft_cap",
            format!(
                "must not exceed hard_cap ({} > {})",
                pipeline.soft_cap, pipeline.hard_cap
            ),
        ));
    }

    if pipeline.packet_limit == 0 {
        return Err(ConfigError::invalid_value(
            "pipeline",
            "packet_limit",
            "must be greater than zero",
        ));
    }

    Ok(())
}

fn validate_store(config: &Config) -> Result<()> {
    let store = &config.store;

    if store.directory.as_os_str().is_empty() {
        return Err(ConfigError::missing_field("store", "directory"));
    }

    if store.max_cache_size == 0 {
        return Err(ConfigError::invalid_value(
            "store",
            "max_cache_size",
            "must be greater than zero",
        ));
    }

    // Shard suffix is a single digit, so at most 9 candidates.
    if store.max_files_per_destination == 0 || store.max_files_per_destination > 9 {
        return Err(ConfigError::invalid_value(
            "store",
            "max_files_per_destination",
            format!("must be 1..=9, got {}", store.max_files_per_destination),
        ));
    }

    if store.max_file_name_len < MIN_FILE_NAME_LEN {
        return Err(ConfigError::invalid_value(
            "store",
            "max_file_name_len",
            format!("must be at least {}", MIN_FILE_NAME_LEN),
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_default_config_is_valid() {
        let config = Config::default();
        assert!(validate(&config).is_ok());
    }

    #[test]
    fn test_soft_cap_above_hard_cap_rejected() {
        let config = Config::from_str("[pipeline]\nsoft_cap = 100\nhard_cap = 50").unwrap();
        let err = validate(&config).unwrap_err();
        assert!(err.to_string().contains("soft_cap"));
    }

    #[test]
    fn test_zero_hard_cap_rejected() {
        let config = Config::from_str("[pipeline]\nhard_cap = 0").unwrap();
        assert!(validate(&config).is_err());
    }

    #[test]
    fn test_zero_packet_limit_rejected() {
        let config = Config::from_str("[pipeline]\npacket_limit = 0").unwrap();
        assert!(validate(&config).is_err());
    }

    #[test]
    fn test_empty_directory_rejected() {
        let config = Config::from_str("[store]\ndirectory = \"\"").unwrap();
        let err = validate(&config).unwrap_err();
        assert!(err.to_string().contains("directory"));
    }

    #[test]
    fn test_zero_cache_size_rejected() {
        let config = Config::from_str("[store]\nmax_cache_size = 0").unwrap();
        assert!(validate(&config).is_err());
    }

    #[test]
    fn test_too_many_shards_rejected() {
        let config = Config::from_str("[store]\nmax_files_per_destination = 10").unwrap();
        let err = validate(&config).unwrap_err();
        assert!(err.to_string().contains("1..=9"));
    }

    #[test]
    fn test_tiny_file_name_clamp_rejected() {
        let config = Config::from_str("[store]\nmax_file_name_len = 4").unwrap();
        assert!(validate(&config).is_err());
    }
}
