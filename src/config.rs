//! Miner configuration
//!
//! Handles loading the proof-of-work budget and target cap from TOML.

use std::path::Path;
use std::time::{Duration, Instant};

use primitive_types::U256;
use serde::{Deserialize, Serialize};

use crate::constants::{DEFAULT_MAX_ATTEMPTS, DEFAULT_MAX_TARGET_HEX};
use crate::error::{Result, WireError};
use crate::pow::SearchLimits;

/// Nonce search configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MinerConfig {
    /// Network maximum target, big-endian hex
    #[serde(default = "default_max_target_hex")]
    pub max_target_hex: String,

    /// Hash attempts per search (`None` = unbounded)
    #[serde(default = "default_max_attempts")]
    pub max_attempts: Option<u64>,

    /// Wall-clock budget per search in milliseconds
    #[serde(default)]
    pub time_budget_ms: Option<u64>,

    /// Parallel search workers
    #[serde(default = "default_workers")]
    pub workers: usize,

    /// Fixed starting nonce for reproducible runs
    #[serde(default)]
    pub start_nonce: Option<u64>,
}

fn default_max_target_hex() -> String {
    DEFAULT_MAX_TARGET_HEX.to_string()
}

fn default_max_attempts() -> Option<u64> {
    Some(DEFAULT_MAX_ATTEMPTS)
}

fn default_workers() -> usize {
    1
}

impl Default for MinerConfig {
    fn default() -> Self {
        Self {
            max_target_hex: default_max_target_hex(),
            max_attempts: default_max_attempts(),
            time_budget_ms: None,
            workers: default_workers(),
            start_nonce: None,
        }
    }
}

impl MinerConfig {
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        let config: MinerConfig = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Load config from file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = std::fs::read_to_string(path.as_ref()).map_err(|e| {
            WireError::Config(format!("Failed to read config file: {}", e))
        })?;
        Self::from_toml_str(&contents)
    }

    /// Parsed maximum target
    pub fn max_target(&self) -> Result<U256> {
        let bytes = hex::decode(self.max_target_hex.trim_start_matches("0x"))?;
        if bytes.is_empty() || bytes.len() > 32 {
            return Err(WireError::Config(format!(
                "max_target_hex must be 1..=32 bytes, got {}",
                bytes.len()
            )));
        }
        Ok(U256::from_big_endian(&bytes))
    }

    /// Search limits starting now
    pub fn limits(&self) -> SearchLimits {
        SearchLimits {
            max_attempts: self.max_attempts,
            deadline: self
                .time_budget_ms
                .map(|ms| Instant::now() + Duration::from_millis(ms)),
            start_nonce: self.start_nonce,
        }
    }

    fn validate(&self) -> Result<()> {
        if self.workers == 0 {
            return Err(WireError::Config("workers must be at least 1".to_string()));
        }
        self.max_target()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = MinerConfig::default();
        assert_eq!(config.max_target().unwrap(), (U256::one() << 255) - U256::one());
        assert_eq!(config.max_attempts, Some(DEFAULT_MAX_ATTEMPTS));
        assert_eq!(config.workers, 1);
    }

    #[test]
    fn test_empty_toml_uses_defaults() {
        let config = MinerConfig::from_toml_str("").unwrap();
        assert_eq!(config, MinerConfig::default());
    }

    #[test]
    fn test_toml_overrides() {
        let config = MinerConfig::from_toml_str(
            r#"
            max_target_hex = "00ff"
            max_attempts = 10
            time_budget_ms = 500
            workers = 4
            start_nonce = 7
            "#,
        )
        .unwrap();
        assert_eq!(config.max_target().unwrap(), U256::from(0xffu64));
        assert_eq!(config.max_attempts, Some(10));
        assert_eq!(config.workers, 4);

        let limits = config.limits();
        assert_eq!(limits.start_nonce, Some(7));
        assert!(limits.deadline.is_some());
    }

    #[test]
    fn test_zero_workers_rejected() {
        assert!(matches!(MinerConfig::from_toml_str("workers = 0"), Err(WireError::Config(_))));
    }

    #[test]
    fn test_bad_toml_rejected() {
        assert!(matches!(MinerConfig::from_toml_str("workers = \"x\""), Err(WireError::Config(_))));
    }
}
