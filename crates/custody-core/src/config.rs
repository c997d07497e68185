//! Ledger configuration
//!
//! Loaded from TOML or built from defaults. Values are validated before a
//! ledger is constructed.

use crate::errors::{CustodyError, CustodyResult};
use crate::identity::Amount;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Upper bound on lock-listing page sizes; every size in `1..=100` is valid.
pub const MAX_PAGE_SIZE: usize = 100;

/// Top-level ledger configuration
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LedgerConfig {
    /// Staking policy defaults
    pub staking: StakingConfig,
    /// Event publication settings
    pub events: EventConfig,
}

/// Staking policy defaults
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StakingConfig {
    /// Whether registered slots require a stake
    pub required: bool,
    /// Tokens required per slot
    pub stake_per_slot: Amount,
}

/// Event publication settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EventConfig {
    /// Receipts buffered per subscriber before lagging ones drop
    pub channel_capacity: usize,
}

impl Default for EventConfig {
    fn default() -> Self {
        Self {
            channel_capacity: 256,
        }
    }
}

impl LedgerConfig {
    /// Parse and validate a TOML document
    pub fn from_toml_str(content: &str) -> CustodyResult<Self> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a TOML file
    pub fn load_from_file(path: &Path) -> CustodyResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            CustodyError::config(format!("failed to read {}: {e}", path.display()))
        })?;
        tracing::debug!(path = %path.display(), "loading ledger configuration");
        Self::from_toml_str(&content)
    }

    /// Check value ranges
    pub fn validate(&self) -> CustodyResult<()> {
        if self.events.channel_capacity == 0 {
            return Err(CustodyError::config(
                "events.channel_capacity must be greater than 0",
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use std::io::Write;

    #[test]
    fn defaults_are_valid() {
        let config = LedgerConfig::default();
        assert!(config.validate().is_ok());
        assert!(!config.staking.required);
    }

    #[test]
    fn partial_toml_keeps_defaults() {
        let config = LedgerConfig::from_toml_str(
            r#"
            [staking]
            required = true
            stake_per_slot = 50
            "#,
        )
        .unwrap();
        assert!(config.staking.required);
        assert_eq!(config.staking.stake_per_slot, 50);
        assert_eq!(config.events.channel_capacity, 256);
    }

    #[test]
    fn rejects_zero_channel_capacity() {
        assert_matches!(
            LedgerConfig::from_toml_str("[events]\nchannel_capacity = 0"),
            Err(CustodyError::Config { .. })
        );
    }

    #[test]
    fn loads_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[staking]\nrequired = true\n[events]\nchannel_capacity = 8").unwrap();

        let config = LedgerConfig::load_from_file(file.path()).unwrap();
        assert!(config.staking.required);
        assert_eq!(config.events.channel_capacity, 8);
    }

    #[test]
    fn missing_file_is_config_error() {
        let result = LedgerConfig::load_from_file(Path::new("/nonexistent/custody.toml"));
        assert_matches!(result, Err(CustodyError::Config { .. }));
    }
}
