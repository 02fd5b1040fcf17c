//! Configuration types for the mine scheduler

use crate::error::{MinerError, Result};
use serde::Deserialize;

/// Runtime configuration for block production scheduling
///
/// Immutable for the lifetime of a scheduler instance. The invariant
/// `block_interval_ms < timeout_ms` is checked by [`MinerConfig::validate`],
/// which the scheduler constructor calls.
#[derive(Clone, Debug, Deserialize)]
pub struct MinerConfig {
    /// Minimum spacing between consecutive blocks (milliseconds)
    pub block_interval_ms: u64,

    /// Duration of one deputy's exclusive production slot (milliseconds)
    pub timeout_ms: u64,

    /// Opaque extra data carried into every production request
    #[serde(default)]
    pub extra_data: Vec<u8>,
}

impl Default for MinerConfig {
    fn default() -> Self {
        Self {
            block_interval_ms: crate::DEFAULT_BLOCK_INTERVAL_MS,
            timeout_ms: crate::DEFAULT_TIMEOUT_MS,
            extra_data: Vec::new(),
        }
    }
}

impl MinerConfig {
    /// Validate the configuration invariants
    pub fn validate(&self) -> Result<()> {
        if self.timeout_ms == 0 {
            return Err(MinerError::InvalidConfig(
                "slot timeout must be positive".to_string(),
            ));
        }
        if self.block_interval_ms >= self.timeout_ms {
            return Err(MinerError::InvalidConfig(format!(
                "block interval {} ms must be smaller than slot timeout {} ms",
                self.block_interval_ms, self.timeout_ms
            )));
        }
        if self.extra_data.len() > crate::MAX_EXTRA_DATA_LEN {
            return Err(MinerError::InvalidConfig(format!(
                "extra data is {} bytes, maximum is {}",
                self.extra_data.len(),
                crate::MAX_EXTRA_DATA_LEN
            )));
        }
        Ok(())
    }

    /// Time budget handed to the block assembler (milliseconds)
    ///
    /// Two thirds of the slot remainder after the block interval; the
    /// last third of the slot is reserved for propagating the sealed
    /// block to peers before the slot closes.
    pub fn produce_budget_ms(&self) -> u64 {
        (self.timeout_ms - self.block_interval_ms) * 2 / 3
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = MinerConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.block_interval_ms, crate::DEFAULT_BLOCK_INTERVAL_MS);
        assert_eq!(config.timeout_ms, crate::DEFAULT_TIMEOUT_MS);
        assert!(config.extra_data.is_empty());
    }

    #[test]
    fn test_interval_must_be_below_timeout() {
        let config = MinerConfig {
            block_interval_ms: 10_000,
            timeout_ms: 10_000,
            extra_data: Vec::new(),
        };
        assert!(matches!(
            config.validate(),
            Err(MinerError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_extra_data_bounded() {
        let config = MinerConfig {
            extra_data: vec![0u8; crate::MAX_EXTRA_DATA_LEN + 1],
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let config = MinerConfig {
            extra_data: vec![0u8; crate::MAX_EXTRA_DATA_LEN],
            ..Default::default()
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_produce_budget() {
        // Two thirds of (10_000 - 3_000).
        let config = MinerConfig::default();
        assert_eq!(config.produce_budget_ms(), 4_666);
    }
}
