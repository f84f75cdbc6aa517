//! Capacity configuration for the matching core.
//!
//! Every structure is provisioned up front: order and level pools, the three
//! queues, the book-per-instrument array. Running out of any of these at
//! runtime is a provisioning bug, so the knobs here are the real safety
//! contract of the system.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::pool::NIL_INDEX;

#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[error("invalid engine config: {0}")]
pub struct ConfigError(pub &'static str);

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Books to instantiate; instrument ids 0..num_instruments are valid.
    pub num_instruments: usize,
    /// Order pool capacity per instrument.
    pub max_orders: u32,
    /// Price level pool capacity per instrument (distinct live prices, both
    /// sides combined).
    pub max_price_levels: u32,
    pub request_queue_capacity: usize,
    pub response_queue_capacity: usize,
    pub update_queue_capacity: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            num_instruments: 8,
            max_orders: 1 << 20,
            max_price_levels: 256,
            request_queue_capacity: 256 * 1024,
            response_queue_capacity: 256 * 1024,
            update_queue_capacity: 256 * 1024,
        }
    }
}

impl EngineConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.num_instruments == 0 {
            return Err(ConfigError("num_instruments must be non-zero"));
        }
        if self.num_instruments > u8::MAX as usize {
            return Err(ConfigError("num_instruments must fit in an instrument id"));
        }
        if self.max_orders == 0 || self.max_orders >= NIL_INDEX {
            return Err(ConfigError("max_orders must be in 1..NIL_INDEX"));
        }
        if self.max_price_levels == 0 || self.max_price_levels >= NIL_INDEX {
            return Err(ConfigError("max_price_levels must be in 1..NIL_INDEX"));
        }
        if self.request_queue_capacity == 0
            || self.response_queue_capacity == 0
            || self.update_queue_capacity == 0
        {
            return Err(ConfigError("queue capacities must be non-zero"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        assert!(EngineConfig::default().validate().is_ok());
    }

    #[test]
    fn zero_capacities_rejected() {
        let mut config = EngineConfig::default();
        config.max_orders = 0;
        assert!(config.validate().is_err());

        let mut config = EngineConfig::default();
        config.num_instruments = 0;
        assert!(config.validate().is_err());

        let mut config = EngineConfig::default();
        config.update_queue_capacity = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn serde_roundtrip() {
        let config = EngineConfig {
            num_instruments: 2,
            max_orders: 4096,
            ..EngineConfig::default()
        };
        let json = serde_json::to_string(&config).unwrap();
        let back: EngineConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back, config);
    }

    #[test]
    fn partial_config_fills_defaults() {
        let back: EngineConfig = serde_json::from_str(r#"{"num_instruments": 3}"#).unwrap();
        assert_eq!(back.num_instruments, 3);
        assert_eq!(back.max_price_levels, EngineConfig::default().max_price_levels);
    }
}
