//! Router configuration.
//!
//! The fixed collaborators a router talks to without a registry lookup.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::{Address, MixerError, Result, constants};

/// Configuration for a single router deployment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouterConfig {
    /// Fungible representation of the chain's native value.
    pub wrapped_native: Address,
    /// Fixed-interface AMM swap venue.
    pub amm: Address,
    /// Aggregator swap venue receiving forwarded payloads.
    pub aggregator: Address,
    /// Voting-escrow locker for the governance token.
    pub ve_locker: Address,
    /// Upper bound on actions in one invocation.
    #[serde(default = "default_max_actions")]
    pub max_actions_per_call: usize,
}

fn default_max_actions() -> usize {
    constants::DEFAULT_MAX_ACTIONS_PER_CALL
}

impl RouterConfig {
    /// Parse and validate a JSON configuration.
    ///
    /// # Errors
    /// `Configuration` if the text is not a valid config, `ZeroAddress` if a
    /// collaborator is unset.
    pub fn from_json(text: &str) -> Result<Self> {
        let config: Self =
            serde_json::from_str(text).map_err(|e| MixerError::Configuration(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a JSON configuration file.
    ///
    /// # Errors
    /// `Io` if the file cannot be read, otherwise as [`RouterConfig::from_json`].
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json(&text)
    }

    /// Reject zero addresses and a zero action limit.
    ///
    /// # Errors
    /// `ZeroAddress` or `Configuration`.
    pub fn validate(&self) -> Result<()> {
        let addresses = [self.wrapped_native, self.amm, self.aggregator, self.ve_locker];
        if addresses.iter().any(Address::is_zero) {
            return Err(MixerError::ZeroAddress);
        }
        if self.max_actions_per_call == 0 {
            return Err(MixerError::Configuration(
                "max_actions_per_call must be > 0".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_config() -> RouterConfig {
        RouterConfig {
            wrapped_native: Address::derive(b"WETH"),
            amm: Address::derive(b"amm"),
            aggregator: Address::derive(b"aggregator"),
            ve_locker: Address::derive(b"ve"),
            max_actions_per_call: 16,
        }
    }

    #[test]
    fn json_roundtrip_validates() {
        let cfg = make_config();
        let json = serde_json::to_string(&cfg).unwrap();
        let back = RouterConfig::from_json(&json).unwrap();
        assert_eq!(cfg, back);
    }

    #[test]
    fn missing_limit_uses_default() {
        let mut value = serde_json::to_value(make_config()).unwrap();
        value.as_object_mut().unwrap().remove("max_actions_per_call");
        let cfg = RouterConfig::from_json(&value.to_string()).unwrap();
        assert_eq!(cfg.max_actions_per_call, constants::DEFAULT_MAX_ACTIONS_PER_CALL);
    }

    #[test]
    fn zero_collaborator_rejected() {
        let mut cfg = make_config();
        cfg.aggregator = Address::ZERO;
        assert!(matches!(cfg.validate(), Err(MixerError::ZeroAddress)));
    }

    #[test]
    fn garbage_is_configuration_error() {
        let err = RouterConfig::from_json("{ not json").unwrap_err();
        assert!(matches!(err, MixerError::Configuration(_)));
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = RouterConfig::from_file("/nonexistent/stablemix.json").unwrap_err();
        assert!(matches!(err, MixerError::Io(_)));
    }
}
