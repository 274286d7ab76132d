//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (timeouts > 0, basis points ≤ 10 000)
//! - Check every required contract address is set
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: ClientConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use alloy::primitives::Address;
use thiserror::Error;

use crate::codec::asset::MAX_DECIMALS;
use crate::config::schema::ClientConfig;

/// A single semantic problem in a configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("invalid RPC URL '{url}': {reason}")]
    InvalidRpcUrl { url: String, reason: String },

    #[error("chain_id must be non-zero")]
    ZeroChainId,

    #[error("{field} must be greater than zero")]
    ZeroDuration { field: &'static str },

    #[error("contract address '{name}' must not be the zero address")]
    MissingContract { name: &'static str },

    #[error("asset {symbol} declares {decimals} decimals (maximum {max})")]
    TooManyDecimals { symbol: String, decimals: u8, max: u8 },

    #[error("{field} is {value} bps (maximum 10000)")]
    BasisPointsOutOfRange { field: &'static str, value: u16 },
}

/// Validate a parsed configuration, collecting every problem found.
pub fn validate_config(config: &ClientConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();
    let network = &config.network;

    for url in std::iter::once(&network.rpc_url).chain(network.failover_urls.iter()) {
        if let Err(e) = url.parse::<url::Url>() {
            errors.push(ValidationError::InvalidRpcUrl {
                url: url.clone(),
                reason: e.to_string(),
            });
        }
    }

    if network.chain_id == 0 {
        errors.push(ValidationError::ZeroChainId);
    }

    let durations = [
        ("network.rpc_timeout_secs", network.rpc_timeout_secs),
        ("network.confirmation_timeout_secs", network.confirmation_timeout_secs),
        ("network.poll_interval_ms", network.poll_interval_ms),
        ("network.confirmation_blocks", u64::from(network.confirmation_blocks)),
    ];
    for (field, value) in durations {
        if value == 0 {
            errors.push(ValidationError::ZeroDuration { field });
        }
    }

    // Liquid staking may legitimately be undeployed.
    let contracts = &config.contracts;
    let required = [
        ("pool", contracts.pool),
        ("blx_token", contracts.blx_token),
        ("usdc_token", contracts.usdc_token),
        ("tiered_staking", contracts.tiered_staking),
        ("vault", contracts.vault),
    ];
    for (name, addr) in required {
        if addr == Address::ZERO {
            errors.push(ValidationError::MissingContract { name });
        }
    }

    for asset in [&config.assets.blx, &config.assets.usdc] {
        if asset.decimals > MAX_DECIMALS {
            errors.push(ValidationError::TooManyDecimals {
                symbol: asset.symbol.clone(),
                decimals: asset.decimals,
                max: MAX_DECIMALS,
            });
        }
    }

    let bps = [
        ("trading.slippage_bps", config.trading.slippage_bps),
        ("trading.fallback_swap_fee_bps", config.trading.fallback_swap_fee_bps),
    ];
    for (field, value) in bps {
        if value > 10_000 {
            errors.push(ValidationError::BasisPointsOutOfRange { field, value });
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(validate_config(&ClientConfig::default()).is_ok());
    }

    #[test]
    fn test_collects_all_errors() {
        let mut config = ClientConfig::default();
        config.network.rpc_url = "not a url".to_string();
        config.contracts.vault = Address::ZERO;
        config.trading.slippage_bps = 20_000;
        config.assets.usdc.decimals = 90;

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 4);
        assert!(errors.contains(&ValidationError::MissingContract { name: "vault" }));
        assert!(errors.contains(&ValidationError::BasisPointsOutOfRange {
            field: "trading.slippage_bps",
            value: 20_000,
        }));
    }

    #[test]
    fn test_zero_liquid_staking_is_allowed() {
        let mut config = ClientConfig::default();
        config.contracts.liquid_staking = Address::ZERO;
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_bad_failover_url() {
        let mut config = ClientConfig::default();
        config.network.failover_urls.push("::::".to_string());
        let errors = validate_config(&config).unwrap_err();
        assert!(matches!(errors[0], ValidationError::InvalidRpcUrl { .. }));
    }
}
