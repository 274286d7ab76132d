//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the client.
//! All types derive Serde traits for deserialization from config files.

use alloy::primitives::{address, Address};
use serde::{Deserialize, Serialize};

/// Root configuration for the protocol client.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct ClientConfig {
    /// RPC endpoints, expected chain and confirmation policy.
    pub network: NetworkConfig,

    /// Deployed protocol contract addresses.
    pub contracts: ContractAddresses,

    /// Fractional-digit counts and symbols of the pool tokens.
    pub assets: AssetsConfig,

    /// Swap defaults.
    pub trading: TradingConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Network configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct NetworkConfig {
    /// JSON-RPC endpoint URL.
    pub rpc_url: String,

    /// Failover JSON-RPC endpoint URLs, tried in order for reads.
    pub failover_urls: Vec<String>,

    /// Expected chain ID (11155111 for Sepolia, 31337 for local Anvil).
    pub chain_id: u64,

    /// RPC request timeout in seconds.
    pub rpc_timeout_secs: u64,

    /// Number of blocks (inclusion block counted) before a transaction is confirmed.
    pub confirmation_blocks: u32,

    /// Maximum time to watch a single transaction before giving up on it.
    pub confirmation_timeout_secs: u64,

    /// Receipt polling interval in milliseconds.
    pub poll_interval_ms: u64,

    /// Maximum gas price in gwei (protection against spikes).
    pub max_gas_price_gwei: u64,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            rpc_url: "http://127.0.0.1:8545".to_string(),
            failover_urls: Vec::new(),
            chain_id: 11_155_111,
            rpc_timeout_secs: 10,
            confirmation_blocks: 1,
            confirmation_timeout_secs: 300,
            poll_interval_ms: 2_000,
            max_gas_price_gwei: 500,
        }
    }
}

/// Addresses of the protocol contracts.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ContractAddresses {
    /// Constant-product BLX/USDC pool (also the LP token).
    pub pool: Address,
    /// BLX token.
    pub blx_token: Address,
    /// USDC token.
    pub usdc_token: Address,
    /// Tiered (fixed-lock) staking.
    pub tiered_staking: Address,
    /// Liquid staking. The zero address disables every liquid-staking query.
    pub liquid_staking: Address,
    /// stBLX receipt token.
    pub staked_blx: Address,
    /// Locked-deposit vault.
    pub vault: Address,
}

impl Default for ContractAddresses {
    fn default() -> Self {
        Self {
            pool: address!("5bCAE371B52A8a497f4Cb9178E14C137141B0c13"),
            blx_token: address!("050F2D144cAdB54Ae304c234F273B0124a126dB5"),
            usdc_token: address!("1D68BE240D1A9e527410B017075868bc543E7538"),
            tiered_staking: address!("Fb3FaC0BDf5dB9c11857F6e0cBedC4f13147D06c"),
            liquid_staking: address!("74534A5ca5793E338ccDB6De58dA5662B05070C5"),
            staked_blx: address!("ec16eE9362d310D42DF579AdA7e627fAf99F6FA7"),
            vault: address!("0C7468Bd1eca2BD7d39aE496234427cD7FEb8344"),
        }
    }
}

impl ContractAddresses {
    /// Liquid staking is optional on some deployments.
    pub fn liquid_staking_enabled(&self) -> bool {
        self.liquid_staking != Address::ZERO
    }
}

/// Per-asset configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AssetConfig {
    /// Ticker symbol.
    pub symbol: String,
    /// Number of fractional digits in the base-unit representation.
    pub decimals: u8,
}

/// Pool token configuration. LP and stBLX tokens share BLX's precision.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AssetsConfig {
    pub blx: AssetConfig,
    pub usdc: AssetConfig,
}

impl Default for AssetsConfig {
    fn default() -> Self {
        Self {
            blx: AssetConfig {
                symbol: "BLX".to_string(),
                decimals: 18,
            },
            usdc: AssetConfig {
                symbol: "USDC".to_string(),
                decimals: 18,
            },
        }
    }
}

/// Swap defaults.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TradingConfig {
    /// Slippage tolerance applied to quotes when deriving minimum outputs.
    pub slippage_bps: u16,

    /// Fee used for local quotes until the pool's own fee has been fetched.
    pub fallback_swap_fee_bps: u16,
}

impl Default for TradingConfig {
    fn default() -> Self {
        Self {
            slippage_bps: 100,
            fallback_swap_fee_bps: 30,
        }
    }
}

/// Logging and metrics settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Default `EnvFilter` directive when `RUST_LOG` is unset.
    pub log_filter: String,

    /// Expose Prometheus metrics.
    pub metrics_enabled: bool,

    /// Metrics listener address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_filter: "blx_client=info,blx_cli=info".to_string(),
            metrics_enabled: false,
            metrics_address: "127.0.0.1:9464".to_string(),
        }
    }
}
