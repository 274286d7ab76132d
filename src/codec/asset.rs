//! Assets and their fixed precision.

use std::fmt;

use alloy::primitives::Address;
use serde::{Deserialize, Serialize};

use crate::config::{AssetsConfig, ContractAddresses};

/// Largest precision whose scale factor (10^decimals) still fits in a U256.
pub const MAX_DECIMALS: u8 = 77;

/// Protocol assets the client moves or displays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssetId {
    /// Protocol token (pool token0).
    Blx,
    /// Stable token (pool token1).
    Usdc,
    /// Pool liquidity token.
    Lp,
    /// Liquid-staking receipt token.
    StBlx,
}

impl AssetId {
    /// ERC-20 contract holding balances and allowances for this asset.
    pub fn token_address(self, contracts: &ContractAddresses) -> Address {
        match self {
            AssetId::Blx => contracts.blx_token,
            AssetId::Usdc => contracts.usdc_token,
            AssetId::Lp => contracts.pool,
            AssetId::StBlx => contracts.staked_blx,
        }
    }
}

impl fmt::Display for AssetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            AssetId::Blx => "BLX",
            AssetId::Usdc => "USDC",
            AssetId::Lp => "BLX-LP",
            AssetId::StBlx => "stBLX",
        };
        f.write_str(s)
    }
}

/// An asset definition. Immutable once configured.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Asset {
    pub id: AssetId,
    pub symbol: String,
    pub decimals: u8,
}

/// All assets known to the client, built once from configuration.
#[derive(Debug, Clone)]
pub struct AssetRegistry {
    blx: Asset,
    usdc: Asset,
    lp: Asset,
    st_blx: Asset,
}

impl AssetRegistry {
    /// Build the registry. LP and stBLX use BLX precision.
    pub fn from_config(config: &AssetsConfig) -> Self {
        let blx_decimals = config.blx.decimals;
        Self {
            blx: Asset {
                id: AssetId::Blx,
                symbol: config.blx.symbol.clone(),
                decimals: blx_decimals,
            },
            usdc: Asset {
                id: AssetId::Usdc,
                symbol: config.usdc.symbol.clone(),
                decimals: config.usdc.decimals,
            },
            lp: Asset {
                id: AssetId::Lp,
                symbol: AssetId::Lp.to_string(),
                decimals: blx_decimals,
            },
            st_blx: Asset {
                id: AssetId::StBlx,
                symbol: AssetId::StBlx.to_string(),
                decimals: blx_decimals,
            },
        }
    }

    pub fn get(&self, id: AssetId) -> &Asset {
        match id {
            AssetId::Blx => &self.blx,
            AssetId::Usdc => &self.usdc,
            AssetId::Lp => &self.lp,
            AssetId::StBlx => &self.st_blx,
        }
    }
}

impl Default for AssetRegistry {
    fn default() -> Self {
        Self::from_config(&AssetsConfig::default())
    }
}
