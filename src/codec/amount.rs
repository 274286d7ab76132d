//! Tagged amount quantities.
//!
//! A `BaseAmount` can only be produced by parsing through the codec or by wrapping a
//! value the ledger itself reported, so no user text reaches a contract call unconverted.

use std::fmt;

use alloy::primitives::U256;
use serde::Serialize;

use crate::codec::asset::{Asset, AssetId, AssetRegistry};
use crate::codec::decimal::{to_base_units, to_display, CodecError};

/// A human-facing decimal string scoped to an asset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DisplayAmount {
    asset: AssetId,
    text: String,
}

impl DisplayAmount {
    pub fn new(asset: AssetId, text: impl Into<String>) -> Self {
        Self {
            asset,
            text: text.into(),
        }
    }

    pub fn asset(&self) -> AssetId {
        self.asset
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// Convert to base units with the asset's configured precision.
    pub fn to_base(&self, assets: &AssetRegistry) -> Result<BaseAmount, CodecError> {
        BaseAmount::parse(&self.text, assets.get(self.asset))
    }
}

impl fmt::Display for DisplayAmount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.text, self.asset)
    }
}

/// An integer amount in an asset's smallest denomination.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct BaseAmount {
    asset: AssetId,
    units: U256,
}

impl BaseAmount {
    /// Parse user input. Rejects malformed or over-precise text.
    pub fn parse(text: &str, asset: &Asset) -> Result<Self, CodecError> {
        Ok(Self {
            asset: asset.id,
            units: to_base_units(text, asset)?,
        })
    }

    /// Parse user input that must be strictly positive.
    pub fn parse_positive(text: &str, asset: &Asset) -> Result<Self, CodecError> {
        let amount = Self::parse(text, asset)?;
        if amount.is_zero() {
            return Err(CodecError::Zero(text.to_string()));
        }
        Ok(amount)
    }

    /// Wrap a value reported by (or derived from values reported by) the ledger.
    pub fn from_units(asset: AssetId, units: U256) -> Self {
        Self { asset, units }
    }

    pub fn asset(&self) -> AssetId {
        self.asset
    }

    pub fn units(&self) -> U256 {
        self.units
    }

    pub fn is_zero(&self) -> bool {
        self.units.is_zero()
    }

    pub fn to_display(&self, assets: &AssetRegistry) -> DisplayAmount {
        DisplayAmount::new(self.asset, to_display(self.units, assets.get(self.asset)))
    }
}
