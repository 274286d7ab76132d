//! Financial calculators.
//!
//! Pure, deterministic functions over already-fetched ledger state. Nothing in this
//! module performs I/O; callers pass `now` explicitly where time matters.
//!
//! # Modules
//! - swap.rs: constant-product output, slippage floor, quotes
//! - liquidity.rs: pool share, LP withdrawal sizing, pool statistics
//! - staking.rs: lock tiers, reward projection, lock countdown
//! - vault.rs: vault lock periods and withdrawal gating

pub mod liquidity;
pub mod staking;
pub mod swap;
pub mod vault;

use std::time::{SystemTime, UNIX_EPOCH};

use alloy::primitives::U256;
use thiserror::Error;

use crate::codec::AssetId;

/// Denominator for every basis-point quantity.
pub const BPS_DENOMINATOR: u16 = 10_000;

/// Calculator input errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CalcError {
    #[error("{0} bps exceeds {BPS_DENOMINATOR}")]
    BasisPointsOutOfRange(U256),

    #[error("percentage {0} exceeds 100")]
    PercentOutOfRange(u8),

    #[error("arithmetic overflow")]
    Overflow,

    #[error("expected a {expected} amount, got {actual}")]
    AssetMismatch { expected: AssetId, actual: AssetId },
}

pub(crate) fn check_bps(bps: u16) -> Result<U256, CalcError> {
    if bps > BPS_DENOMINATOR {
        return Err(CalcError::BasisPointsOutOfRange(U256::from(bps)));
    }
    Ok(U256::from(bps))
}

pub(crate) fn ensure_asset(actual: AssetId, expected: AssetId) -> Result<(), CalcError> {
    if actual != expected {
        return Err(CalcError::AssetMismatch { expected, actual });
    }
    Ok(())
}

/// Lower bound accepted after `slippage_bps` of adverse movement, truncated.
pub fn apply_slippage(amount: U256, slippage_bps: u16) -> Result<U256, CalcError> {
    let keep = U256::from(BPS_DENOMINATOR) - check_bps(slippage_bps)?;
    let scaled = amount.checked_mul(keep).ok_or(CalcError::Overflow)?;
    Ok(scaled / U256::from(BPS_DENOMINATOR))
}

/// Current unix time in seconds.
pub fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_apply_slippage() {
        assert_eq!(apply_slippage(U256::from(1_000), 100).unwrap(), U256::from(990));
        assert_eq!(apply_slippage(U256::from(999), 100).unwrap(), U256::from(989));
        assert_eq!(apply_slippage(U256::from(1_000), 0).unwrap(), U256::from(1_000));
        assert_eq!(apply_slippage(U256::from(1_000), 10_000).unwrap(), U256::ZERO);
    }

    #[test]
    fn test_slippage_out_of_range() {
        assert_eq!(
            apply_slippage(U256::from(1), 10_001),
            Err(CalcError::BasisPointsOutOfRange(U256::from(10_001)))
        );
    }

    #[test]
    fn test_slippage_overflow() {
        assert_eq!(apply_slippage(U256::MAX, 100), Err(CalcError::Overflow));
    }
}
