//! Constant-product swap quoting.

use alloy::primitives::U256;
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::calc::{apply_slippage, check_bps, ensure_asset, CalcError, BPS_DENOMINATOR};
use crate::codec::{AssetId, AssetRegistry, BaseAmount};
use crate::query::types::ReservePair;

/// Which way a swap crosses the pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum SwapDirection {
    /// token0 → token1.
    BlxToUsdc,
    /// token1 → token0.
    UsdcToBlx,
}

impl SwapDirection {
    pub fn input_asset(self) -> AssetId {
        match self {
            SwapDirection::BlxToUsdc => AssetId::Blx,
            SwapDirection::UsdcToBlx => AssetId::Usdc,
        }
    }

    pub fn output_asset(self) -> AssetId {
        match self {
            SwapDirection::BlxToUsdc => AssetId::Usdc,
            SwapDirection::UsdcToBlx => AssetId::Blx,
        }
    }

    pub fn token0_to_token1(self) -> bool {
        matches!(self, SwapDirection::BlxToUsdc)
    }

    /// `(reserve_in, reserve_out)` for this direction.
    pub fn reserves(self, reserves: &ReservePair) -> (U256, U256) {
        match self {
            SwapDirection::BlxToUsdc => (reserves.reserve0, reserves.reserve1),
            SwapDirection::UsdcToBlx => (reserves.reserve1, reserves.reserve0),
        }
    }
}

/// Output of a constant-product swap after the input fee, truncated toward zero.
///
/// `amountOut = amountIn·(10000−fee)·reserveOut / (reserveIn·10000 + amountIn·(10000−fee))`
///
/// Returns zero when the input or either reserve is zero. The result is always strictly
/// below `reserve_out`.
pub fn amount_out(
    amount_in: U256,
    reserve_in: U256,
    reserve_out: U256,
    fee_bps: u16,
) -> Result<U256, CalcError> {
    let fee = check_bps(fee_bps)?;
    if amount_in.is_zero() || reserve_in.is_zero() || reserve_out.is_zero() {
        return Ok(U256::ZERO);
    }

    let denominator_bps = U256::from(BPS_DENOMINATOR);
    let amount_in_with_fee = amount_in
        .checked_mul(denominator_bps - fee)
        .ok_or(CalcError::Overflow)?;
    let numerator = amount_in_with_fee
        .checked_mul(reserve_out)
        .ok_or(CalcError::Overflow)?;
    let denominator = reserve_in
        .checked_mul(denominator_bps)
        .and_then(|d| d.checked_add(amount_in_with_fee))
        .ok_or(CalcError::Overflow)?;

    Ok(numerator / denominator)
}

/// Resolve the pool fee, falling back while the ledger value is unknown.
pub fn fee_bps_or(observed: Option<U256>, fallback: u16) -> Result<u16, CalcError> {
    match observed {
        None => Ok(fallback),
        Some(fee) => match u16::try_from(fee) {
            Ok(bps) if bps <= BPS_DENOMINATOR => Ok(bps),
            _ => Err(CalcError::BasisPointsOutOfRange(fee)),
        },
    }
}

/// A locally computed quote with its slippage floor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SwapQuote {
    pub direction: SwapDirection,
    pub amount_in: BaseAmount,
    pub amount_out: BaseAmount,
    pub min_amount_out: BaseAmount,
    pub fee_bps: u16,
    pub slippage_bps: u16,
}

impl SwapQuote {
    /// Output per unit of input in display terms. Display only.
    pub fn execution_price(&self, assets: &AssetRegistry) -> Option<f64> {
        let input: f64 = self.amount_in.to_display(assets).as_str().parse().ok()?;
        let output: f64 = self.amount_out.to_display(assets).as_str().parse().ok()?;
        (input > 0.0).then(|| output / input)
    }
}

/// Quote a swap against a reserve snapshot.
pub fn quote_swap(
    amount_in: BaseAmount,
    direction: SwapDirection,
    reserves: &ReservePair,
    fee_bps: u16,
    slippage_bps: u16,
) -> Result<SwapQuote, CalcError> {
    ensure_asset(amount_in.asset(), direction.input_asset())?;

    let (reserve_in, reserve_out) = direction.reserves(reserves);
    let out = amount_out(amount_in.units(), reserve_in, reserve_out, fee_bps)?;
    let min_out = apply_slippage(out, slippage_bps)?;

    Ok(SwapQuote {
        direction,
        amount_in,
        amount_out: BaseAmount::from_units(direction.output_asset(), out),
        min_amount_out: BaseAmount::from_units(direction.output_asset(), min_out),
        fee_bps,
        slippage_bps,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const ONE: u128 = 1_000_000_000_000_000_000;

    fn pool(reserve0: u128, reserve1: u128) -> ReservePair {
        ReservePair {
            reserve0: U256::from(reserve0),
            reserve1: U256::from(reserve1),
            last_update: 0,
        }
    }

    #[test]
    fn test_reference_scenario() {
        // 1,000,000 / 1,000,000 pool, 30 bps, 1,000 in.
        let reserve = U256::from(1_000_000u128 * ONE);
        let out = amount_out(U256::from(1_000u128 * ONE), reserve, reserve, 30).unwrap();
        assert_eq!(out, U256::from(996_006_981_039_903_216_493u128));

        let out = amount_out(
            U256::from(1_000u64),
            U256::from(1_000_000u64),
            U256::from(1_000_000u64),
            30,
        )
        .unwrap();
        assert_eq!(out, U256::from(996u64));
    }

    #[test]
    fn test_zero_inputs() {
        let r = U256::from(1_000u64);
        assert_eq!(amount_out(U256::ZERO, r, r, 30).unwrap(), U256::ZERO);
        assert_eq!(amount_out(r, U256::ZERO, r, 30).unwrap(), U256::ZERO);
        assert_eq!(amount_out(r, r, U256::ZERO, 30).unwrap(), U256::ZERO);
    }

    #[test]
    fn test_monotonic_and_bounded() {
        let reserve_in = U256::from(5_000_000u64);
        let reserve_out = U256::from(3_000_000u64);
        let mut previous = U256::ZERO;
        for amount in [1u64, 10, 999, 10_000, 1_000_000, 50_000_000, 10_000_000_000] {
            let out = amount_out(U256::from(amount), reserve_in, reserve_out, 30).unwrap();
            assert!(out >= previous, "non-monotonic at {amount}");
            assert!(out < reserve_out, "drained pool at {amount}");
            previous = out;
        }

        let huge = amount_out(U256::from(u128::MAX), reserve_in, reserve_out, 0).unwrap();
        assert!(huge < reserve_out);
    }

    #[test]
    fn test_fee_bounds() {
        let r = U256::from(1_000_000u64);
        assert_eq!(amount_out(r, r, r, 10_000).unwrap(), U256::ZERO);
        assert!(matches!(
            amount_out(r, r, r, 10_001),
            Err(CalcError::BasisPointsOutOfRange(_))
        ));
    }

    #[test]
    fn test_overflow_is_reported() {
        assert_eq!(
            amount_out(U256::MAX, U256::from(1u8), U256::from(1u8), 30),
            Err(CalcError::Overflow)
        );
    }

    #[test]
    fn test_fee_fallback() {
        assert_eq!(fee_bps_or(None, 30).unwrap(), 30);
        assert_eq!(fee_bps_or(Some(U256::from(25)), 30).unwrap(), 25);
        assert!(fee_bps_or(Some(U256::from(20_000)), 30).is_err());
    }

    #[test]
    fn test_quote_swap_reverse_direction() {
        let reserves = pool(2_000_000, 1_000_000);
        let amount_in = BaseAmount::from_units(AssetId::Usdc, U256::from(1_000u64));
        let quote = quote_swap(amount_in, SwapDirection::UsdcToBlx, &reserves, 30, 100).unwrap();

        // reserve_in = USDC (1,000,000), reserve_out = BLX (2,000,000)
        let expected = amount_out(
            U256::from(1_000u64),
            U256::from(1_000_000u64),
            U256::from(2_000_000u64),
            30,
        )
        .unwrap();
        assert_eq!(quote.amount_out.units(), expected);
        assert_eq!(quote.amount_out.asset(), AssetId::Blx);
        assert_eq!(
            quote.min_amount_out.units(),
            expected * U256::from(9_900u64) / U256::from(10_000u64)
        );
    }

    #[test]
    fn test_quote_rejects_wrong_asset() {
        let reserves = pool(1_000, 1_000);
        let amount_in = BaseAmount::from_units(AssetId::Usdc, U256::from(10u64));
        assert_eq!(
            quote_swap(amount_in, SwapDirection::BlxToUsdc, &reserves, 30, 100),
            Err(CalcError::AssetMismatch {
                expected: AssetId::Blx,
                actual: AssetId::Usdc,
            })
        );
    }

    #[test]
    fn test_execution_price() {
        let assets = AssetRegistry::default();
        let reserves = pool(1_000_000 * ONE, 1_000_000 * ONE);
        let amount_in = BaseAmount::from_units(AssetId::Blx, U256::from(1_000 * ONE));
        let quote = quote_swap(amount_in, SwapDirection::BlxToUsdc, &reserves, 30, 100).unwrap();

        let price = quote.execution_price(&assets).unwrap();
        assert!((price - 0.996_006_981).abs() < 1e-6);
    }
}
