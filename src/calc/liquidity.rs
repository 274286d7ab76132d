//! Pool share, LP withdrawal sizing and pool statistics.

use alloy::primitives::U256;
use serde::Serialize;

use crate::calc::{apply_slippage, CalcError};
use crate::codec::{AssetId, AssetRegistry, BaseAmount, DisplayAmount};
use crate::query::types::ReservePair;

/// Fixed-point scale used before the single float conversion: 4 decimal places of a percent.
const SHARE_SCALE: u64 = 1_000_000;
const SHARE_DIVISOR: f64 = 10_000.0;

/// `user_lp / total_supply * 100`, or `0` when the pool has no supply.
///
/// The ratio is computed in integers and converted to float once, so the result is
/// exact to four decimal places of a percent.
pub fn pool_share_percent(user_lp: U256, total_supply: U256) -> f64 {
    if total_supply.is_zero() {
        return 0.0;
    }
    let scaled = user_lp.saturating_mul(U256::from(SHARE_SCALE)) / total_supply;
    let scaled = u64::try_from(scaled).unwrap_or(u64::MAX);
    scaled as f64 / SHARE_DIVISOR
}

/// LP amount corresponding to `percent` of a balance, truncated.
pub fn liquidity_for_percent(lp_balance: BaseAmount, percent: u8) -> Result<BaseAmount, CalcError> {
    if percent > 100 {
        return Err(CalcError::PercentOutOfRange(percent));
    }
    let scaled = lp_balance
        .units()
        .checked_mul(U256::from(percent))
        .ok_or(CalcError::Overflow)?;
    Ok(BaseAmount::from_units(lp_balance.asset(), scaled / U256::from(100u8)))
}

/// Underlying tokens returned for burning `liquidity` at the current reserves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LiquidityWithdrawal {
    pub blx: BaseAmount,
    pub usdc: BaseAmount,
}

impl LiquidityWithdrawal {
    /// Minimum amounts after slippage, for the remove-liquidity call.
    pub fn with_slippage(&self, slippage_bps: u16) -> Result<Self, CalcError> {
        Ok(Self {
            blx: BaseAmount::from_units(AssetId::Blx, apply_slippage(self.blx.units(), slippage_bps)?),
            usdc: BaseAmount::from_units(
                AssetId::Usdc,
                apply_slippage(self.usdc.units(), slippage_bps)?,
            ),
        })
    }
}

/// Pro-rata share of both reserves. Zero when the pool has no supply.
pub fn expected_withdrawal(
    liquidity: BaseAmount,
    reserves: &ReservePair,
    total_supply: U256,
) -> Result<LiquidityWithdrawal, CalcError> {
    if total_supply.is_zero() {
        return Ok(LiquidityWithdrawal {
            blx: BaseAmount::from_units(AssetId::Blx, U256::ZERO),
            usdc: BaseAmount::from_units(AssetId::Usdc, U256::ZERO),
        });
    }

    let share = |reserve: U256| -> Result<U256, CalcError> {
        let scaled = liquidity
            .units()
            .checked_mul(reserve)
            .ok_or(CalcError::Overflow)?;
        Ok(scaled / total_supply)
    };

    Ok(LiquidityWithdrawal {
        blx: BaseAmount::from_units(AssetId::Blx, share(reserves.reserve0)?),
        usdc: BaseAmount::from_units(AssetId::Usdc, share(reserves.reserve1)?),
    })
}

/// Display-only pool summary.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PoolStats {
    pub blx_reserve: DisplayAmount,
    pub usdc_reserve: DisplayAmount,
    /// USDC per BLX. `None` while the BLX reserve is empty.
    pub token_ratio: Option<f64>,
    /// Sum of both reserves assuming 1:1 parity. An estimate, never used for a call.
    pub total_liquidity_value: f64,
    pub last_update: u32,
}

pub fn pool_stats(reserves: &ReservePair, assets: &AssetRegistry) -> PoolStats {
    let blx_reserve = BaseAmount::from_units(AssetId::Blx, reserves.reserve0).to_display(assets);
    let usdc_reserve = BaseAmount::from_units(AssetId::Usdc, reserves.reserve1).to_display(assets);

    let blx: f64 = blx_reserve.as_str().parse().unwrap_or(0.0);
    let usdc: f64 = usdc_reserve.as_str().parse().unwrap_or(0.0);

    PoolStats {
        token_ratio: (blx > 0.0).then(|| usdc / blx),
        total_liquidity_value: blx + usdc,
        blx_reserve,
        usdc_reserve,
        last_update: reserves.last_update,
    }
}
