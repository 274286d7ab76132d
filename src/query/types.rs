//! Snapshots of ledger-owned state.
//!
//! Every record here is a read-only copy of what the ledger reported. Nothing mutates
//! them locally; they are replaced wholesale on the next successful refresh.

use alloy::primitives::{Address, U256};
use serde::Serialize;

use crate::codec::AssetId;

/// Clamp a ledger uint256 (timestamps, durations, rates) into `u64`.
pub fn saturating_u64(value: U256) -> u64 {
    u64::try_from(value).unwrap_or(u64::MAX)
}

/// Pool reserves. `reserve0` is BLX, `reserve1` is USDC.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ReservePair {
    pub reserve0: U256,
    pub reserve1: U256,
    pub last_update: u32,
}

/// Allowance granted by `owner` to `spender` over `asset`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AllowanceRecord {
    pub owner: Address,
    pub spender: Address,
    pub asset: AssetId,
    pub amount: U256,
}

/// A tiered or liquid stake position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StakeRecord {
    pub principal: U256,
    pub start_time: u64,
    pub lock_duration: u64,
    /// Annual rate in basis points.
    pub apr_bps: u64,
    /// Liquid stakes do not report this flag; it reads `false` for them.
    pub withdrawn: bool,
}

impl StakeRecord {
    pub fn unlock_at(&self) -> u64 {
        self.start_time.saturating_add(self.lock_duration)
    }
}

/// A vault deposit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DepositRecord {
    pub principal: U256,
    pub deposit_time: u64,
    /// Zero when the deposit was made without a lock.
    pub lock_until: u64,
    pub auto_stake: bool,
    pub withdrawn: bool,
}

/// Net/fee split reported by the vault's own view function.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct WithdrawalSplit {
    pub net_amount: U256,
    pub fee: U256,
}

/// APR constants of a staking program, in basis points.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StakingAprs {
    pub days_30: u64,
    pub days_90: u64,
    pub days_365: u64,
}

/// Liquid staking aggregates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LiquidTotals {
    pub total_staked: U256,
    pub total_rewards: U256,
}

/// Vault aggregates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct VaultTotals {
    pub total_balance: U256,
    pub total_auto_staked: U256,
}

/// Lock-period constants exposed by the vault, in seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct VaultLockPeriods {
    pub no_lock: U256,
    pub days_7: U256,
    pub days_30: U256,
    pub days_90: U256,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_saturating_u64() {
        assert_eq!(saturating_u64(U256::from(42)), 42);
        assert_eq!(saturating_u64(U256::MAX), u64::MAX);
    }

    #[test]
    fn test_unlock_at_saturates() {
        let stake = StakeRecord {
            principal: U256::from(1),
            start_time: u64::MAX - 1,
            lock_duration: 10,
            apr_bps: 500,
            withdrawn: false,
        };
        assert_eq!(stake.unlock_at(), u64::MAX);
    }
}
