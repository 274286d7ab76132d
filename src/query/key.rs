//! Cache keys and the values stored under them.

use alloy::primitives::{Address, U256};
use serde::Serialize;

use crate::calc::staking::StakingProgram;
use crate::codec::AssetId;
use crate::query::types::{
    DepositRecord, LiquidTotals, ReservePair, StakeRecord, StakingAprs, VaultLockPeriods,
    VaultTotals, WithdrawalSplit,
};

/// One read call with its arguments. Two equal keys always denote the same ledger value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "query", rename_all = "snake_case")]
pub enum QueryKey {
    Reserves,
    LpTotalSupply,
    SwapFee,
    TradingEnabled,
    AmountOut {
        amount_in: U256,
        reserve_in: U256,
        reserve_out: U256,
    },
    TokenBalance {
        asset: AssetId,
        owner: Address,
    },
    Allowance {
        asset: AssetId,
        owner: Address,
        spender: Address,
    },
    StakeList {
        owner: Address,
    },
    StakeCount {
        owner: Address,
    },
    LiquidStake {
        owner: Address,
        index: u64,
    },
    PendingReward {
        program: StakingProgram,
        owner: Address,
        index: u64,
    },
    StakingAprs {
        program: StakingProgram,
    },
    LiquidTotals,
    VaultDeposits {
        owner: Address,
    },
    VaultDepositCount {
        owner: Address,
    },
    VaultUserBalance {
        owner: Address,
    },
    VaultTotals,
    VaultLockPeriods,
    DepositLocked {
        owner: Address,
        index: u64,
    },
    WithdrawalSplit {
        owner: Address,
        index: u64,
    },
}

impl QueryKey {
    /// Metric label.
    pub fn kind(&self) -> &'static str {
        match self {
            QueryKey::Reserves => "reserves",
            QueryKey::LpTotalSupply => "lp_total_supply",
            QueryKey::SwapFee => "swap_fee",
            QueryKey::TradingEnabled => "trading_enabled",
            QueryKey::AmountOut { .. } => "amount_out",
            QueryKey::TokenBalance { .. } => "token_balance",
            QueryKey::Allowance { .. } => "allowance",
            QueryKey::StakeList { .. } => "stake_list",
            QueryKey::StakeCount { .. } => "stake_count",
            QueryKey::LiquidStake { .. } => "liquid_stake",
            QueryKey::PendingReward { .. } => "pending_reward",
            QueryKey::StakingAprs { .. } => "staking_aprs",
            QueryKey::LiquidTotals => "liquid_totals",
            QueryKey::VaultDeposits { .. } => "vault_deposits",
            QueryKey::VaultDepositCount { .. } => "vault_deposit_count",
            QueryKey::VaultUserBalance { .. } => "vault_user_balance",
            QueryKey::VaultTotals => "vault_totals",
            QueryKey::VaultLockPeriods => "vault_lock_periods",
            QueryKey::DepositLocked { .. } => "deposit_locked",
            QueryKey::WithdrawalSplit { .. } => "withdrawal_split",
        }
    }

    /// Keys served by the liquid-staking contract.
    pub fn targets_liquid_staking(&self) -> bool {
        matches!(
            self,
            QueryKey::LiquidStake { .. }
                | QueryKey::LiquidTotals
                | QueryKey::PendingReward {
                    program: StakingProgram::Liquid,
                    ..
                }
                | QueryKey::StakingAprs {
                    program: StakingProgram::Liquid,
                }
        )
    }
}

/// Groups of keys dropped together after a write, for keys whose arguments the writer
/// cannot enumerate (per-index views).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum InvalidationScope {
    Exact(QueryKey),
    /// Everything derived from reserves or LP supply, including remote quotes.
    PoolState,
    /// Every per-stake view of `owner` in `program`.
    Stakes {
        program: StakingProgram,
        owner: Address,
    },
    /// Every per-deposit view of `owner`.
    VaultEntries { owner: Address },
}

impl InvalidationScope {
    pub fn matches(&self, key: &QueryKey) -> bool {
        match (self, key) {
            (InvalidationScope::Exact(exact), key) => exact == key,
            (
                InvalidationScope::PoolState,
                QueryKey::Reserves | QueryKey::LpTotalSupply | QueryKey::AmountOut { .. },
            ) => true,
            (
                InvalidationScope::Stakes { program, owner },
                QueryKey::PendingReward {
                    program: p,
                    owner: o,
                    ..
                },
            ) => p == program && o == owner,
            (
                InvalidationScope::Stakes {
                    program: StakingProgram::Tiered,
                    owner,
                },
                QueryKey::StakeList { owner: o } | QueryKey::StakeCount { owner: o },
            ) => o == owner,
            (
                InvalidationScope::Stakes {
                    program: StakingProgram::Liquid,
                    owner,
                },
                QueryKey::LiquidStake { owner: o, .. },
            ) => o == owner,
            (
                InvalidationScope::Stakes {
                    program: StakingProgram::Liquid,
                    ..
                },
                QueryKey::LiquidTotals,
            ) => true,
            (
                InvalidationScope::VaultEntries { owner },
                QueryKey::VaultDeposits { owner: o }
                | QueryKey::VaultDepositCount { owner: o }
                | QueryKey::VaultUserBalance { owner: o }
                | QueryKey::DepositLocked { owner: o, .. }
                | QueryKey::WithdrawalSplit { owner: o, .. },
            ) => o == owner,
            (InvalidationScope::VaultEntries { .. }, QueryKey::VaultTotals) => true,
            _ => false,
        }
    }
}

/// A decoded ledger value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum QueryValue {
    Uint(U256),
    Flag(bool),
    Reserves(ReservePair),
    Stakes(Vec<StakeRecord>),
    Stake(StakeRecord),
    Deposits(Vec<DepositRecord>),
    Aprs(StakingAprs),
    LiquidTotals(LiquidTotals),
    VaultTotals(VaultTotals),
    LockPeriods(VaultLockPeriods),
    Split(WithdrawalSplit),
}

/// Typed extraction from a `QueryValue`.
pub trait FromQueryValue: Sized {
    fn from_query_value(value: QueryValue) -> Option<Self>;
}

macro_rules! from_query_value {
    ($ty:ty, $variant:ident) => {
        impl FromQueryValue for $ty {
            fn from_query_value(value: QueryValue) -> Option<Self> {
                match value {
                    QueryValue::$variant(inner) => Some(inner),
                    _ => None,
                }
            }
        }
    };
}

from_query_value!(U256, Uint);
from_query_value!(bool, Flag);
from_query_value!(ReservePair, Reserves);
from_query_value!(Vec<StakeRecord>, Stakes);
from_query_value!(StakeRecord, Stake);
from_query_value!(Vec<DepositRecord>, Deposits);
from_query_value!(StakingAprs, Aprs);
from_query_value!(LiquidTotals, LiquidTotals);
from_query_value!(VaultTotals, VaultTotals);
from_query_value!(VaultLockPeriods, LockPeriods);
from_query_value!(WithdrawalSplit, Split);
