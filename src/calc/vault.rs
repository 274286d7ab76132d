//! Vault lock periods and withdrawal gating.
//!
//! The withdrawal fee is ledger policy. This module only decides whether a withdrawal is
//! currently permitted; the net/fee split always comes from the vault's own view call.

use std::fmt;

use alloy::primitives::U256;
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::query::types::{DepositRecord, VaultLockPeriods, WithdrawalSplit};

/// Lock periods offered by the vault.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum VaultLock {
    #[value(name = "none")]
    NoLock,
    #[value(name = "7d")]
    Days7,
    #[value(name = "30d")]
    Days30,
    #[value(name = "90d")]
    Days90,
}

impl VaultLock {
    /// Period used while the vault's own constants are unknown.
    pub fn fallback_secs(self) -> u64 {
        match self {
            VaultLock::NoLock => 0,
            VaultLock::Days7 => 604_800,
            VaultLock::Days30 => 2_592_000,
            VaultLock::Days90 => 7_776_000,
        }
    }

    /// Ledger constant when fetched, fallback otherwise.
    pub fn period_secs(self, observed: Option<&VaultLockPeriods>) -> U256 {
        match (self, observed) {
            (VaultLock::NoLock, Some(p)) => p.no_lock,
            (VaultLock::Days7, Some(p)) => p.days_7,
            (VaultLock::Days30, Some(p)) => p.days_30,
            (VaultLock::Days90, Some(p)) => p.days_90,
            (lock, None) => U256::from(lock.fallback_secs()),
        }
    }
}

impl fmt::Display for VaultLock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            VaultLock::NoLock => "no lock",
            VaultLock::Days7 => "7 days",
            VaultLock::Days30 => "30 days",
            VaultLock::Days90 => "90 days",
        };
        f.write_str(s)
    }
}

/// A deposit may be withdrawn once, after its lock (if any) has elapsed.
pub fn withdrawal_permitted(deposit: &DepositRecord, now: u64) -> bool {
    !deposit.withdrawn && (deposit.lock_until == 0 || now >= deposit.lock_until)
}

/// What the client shows before a vault withdrawal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct WithdrawalPreview {
    pub permitted: bool,
    /// As reported by the vault; `None` until fetched.
    pub split: Option<WithdrawalSplit>,
}

pub fn withdrawal_preview(
    deposit: &DepositRecord,
    reported: Option<WithdrawalSplit>,
    now: u64,
) -> WithdrawalPreview {
    WithdrawalPreview {
        permitted: withdrawal_permitted(deposit, now),
        split: reported,
    }
}
