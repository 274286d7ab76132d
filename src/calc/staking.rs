//! Staking lock tiers, reward projection and lock countdown.

use std::fmt;

use alloy::primitives::U256;
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::calc::{CalcError, BPS_DENOMINATOR};
use crate::query::types::{StakeRecord, StakingAprs};

const SECS_PER_DAY: u64 = 86_400;
const SECS_PER_HOUR: u64 = 3_600;

/// Which staking contract a position lives in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum StakingProgram {
    /// Fixed-lock staking; positions are withdrawn.
    Tiered,
    /// Liquid staking with a receipt token; positions are redeemed.
    Liquid,
}

impl fmt::Display for StakingProgram {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StakingProgram::Tiered => f.write_str("tiered"),
            StakingProgram::Liquid => f.write_str("liquid"),
        }
    }
}

/// Lock choice offered by both staking programs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
pub enum StakeLock {
    #[value(name = "30d")]
    Days30,
    #[value(name = "90d")]
    Days90,
    #[value(name = "365d")]
    Days365,
}

impl StakeLock {
    pub const ALL: [StakeLock; 3] = [StakeLock::Days30, StakeLock::Days90, StakeLock::Days365];

    pub fn from_days(days: u64) -> Option<Self> {
        match days {
            30 => Some(StakeLock::Days30),
            90 => Some(StakeLock::Days90),
            365 => Some(StakeLock::Days365),
            _ => None,
        }
    }

    pub fn days(self) -> u64 {
        match self {
            StakeLock::Days30 => 30,
            StakeLock::Days90 => 90,
            StakeLock::Days365 => 365,
        }
    }

    /// Lock duration in seconds; this is the value passed as the contract's lock choice.
    pub fn duration_secs(self) -> u64 {
        self.days() * SECS_PER_DAY
    }

    /// Advertised APR, used only until the ledger's constant has been fetched.
    pub fn nominal_apr_bps(self) -> u64 {
        match self {
            StakeLock::Days30 => 500,
            StakeLock::Days90 => 1_000,
            StakeLock::Days365 => 2_000,
        }
    }

    /// Ledger APR when known, nominal otherwise.
    pub fn apr_bps(self, observed: Option<&StakingAprs>) -> u64 {
        match (self, observed) {
            (StakeLock::Days30, Some(aprs)) => aprs.days_30,
            (StakeLock::Days90, Some(aprs)) => aprs.days_90,
            (StakeLock::Days365, Some(aprs)) => aprs.days_365,
            (lock, None) => lock.nominal_apr_bps(),
        }
    }
}

impl fmt::Display for StakeLock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} days", self.days())
    }
}

/// `principal * apr_bps / 10000`, truncated. The reward for a full lock period.
pub fn reward_at_maturity(principal: U256, apr_bps: u64) -> Result<U256, CalcError> {
    let scaled = principal
        .checked_mul(U256::from(apr_bps))
        .ok_or(CalcError::Overflow)?;
    Ok(scaled / U256::from(BPS_DENOMINATOR))
}

/// Linear projection of the unrealized reward at `now`.
///
/// Display estimate only: the payable amount is whatever the staking contract's
/// `pendingReward` view reports, and withdrawal decisions never use this value.
pub fn pending_reward_estimate(stake: &StakeRecord, now: u64) -> Result<U256, CalcError> {
    if stake.withdrawn {
        return Ok(U256::ZERO);
    }
    let full = reward_at_maturity(stake.principal, stake.apr_bps)?;
    if stake.lock_duration == 0 {
        return Ok(full);
    }

    let elapsed = now.saturating_sub(stake.start_time).min(stake.lock_duration);
    let scaled = full
        .checked_mul(U256::from(elapsed))
        .ok_or(CalcError::Overflow)?;
    Ok(scaled / U256::from(stake.lock_duration))
}

/// Whether a stake's lock has elapsed and it has not been withdrawn yet.
pub fn stake_withdrawable(stake: &StakeRecord, now: u64) -> bool {
    !stake.withdrawn && now >= stake.unlock_at()
}

/// Time left on a lock.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum LockRemaining {
    Unlocked,
    Locked { secs: u64 },
}

pub fn lock_remaining(unlock_at: u64, now: u64) -> LockRemaining {
    if now >= unlock_at {
        LockRemaining::Unlocked
    } else {
        LockRemaining::Locked {
            secs: unlock_at - now,
        }
    }
}

impl fmt::Display for LockRemaining {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            LockRemaining::Unlocked => f.write_str("Unlocked"),
            LockRemaining::Locked { secs } => {
                let days = secs / SECS_PER_DAY;
                let hours = (secs % SECS_PER_DAY) / SECS_PER_HOUR;
                if days > 0 {
                    write!(f, "{days}d {hours}h")
                } else {
                    write!(f, "{hours}h")
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stake(principal: u64, start: u64, lock: u64, apr_bps: u64) -> StakeRecord {
        StakeRecord {
            principal: U256::from(principal),
            start_time: start,
            lock_duration: lock,
            apr_bps,
            withdrawn: false,
        }
    }

    #[test]
    fn test_lock_tiers() {
        assert_eq!(StakeLock::Days30.duration_secs(), 2_592_000);
        assert_eq!(StakeLock::Days90.duration_secs(), 7_776_000);
        assert_eq!(StakeLock::Days365.duration_secs(), 31_536_000);
        assert_eq!(StakeLock::from_days(90), Some(StakeLock::Days90));
        assert_eq!(StakeLock::from_days(7), None);
    }

    #[test]
    fn test_apr_resolution() {
        let observed = StakingAprs {
            days_30: 600,
            days_90: 1_100,
            days_365: 2_500,
        };
        assert_eq!(StakeLock::Days90.apr_bps(Some(&observed)), 1_100);
        assert_eq!(StakeLock::Days365.apr_bps(None), 2_000);
    }

    #[test]
    fn test_reward_at_maturity() {
        assert_eq!(reward_at_maturity(U256::from(10_000), 500).unwrap(), U256::from(500));
        assert_eq!(reward_at_maturity(U256::from(999), 500).unwrap(), U256::from(49));
        assert_eq!(reward_at_maturity(U256::MAX, 500), Err(CalcError::Overflow));
    }

    #[test]
    fn test_pending_reward_is_linear_and_capped() {
        let s = stake(10_000, 1_000, 100, 2_000);
        assert_eq!(pending_reward_estimate(&s, 1_000).unwrap(), U256::ZERO);
        assert_eq!(pending_reward_estimate(&s, 1_050).unwrap(), U256::from(1_000));
        assert_eq!(pending_reward_estimate(&s, 1_100).unwrap(), U256::from(2_000));
        assert_eq!(pending_reward_estimate(&s, 9_999).unwrap(), U256::from(2_000));
        // clock behind the ledger
        assert_eq!(pending_reward_estimate(&s, 10).unwrap(), U256::ZERO);
    }

    #[test]
    fn test_pending_reward_edge_cases() {
        let unlocked = stake(10_000, 1_000, 0, 500);
        assert_eq!(pending_reward_estimate(&unlocked, 1_000).unwrap(), U256::from(500));

        let mut done = stake(10_000, 1_000, 100, 500);
        done.withdrawn = true;
        assert_eq!(pending_reward_estimate(&done, 5_000).unwrap(), U256::ZERO);
        assert!(!stake_withdrawable(&done, 5_000));
    }

    #[test]
    fn test_stake_withdrawable() {
        let s = stake(1, 1_000, 100, 500);
        assert!(!stake_withdrawable(&s, 1_099));
        assert!(stake_withdrawable(&s, 1_100));
    }

    #[test]
    fn test_lock_countdown() {
        assert_eq!(lock_remaining(100, 100).to_string(), "Unlocked");
        assert_eq!(lock_remaining(100, 200).to_string(), "Unlocked");
        assert_eq!(lock_remaining(7_200, 0).to_string(), "2h");
        assert_eq!(lock_remaining(1_800, 0).to_string(), "0h");
        assert_eq!(lock_remaining(3 * 86_400 + 5 * 3_600 + 59, 0).to_string(), "3d 5h");
        assert_eq!(
            lock_remaining(1_000, 400),
            LockRemaining::Locked { secs: 600 }
        );
    }
}
