//! One validated record per state-changing call.
//!
//! Every amount field is a `BaseAmount`, so the only way user text reaches calldata is
//! through the decimal codec. Constructors check that each amount is denominated in the
//! asset the target function expects.

use std::fmt;

use alloy::primitives::{Address, Bytes, U256};
use alloy::sol_types::SolCall;
use serde::Serialize;
use thiserror::Error;

use crate::calc::liquidity::LiquidityWithdrawal;
use crate::calc::staking::{StakeLock, StakingProgram};
use crate::calc::swap::{SwapDirection, SwapQuote};
use crate::calc::{apply_slippage, ensure_asset, CalcError};
use crate::codec::{AssetId, BaseAmount};
use crate::config::ContractAddresses;
use crate::contracts::abi::{IBLXPool, IBLXVault, IERC20, ILiquidStaking, ITieredStaking};

/// Rejections raised while building a call record.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CallError {
    #[error(transparent)]
    Calc(#[from] CalcError),

    #[error("{0} amount must be greater than zero")]
    ZeroAmount(AssetId),

    #[error("minimum {0} output rounds to zero; increase the amount")]
    ZeroMinimumOut(AssetId),
}

/// Tokens a call pulls from the sender via `transferFrom`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Spend {
    pub amount: BaseAmount,
    pub spender: Address,
}

impl Spend {
    /// Exact-amount approval covering this spend.
    pub fn authorization(&self) -> ContractCall {
        ContractCall::Approve {
            amount: self.amount,
            spender: self.spender,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "call", rename_all = "snake_case")]
pub enum ContractCall {
    Approve {
        amount: BaseAmount,
        spender: Address,
    },
    Swap {
        amount_in: BaseAmount,
        min_amount_out: BaseAmount,
        direction: SwapDirection,
        recipient: Address,
    },
    AddLiquidity {
        blx_desired: BaseAmount,
        usdc_desired: BaseAmount,
        blx_min: BaseAmount,
        usdc_min: BaseAmount,
        recipient: Address,
    },
    RemoveLiquidity {
        liquidity: BaseAmount,
        blx_min: BaseAmount,
        usdc_min: BaseAmount,
        recipient: Address,
    },
    Stake {
        program: StakingProgram,
        amount: BaseAmount,
        lock: StakeLock,
    },
    /// Tiered `withdraw` or liquid `redeem`.
    Unstake {
        program: StakingProgram,
        index: u64,
    },
    VaultDeposit {
        amount: BaseAmount,
        lock_period_secs: U256,
        auto_stake: bool,
    },
    VaultWithdraw {
        index: u64,
    },
    VaultToggleAutoStake {
        index: u64,
    },
    VaultEmergencyWithdraw,
}

fn positive(amount: BaseAmount, expected: AssetId) -> Result<BaseAmount, CallError> {
    ensure_asset(amount.asset(), expected)?;
    if amount.is_zero() {
        return Err(CallError::ZeroAmount(expected));
    }
    Ok(amount)
}

impl ContractCall {
    pub fn approve(amount: BaseAmount, spender: Address) -> Self {
        ContractCall::Approve { amount, spender }
    }

    /// Swap at a previously computed quote; the slippage floor comes from the quote.
    pub fn swap(quote: &SwapQuote, recipient: Address) -> Result<Self, CallError> {
        let amount_in = positive(quote.amount_in, quote.direction.input_asset())?;
        ensure_asset(quote.min_amount_out.asset(), quote.direction.output_asset())?;
        if quote.min_amount_out.is_zero() {
            return Err(CallError::ZeroMinimumOut(quote.direction.output_asset()));
        }
        Ok(ContractCall::Swap {
            amount_in,
            min_amount_out: quote.min_amount_out,
            direction: quote.direction,
            recipient,
        })
    }

    pub fn add_liquidity(
        blx: BaseAmount,
        usdc: BaseAmount,
        slippage_bps: u16,
        recipient: Address,
    ) -> Result<Self, CallError> {
        let blx = positive(blx, AssetId::Blx)?;
        let usdc = positive(usdc, AssetId::Usdc)?;
        Ok(ContractCall::AddLiquidity {
            blx_min: BaseAmount::from_units(AssetId::Blx, apply_slippage(blx.units(), slippage_bps)?),
            usdc_min: BaseAmount::from_units(
                AssetId::Usdc,
                apply_slippage(usdc.units(), slippage_bps)?,
            ),
            blx_desired: blx,
            usdc_desired: usdc,
            recipient,
        })
    }

    /// `minimums` is usually `expected_withdrawal(..).with_slippage(..)`.
    pub fn remove_liquidity(
        liquidity: BaseAmount,
        minimums: &LiquidityWithdrawal,
        recipient: Address,
    ) -> Result<Self, CallError> {
        let liquidity = positive(liquidity, AssetId::Lp)?;
        ensure_asset(minimums.blx.asset(), AssetId::Blx)?;
        ensure_asset(minimums.usdc.asset(), AssetId::Usdc)?;
        Ok(ContractCall::RemoveLiquidity {
            liquidity,
            blx_min: minimums.blx,
            usdc_min: minimums.usdc,
            recipient,
        })
    }

    pub fn stake(
        program: StakingProgram,
        amount: BaseAmount,
        lock: StakeLock,
    ) -> Result<Self, CallError> {
        Ok(ContractCall::Stake {
            program,
            amount: positive(amount, AssetId::Blx)?,
            lock,
        })
    }

    pub fn vault_deposit(
        amount: BaseAmount,
        lock_period_secs: U256,
        auto_stake: bool,
    ) -> Result<Self, CallError> {
        Ok(ContractCall::VaultDeposit {
            amount: positive(amount, AssetId::Blx)?,
            lock_period_secs,
            auto_stake,
        })
    }

    /// Short stable name, used in logs and metric labels.
    pub fn name(&self) -> &'static str {
        match self {
            ContractCall::Approve { .. } => "approve",
            ContractCall::Swap { .. } => "swap",
            ContractCall::AddLiquidity { .. } => "add_liquidity",
            ContractCall::RemoveLiquidity { .. } => "remove_liquidity",
            ContractCall::Stake { .. } => "stake",
            ContractCall::Unstake {
                program: StakingProgram::Tiered,
                ..
            } => "withdraw_stake",
            ContractCall::Unstake {
                program: StakingProgram::Liquid,
                ..
            } => "redeem",
            ContractCall::VaultDeposit { .. } => "vault_deposit",
            ContractCall::VaultWithdraw { .. } => "vault_withdraw",
            ContractCall::VaultToggleAutoStake { .. } => "vault_toggle_auto_stake",
            ContractCall::VaultEmergencyWithdraw => "vault_emergency_withdraw",
        }
    }

    pub fn is_authorization(&self) -> bool {
        matches!(self, ContractCall::Approve { .. })
    }

    /// Contract the call is sent to.
    pub fn target(&self, contracts: &ContractAddresses) -> Address {
        match self {
            ContractCall::Approve { amount, .. } => amount.asset().token_address(contracts),
            ContractCall::Swap { .. }
            | ContractCall::AddLiquidity { .. }
            | ContractCall::RemoveLiquidity { .. } => contracts.pool,
            ContractCall::Stake { program, .. } | ContractCall::Unstake { program, .. } => {
                staking_address(*program, contracts)
            }
            ContractCall::VaultDeposit { .. }
            | ContractCall::VaultWithdraw { .. }
            | ContractCall::VaultToggleAutoStake { .. }
            | ContractCall::VaultEmergencyWithdraw => contracts.vault,
        }
    }

    /// ABI-encoded calldata.
    pub fn calldata(&self) -> Bytes {
        let encoded = match self {
            ContractCall::Approve { amount, spender } => IERC20::approveCall {
                spender: *spender,
                amount: amount.units(),
            }
            .abi_encode(),
            ContractCall::Swap {
                amount_in,
                min_amount_out,
                direction,
                recipient,
            } => IBLXPool::swapExactTokensForTokensCall {
                amountIn: amount_in.units(),
                amountOutMin: min_amount_out.units(),
                token0ToToken1: direction.token0_to_token1(),
                to: *recipient,
            }
            .abi_encode(),
            ContractCall::AddLiquidity {
                blx_desired,
                usdc_desired,
                blx_min,
                usdc_min,
                recipient,
            } => IBLXPool::addLiquidityCall {
                amount0Desired: blx_desired.units(),
                amount1Desired: usdc_desired.units(),
                amount0Min: blx_min.units(),
                amount1Min: usdc_min.units(),
                to: *recipient,
            }
            .abi_encode(),
            ContractCall::RemoveLiquidity {
                liquidity,
                blx_min,
                usdc_min,
                recipient,
            } => IBLXPool::removeLiquidityCall {
                liquidity: liquidity.units(),
                amount0Min: blx_min.units(),
                amount1Min: usdc_min.units(),
                to: *recipient,
            }
            .abi_encode(),
            ContractCall::Stake {
                program,
                amount,
                lock,
            } => {
                let lock_choice = U256::from(lock.duration_secs());
                match program {
                    StakingProgram::Tiered => ITieredStaking::stakeCall {
                        amount: amount.units(),
                        lockChoice: lock_choice,
                    }
                    .abi_encode(),
                    StakingProgram::Liquid => ILiquidStaking::stakeCall {
                        amount: amount.units(),
                        lockChoice: lock_choice,
                    }
                    .abi_encode(),
                }
            }
            ContractCall::Unstake { program, index } => match program {
                StakingProgram::Tiered => ITieredStaking::withdrawCall {
                    index: U256::from(*index),
                }
                .abi_encode(),
                StakingProgram::Liquid => ILiquidStaking::redeemCall {
                    index: U256::from(*index),
                }
                .abi_encode(),
            },
            ContractCall::VaultDeposit {
                amount,
                lock_period_secs,
                auto_stake,
            } => IBLXVault::depositCall {
                amount: amount.units(),
                lockPeriod: *lock_period_secs,
                autoStake: *auto_stake,
            }
            .abi_encode(),
            ContractCall::VaultWithdraw { index } => IBLXVault::withdrawCall {
                depositIndex: U256::from(*index),
            }
            .abi_encode(),
            ContractCall::VaultToggleAutoStake { index } => IBLXVault::toggleAutoStakeCall {
                depositIndex: U256::from(*index),
            }
            .abi_encode(),
            ContractCall::VaultEmergencyWithdraw => IBLXVault::emergencyWithdrawCall {}.abi_encode(),
        };
        Bytes::from(encoded)
    }

    /// Token pulls that need a prior allowance, in the order they should be authorized.
    pub fn spends(&self, contracts: &ContractAddresses) -> Vec<Spend> {
        match self {
            ContractCall::Swap { amount_in, .. } => vec![Spend {
                amount: *amount_in,
                spender: contracts.pool,
            }],
            ContractCall::AddLiquidity {
                blx_desired,
                usdc_desired,
                ..
            } => vec![
                Spend {
                    amount: *blx_desired,
                    spender: contracts.pool,
                },
                Spend {
                    amount: *usdc_desired,
                    spender: contracts.pool,
                },
            ],
            ContractCall::Stake {
                program, amount, ..
            } => vec![Spend {
                amount: *amount,
                spender: staking_address(*program, contracts),
            }],
            ContractCall::VaultDeposit { amount, .. } => vec![Spend {
                amount: *amount,
                spender: contracts.vault,
            }],
            _ => Vec::new(),
        }
    }

    /// Every balance the call reduces. The pool burns LP directly, without an allowance.
    pub fn debits(&self, contracts: &ContractAddresses) -> Vec<BaseAmount> {
        let mut debits: Vec<BaseAmount> = self.spends(contracts).iter().map(|s| s.amount).collect();
        if let ContractCall::RemoveLiquidity { liquidity, .. } = self {
            debits.push(*liquidity);
        }
        debits
    }
}

impl fmt::Display for ContractCall {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ContractCall::Approve { amount, spender } => {
                write!(f, "approve {} {} for {spender}", amount.units(), amount.asset())
            }
            ContractCall::Unstake { index, .. }
            | ContractCall::VaultWithdraw { index }
            | ContractCall::VaultToggleAutoStake { index } => write!(f, "{} #{index}", self.name()),
            _ => f.write_str(self.name()),
        }
    }
}

pub(crate) fn staking_address(program: StakingProgram, contracts: &ContractAddresses) -> Address {
    match program {
        StakingProgram::Tiered => contracts.tiered_staking,
        StakingProgram::Liquid => contracts.liquid_staking,
    }
}
