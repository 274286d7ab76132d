//! JSON-RPC implementation of both ledger seams.

use alloy::primitives::{Address, U256};
use alloy::sol_types::SolCall;

use crate::blockchain::client::BlockchainClient;
use crate::blockchain::transaction::TxWatcher;
use crate::blockchain::types::{BlockchainError, BlockchainResult, ChainId, ConfirmationStatus};
use crate::calc::staking::StakingProgram;
use crate::config::{ContractAddresses, NetworkConfig};
use crate::contracts::abi::{IBLXPool, IBLXVault, IERC20, ILiquidStaking, ITieredStaking};
use crate::contracts::calls::staking_address;
use crate::contracts::ContractCall;
use crate::orchestrator::{LedgerWriter, TxHandle};
use crate::query::types::{
    saturating_u64, DepositRecord, LiquidTotals, ReservePair, StakeRecord, StakingAprs,
    VaultLockPeriods, VaultTotals, WithdrawalSplit,
};
use crate::query::{LedgerReader, QueryKey, QueryValue};

/// The deployed protocol, reached over JSON-RPC.
#[derive(Debug, Clone)]
pub struct RpcLedger {
    client: BlockchainClient,
    watcher: TxWatcher,
    contracts: ContractAddresses,
}

impl RpcLedger {
    pub fn new(client: BlockchainClient, network: &NetworkConfig, contracts: ContractAddresses) -> Self {
        Self {
            watcher: TxWatcher::new(client.clone(), network),
            client,
            contracts,
        }
    }

    pub fn client(&self) -> &BlockchainClient {
        &self.client
    }

    /// `eth_call` a view function and decode its return data.
    async fn view<C: SolCall>(&self, to: Address, call: C) -> BlockchainResult<C::Return> {
        let data = self.client.call(to, call.abi_encode().into()).await?;
        C::abi_decode_returns(&data).map_err(|e| BlockchainError::Decode {
            call: C::SIGNATURE,
            reason: e.to_string(),
        })
    }

    async fn read_aprs(&self, program: StakingProgram) -> BlockchainResult<StakingAprs> {
        let to = staking_address(program, &self.contracts);
        let aprs = match program {
            StakingProgram::Tiered => StakingAprs {
                days_30: saturating_u64(self.view(to, ITieredStaking::APR_30DCall {}).await?),
                days_90: saturating_u64(self.view(to, ITieredStaking::APR_90DCall {}).await?),
                days_365: saturating_u64(self.view(to, ITieredStaking::APR_365DCall {}).await?),
            },
            StakingProgram::Liquid => StakingAprs {
                days_30: saturating_u64(self.view(to, ILiquidStaking::APR_30DCall {}).await?),
                days_90: saturating_u64(self.view(to, ILiquidStaking::APR_90DCall {}).await?),
                days_365: saturating_u64(self.view(to, ILiquidStaking::APR_365DCall {}).await?),
            },
        };
        Ok(aprs)
    }
}

impl LedgerReader for RpcLedger {
    async fn read(&self, key: &QueryKey) -> BlockchainResult<QueryValue> {
        let c = &self.contracts;
        let value = match *key {
            QueryKey::Reserves => {
                let r = self.view(c.pool, IBLXPool::getReservesCall {}).await?;
                QueryValue::Reserves(ReservePair {
                    reserve0: r.reserve0,
                    reserve1: r.reserve1,
                    last_update: r.blockTimestampLast,
                })
            }
            QueryKey::LpTotalSupply => {
                QueryValue::Uint(self.view(c.pool, IERC20::totalSupplyCall {}).await?)
            }
            QueryKey::SwapFee => QueryValue::Uint(self.view(c.pool, IBLXPool::swapFeeCall {}).await?),
            QueryKey::TradingEnabled => {
                QueryValue::Flag(self.view(c.pool, IBLXPool::tradingEnabledCall {}).await?)
            }
            QueryKey::AmountOut {
                amount_in,
                reserve_in,
                reserve_out,
            } => QueryValue::Uint(
                self.view(
                    c.pool,
                    IBLXPool::getAmountOutCall {
                        amountIn: amount_in,
                        reserveIn: reserve_in,
                        reserveOut: reserve_out,
                    },
                )
                .await?,
            ),
            QueryKey::TokenBalance { asset, owner } => QueryValue::Uint(
                self.view(asset.token_address(c), IERC20::balanceOfCall { account: owner })
                    .await?,
            ),
            QueryKey::Allowance {
                asset,
                owner,
                spender,
            } => QueryValue::Uint(
                self.view(asset.token_address(c), IERC20::allowanceCall { owner, spender })
                    .await?,
            ),
            QueryKey::StakeList { owner } => {
                let stakes = self
                    .view(c.tiered_staking, ITieredStaking::getUserStakesInfoCall { user: owner })
                    .await?;
                QueryValue::Stakes(
                    stakes
                        .into_iter()
                        .map(|s| StakeRecord {
                            principal: s.amount,
                            start_time: saturating_u64(s.startTime),
                            lock_duration: saturating_u64(s.lockDuration),
                            apr_bps: saturating_u64(s.apr),
                            withdrawn: s.withdrawn,
                        })
                        .collect(),
                )
            }
            QueryKey::StakeCount { owner } => QueryValue::Uint(
                self.view(c.tiered_staking, ITieredStaking::stakesLengthCall { user: owner })
                    .await?,
            ),
            QueryKey::LiquidStake { owner, index } => {
                let s = self
                    .view(
                        c.liquid_staking,
                        ILiquidStaking::stakesCall {
                            user: owner,
                            index: U256::from(index),
                        },
                    )
                    .await?;
                QueryValue::Stake(StakeRecord {
                    principal: s.amount,
                    start_time: saturating_u64(s.startTime),
                    lock_duration: saturating_u64(s.lockDuration),
                    apr_bps: saturating_u64(s.apr),
                    withdrawn: false,
                })
            }
            QueryKey::PendingReward {
                program,
                owner,
                index,
            } => {
                let to = staking_address(program, &self.contracts);
                let index = U256::from(index);
                let reward = match program {
                    StakingProgram::Tiered => {
                        self.view(to, ITieredStaking::pendingRewardCall { user: owner, index })
                            .await?
                    }
                    StakingProgram::Liquid => {
                        self.view(to, ILiquidStaking::pendingRewardCall { user: owner, index })
                            .await?
                    }
                };
                QueryValue::Uint(reward)
            }
            QueryKey::StakingAprs { program } => QueryValue::Aprs(self.read_aprs(program).await?),
            QueryKey::LiquidTotals => QueryValue::LiquidTotals(LiquidTotals {
                total_staked: self
                    .view(c.liquid_staking, ILiquidStaking::totalStakedCall {})
                    .await?,
                total_rewards: self
                    .view(c.liquid_staking, ILiquidStaking::totalRewardsCall {})
                    .await?,
            }),
            QueryKey::VaultDeposits { owner } => {
                let deposits = self
                    .view(c.vault, IBLXVault::getUserDepositsCall { user: owner })
                    .await?;
                QueryValue::Deposits(
                    deposits
                        .into_iter()
                        .map(|d| DepositRecord {
                            principal: d.amount,
                            deposit_time: saturating_u64(d.depositTime),
                            lock_until: saturating_u64(d.lockUntil),
                            auto_stake: d.autoStake,
                            withdrawn: d.withdrawn,
                        })
                        .collect(),
                )
            }
            QueryKey::VaultDepositCount { owner } => QueryValue::Uint(
                self.view(c.vault, IBLXVault::getUserDepositCountCall { user: owner })
                    .await?,
            ),
            QueryKey::VaultUserBalance { owner } => QueryValue::Uint(
                self.view(c.vault, IBLXVault::totalUserBalanceCall { user: owner })
                    .await?,
            ),
            QueryKey::VaultTotals => QueryValue::VaultTotals(VaultTotals {
                total_balance: self.view(c.vault, IBLXVault::totalVaultBalanceCall {}).await?,
                total_auto_staked: self.view(c.vault, IBLXVault::totalAutoStakedCall {}).await?,
            }),
            QueryKey::VaultLockPeriods => QueryValue::LockPeriods(VaultLockPeriods {
                no_lock: self.view(c.vault, IBLXVault::NO_LOCKCall {}).await?,
                days_7: self.view(c.vault, IBLXVault::LOCK_7_DAYSCall {}).await?,
                days_30: self.view(c.vault, IBLXVault::LOCK_30_DAYSCall {}).await?,
                days_90: self.view(c.vault, IBLXVault::LOCK_90_DAYSCall {}).await?,
            }),
            QueryKey::DepositLocked { owner, index } => QueryValue::Flag(
                self.view(
                    c.vault,
                    IBLXVault::isDepositLockedCall {
                        user: owner,
                        depositIndex: U256::from(index),
                    },
                )
                .await?,
            ),
            QueryKey::WithdrawalSplit { owner, index } => {
                let split = self
                    .view(
                        c.vault,
                        IBLXVault::calculateWithdrawalAmountCall {
                            user: owner,
                            depositIndex: U256::from(index),
                        },
                    )
                    .await?;
                QueryValue::Split(WithdrawalSplit {
                    net_amount: split.netAmount,
                    fee: split.fee,
                })
            }
        };
        Ok(value)
    }
}

impl LedgerWriter for RpcLedger {
    async fn chain_id(&self) -> BlockchainResult<ChainId> {
        self.client.get_chain_id().await
    }

    fn sender(&self) -> Option<Address> {
        self.client.sender()
    }

    async fn submit(&self, call: &ContractCall) -> BlockchainResult<TxHandle> {
        let to = call.target(&self.contracts);
        let tx_hash = self.client.send(to, call.calldata()).await?;
        Ok(TxHandle(tx_hash))
    }

    async fn wait_for_confirmation(&self, handle: TxHandle) -> BlockchainResult<ConfirmationStatus> {
        self.watcher.wait_for_confirmation(handle.0).await
    }
}
