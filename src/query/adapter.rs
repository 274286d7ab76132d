//! Typed, cached reads over a `LedgerReader`.

use std::sync::Arc;

use alloy::primitives::{Address, U256};
use thiserror::Error;

use crate::blockchain::types::BlockchainError;
use crate::calc::staking::StakingProgram;
use crate::codec::AssetId;
use crate::config::ContractAddresses;
use crate::observability::metrics;
use crate::query::cache::QueryCache;
use crate::query::key::{FromQueryValue, InvalidationScope, QueryKey, QueryValue};
use crate::query::observable::Observable;
use crate::query::reader::LedgerReader;
use crate::query::types::{
    AllowanceRecord, DepositRecord, LiquidTotals, ReservePair, StakeRecord, StakingAprs,
    VaultLockPeriods, VaultTotals, WithdrawalSplit,
};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QueryError {
    /// The query targets a contract that is not deployed in this configuration.
    #[error("query {0} is disabled")]
    Disabled(&'static str),

    #[error(transparent)]
    Ledger(#[from] BlockchainError),

    #[error("unexpected value shape for {0}")]
    UnexpectedShape(&'static str),
}

/// Chain Query Adapter.
///
/// Each `refresh` issues exactly one read, with no retry. Failures leave the previous value
/// in the cache and surface through the observable's `error`.
pub struct ChainQueries<R> {
    reader: Arc<R>,
    cache: QueryCache,
    contracts: ContractAddresses,
}

impl<R> Clone for ChainQueries<R> {
    fn clone(&self) -> Self {
        Self {
            reader: self.reader.clone(),
            cache: self.cache.clone(),
            contracts: self.contracts.clone(),
        }
    }
}

impl<R: LedgerReader> ChainQueries<R> {
    pub fn new(reader: Arc<R>, contracts: ContractAddresses) -> Self {
        Self::with_cache(reader, contracts, QueryCache::new())
    }

    pub fn with_cache(reader: Arc<R>, contracts: ContractAddresses, cache: QueryCache) -> Self {
        Self {
            reader,
            cache,
            contracts,
        }
    }

    pub fn cache(&self) -> &QueryCache {
        &self.cache
    }

    pub fn contracts(&self) -> &ContractAddresses {
        &self.contracts
    }

    fn is_enabled(&self, key: &QueryKey) -> bool {
        !key.targets_liquid_staking() || self.contracts.liquid_staking_enabled()
    }

    /// Read `key` from the ledger now and store the result.
    pub async fn fetch(&self, key: QueryKey) -> Result<QueryValue, QueryError> {
        let kind = key.kind();
        if !self.is_enabled(&key) {
            return Err(QueryError::Disabled(kind));
        }

        self.cache.mark_loading(key);
        match self.reader.read(&key).await {
            Ok(value) => {
                metrics::record_query(kind, true);
                tracing::debug!(query = kind, "Query resolved");
                self.cache.store_value(key, value.clone());
                Ok(value)
            }
            Err(e) => {
                metrics::record_query(kind, false);
                tracing::warn!(query = kind, error = %e, "Query failed");
                self.cache.store_error(key, e.to_string());
                Err(QueryError::Ledger(e))
            }
        }
    }

    pub async fn fetch_as<T: FromQueryValue>(&self, key: QueryKey) -> Result<T, QueryError> {
        let value = self.fetch(key).await?;
        T::from_query_value(value).ok_or(QueryError::UnexpectedShape(key.kind()))
    }

    /// Current cached view of `key`, without I/O.
    pub fn snapshot<T: FromQueryValue>(&self, key: &QueryKey) -> Observable<T> {
        match self.cache.get(key) {
            Some(state) => Observable {
                value: state.value.and_then(T::from_query_value),
                is_loading: state.is_loading,
                error: state.error,
                is_stale: state.stale,
                is_enabled: true,
            },
            None => Observable::unfetched(),
        }
    }

    /// Manual refresh: one read, then the resulting view.
    pub async fn refresh<T: FromQueryValue>(&self, key: QueryKey) -> Observable<T> {
        if !self.is_enabled(&key) {
            return Observable::disabled();
        }
        // The outcome is recorded in the cache either way.
        let _ = self.fetch(key).await;
        self.snapshot(&key)
    }

    async fn refresh_for<T: FromQueryValue>(
        &self,
        owner: Option<Address>,
        key: impl FnOnce(Address) -> QueryKey,
    ) -> Observable<T> {
        match owner {
            Some(owner) => self.refresh(key(owner)).await,
            None => Observable::disabled(),
        }
    }

    pub fn invalidate(&self, scope: &InvalidationScope) -> usize {
        let count = self.cache.invalidate_scope(scope);
        tracing::debug!(scope = ?scope, count, "Invalidated cached queries");
        count
    }

    pub async fn reserves(&self) -> Observable<ReservePair> {
        self.refresh(QueryKey::Reserves).await
    }

    pub async fn lp_total_supply(&self) -> Observable<U256> {
        self.refresh(QueryKey::LpTotalSupply).await
    }

    pub async fn swap_fee(&self) -> Observable<U256> {
        self.refresh(QueryKey::SwapFee).await
    }

    pub async fn trading_enabled(&self) -> Observable<bool> {
        self.refresh(QueryKey::TradingEnabled).await
    }

    /// The pool's own quote for the given reserves.
    pub async fn remote_amount_out(
        &self,
        amount_in: U256,
        reserve_in: U256,
        reserve_out: U256,
    ) -> Observable<U256> {
        self.refresh(QueryKey::AmountOut {
            amount_in,
            reserve_in,
            reserve_out,
        })
        .await
    }

    pub async fn token_balance(&self, asset: AssetId, owner: Option<Address>) -> Observable<U256> {
        self.refresh_for(owner, |owner| QueryKey::TokenBalance { asset, owner })
            .await
    }

    pub async fn allowance(
        &self,
        asset: AssetId,
        owner: Option<Address>,
        spender: Address,
    ) -> Observable<AllowanceRecord> {
        let Some(owner) = owner else {
            return Observable::disabled();
        };
        let amount: Observable<U256> = self
            .refresh(QueryKey::Allowance {
                asset,
                owner,
                spender,
            })
            .await;
        amount.map(|amount| AllowanceRecord {
            owner,
            spender,
            asset,
            amount,
        })
    }

    pub async fn stakes(&self, owner: Option<Address>) -> Observable<Vec<StakeRecord>> {
        self.refresh_for(owner, |owner| QueryKey::StakeList { owner }).await
    }

    pub async fn stake_count(&self, owner: Option<Address>) -> Observable<U256> {
        self.refresh_for(owner, |owner| QueryKey::StakeCount { owner }).await
    }

    pub async fn liquid_stake(&self, owner: Option<Address>, index: u64) -> Observable<StakeRecord> {
        self.refresh_for(owner, |owner| QueryKey::LiquidStake { owner, index })
            .await
    }

    pub async fn pending_reward(
        &self,
        program: StakingProgram,
        owner: Option<Address>,
        index: u64,
    ) -> Observable<U256> {
        self.refresh_for(owner, |owner| QueryKey::PendingReward {
            program,
            owner,
            index,
        })
        .await
    }

    pub async fn staking_aprs(&self, program: StakingProgram) -> Observable<StakingAprs> {
        self.refresh(QueryKey::StakingAprs { program }).await
    }

    pub async fn liquid_totals(&self) -> Observable<LiquidTotals> {
        self.refresh(QueryKey::LiquidTotals).await
    }

    pub async fn vault_deposits(&self, owner: Option<Address>) -> Observable<Vec<DepositRecord>> {
        self.refresh_for(owner, |owner| QueryKey::VaultDeposits { owner })
            .await
    }

    pub async fn vault_deposit_count(&self, owner: Option<Address>) -> Observable<U256> {
        self.refresh_for(owner, |owner| QueryKey::VaultDepositCount { owner })
            .await
    }

    pub async fn vault_user_balance(&self, owner: Option<Address>) -> Observable<U256> {
        self.refresh_for(owner, |owner| QueryKey::VaultUserBalance { owner })
            .await
    }

    pub async fn vault_totals(&self) -> Observable<VaultTotals> {
        self.refresh(QueryKey::VaultTotals).await
    }

    pub async fn vault_lock_periods(&self) -> Observable<VaultLockPeriods> {
        self.refresh(QueryKey::VaultLockPeriods).await
    }

    pub async fn deposit_locked(&self, owner: Option<Address>, index: u64) -> Observable<bool> {
        self.refresh_for(owner, |owner| QueryKey::DepositLocked { owner, index })
            .await
    }

    pub async fn withdrawal_split(
        &self,
        owner: Option<Address>,
        index: u64,
    ) -> Observable<WithdrawalSplit> {
        self.refresh_for(owner, |owner| QueryKey::WithdrawalSplit { owner, index })
            .await
    }
}
