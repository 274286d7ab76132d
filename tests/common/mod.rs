//! Shared utilities for integration testing: an in-memory ledger.

#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use alloy::primitives::{Address, TxHash, U256};
use dashmap::DashMap;

use blx_client::blockchain::{BlockchainError, BlockchainResult, ChainId, ConfirmationStatus};
use blx_client::calc::staking::StakingProgram;
use blx_client::codec::{AssetId, BaseAmount};
use blx_client::config::ContractAddresses;
use blx_client::contracts::ContractCall;
use blx_client::orchestrator::{LedgerWriter, TxHandle};
use blx_client::query::types::{ReservePair, StakeRecord};
use blx_client::query::{ChainQueries, LedgerReader, QueryKey, QueryValue};
use blx_client::TransactionOrchestrator;

pub const CHAIN: ChainId = ChainId(11_155_111);

pub fn owner() -> Address {
    Address::repeat_byte(0xAA)
}

pub fn blx(units: u64) -> BaseAmount {
    BaseAmount::from_units(AssetId::Blx, U256::from(units))
}

pub fn usdc(units: u64) -> BaseAmount {
    BaseAmount::from_units(AssetId::Usdc, U256::from(units))
}

/// Ledger double. Confirmations apply the call's effect on balances, allowances and
/// positions, so the orchestrator's re-reads observe a consistent world.
pub struct MockLedger {
    pub contracts: ContractAddresses,
    sender: Option<Address>,
    chain_id: AtomicU64,
    block: AtomicU64,
    balances: DashMap<AssetId, U256>,
    allowances: DashMap<(AssetId, Address), U256>,
    reserves: Mutex<ReservePair>,
    stakes: Mutex<Vec<StakeRecord>>,
    /// One-shot reverts keyed by call name.
    reverts: DashMap<&'static str, String>,
    /// One-shot broadcast failures keyed by call name.
    rejected_submits: DashMap<&'static str, String>,
    fail_allowance_reads: AtomicBool,
    fail_all_reads: AtomicBool,
    fail_next_watch: AtomicBool,
    stall_watches: AtomicBool,
    submitted: Mutex<Vec<(TxHandle, ContractCall)>>,
    reads: DashMap<&'static str, u64>,
}

impl MockLedger {
    pub fn new() -> Self {
        Self::with_sender(Some(owner()))
    }

    pub fn with_sender(sender: Option<Address>) -> Self {
        Self {
            contracts: ContractAddresses::default(),
            sender,
            chain_id: AtomicU64::new(CHAIN.0),
            block: AtomicU64::new(100),
            balances: DashMap::new(),
            allowances: DashMap::new(),
            reserves: Mutex::new(ReservePair {
                reserve0: U256::from(1_000_000u64),
                reserve1: U256::from(1_000_000u64),
                last_update: 1_700_000_000,
            }),
            stakes: Mutex::new(Vec::new()),
            reverts: DashMap::new(),
            rejected_submits: DashMap::new(),
            fail_allowance_reads: AtomicBool::new(false),
            fail_all_reads: AtomicBool::new(false),
            fail_next_watch: AtomicBool::new(false),
            stall_watches: AtomicBool::new(false),
            submitted: Mutex::new(Vec::new()),
            reads: DashMap::new(),
        }
    }

    pub fn set_chain_id(&self, id: u64) {
        self.chain_id.store(id, Ordering::SeqCst);
    }

    pub fn set_balance(&self, asset: AssetId, units: u64) {
        self.balances.insert(asset, U256::from(units));
    }

    pub fn set_allowance(&self, asset: AssetId, spender: Address, units: u64) {
        self.allowances.insert((asset, spender), U256::from(units));
    }

    pub fn allowance(&self, asset: AssetId, spender: Address) -> U256 {
        self.allowances
            .get(&(asset, spender))
            .map(|a| *a)
            .unwrap_or_default()
    }

    pub fn set_reserves(&self, reserve0: u64, reserve1: u64) {
        let mut reserves = self.reserves.lock().unwrap();
        reserves.reserve0 = U256::from(reserve0);
        reserves.reserve1 = U256::from(reserve1);
    }

    /// The next confirmation of a call with this name reports a revert.
    pub fn revert_next(&self, call_name: &'static str, reason: &str) {
        self.reverts.insert(call_name, reason.to_string());
    }

    /// The next broadcast of a call with this name is refused by the endpoint.
    pub fn fail_next_submit(&self, call_name: &'static str, reason: &str) {
        self.rejected_submits.insert(call_name, reason.to_string());
    }

    pub fn fail_allowance_reads(&self, fail: bool) {
        self.fail_allowance_reads.store(fail, Ordering::SeqCst);
    }

    pub fn fail_all_reads(&self, fail: bool) {
        self.fail_all_reads.store(fail, Ordering::SeqCst);
    }

    /// The next confirmation watch errors instead of reporting a verdict.
    pub fn fail_next_watch(&self) {
        self.fail_next_watch.store(true, Ordering::SeqCst);
    }

    /// Confirmation watches never resolve, as if the transaction sat in the mempool.
    pub fn stall_watches(&self, stall: bool) {
        self.stall_watches.store(stall, Ordering::SeqCst);
    }

    pub fn submitted(&self) -> Vec<ContractCall> {
        self.submitted
            .lock()
            .unwrap()
            .iter()
            .map(|(_, call)| call.clone())
            .collect()
    }

    pub fn submitted_names(&self) -> Vec<&'static str> {
        self.submitted().iter().map(ContractCall::name).collect()
    }

    pub fn reads_of(&self, kind: &'static str) -> u64 {
        self.reads.get(kind).map(|n| *n).unwrap_or(0)
    }

    fn call_for(&self, handle: TxHandle) -> Option<ContractCall> {
        self.submitted
            .lock()
            .unwrap()
            .iter()
            .find(|(h, _)| *h == handle)
            .map(|(_, call)| call.clone())
    }

    fn debit(&self, amount: BaseAmount) {
        let mut balance = self.balances.entry(amount.asset()).or_default();
        *balance = balance.saturating_sub(amount.units());
    }

    fn apply(&self, call: &ContractCall) {
        for spend in call.spends(&self.contracts) {
            let mut allowance = self
                .allowances
                .entry((spend.amount.asset(), spend.spender))
                .or_default();
            *allowance = allowance.saturating_sub(spend.amount.units());
        }
        for debit in call.debits(&self.contracts) {
            self.debit(debit);
        }

        match call {
            ContractCall::Approve { amount, spender } => {
                self.allowances
                    .insert((amount.asset(), *spender), amount.units());
            }
            ContractCall::Stake {
                program: StakingProgram::Tiered,
                amount,
                lock,
            } => {
                self.stakes.lock().unwrap().push(StakeRecord {
                    principal: amount.units(),
                    start_time: 1_700_000_000,
                    lock_duration: lock.duration_secs(),
                    apr_bps: lock.nominal_apr_bps(),
                    withdrawn: false,
                });
            }
            ContractCall::Swap {
                amount_in,
                min_amount_out,
                direction,
                ..
            } => {
                let mut reserves = self.reserves.lock().unwrap();
                if direction.token0_to_token1() {
                    reserves.reserve0 += amount_in.units();
                    reserves.reserve1 = reserves.reserve1.saturating_sub(min_amount_out.units());
                } else {
                    reserves.reserve1 += amount_in.units();
                    reserves.reserve0 = reserves.reserve0.saturating_sub(min_amount_out.units());
                }
                let mut balance = self.balances.entry(direction.output_asset()).or_default();
                *balance += min_amount_out.units();
            }
            _ => {}
        }
    }
}

impl Default for MockLedger {
    fn default() -> Self {
        Self::new()
    }
}

impl LedgerReader for MockLedger {
    async fn read(&self, key: &QueryKey) -> BlockchainResult<QueryValue> {
        *self.reads.entry(key.kind()).or_default() += 1;

        if self.fail_all_reads.load(Ordering::SeqCst) {
            return Err(BlockchainError::Timeout(10));
        }

        match key {
            QueryKey::Reserves => Ok(QueryValue::Reserves(*self.reserves.lock().unwrap())),
            QueryKey::LpTotalSupply => Ok(QueryValue::Uint(U256::from(1_000_000u64))),
            QueryKey::SwapFee => Ok(QueryValue::Uint(U256::from(30))),
            QueryKey::TradingEnabled => Ok(QueryValue::Flag(true)),
            QueryKey::TokenBalance { asset, .. } => Ok(QueryValue::Uint(
                self.balances.get(asset).map(|b| *b).unwrap_or_default(),
            )),
            QueryKey::Allowance { asset, spender, .. } => {
                if self.fail_allowance_reads.load(Ordering::SeqCst) {
                    return Err(BlockchainError::Rpc("connection reset".to_string()));
                }
                Ok(QueryValue::Uint(self.allowance(*asset, *spender)))
            }
            QueryKey::StakeList { .. } => {
                Ok(QueryValue::Stakes(self.stakes.lock().unwrap().clone()))
            }
            QueryKey::StakeCount { .. } => Ok(QueryValue::Uint(U256::from(
                self.stakes.lock().unwrap().len(),
            ))),
            other => Err(BlockchainError::Rpc(format!("{} not served", other.kind()))),
        }
    }
}

impl LedgerWriter for MockLedger {
    async fn chain_id(&self) -> BlockchainResult<ChainId> {
        Ok(ChainId(self.chain_id.load(Ordering::SeqCst)))
    }

    fn sender(&self) -> Option<Address> {
        self.sender
    }

    async fn submit(&self, call: &ContractCall) -> BlockchainResult<TxHandle> {
        if let Some((_, reason)) = self.rejected_submits.remove(call.name()) {
            return Err(BlockchainError::Rpc(reason));
        }
        let mut submitted = self.submitted.lock().unwrap();
        let nonce = submitted.len() as u64 + 1;
        let handle = TxHandle(TxHash::left_padding_from(&nonce.to_be_bytes()));
        submitted.push((handle, call.clone()));
        Ok(handle)
    }

    async fn wait_for_confirmation(&self, handle: TxHandle) -> BlockchainResult<ConfirmationStatus> {
        if self.fail_next_watch.swap(false, Ordering::SeqCst) {
            return Err(BlockchainError::ConfirmationTimeout(300));
        }
        if self.stall_watches.load(Ordering::SeqCst) {
            std::future::pending::<()>().await;
        }

        let call = self
            .call_for(handle)
            .ok_or_else(|| BlockchainError::Rpc(format!("unknown transaction {handle}")))?;

        if let Some((_, reason)) = self.reverts.remove(call.name()) {
            return Ok(ConfirmationStatus::Failed(reason));
        }

        self.apply(&call);
        let block_number = self.block.fetch_add(1, Ordering::SeqCst);
        Ok(ConfirmationStatus::Confirmed { block_number })
    }
}

pub fn orchestrator(ledger: &Arc<MockLedger>) -> TransactionOrchestrator<MockLedger> {
    TransactionOrchestrator::new(ledger.clone(), ledger.contracts.clone(), CHAIN)
}

pub fn queries(ledger: &Arc<MockLedger>) -> ChainQueries<MockLedger> {
    ChainQueries::new(ledger.clone(), ledger.contracts.clone())
}
