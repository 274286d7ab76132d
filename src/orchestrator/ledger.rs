//! Write side of the ledger seam.

use std::future::Future;

use alloy::primitives::Address;

use crate::blockchain::types::{BlockchainResult, ChainId, ConfirmationStatus};
use crate::contracts::ContractCall;
use crate::orchestrator::state::TxHandle;

/// Anything that can broadcast calls and report their fate.
pub trait LedgerWriter: Send + Sync {
    /// Chain the ledger endpoint serves, asked fresh every time.
    fn chain_id(&self) -> impl Future<Output = BlockchainResult<ChainId>> + Send;

    /// Account calls are sent from; `None` when the ledger is read-only.
    fn sender(&self) -> Option<Address>;

    /// Broadcast one call. Resolves once the network accepted it.
    fn submit(&self, call: &ContractCall) -> impl Future<Output = BlockchainResult<TxHandle>> + Send;

    /// Resolve once the transaction is confirmed or failed. `Err` means the watch
    /// itself failed and the outcome is unknown.
    fn wait_for_confirmation(
        &self,
        handle: TxHandle,
    ) -> impl Future<Output = BlockchainResult<ConfirmationStatus>> + Send;
}
