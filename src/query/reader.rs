//! Read side of the ledger seam.

use std::future::Future;

use crate::blockchain::types::BlockchainResult;
use crate::query::key::{QueryKey, QueryValue};

/// Anything that can answer a read-only query.
///
/// Implemented over JSON-RPC by `blockchain::RpcLedger` and by in-memory ledgers in tests.
pub trait LedgerReader: Send + Sync {
    fn read(&self, key: &QueryKey) -> impl Future<Output = BlockchainResult<QueryValue>> + Send;
}
