//! Client-wide error taxonomy.
//!
//! Subsystem errors stay precise inside their modules; at the edge they collapse into
//! the conditions a caller can act on.

use alloy::primitives::U256;
use thiserror::Error;

use crate::blockchain::types::{BlockchainError, ChainId};
use crate::calc::CalcError;
use crate::codec::{AssetId, CodecError};
use crate::config::ConfigError;
use crate::contracts::CallError;
use crate::orchestrator::OrchestratorError;
use crate::query::QueryError;

#[derive(Debug, Error)]
pub enum ClientError {
    /// Rejected before any call was attempted.
    #[error("invalid amount: {0}")]
    InvalidAmount(String),

    #[error("insufficient {asset} allowance (need {required})")]
    InsufficientAllowance { asset: AssetId, required: U256 },

    #[error("insufficient {asset} balance: need {required}, have {available}")]
    InsufficientBalance {
        asset: AssetId,
        required: U256,
        available: U256,
    },

    #[error("network failure: {0}")]
    NetworkFailure(String),

    #[error("transaction reverted: {0}")]
    TransactionReverted(String),

    #[error("a transaction sequence is already in progress")]
    AlreadyInProgress,

    #[error("wrong network: expected chain {expected}, connected to {actual}")]
    WrongNetwork { expected: ChainId, actual: ChainId },

    #[error("no signing account configured (set BLX_CLIENT_PRIVATE_KEY)")]
    NoAccount,

    #[error("{0} is not available in this deployment")]
    Unavailable(&'static str),

    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
}

impl ClientError {
    /// Stable label of the condition.
    pub fn kind(&self) -> &'static str {
        match self {
            ClientError::InvalidAmount(_) => "invalid_amount",
            ClientError::InsufficientAllowance { .. } => "insufficient_allowance",
            ClientError::InsufficientBalance { .. } => "insufficient_balance",
            ClientError::NetworkFailure(_) => "network_failure",
            ClientError::TransactionReverted(_) => "transaction_reverted",
            ClientError::AlreadyInProgress => "already_in_progress",
            ClientError::WrongNetwork { .. } => "wrong_network",
            ClientError::NoAccount => "no_account",
            ClientError::Unavailable(_) => "unavailable",
            ClientError::Config(_) => "config",
        }
    }
}

impl From<CodecError> for ClientError {
    fn from(error: CodecError) -> Self {
        ClientError::InvalidAmount(error.to_string())
    }
}

impl From<CalcError> for ClientError {
    fn from(error: CalcError) -> Self {
        ClientError::InvalidAmount(error.to_string())
    }
}

impl From<CallError> for ClientError {
    fn from(error: CallError) -> Self {
        ClientError::InvalidAmount(error.to_string())
    }
}

impl From<BlockchainError> for ClientError {
    fn from(error: BlockchainError) -> Self {
        OrchestratorError::from(error).into()
    }
}

impl From<QueryError> for ClientError {
    fn from(error: QueryError) -> Self {
        match error {
            QueryError::Disabled(kind) => ClientError::Unavailable(kind),
            QueryError::Ledger(e) => e.into(),
            QueryError::UnexpectedShape(_) => ClientError::NetworkFailure(error.to_string()),
        }
    }
}

impl From<OrchestratorError> for ClientError {
    fn from(error: OrchestratorError) -> Self {
        match error {
            OrchestratorError::AlreadyInProgress => ClientError::AlreadyInProgress,
            OrchestratorError::WrongNetwork { expected, actual } => {
                ClientError::WrongNetwork { expected, actual }
            }
            OrchestratorError::InsufficientBalance {
                asset,
                required,
                available,
            } => ClientError::InsufficientBalance {
                asset,
                required,
                available,
            },
            OrchestratorError::InsufficientAllowance {
                asset, required, ..
            } => ClientError::InsufficientAllowance { asset, required },
            OrchestratorError::Network(e) => ClientError::NetworkFailure(e.to_string()),
            OrchestratorError::Reverted(reason) => ClientError::TransactionReverted(reason),
            OrchestratorError::NoAccount => ClientError::NoAccount,
            e @ (OrchestratorError::NothingPending | OrchestratorError::UnknownHandle(_)) => {
                ClientError::NetworkFailure(e.to_string())
            }
        }
    }
}
