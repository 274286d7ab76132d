//! Phases, handles and errors of the transaction state machine.

use std::fmt;

use alloy::primitives::{TxHash, U256};
use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;

use crate::blockchain::types::{BlockchainError, ChainId};
use crate::codec::AssetId;
use crate::contracts::ContractCall;
use crate::query::QueryError;

/// Role of a transaction within a sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TxKind {
    Authorization,
    Action,
}

impl TxKind {
    pub fn label(self) -> &'static str {
        match self {
            TxKind::Authorization => "authorization",
            TxKind::Action => "action",
        }
    }
}

impl fmt::Display for TxKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Opaque identifier the ledger returned for a broadcast transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct TxHandle(pub TxHash);

impl fmt::Display for TxHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Why a sequence stopped short.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "reason", content = "detail", rename_all = "snake_case")]
pub enum FailureReason {
    /// The ledger rejected the transaction.
    Reverted(String),
    /// The ledger could not be reached, or the confirmation watch gave up.
    Network(String),
    /// The caller stopped watching; the transaction's fate is unknown.
    Abandoned,
}

impl FailureReason {
    pub fn label(&self) -> &'static str {
        match self {
            FailureReason::Reverted(_) => "reverted",
            FailureReason::Network(_) => "network",
            FailureReason::Abandoned => "abandoned",
        }
    }
}

impl fmt::Display for FailureReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureReason::Reverted(reason) => write!(f, "reverted: {reason}"),
            FailureReason::Network(reason) => write!(f, "network failure: {reason}"),
            FailureReason::Abandoned => f.write_str("abandoned"),
        }
    }
}

/// Published state of the orchestrator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "phase", rename_all = "snake_case")]
pub enum Phase {
    Idle,
    Submitting {
        kind: TxKind,
    },
    AwaitingConfirmation {
        handle: TxHandle,
        kind: TxKind,
    },
    Confirmed {
        kind: TxKind,
    },
    Failed {
        kind: TxKind,
        reason: FailureReason,
    },
}

impl Phase {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            Phase::Confirmed {
                kind: TxKind::Action
            } | Phase::Failed { .. }
        )
    }
}

/// The transaction currently being watched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PendingTransaction {
    pub handle: TxHandle,
    pub kind: TxKind,
    pub call: ContractCall,
    /// Next call of the sequence, submitted only after this one confirms.
    pub dependent: Option<ContractCall>,
}

/// Record of a finished sequence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SequenceOutcome {
    pub sequence_id: Uuid,
    pub action: &'static str,
    /// Every handle broadcast by the sequence, in order.
    pub transactions: Vec<TxHandle>,
    /// Every phase the sequence passed through, ending with its terminal phase.
    pub phases: Vec<Phase>,
    /// Block the action was confirmed in.
    pub block_number: Option<u64>,
}

impl SequenceOutcome {
    pub fn terminal(&self) -> Option<&Phase> {
        self.phases.last()
    }

    pub fn succeeded(&self) -> bool {
        matches!(
            self.terminal(),
            Some(Phase::Confirmed {
                kind: TxKind::Action
            })
        )
    }

    pub fn failure(&self) -> Option<&FailureReason> {
        match self.terminal() {
            Some(Phase::Failed { reason, .. }) => Some(reason),
            _ => None,
        }
    }
}

/// Conditions that stop a request before or during its sequence.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OrchestratorError {
    #[error("a transaction sequence is already in progress")]
    AlreadyInProgress,

    #[error("wrong network: expected chain {expected}, connected to {actual}")]
    WrongNetwork { expected: ChainId, actual: ChainId },

    #[error("insufficient {asset} balance: need {required}, have {available}")]
    InsufficientBalance {
        asset: AssetId,
        required: U256,
        available: U256,
    },

    #[error("insufficient {asset} allowance: need {required}, have {}", display_allowance(.current))]
    InsufficientAllowance {
        asset: AssetId,
        required: U256,
        current: Option<U256>,
    },

    #[error("network failure: {0}")]
    Network(BlockchainError),

    #[error("transaction reverted: {0}")]
    Reverted(String),

    #[error("no signing account configured")]
    NoAccount,

    #[error("no transaction sequence in progress")]
    NothingPending,

    #[error("transaction {0} is not part of the current sequence")]
    UnknownHandle(TxHandle),
}

fn display_allowance(current: &Option<U256>) -> String {
    match current {
        Some(amount) => amount.to_string(),
        None => "unknown".to_string(),
    }
}

impl From<BlockchainError> for OrchestratorError {
    fn from(error: BlockchainError) -> Self {
        match error {
            BlockchainError::Reverted(reason) => OrchestratorError::Reverted(reason),
            BlockchainError::NoSigner => OrchestratorError::NoAccount,
            BlockchainError::ChainMismatch { expected, actual } => OrchestratorError::WrongNetwork {
                expected: ChainId(expected),
                actual: ChainId(actual),
            },
            other => OrchestratorError::Network(other),
        }
    }
}

impl From<QueryError> for OrchestratorError {
    fn from(error: QueryError) -> Self {
        match error {
            QueryError::Ledger(e) => e.into(),
            QueryError::Disabled(kind) | QueryError::UnexpectedShape(kind) => {
                OrchestratorError::Network(BlockchainError::Decode {
                    call: kind,
                    reason: "no usable value".to_string(),
                })
            }
        }
    }
}

impl From<&OrchestratorError> for FailureReason {
    fn from(error: &OrchestratorError) -> Self {
        match error {
            OrchestratorError::Reverted(reason) => FailureReason::Reverted(reason.clone()),
            other => FailureReason::Network(other.to_string()),
        }
    }
}
