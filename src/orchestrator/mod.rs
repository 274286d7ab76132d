//! Transaction Orchestrator.
//!
//! # Data Flow
//! ```text
//! FlowRequest (action built through the codec)
//!     → machine.rs: network check → balance check → fresh allowances → Authorization Gate
//!     → ledger.rs (LedgerWriter::submit) → AwaitingConfirmation
//!     → confirmation event → next step or terminal phase → Idle
//!     → request.rs (cached reads made stale by the write)
//! ```
//!
//! # Phases
//! ```text
//! Idle → Submitting(kind) → AwaitingConfirmation(handle, kind) → Confirmed(kind) | Failed(kind, reason)
//!                 ↑                                                    │
//!                 └──────── Confirmed(authorization), next step ───────┘
//! ```
//!
//! # Design Decisions
//! - Exactly one broadcast per transition into `Submitting`; nothing is retried
//! - Approvals cover exactly the amount the action spends
//! - A failed authorization drops every later step of the sequence

pub mod ledger;
pub mod machine;
pub mod request;
pub mod state;

pub use ledger::LedgerWriter;
pub use machine::TransactionOrchestrator;
pub use request::{invalidated_by, FlowRequest};
pub use state::{
    FailureReason, OrchestratorError, PendingTransaction, Phase, SequenceOutcome, TxHandle, TxKind,
};
