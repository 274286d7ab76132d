//! BLX protocol client library.
//!
//! Orchestration and calculator layer for the BLX/USDC pool, the tiered and liquid
//! staking programs and the locked-deposit vault.
//!
//! # Architecture Overview
//!
//! ```text
//!   user input ──▶ codec ──▶ contracts::ContractCall ──▶ orchestrator ──▶ blockchain ──▶ ledger
//!                    ▲                                       │   ▲
//!                    │                                       │   │ fresh allowances/balances
//!                  calc ◀──────── query (cache) ◀────────────┘───┘
//!                (pure)            ▲
//!                                  └── blockchain::RpcLedger (eth_call)
//! ```

// Core subsystems
pub mod codec;
pub mod config;
pub mod contracts;

// Ledger access
pub mod blockchain;
pub mod query;

// Domain logic
pub mod authorization;
pub mod calc;
pub mod orchestrator;

// Cross-cutting concerns
pub mod error;
pub mod lifecycle;
pub mod observability;

pub use config::ClientConfig;
pub use error::ClientError;
pub use lifecycle::Shutdown;
pub use orchestrator::TransactionOrchestrator;
pub use query::ChainQueries;
