//! Blockchain integration subsystem.
//!
//! # Data Flow
//! ```text
//! BLX_CLIENT_PRIVATE_KEY
//!     → wallet.rs (key loading)
//!     → client.rs (failover reads, signing provider, chain-id guard, gas cap)
//!     → transaction.rs (receipt polling, confirmation depth)
//!     → ledger.rs (RpcLedger: query decoding + call submission)
//! ```
//!
//! # Security Constraints
//! - Private keys ONLY from environment variables
//! - Never log private keys or sensitive data
//! - All RPC calls have configurable timeouts
//! - Reads work without a key; writes fail with `NoSigner`

pub mod client;
pub mod ledger;
pub mod transaction;
pub mod types;
pub mod wallet;

pub use client::BlockchainClient;
pub use ledger::RpcLedger;
pub use transaction::TxWatcher;
pub use types::{BlockchainError, BlockchainResult, ChainId, ConfirmationStatus};
pub use wallet::Wallet;
