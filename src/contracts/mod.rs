//! Protocol contract bindings.
//!
//! # Data Flow
//! ```text
//! codec::BaseAmount + calc lock choices
//!     → calls.rs (ContractCall, one validated record per write)
//!     → abi.rs (sol! bindings, ABI encoding)
//!     → blockchain::ledger (eth_call / eth_sendTransaction)
//! ```
//!
//! # Design Decisions
//! - Only the functions the client actually uses are bound
//! - Read-side reserve widths are declared as uint256; the return encoding is identical

pub mod abi;
pub mod calls;

pub use calls::{CallError, ContractCall, Spend};
