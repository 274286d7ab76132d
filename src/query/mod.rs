//! Chain Query Adapter.
//!
//! # Data Flow
//! ```text
//! caller (CLI, orchestrator, calculators)
//!     → adapter.rs (ChainQueries: typed refresh, identity gating)
//!     → cache.rs (one DashMap keyed by QueryKey)
//!     → reader.rs (LedgerReader seam)
//!     → blockchain::RpcLedger (eth_call + ABI decode)
//! ```
//!
//! # Design Decisions
//! - Stale-while-revalidate: a failed refresh never clears the last good value
//! - No automatic retries; every refresh is explicit
//! - Writes mark affected keys stale instead of patching cached values
//! - Queries needing an absent account are never sent

pub mod adapter;
pub mod cache;
pub mod key;
pub mod observable;
pub mod reader;
pub mod types;

pub use adapter::{ChainQueries, QueryError};
pub use cache::{QueryCache, QueryState};
pub use key::{FromQueryValue, InvalidationScope, QueryKey, QueryValue};
pub use observable::Observable;
pub use reader::LedgerReader;
