//! Decimal codec.
//!
//! # Data Flow
//! ```text
//! user text "12.5"
//!     → decimal.rs (to_base_units, per-asset precision)
//!     → amount.rs (BaseAmount, the only amount type call records accept)
//!     → contracts::calls (ABI-encoded uint256)
//!
//! ledger uint256
//!     → BaseAmount::from_units
//!     → decimal.rs (to_display, exact)
//! ```
//!
//! # Design Decisions
//! - No floating point anywhere on the conversion path
//! - Over-precise input is rejected unless the caller explicitly asks to truncate
//! - `to_base_units(to_display(x)) == x` for every `x`

pub mod amount;
pub mod asset;
pub mod decimal;

pub use amount::{BaseAmount, DisplayAmount};
pub use asset::{Asset, AssetId, AssetRegistry};
pub use decimal::{to_base_units, to_base_units_truncating, to_display, CodecError};
