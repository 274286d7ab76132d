//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Signals (signals.rs):
//!     SIGINT (Ctrl-C) → Shutdown::trigger
//!
//! Shutdown (shutdown.rs):
//!     trigger → every subscriber's `notified()` resolves
//!     → orchestrator abandons its confirmation watch and returns to Idle
//! ```
//!
//! # Design Decisions
//! - A broadcast transaction cannot be recalled; shutdown only stops watching it
//! - Triggering before anyone subscribes is not lost

pub mod shutdown;
pub mod signals;

pub use shutdown::Shutdown;
pub use signals::listen_for_ctrl_c;
