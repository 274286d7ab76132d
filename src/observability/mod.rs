//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! query adapter, orchestrator, blockchain client produce:
//!     → logging.rs (structured tracing events)
//!     → metrics.rs (counters and gauges through the `metrics` facade)
//!
//! Consumers:
//!     → stderr (fmt layer, filtered by RUST_LOG or config)
//!     → Prometheus scrape endpoint (optional)
//! ```
//!
//! # Design Decisions
//! - Recording is a no-op until a recorder is installed, so library users and tests pay nothing
//! - Metric names and labels are fixed here; call sites never build names dynamically

pub mod logging;
pub mod metrics;
