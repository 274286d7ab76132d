//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → ClientConfig (validated, immutable)
//!     → shared by reference with the query adapter, orchestrator and CLI
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; it is supplied once at startup
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks
//! - The signing key never lives in the file (see `blockchain::wallet`)

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, ConfigError};
pub use schema::{
    AssetConfig, AssetsConfig, ClientConfig, ContractAddresses, NetworkConfig,
    ObservabilityConfig, TradingConfig,
};
pub use validation::{validate_config, ValidationError};
