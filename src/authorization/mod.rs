//! Authorization Gate.
//!
//! Decides whether an action needs a prior approval. The orchestrator consults it with a
//! freshly queried allowance before every submission.

pub mod gate;

pub use gate::{needs_authorization, needs_authorization_observed, AuthorizationCheck};
