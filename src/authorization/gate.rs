use alloy::primitives::U256;
use serde::Serialize;

use crate::query::types::AllowanceRecord;
use crate::query::Observable;

/// Outcome of comparing a required amount with the known allowance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum AuthorizationCheck {
    Sufficient,
    Required { current: Option<U256> },
}

impl AuthorizationCheck {
    pub fn evaluate(required: U256, current: Option<U256>) -> Self {
        if needs_authorization(required, current) {
            AuthorizationCheck::Required { current }
        } else {
            AuthorizationCheck::Sufficient
        }
    }

    pub fn is_required(&self) -> bool {
        matches!(self, AuthorizationCheck::Required { .. })
    }
}

/// True when the allowance is unknown or strictly below `required`.
pub fn needs_authorization(required: U256, current: Option<U256>) -> bool {
    match current {
        None => true,
        Some(allowance) => allowance < required,
    }
}

/// Same as `needs_authorization`, treating a stale or failed observation as unknown.
pub fn needs_authorization_observed(
    required: U256,
    allowance: &Observable<AllowanceRecord>,
) -> bool {
    needs_authorization(required, allowance.fresh_value().map(|record| record.amount))
}
