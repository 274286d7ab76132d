//! What a consumer sees for a query.

use serde::Serialize;

/// Value, loading flag and error of one query.
///
/// A refresh that fails keeps the last good `value` and sets `error`; a value from before
/// an invalidation stays visible with `is_stale` set until the next successful fetch.
/// `is_enabled` is false only when the query was skipped for lack of an identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Observable<T> {
    pub value: Option<T>,
    pub is_loading: bool,
    pub error: Option<String>,
    pub is_stale: bool,
    pub is_enabled: bool,
}

impl<T> Observable<T> {
    /// A query that was not issued because a required identity is absent.
    pub fn disabled() -> Self {
        Self {
            value: None,
            is_loading: false,
            error: None,
            is_stale: false,
            is_enabled: false,
        }
    }

    /// An enabled query that has never been fetched.
    pub fn unfetched() -> Self {
        Self {
            is_enabled: true,
            ..Self::disabled()
        }
    }

    pub fn ready(value: T) -> Self {
        Self {
            value: Some(value),
            ..Self::unfetched()
        }
    }

    /// The value only when it reflects the latest successful fetch.
    pub fn fresh_value(&self) -> Option<&T> {
        if self.error.is_some() || self.is_stale {
            return None;
        }
        self.value.as_ref()
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Observable<U> {
        Observable {
            value: self.value.map(f),
            is_loading: self.is_loading,
            error: self.error,
            is_stale: self.is_stale,
            is_enabled: self.is_enabled,
        }
    }
}
