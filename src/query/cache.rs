//! The single explicit query cache.

use std::sync::Arc;

use dashmap::DashMap;

use crate::observability::metrics;
use crate::query::key::{InvalidationScope, QueryKey, QueryValue};

/// Last known state of one query.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryState {
    /// Last successfully fetched value. Kept across failed refreshes.
    pub value: Option<QueryValue>,
    pub is_loading: bool,
    pub error: Option<String>,
    /// Set by invalidation; cleared by the next successful fetch.
    pub stale: bool,
}

/// Cache keyed by (call kind, arguments), shared by every component of the client.
///
/// Values are only ever replaced wholesale by a fetch or marked stale. Nothing updates
/// them incrementally.
#[derive(Debug, Clone, Default)]
pub struct QueryCache {
    inner: Arc<DashMap<QueryKey, QueryState>>,
}

impl QueryCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &QueryKey) -> Option<QueryState> {
        self.inner.get(key).map(|r| r.value().clone())
    }

    pub fn mark_loading(&self, key: QueryKey) {
        self.inner.entry(key).or_default().is_loading = true;
        metrics::record_cache_size(self.inner.len());
    }

    pub fn store_value(&self, key: QueryKey, value: QueryValue) {
        self.inner.insert(
            key,
            QueryState {
                value: Some(value),
                is_loading: false,
                error: None,
                stale: false,
            },
        );
        metrics::record_cache_size(self.inner.len());
    }

    /// Record a failed refresh. The previous value stays visible.
    pub fn store_error(&self, key: QueryKey, error: String) {
        let mut entry = self.inner.entry(key).or_default();
        entry.is_loading = false;
        entry.error = Some(error);
    }

    /// Mark one key stale. Returns whether it was cached.
    pub fn invalidate(&self, key: &QueryKey) -> bool {
        match self.inner.get_mut(key) {
            Some(mut state) => {
                state.stale = true;
                true
            }
            None => false,
        }
    }

    /// Mark every key in `scope` stale. Returns how many were affected.
    pub fn invalidate_scope(&self, scope: &InvalidationScope) -> usize {
        let mut count = 0;
        for mut entry in self.inner.iter_mut() {
            if scope.matches(entry.key()) {
                entry.value_mut().stale = true;
                count += 1;
            }
        }
        count
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}
