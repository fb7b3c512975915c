//! Content-addressed memo of loaded series.

use std::sync::Arc;

use chrono::NaiveDate;
use indexmap::IndexMap;
use tracing::debug;

use crate::models::price_point::PricePoint;

/// Default number of series kept before the oldest is evicted.
pub const DEFAULT_CAPACITY: usize = 16;

/// Identity of a loaded series' content.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum SourceKey {
    Sample,
    Upload { digest: u64, len: usize },
    Remote {
        ticker: String,
        start: NaiveDate,
        end: NaiveDate,
    },
}

/// Insertion-ordered cache with first-in first-out eviction.
///
/// Only successful loads are ever inserted.
#[derive(Debug)]
pub struct LoaderCache {
    entries: IndexMap<SourceKey, Arc<[PricePoint]>>,
    capacity: usize,
}

impl Default for LoaderCache {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }
}

impl LoaderCache {
    /// A capacity of zero is treated as one.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: IndexMap::new(),
            capacity: capacity.max(1),
        }
    }

    pub fn get(&self, key: &SourceKey) -> Option<Arc<[PricePoint]>> {
        self.entries.get(key).cloned()
    }

    pub fn insert(&mut self, key: SourceKey, series: Arc<[PricePoint]>) {
        if !self.entries.contains_key(&key) && self.entries.len() >= self.capacity {
            if let Some((evicted, _)) = self.entries.shift_remove_index(0) {
                debug!(?evicted, "cache full, evicting oldest series");
            }
        }
        self.entries.insert(key, series);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
