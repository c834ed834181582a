//! Memo of the last computed series, keyed by an input hash.
//!
//! Reads share a lock; a store replaces the slot (last writer wins) and never
//! merges with what was there.

use std::sync::{Arc, PoisonError, RwLock};

use crate::series::ComputedSeries;

#[derive(Debug, Default)]
pub struct SeriesCache {
    slot: RwLock<Option<(u64, Arc<ComputedSeries>)>>,
}

impl SeriesCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// The cached series if it was computed from `hash`.
    pub fn get(&self, hash: u64) -> Option<Arc<ComputedSeries>> {
        let slot = self.slot.read().unwrap_or_else(PoisonError::into_inner);
        match slot.as_ref() {
            Some((h, series)) if *h == hash => Some(Arc::clone(series)),
            _ => None,
        }
    }

    pub fn store(&self, hash: u64, series: Arc<ComputedSeries>) {
        let mut slot = self.slot.write().unwrap_or_else(PoisonError::into_inner);
        *slot = Some((hash, series));
    }

    pub fn invalidate(&self) {
        let mut slot = self.slot.write().unwrap_or_else(PoisonError::into_inner);
        *slot = None;
    }

    pub fn is_empty(&self) -> bool {
        self.slot.read().unwrap_or_else(PoisonError::into_inner).is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hit_only_for_matching_hash() {
        let cache = SeriesCache::new();
        assert!(cache.get(1).is_none());

        let series = Arc::new(ComputedSeries::default());
        cache.store(1, Arc::clone(&series));
        assert!(Arc::ptr_eq(&cache.get(1).unwrap(), &series));
        assert!(cache.get(2).is_none());
    }

    #[test]
    fn store_replaces_and_invalidate_clears() {
        let cache = SeriesCache::new();
        cache.store(1, Arc::new(ComputedSeries::default()));
        cache.store(2, Arc::new(ComputedSeries::default()));
        assert!(cache.get(1).is_none());
        assert!(cache.get(2).is_some());

        cache.invalidate();
        assert!(cache.is_empty());
    }
}
