//! Injected read-through cache for resolved facility records.
//!
//! Feature downloads are owned by the surrounding service; the pipeline only
//! ever sees already-loaded records. This module gives that service a
//! disk-free collaborator: a [`FeatureSource`] seam plus a read-through cache
//! with an explicit `(region, mode)` key and explicit invalidation, so
//! nothing in the core depends on ambient filesystem state.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use tracing::debug;

use crate::error::Result;
use crate::facility::{FacilityRecord, TransportMode};
use crate::region::BoundingRegion;

/// Resolver of facility records for a region and category mode.
pub trait FeatureSource {
    fn load(&self, region: &BoundingRegion, mode: TransportMode) -> Result<Vec<FacilityRecord>>;
}

/// Exact cache key: region bounds (by bit pattern) plus mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct CacheKey {
    bounds: [u64; 4],
    mode: TransportMode,
}

impl CacheKey {
    fn new(region: &BoundingRegion, mode: TransportMode) -> Self {
        Self {
            bounds: [
                region.west.to_bits(),
                region.south.to_bits(),
                region.east.to_bits(),
                region.north.to_bits(),
            ],
            mode,
        }
    }
}

/// Read-through cache over a [`FeatureSource`].
///
/// Concurrent misses for the same key may each hit the inner source; the last
/// writer wins, which is harmless for an idempotent source.
pub struct CachedFeatureSource<S> {
    inner: S,
    store: Mutex<HashMap<CacheKey, Arc<Vec<FacilityRecord>>>>,
}

impl<S: FeatureSource> CachedFeatureSource<S> {
    pub fn new(inner: S) -> Self {
        Self {
            inner,
            store: Mutex::new(HashMap::new()),
        }
    }

    /// Load through the cache, sharing the stored records.
    pub fn load_shared(
        &self,
        region: &BoundingRegion,
        mode: TransportMode,
    ) -> Result<Arc<Vec<FacilityRecord>>> {
        let key = CacheKey::new(region, mode);
        if let Some(records) = self.lock().get(&key) {
            debug!(%region, %mode, "feature cache hit");
            return Ok(Arc::clone(records));
        }

        let loaded = Arc::new(self.inner.load(region, mode)?);
        self.lock().insert(key, Arc::clone(&loaded));
        debug!(%region, %mode, records = loaded.len(), "feature cache filled");
        Ok(loaded)
    }

    /// Drop the entry for one key. Returns whether an entry existed.
    pub fn invalidate(&self, region: &BoundingRegion, mode: TransportMode) -> bool {
        self.lock().remove(&CacheKey::new(region, mode)).is_some()
    }

    /// Drop every cached entry.
    pub fn clear(&self) {
        self.lock().clear();
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<CacheKey, Arc<Vec<FacilityRecord>>>> {
        self.store.lock().expect("feature cache lock poisoned")
    }
}

impl<S: FeatureSource> FeatureSource for CachedFeatureSource<S> {
    fn load(&self, region: &BoundingRegion, mode: TransportMode) -> Result<Vec<FacilityRecord>> {
        self.load_shared(region, mode)
            .map(|records| records.as_ref().clone())
    }
}
