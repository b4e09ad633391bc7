//! Bounded cache of full-page rasters.
//!
//! Eviction is first-in first-out: the entry inserted longest ago goes first,
//! no matter how recently it was read.

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

use crate::raster::Raster;

/// Default number of cached page rasters.
pub const DEFAULT_CACHE_SIZE: usize = 5;

/// Cache key for rendered pages
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct CacheKey {
    /// Page number
    pub page: u32,
    /// Scale factor (stored as millionths for stable hashing)
    pub scale_millionths: u64,
}

impl CacheKey {
    pub fn new(page: u32, scale: f64) -> Self {
        Self {
            page,
            scale_millionths: (scale * 1_000_000.0).round() as u64,
        }
    }
}

/// FIFO cache for rendered page rasters
pub struct PageCache {
    entries: HashMap<CacheKey, Arc<Raster>>,
    order: VecDeque<CacheKey>,
    capacity: usize,
}

impl PageCache {
    /// Create a new cache with the given capacity (at least 1).
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            entries: HashMap::with_capacity(capacity),
            order: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Look up a raster. Does not affect eviction order.
    #[must_use]
    pub fn get(&self, page: u32, scale: f64) -> Option<Arc<Raster>> {
        self.entries.get(&CacheKey::new(page, scale)).cloned()
    }

    #[must_use]
    pub fn contains(&self, page: u32, scale: f64) -> bool {
        self.entries.contains_key(&CacheKey::new(page, scale))
    }

    /// Insert a raster, evicting the oldest insertion when full.
    /// Returns the evicted key, if any.
    pub fn put(&mut self, page: u32, scale: f64, raster: Arc<Raster>) -> Option<CacheKey> {
        let key = CacheKey::new(page, scale);
        if let Some(slot) = self.entries.get_mut(&key) {
            *slot = raster;
            return None;
        }

        let mut evicted = None;
        while self.entries.len() >= self.capacity {
            let Some(oldest) = self.order.pop_front() else {
                break;
            };
            self.entries.remove(&oldest);
            evicted = Some(oldest);
        }

        self.entries.insert(key, raster);
        self.order.push_back(key);
        evicted
    }

    /// Clear all cached pages
    pub fn clear(&mut self) {
        self.entries.clear();
        self.order.clear();
    }

    /// Number of cached pages
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if cache is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Cache capacity
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl Default for PageCache {
    fn default() -> Self {
        Self::new(DEFAULT_CACHE_SIZE)
    }
}
