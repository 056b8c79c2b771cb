//! Process-local embedding cache with insertion-order eviction.
//!
//! Eviction is FIFO: reads do not refresh an entry. Switching to LRU would
//! only require moving the key to the back of `order` inside [`EmbeddingCache::get`].

use std::{
    collections::{HashMap, VecDeque},
    sync::Mutex,
};

use tracing::{trace, warn};

#[derive(Debug, Default)]
struct Inner {
    map: HashMap<String, Vec<f32>>,
    order: VecDeque<String>,
}

/// Bounded map from source text to its embedding.
#[derive(Debug)]
pub struct EmbeddingCache {
    capacity: usize,
    inner: Mutex<Inner>,
}

impl EmbeddingCache {
    /// A capacity of zero disables storage entirely.
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            inner: Mutex::new(Inner::default()),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Returns a copy of the cached vector.
    ///
    /// A poisoned lock or an unusable entry (empty, or holding NaN/inf) is
    /// reported as a miss.
    pub fn get(&self, key: &str) -> Option<Vec<f32>> {
        let Ok(inner) = self.inner.lock() else {
            warn!("embedding cache lock poisoned; treating as miss");
            return None;
        };
        match inner.map.get(key) {
            Some(v) if !v.is_empty() && v.iter().all(|x| x.is_finite()) => {
                trace!(key_len = key.len(), "embedding cache hit");
                Some(v.clone())
            }
            Some(_) => {
                warn!(key_len = key.len(), "corrupt embedding cache entry; treating as miss");
                None
            }
            None => {
                trace!(key_len = key.len(), "embedding cache miss");
                None
            }
        }
    }

    /// Inserts or replaces `key`.
    ///
    /// Replacing keeps the original insertion slot. Inserting a new key into a
    /// full cache first evicts the oldest inserted key.
    pub fn put(&self, key: impl Into<String>, value: Vec<f32>) {
        if self.capacity == 0 {
            return;
        }
        let Ok(mut inner) = self.inner.lock() else {
            warn!("embedding cache lock poisoned; skipping insert");
            return;
        };
        let key = key.into();
        if let Some(slot) = inner.map.get_mut(&key) {
            *slot = value;
            return;
        }
        while inner.map.len() >= self.capacity {
            let Some(oldest) = inner.order.pop_front() else {
                break;
            };
            inner.map.remove(&oldest);
            trace!(key_len = oldest.len(), "evicted oldest embedding");
        }
        inner.order.push_back(key.clone());
        inner.map.insert(key, value);
    }

    pub fn size(&self) -> usize {
        self.inner.lock().map(|i| i.map.len()).unwrap_or(0)
    }

    pub fn clear(&self) {
        if let Ok(mut inner) = self.inner.lock() {
            inner.map.clear();
            inner.order.clear();
        }
    }
}
