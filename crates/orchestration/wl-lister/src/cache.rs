//! Ordered cache for speculatively listed objects.
//!
//! Sub-range workers push objects into an unordered staging channel from any
//! task; the iterator later drains staging into a sorted, de-duplicated view
//! with [`ObjectCache::build`] and serves batches from it. The two sides never
//! run concurrently: workers only hold a [`CacheInserter`], and `build`,
//! `batch_after` and `clear` are called from the iterator alone.

use std::collections::HashMap;

use tokio::sync::mpsc;

use crate::ObjectSummary;

/// Write handle handed to sub-range workers.
///
/// Cloneable and cheap; sending never blocks.
#[derive(Clone)]
pub struct CacheInserter {
    staging: mpsc::UnboundedSender<ObjectSummary>,
}

impl CacheInserter {
    /// Stage a page of objects. Nothing becomes visible to readers until the
    /// owning cache runs `build`.
    pub fn insert(&self, objects: Vec<ObjectSummary>) {
        for object in objects {
            // the receiver only disappears when the iterator is dropped, at
            // which point staged objects are moot
            let _ = self.staging.send(object);
        }
    }
}

/// Staging plus the sorted view built from it.
pub struct ObjectCache {
    staging_tx: mpsc::UnboundedSender<ObjectSummary>,
    staging_rx: mpsc::UnboundedReceiver<ObjectSummary>,
    sorted_keys: Vec<String>,
    by_key: HashMap<String, ObjectSummary>,
}

impl ObjectCache {
    pub fn new() -> Self {
        let (staging_tx, staging_rx) = mpsc::unbounded_channel();
        Self {
            staging_tx,
            staging_rx,
            sorted_keys: Vec::new(),
            by_key: HashMap::new(),
        }
    }

    /// A write handle for one prefetch cycle's workers.
    pub fn inserter(&self) -> CacheInserter {
        CacheInserter {
            staging: self.staging_tx.clone(),
        }
    }

    /// Drain staging into the sorted view, dropping duplicate keys.
    ///
    /// Adjacent workers overlap on uneven key distributions and contribute
    /// the same key more than once; object content for a key is identical
    /// within a listing epoch, so keeping the last write is as good as any.
    pub fn build(&mut self) {
        while let Ok(object) = self.staging_rx.try_recv() {
            self.sorted_keys.push(object.key.clone());
            self.by_key.insert(object.key.clone(), object);
        }
        self.sorted_keys.sort_unstable();
        self.sorted_keys.dedup();
    }

    /// Up to `count` objects with keys strictly greater than `after_key`,
    /// in ascending key order. Fewer than `count` means the cache holds
    /// nothing further past `after_key`.
    pub fn batch_after(&self, after_key: &str, count: usize) -> Vec<ObjectSummary> {
        let start = self
            .sorted_keys
            .partition_point(|key| key.as_str() <= after_key);
        self.sorted_keys[start..]
            .iter()
            .take(count)
            .filter_map(|key| self.by_key.get(key).cloned())
            .collect()
    }

    /// Reset everything, including objects a cancelled cycle left in staging.
    pub fn clear(&mut self) {
        while self.staging_rx.try_recv().is_ok() {}
        self.sorted_keys.clear();
        self.by_key.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.sorted_keys.is_empty()
    }
}

impl Default for ObjectCache {
    fn default() -> Self {
        Self::new()
    }
}
