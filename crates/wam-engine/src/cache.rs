//! Effective-policy cache — generation-keyed memoization.
//!
//! A cached entry records everything its resolution depended on: the full
//! root→node path with each node's declaration generation, the global
//! policy generation, the license registry generation, and the dependency
//! overlay generation. An entry is served only if every recorded number
//! still matches — no stale result is ever observed, and mutating one
//! subtree leaves cousins' entries untouched.
//!
//! # Concurrency
//!
//! Read-mostly: lookups take the read lock; a recompute inserts a fresh
//! immutable `Arc` under the write lock (copy-on-write replace), never
//! mutating an entry another reader may hold.

use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use wam_types::NodeId;

use crate::effective::EffectivePolicy;

/// Everything a cached resolution depended on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct CacheKey {
    /// Root→node path with each node's declaration generation.
    pub path: Vec<(NodeId, u64)>,
    /// Global policy generation.
    pub global_gen: u64,
    /// License registry generation.
    pub registry_gen: u64,
    /// Dependency overlay generation.
    pub overlay_gen: u64,
}

struct Entry {
    key: CacheKey,
    policy: Arc<EffectivePolicy>,
}

/// Hit/miss counters, mostly for tests and monitoring.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CacheStats {
    /// Lookups served from a valid entry.
    pub hits: u64,
    /// Lookups that required a recompute (absent or stale entry).
    pub misses: u64,
}

/// The per-engine memoization table.
pub(crate) struct EffectiveCache {
    entries: RwLock<HashMap<NodeId, Entry>>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl EffectiveCache {
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    /// Returns the cached policy if every recorded generation matches.
    pub fn lookup(&self, node: NodeId, key: &CacheKey) -> Option<Arc<EffectivePolicy>> {
        let entries = self.entries.read();
        match entries.get(&node) {
            Some(entry) if entry.key == *key => {
                self.hits.fetch_add(1, Ordering::Relaxed);
                Some(Arc::clone(&entry.policy))
            }
            _ => {
                self.misses.fetch_add(1, Ordering::Relaxed);
                None
            }
        }
    }

    /// Stores a freshly computed policy, replacing any stale entry.
    pub fn insert(&self, node: NodeId, key: CacheKey, policy: Arc<EffectivePolicy>) {
        self.entries.write().insert(node, Entry { key, policy });
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
        }
    }
}
