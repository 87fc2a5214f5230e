//! # Row Parser Cache
//!
//! Compiled plans are shared across every parser built for the same target
//! type, column window, null policy, and column layout. The cache is an
//! explicit object so it can be injected, inspected, and reset.
//!
//! ## Lock Sharding
//!
//! ```text
//! ParserCache
//! ├── Shard 0:  RwLock<HashMap<ParserKey, Arc<Plan>>>
//! ├── Shard 1:  RwLock<HashMap<ParserKey, Arc<Plan>>>
//! ├── ...
//! └── Shard 15: RwLock<HashMap<ParserKey, Arc<Plan>>>
//! ```
//!
//! Lookups take a shard read lock. A miss retakes the shard under its write
//! lock, checks again, and compiles while holding it, so concurrent requests
//! for the same key compile exactly once and observe the same plan.
//!
//! `compilations()` counts how many plans were actually built; tests use it
//! to observe that a second request reused the first plan.

use std::any::TypeId;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use eyre::Result;
use hashbrown::HashMap;
use parking_lot::RwLock;

use super::plan::Plan;
use crate::config::PARSER_CACHE_SHARD_COUNT as SHARD_COUNT;

/// Identity of a compiled plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) struct ParserKey {
    pub type_id: TypeId,
    pub start: usize,
    pub length: Option<usize>,
    pub null_if_first_missing: bool,
    pub layout: u64,
}

type Shard = RwLock<HashMap<ParserKey, Arc<Plan>>>;

/// Process-wide cache of compiled row parsers.
pub struct ParserCache {
    shards: Vec<Shard>,
    compilations: AtomicU64,
    hits: AtomicU64,
}

impl Default for ParserCache {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for ParserCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ParserCache")
            .field("len", &self.len())
            .field("compilations", &self.compilations())
            .field("hits", &self.hits())
            .finish()
    }
}

impl ParserCache {
    pub fn new() -> Self {
        Self {
            shards: (0..SHARD_COUNT).map(|_| RwLock::new(HashMap::new())).collect(),
            compilations: AtomicU64::new(0),
            hits: AtomicU64::new(0),
        }
    }

    fn shard(&self, key: &ParserKey) -> &Shard {
        let mut hasher = DefaultHasher::new();
        key.hash(&mut hasher);
        &self.shards[hasher.finish() as usize & (SHARD_COUNT - 1)]
    }

    pub(crate) fn get_or_compile<F>(&self, key: ParserKey, compile: F) -> Result<Arc<Plan>>
    where
        F: FnOnce() -> Result<Plan>,
    {
        let shard = self.shard(&key);
        if let Some(plan) = shard.read().get(&key) {
            self.hits.fetch_add(1, Ordering::Relaxed);
            return Ok(Arc::clone(plan));
        }

        let mut guard = shard.write();
        if let Some(plan) = guard.get(&key) {
            self.hits.fetch_add(1, Ordering::Relaxed);
            return Ok(Arc::clone(plan));
        }
        let plan = Arc::new(compile()?);
        self.compilations.fetch_add(1, Ordering::Relaxed);
        guard.insert(key, Arc::clone(&plan));
        Ok(plan)
    }

    /// Number of cached plans.
    pub fn len(&self) -> usize {
        self.shards.iter().map(|shard| shard.read().len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of plans compiled since creation or the last `clear`.
    pub fn compilations(&self) -> u64 {
        self.compilations.load(Ordering::Relaxed)
    }

    pub fn hits(&self) -> u64 {
        self.hits.load(Ordering::Relaxed)
    }

    /// Drops every cached plan and resets the counters.
    pub fn clear(&self) {
        for shard in &self.shards {
            shard.write().clear();
        }
        self.compilations.store(0, Ordering::Relaxed);
        self.hits.store(0, Ordering::Relaxed);
    }
}
