//! Bounded memoization caches with swappable eviction policies.
//!
//! [`BoundedCache`] is the single-owner abstraction; [`ShardedCache`] splits a
//! total capacity across independently locked shards so worker threads only
//! contend when their keys hash to the same shard.

use std::collections::{BTreeMap, VecDeque};
use std::hash::{BuildHasher, Hash};
use std::sync::{Mutex, PoisonError};

use hashbrown::{DefaultHashBuilder, HashMap};

/// Eviction policy for a bounded cache.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum CachePolicy {
    /// Least-recently-used entry is evicted first.
    #[default]
    Lru,
    /// Insertion order; once over capacity the oldest ~10% are dropped at once.
    FifoBulk,
}

/// A fixed-capacity memo table.
///
/// `len()` never exceeds `capacity()` after an insert returns.
pub trait BoundedCache<K, V>: Send {
    /// Looks up a value, cloning it out. May update recency bookkeeping.
    fn get(&mut self, key: &K) -> Option<V>;
    /// Inserts or overwrites a value, evicting as the policy dictates.
    fn insert(&mut self, key: K, value: V);
    /// Number of stored entries.
    fn len(&self) -> usize;
    /// Maximum number of stored entries.
    fn capacity(&self) -> usize;
    /// Drops every entry.
    fn clear(&mut self);

    /// Returns `true` if no entries are stored.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Builds a boxed cache for the given policy.
pub fn new_cache<K, V>(policy: CachePolicy, capacity: usize) -> Box<dyn BoundedCache<K, V>>
where
    K: Eq + Hash + Clone + Send + 'static,
    V: Clone + Send + 'static,
{
    match policy {
        CachePolicy::Lru => Box::new(LruCache::new(capacity)),
        CachePolicy::FifoBulk => Box::new(FifoCache::new(capacity)),
    }
}

// ---------------------------------------------------------------------------
// FIFO with bulk eviction
// ---------------------------------------------------------------------------

/// Insertion-ordered cache that drops the oldest tenth in one sweep once it
/// grows past capacity.
pub struct FifoCache<K, V> {
    map: HashMap<K, V>,
    order: VecDeque<K>,
    capacity: usize,
}

impl<K: Eq + Hash + Clone, V: Clone> FifoCache<K, V> {
    /// Creates an empty cache. A capacity of zero is treated as one.
    pub fn new(capacity: usize) -> Self {
        Self {
            map: HashMap::new(),
            order: VecDeque::new(),
            capacity: capacity.max(1),
        }
    }

    fn evict_oldest(&mut self) {
        let batch = (self.map.len() / 10).max(1);
        for _ in 0..batch {
            match self.order.pop_front() {
                Some(key) => {
                    self.map.remove(&key);
                }
                None => break,
            }
        }
    }
}

impl<K, V> BoundedCache<K, V> for FifoCache<K, V>
where
    K: Eq + Hash + Clone + Send,
    V: Clone + Send,
{
    fn get(&mut self, key: &K) -> Option<V> {
        self.map.get(key).cloned()
    }

    fn insert(&mut self, key: K, value: V) {
        // Overwriting keeps the original insertion slot.
        if let Some(slot) = self.map.get_mut(&key) {
            *slot = value;
            return;
        }
        self.order.push_back(key.clone());
        self.map.insert(key, value);
        if self.map.len() > self.capacity {
            self.evict_oldest();
        }
    }

    fn len(&self) -> usize {
        self.map.len()
    }

    fn capacity(&self) -> usize {
        self.capacity
    }

    fn clear(&mut self) {
        self.map.clear();
        self.order.clear();
    }
}

// ---------------------------------------------------------------------------
// LRU
// ---------------------------------------------------------------------------

/// Least-recently-used cache. Both reads and writes refresh an entry.
pub struct LruCache<K, V> {
    map: HashMap<K, (V, u64)>,
    recency: BTreeMap<u64, K>,
    tick: u64,
    capacity: usize,
}

impl<K: Eq + Hash + Clone, V: Clone> LruCache<K, V> {
    /// Creates an empty cache. A capacity of zero is treated as one.
    pub fn new(capacity: usize) -> Self {
        Self {
            map: HashMap::new(),
            recency: BTreeMap::new(),
            tick: 0,
            capacity: capacity.max(1),
        }
    }

    fn next_tick(&mut self) -> u64 {
        self.tick += 1;
        self.tick
    }
}

impl<K, V> BoundedCache<K, V> for LruCache<K, V>
where
    K: Eq + Hash + Clone + Send,
    V: Clone + Send,
{
    fn get(&mut self, key: &K) -> Option<V> {
        let tick = self.next_tick();
        let (value, stamp) = self.map.get_mut(key)?;
        let old = std::mem::replace(stamp, tick);
        let value = value.clone();
        if let Some(k) = self.recency.remove(&old) {
            self.recency.insert(tick, k);
        }
        Some(value)
    }

    fn insert(&mut self, key: K, value: V) {
        let tick = self.next_tick();
        if let Some((_, old_tick)) = self.map.insert(key.clone(), (value, tick)) {
            self.recency.remove(&old_tick);
        }
        self.recency.insert(tick, key);

        while self.map.len() > self.capacity {
            let Some((_, oldest)) = self.recency.pop_first() else {
                break;
            };
            self.map.remove(&oldest);
        }
    }

    fn len(&self) -> usize {
        self.map.len()
    }

    fn capacity(&self) -> usize {
        self.capacity
    }

    fn clear(&mut self) {
        self.map.clear();
        self.recency.clear();
    }
}

/// Size, sharding and eviction policy of one [`ShardedCache`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CacheSettings {
    pub policy: CachePolicy,
    pub capacity: usize,
    pub shards: usize,
}

impl CacheSettings {
    pub fn new(policy: CachePolicy, capacity: usize, shards: usize) -> Self {
        Self {
            policy,
            capacity,
            shards,
        }
    }

    /// Builds an empty cache with these settings.
    pub fn build<K, V>(&self) -> ShardedCache<K, V>
    where
        K: Eq + Hash + Clone + Send + 'static,
        V: Clone + Send + 'static,
    {
        ShardedCache::new(self.policy, self.capacity, self.shards)
    }
}

// ---------------------------------------------------------------------------
// Sharded, thread-safe wrapper
// ---------------------------------------------------------------------------

/// Thread-safe cache made of independently locked shards.
///
/// The total capacity is split evenly, so the combined size never exceeds
/// the requested capacity. Two threads racing on one key compute the same
/// value; whichever insert lands last wins, which is harmless.
pub struct ShardedCache<K, V> {
    shards: Vec<Mutex<Box<dyn BoundedCache<K, V>>>>,
    hasher: DefaultHashBuilder,
}

impl<K, V> ShardedCache<K, V>
where
    K: Eq + Hash + Clone + Send + 'static,
    V: Clone + Send + 'static,
{
    /// Creates a cache with `capacity` total entries spread over up to
    /// `shards` shards.
    pub fn new(policy: CachePolicy, capacity: usize, shards: usize) -> Self {
        let capacity = capacity.max(1);
        let shard_count = shards.clamp(1, capacity);
        let per_shard = capacity / shard_count;
        let shards = (0..shard_count)
            .map(|_| Mutex::new(new_cache(policy, per_shard)))
            .collect();
        Self {
            shards,
            hasher: DefaultHashBuilder::default(),
        }
    }

    fn shard(&self, key: &K) -> &Mutex<Box<dyn BoundedCache<K, V>>> {
        let index = self.hasher.hash_one(key) as usize % self.shards.len();
        &self.shards[index]
    }

    /// Looks up a value.
    pub fn get(&self, key: &K) -> Option<V> {
        self.shard(key)
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
    }

    /// Inserts or overwrites a value.
    pub fn insert(&self, key: K, value: V) {
        self.shard(&key)
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key, value);
    }

    /// Returns the cached value or computes, stores and returns it.
    ///
    /// `compute` runs without holding the shard lock.
    pub fn get_or_insert_with(&self, key: K, compute: impl FnOnce() -> V) -> V {
        if let Some(hit) = self.get(&key) {
            return hit;
        }
        let value = compute();
        self.insert(key, value.clone());
        value
    }

    /// Total number of stored entries across all shards.
    pub fn len(&self) -> usize {
        self.shards
            .iter()
            .map(|s| s.lock().unwrap_or_else(PoisonError::into_inner).len())
            .sum()
    }

    /// Returns `true` if no shard holds an entry.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Sum of shard capacities.
    pub fn capacity(&self) -> usize {
        self.shards
            .iter()
            .map(|s| s.lock().unwrap_or_else(PoisonError::into_inner).capacity())
            .sum()
    }

    /// Drops every entry in every shard.
    pub fn clear(&self) {
        for shard in &self.shards {
            shard.lock().unwrap_or_else(PoisonError::into_inner).clear();
        }
    }
}
