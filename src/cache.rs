//! Identity-preserving LRU cache for entities.
//!
//! Maps a key to the one live instance representing it, so every lookup of
//! the same key shares futures and population work. Thread-safe; lookup and
//! creation happen under one lock so racing callers still end up with a
//! single canonical instance. Evicts the least recently used entry when at
//! capacity, whatever kind of entity it holds.

use std::borrow::Borrow;
use std::collections::{HashMap, VecDeque};
use std::fmt;
use std::hash::Hash;
use std::sync::{Mutex, MutexGuard, PoisonError};

/// Default number of resident entities.
pub const DEFAULT_CACHE_CAPACITY: usize = 400;

struct Entries<K, V> {
    /// Cached entries: key -> canonical instance
    map: HashMap<K, V>,
    /// LRU order: most recently used at back
    order: VecDeque<K>,
}

/// Bounded mapping from key to the canonical entity instance.
///
/// Values are cheap handles (`Arc`s or enums of `Arc`s); lookups hand out
/// clones of the stored handle.
pub struct EntityCache<K, V> {
    entries: Mutex<Entries<K, V>>,
    capacity: usize,
}

impl<K, V> EntityCache<K, V>
where
    K: Hash + Eq + Clone + fmt::Debug,
    V: Clone,
{
    /// Create a new empty cache with default capacity (400 entries).
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CACHE_CAPACITY)
    }

    /// Create a new empty cache with specified capacity.
    ///
    /// A capacity of zero is treated as one: the most recent entity always
    /// stays resident.
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            entries: Mutex::new(Entries {
                map: HashMap::with_capacity(capacity),
                order: VecDeque::with_capacity(capacity),
            }),
            capacity,
        }
    }

    fn lock(&self) -> MutexGuard<'_, Entries<K, V>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Return the cached instance for `key`, creating it with `create` on a miss.
    ///
    /// `create` runs under the cache lock and must not touch this cache.
    pub fn get_or_insert_with<Q, F>(&self, key: &Q, create: F) -> V
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ToOwned<Owned = K> + ?Sized,
        F: FnOnce() -> V,
    {
        let mut entries = self.lock();

        if let Some(entity) = entries.map.get(key).cloned() {
            Self::touch(&mut entries, key);
            return entity;
        }

        // Evict oldest if at capacity
        while entries.order.len() >= self.capacity {
            match entries.order.pop_front() {
                Some(oldest) => {
                    entries.map.remove::<K>(&oldest);
                    tracing::trace!(key = ?oldest, "evicted entity");
                }
                None => break,
            }
        }

        let entity = create();
        let owned = key.to_owned();
        entries.map.insert(owned.clone(), entity.clone());
        entries.order.push_back(owned);
        entity
    }

    /// Look up `key` without creating it or refreshing its recency.
    pub fn peek<Q>(&self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.lock().map.get(key).cloned()
    }

    /// Check whether `key` is resident.
    pub fn contains<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.lock().map.contains_key(key)
    }

    /// Number of resident entities.
    pub fn len(&self) -> usize {
        self.lock().map.len()
    }

    /// Check whether the cache holds no entities.
    pub fn is_empty(&self) -> bool {
        self.lock().map.is_empty()
    }

    /// Maximum number of resident entities.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Move key to end of LRU order (mark as recently used).
    fn touch<Q>(entries: &mut Entries<K, V>, key: &Q)
    where
        K: Borrow<Q>,
        Q: Eq + ?Sized,
    {
        if let Some(pos) = entries.order.iter().position(|k| k.borrow() == key) {
            if let Some(k) = entries.order.remove(pos) {
                entries.order.push_back(k);
            }
        }
    }
}

impl<K, V> Default for EntityCache<K, V>
where
    K: Hash + Eq + Clone + fmt::Debug,
    V: Clone,
{
    fn default() -> Self {
        Self::new()
    }
}
