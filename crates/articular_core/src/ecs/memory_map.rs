//! Concurrent key/value containers backing both indexes.
//!
//! All memory maps share one wrapper around [`DashMap`]: inserts and removes
//! are atomic per key, readers never see a half-built entry, and no global
//! lock is taken. Values are cloned out of the map (they are `Arc`s or small
//! handles), so no shard guard outlives a call.
//!
//! Writes are crate-private. Outside the crate a map is read-only, so every
//! mutation of an index goes through [`World`](crate::ecs::World), which keeps
//! both indexes in step. Hosts build standalone rows with `collect()`.
//!
//! | Alias | Key | Value |
//! |---|---|---|
//! | [`SystemMap`] | system | [`EntityComponentMap`] |
//! | [`EntityComponentMap`] | entity | component |
//! | [`SystemComponentMap`] | system | component |
//! | [`CacheMap`] | entity | [`SystemComponentMap`] |
//! | [`ComponentMap`] | component | component (module contents) |

use crate::ecs::{ComponentId, ComponentRef, EntityId, SystemId};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use std::fmt;
use std::hash::Hash;
use std::sync::Arc;

/// Primary index row: one system's components, by entity.
pub type EntityComponentMap = MemoryMap<EntityId, ComponentRef>;

/// Primary index root.
pub type SystemMap = MemoryMap<SystemId, Arc<EntityComponentMap>>;

/// Cache index row: one entity's components, by system.
pub type SystemComponentMap = MemoryMap<SystemId, ComponentRef>;

/// Cache index root.
pub type CacheMap = MemoryMap<EntityId, Arc<SystemComponentMap>>;

/// Sub-components grouped under a [`Module`](crate::ecs::Module).
pub type ComponentMap = MemoryMap<ComponentId, ComponentRef>;

/// Keyed map with per-key atomic writes and lock-free-to-the-caller reads.
pub struct MemoryMap<K, V> {
    inner: DashMap<K, V>,
}

impl<K, V> MemoryMap<K, V>
where
    K: Eq + Hash + Copy,
    V: Clone,
{
    pub fn new() -> Self {
        Self {
            inner: DashMap::new(),
        }
    }

    /// Clone out the value stored at `key`.
    pub fn get(&self, key: &K) -> Option<V> {
        self.inner.get(key).map(|entry| entry.value().clone())
    }

    /// Insert or replace, returning the previous value.
    pub(crate) fn insert(&self, key: K, value: V) -> Option<V> {
        self.inner.insert(key, value)
    }

    /// Insert only if `key` is vacant.
    ///
    /// Returns `Ok(value)` when inserted, `Err(existing)` otherwise. The check
    /// and the insert happen under the same shard lock.
    pub(crate) fn insert_if_absent(&self, key: K, value: V) -> Result<V, V> {
        match self.inner.entry(key) {
            Entry::Occupied(occupied) => Err(occupied.get().clone()),
            Entry::Vacant(vacant) => {
                vacant.insert(value.clone());
                Ok(value)
            }
        }
    }

    /// Return the value at `key`, creating it with `make` if vacant.
    pub(crate) fn get_or_insert_with<F>(&self, key: K, make: F) -> V
    where
        F: FnOnce() -> V,
    {
        self.inner.entry(key).or_insert_with(make).value().clone()
    }

    pub(crate) fn remove(&self, key: &K) -> Option<V> {
        self.inner.remove(key).map(|(_, value)| value)
    }

    pub fn contains_key(&self, key: &K) -> bool {
        self.inner.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// Keys present at the time of the call.
    pub fn keys(&self) -> Vec<K> {
        self.inner.iter().map(|entry| *entry.key()).collect()
    }

    /// Copy every entry out of the map.
    pub fn snapshot(&self) -> Vec<(K, V)> {
        self.inner
            .iter()
            .map(|entry| (*entry.key(), entry.value().clone()))
            .collect()
    }

    /// Like [`snapshot`](Self::snapshot), ordered by key.
    pub fn sorted(&self) -> Vec<(K, V)>
    where
        K: Ord,
    {
        let mut entries = self.snapshot();
        entries.sort_unstable_by_key(|(key, _)| *key);
        entries
    }

    /// Visit every entry in place.
    ///
    /// Shard read locks are held while `f` runs: `f` may read this map and
    /// write to *other* maps, but must not insert into or remove from this one.
    pub fn for_each<F>(&self, mut f: F)
    where
        F: FnMut(&K, &V),
    {
        for entry in self.inner.iter() {
            f(entry.key(), entry.value());
        }
    }
}

impl<K, V> Default for MemoryMap<K, V>
where
    K: Eq + Hash + Copy,
    V: Clone,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V> Clone for MemoryMap<K, V>
where
    K: Eq + Hash + Copy,
    V: Clone,
{
    /// Detached copy: later writes to either map are not seen by the other.
    fn clone(&self) -> Self {
        self.snapshot().into_iter().collect()
    }
}

impl<K, V> FromIterator<(K, V)> for MemoryMap<K, V>
where
    K: Eq + Hash + Copy,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(entries: I) -> Self {
        Self {
            inner: entries.into_iter().collect(),
        }
    }
}

impl<K, V> fmt::Debug for MemoryMap<K, V>
where
    K: Eq + Hash + Copy + fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set()
            .entries(self.inner.iter().map(|entry| *entry.key()))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_replaces_and_returns_previous() {
        let map: MemoryMap<u32, &str> = MemoryMap::new();
        assert_eq!(map.insert(1, "a"), None);
        assert_eq!(map.insert(1, "b"), Some("a"));
        assert_eq!(map.get(&1), Some("b"));
        assert_eq!(map.len(), 1);
    }

    #[test]
    fn insert_if_absent_keeps_existing() {
        let map: MemoryMap<u32, &str> = MemoryMap::new();
        assert_eq!(map.insert_if_absent(7, "first"), Ok("first"));
        assert_eq!(map.insert_if_absent(7, "second"), Err("first"));
        assert_eq!(map.get(&7), Some("first"));
    }

    #[test]
    fn get_or_insert_with_only_builds_once() {
        let map: MemoryMap<u32, u64> = MemoryMap::new();
        let mut calls = 0;
        map.get_or_insert_with(3, || {
            calls += 1;
            10
        });
        let value = map.get_or_insert_with(3, || {
            calls += 1;
            20
        });
        assert_eq!(value, 10);
        assert_eq!(calls, 1);
    }

    #[test]
    fn collect_and_sorted_snapshot() {
        let map: MemoryMap<u32, u32> = [5, 1, 4, 2, 3].into_iter().map(|key| (key, key * 10)).collect();
        assert_eq!(map.remove(&4), Some(40));
        assert_eq!(map.remove(&2), Some(20));
        assert_eq!(map.sorted(), vec![(1, 10), (3, 30), (5, 50)]);
        assert!(!map.contains_key(&2));
    }

    #[test]
    fn clone_is_detached() {
        let map: MemoryMap<u32, u32> = MemoryMap::new();
        map.insert(1, 10);
        let copy = map.clone();
        map.insert(2, 20);
        copy.remove(&1);
        assert_eq!(map.sorted(), vec![(1, 10), (2, 20)]);
        assert!(copy.is_empty());
    }
}
