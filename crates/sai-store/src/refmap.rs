//! Map of weak references keyed by logical identity.
//!
//! `RefMap` never keeps its values alive: owners hold `Arc`s, the map holds
//! `Weak`s. A lookup on an entry whose last owner is gone behaves exactly
//! like a lookup on a missing key, and never creates an entry.

use std::collections::HashMap;
use std::hash::Hash;
use std::sync::{Arc, Weak};

#[derive(Debug)]
pub struct RefMap<K, V> {
    inner: HashMap<K, Weak<V>>,
}

impl<K, V> RefMap<K, V>
where
    K: Eq + Hash,
{
    pub fn new() -> Self {
        Self {
            inner: HashMap::new(),
        }
    }

    /// Number of entries whose value is still alive.
    pub fn len(&self) -> usize {
        self.inner.values().filter(|w| w.strong_count() > 0).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the live value for `key`.
    ///
    /// **This never creates entries.**
    pub fn get(&self, key: &K) -> Option<Arc<V>> {
        self.inner.get(key).and_then(Weak::upgrade)
    }

    /// Tracks `value` under `key`.
    ///
    /// Returns the previous value if it was still alive. Dead entries are
    /// pruned on the way.
    pub fn insert(&mut self, key: K, value: &Arc<V>) -> Option<Arc<V>> {
        self.prune();
        self.inner
            .insert(key, Arc::downgrade(value))
            .and_then(|old| old.upgrade())
    }

    /// Stops tracking `key`, returning its value if still alive.
    pub fn remove(&mut self, key: &K) -> Option<Arc<V>> {
        self.inner.remove(key).and_then(|old| old.upgrade())
    }

    /// Drops entries whose value has been destroyed.
    pub fn prune(&mut self) {
        self.inner.retain(|_, w| w.strong_count() > 0);
    }

    /// Removes every entry, handing back the values that are still alive.
    pub fn drain(&mut self) -> Vec<Arc<V>> {
        self.inner.drain().filter_map(|(_, w)| w.upgrade()).collect()
    }

    /// Live entries, in no particular order.
    pub fn iter(&self) -> impl Iterator<Item = (&K, Arc<V>)> {
        self.inner
            .iter()
            .filter_map(|(k, w)| w.upgrade().map(|v| (k, v)))
    }
}

impl<K, V> Default for RefMap<K, V>
where
    K: Eq + Hash,
{
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_does_not_keep_alive() {
        let mut map: RefMap<&str, u32> = RefMap::new();
        let value = Arc::new(7);
        map.insert("a", &value);
        assert_eq!(map.get(&"a").as_deref(), Some(&7));

        drop(value);
        assert!(map.get(&"a").is_none());
        assert!(map.is_empty());
    }

    #[test]
    fn test_get_missing_does_not_create() {
        let map: RefMap<&str, u32> = RefMap::new();
        assert!(map.get(&"missing").is_none());
        assert_eq!(map.inner.len(), 0);
    }

    #[test]
    fn test_insert_returns_live_previous() {
        let mut map = RefMap::new();
        let first = Arc::new("first");
        let second = Arc::new("second");
        assert!(map.insert(1, &first).is_none());
        assert_eq!(map.insert(1, &second).as_deref(), Some(&"first"));
        assert_eq!(map.len(), 1);
    }

    #[test]
    fn test_insert_prunes_dead_entries() {
        let mut map = RefMap::new();
        let dead = Arc::new(1);
        map.insert("dead", &dead);
        drop(dead);

        let live = Arc::new(2);
        map.insert("live", &live);
        assert_eq!(map.inner.len(), 1);
    }

    #[test]
    fn test_drain_returns_only_live() {
        let mut map = RefMap::new();
        let live = Arc::new(1);
        let dead = Arc::new(2);
        map.insert("live", &live);
        map.insert("dead", &dead);
        drop(dead);

        let drained = map.drain();
        assert_eq!(drained.len(), 1);
        assert_eq!(*drained[0], 1);
        assert!(map.get(&"live").is_none());
    }
}
