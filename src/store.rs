// Copyright 2026 the Shapecache Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Insertion-ordered entry store with explicit oldest-first eviction.

use hashbrown::Equivalent;

/// Invoked with an entry's key, value and weight as the entry is removed,
/// before its storage is reclaimed.
pub(crate) type RemovalListener<K, V> = Box<dyn FnMut(&K, &V, usize) + Send>;

struct Entry<K, V> {
    key: K,
    value: V,
    /// Caller-accounted size, captured at insertion.
    weight: usize,
}

/// A store whose eviction order is insertion order: `put` appends the most
/// recent entry and `get` never reorders, so the eviction victim is always
/// the earliest surviving insertion.
///
/// Lookup is a linear scan. Entry counts stay small in practice because the
/// facade's byte budget bounds them; the store itself is count-unbounded.
pub(crate) struct LruStore<K, V> {
    entries: Vec<Entry<K, V>>,
    on_removed: Option<RemovalListener<K, V>>,
}

impl<K, V> LruStore<K, V> {
    pub(crate) fn new() -> Self {
        Self {
            entries: Vec::new(),
            on_removed: None,
        }
    }

    pub(crate) fn set_on_removed(&mut self, listener: RemovalListener<K, V>) {
        self.on_removed = Some(listener);
    }

    /// Returns the value stored for a key equivalent to `key`.
    pub(crate) fn get<Q>(&self, key: &Q) -> Option<&V>
    where
        Q: Equivalent<K> + ?Sized,
    {
        self.entries
            .iter()
            .find(|entry| key.equivalent(&entry.key))
            .map(|entry| &entry.value)
    }

    /// Appends `key`/`value` as the most recent entry. `weight` is handed
    /// back to the removal listener when the entry is removed.
    pub(crate) fn put(&mut self, key: K, value: V, weight: usize) {
        self.entries.push(Entry { key, value, weight });
    }

    /// Removes the least recent entry, notifying the removal listener.
    /// Returns `false` when the store is empty.
    pub(crate) fn remove_oldest(&mut self) -> bool {
        if self.entries.is_empty() {
            return false;
        }
        let entry = self.entries.remove(0);
        if let Some(listener) = self.on_removed.as_mut() {
            listener(&entry.key, &entry.value, entry.weight);
        }
        true
    }

    /// Removes every entry, notifying the removal listener for each in
    /// insertion order.
    pub(crate) fn clear(&mut self) {
        let listener = &mut self.on_removed;
        for entry in self.entries.drain(..) {
            if let Some(listener) = listener.as_mut() {
                listener(&entry.key, &entry.value, entry.weight);
            }
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }
}
