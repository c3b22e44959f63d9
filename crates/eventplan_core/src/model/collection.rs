//! ID-allocating entry collection.
//!
//! # Responsibility
//! - Pair an allocation cursor with the live entries of one collection.
//! - Provide membership, lookup and range queries over typed IDs.
//!
//! # Invariants
//! - `counter` only grows and equals the highest ID ever allocated.
//! - Removed IDs are never handed out again.
//! - Entry iteration is ascending by ID, which is also allocation order.

use super::ids::SequentialId;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Live entries of one collection plus its allocation cursor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Collection<K: Ord, V> {
    counter: u64,
    entries: BTreeMap<K, V>,
}

impl<K: Ord, V> Default for Collection<K, V> {
    fn default() -> Self {
        Self {
            counter: 0,
            entries: BTreeMap::new(),
        }
    }
}

impl<K: SequentialId, V> Collection<K, V> {
    /// Creates an empty collection with the cursor at `0`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuilds a collection from stored parts.
    ///
    /// Returns `None` when an entry ID exceeds `counter`.
    pub fn from_parts(counter: u64, entries: BTreeMap<K, V>) -> Option<Self> {
        let max_seq = entries.keys().next_back().map_or(0, |id| id.seq());
        if max_seq > counter {
            return None;
        }
        Some(Self { counter, entries })
    }

    /// Allocates the next ID and stores `value` under it.
    pub fn allocate(&mut self, value: V) -> K {
        self.counter += 1;
        let id = K::from_seq(self.counter);
        self.entries.insert(id, value);
        id
    }

    /// Highest ID ever allocated (`0` when none).
    pub fn counter(&self) -> u64 {
        self.counter
    }

    /// Whether `id` lies in `[1, counter]`, i.e. was handed out at some point.
    pub fn was_allocated(&self, id: K) -> bool {
        let seq = id.seq();
        seq >= 1 && seq <= self.counter
    }

    /// Whether `id` currently names a live entry.
    pub fn contains(&self, id: K) -> bool {
        self.entries.contains_key(&id)
    }

    /// Live value stored under `id`.
    pub fn get(&self, id: K) -> Option<&V> {
        self.entries.get(&id)
    }

    /// Mutable access to the live value under `id`.
    pub fn get_mut(&mut self, id: K) -> Option<&mut V> {
        self.entries.get_mut(&id)
    }

    /// Removes a live entry; the cursor is left untouched.
    pub fn remove(&mut self, id: K) -> Option<V> {
        self.entries.remove(&id)
    }

    /// Returns the first ID (ascending) whose value satisfies `predicate`.
    pub fn find(&self, mut predicate: impl FnMut(&V) -> bool) -> Option<K> {
        self.entries
            .iter()
            .find(|(_, value)| predicate(value))
            .map(|(id, _)| *id)
    }

    /// Live IDs in ascending order.
    pub fn ids(&self) -> impl Iterator<Item = K> + '_ {
        self.entries.keys().copied()
    }

    /// Live entries keyed by ID, without the cursor.
    pub fn entries(&self) -> &BTreeMap<K, V> {
        &self.entries
    }

    /// Drops the cursor and yields the live entries.
    pub fn into_entries(self) -> BTreeMap<K, V> {
        self.entries
    }

    /// Number of live entries (not the cursor).
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no entry is live, even if IDs were allocated before.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K: SequentialId> Collection<K, String> {
    /// Looks up the ID currently holding `name` (exact, case-sensitive).
    pub fn id_of(&self, name: &str) -> Option<K> {
        self.find(|value| value == name)
    }
}

#[cfg(test)]
mod tests {
    use super::Collection;
    use crate::model::ids::TermId;
    use std::collections::BTreeMap;

    #[test]
    fn allocate_never_reuses_removed_ids() {
        let mut terms: Collection<TermId, String> = Collection::new();
        let first = terms.allocate("mon".to_string());
        let second = terms.allocate("tue".to_string());
        terms.remove(second);
        let third = terms.allocate("wed".to_string());

        assert_eq!(first, TermId::new(1));
        assert_eq!(third, TermId::new(3));
        assert_eq!(terms.counter(), 3);
        assert!(terms.was_allocated(second));
        assert!(!terms.contains(second));
    }

    #[test]
    fn was_allocated_excludes_zero_and_future_ids() {
        let mut terms: Collection<TermId, String> = Collection::new();
        terms.allocate("mon".to_string());
        assert!(!terms.was_allocated(TermId::new(0)));
        assert!(terms.was_allocated(TermId::new(1)));
        assert!(!terms.was_allocated(TermId::new(2)));
    }

    #[test]
    fn id_of_is_exact_and_case_sensitive() {
        let mut terms: Collection<TermId, String> = Collection::new();
        terms.allocate("Monday".to_string());
        assert_eq!(terms.id_of("Monday"), Some(TermId::new(1)));
        assert_eq!(terms.id_of("monday"), None);
        assert_eq!(terms.id_of("Monday "), None);
    }

    #[test]
    fn from_parts_rejects_entries_beyond_counter() {
        let mut entries = BTreeMap::new();
        entries.insert(TermId::new(4), "late".to_string());
        assert!(Collection::from_parts(3, entries.clone()).is_none());
        assert!(Collection::from_parts(4, entries).is_some());
    }
}
