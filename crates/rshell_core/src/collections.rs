//! Custom collection types used throughout the engine.

use crate::name::fold_name;
use indexmap::map::Entry;
use indexmap::IndexMap;
use rustc_hash::FxBuildHasher;

/// A map keyed by case-insensitive names that remembers the spelling each
/// key was first inserted with and preserves insertion order.
///
/// Insertion order is what makes candidate lists (ambiguous parameters,
/// parameter-set members) deterministic.
#[derive(Debug, Clone)]
pub struct CaseInsensitiveMap<V> {
    entries: IndexMap<String, (String, V), FxBuildHasher>,
}

impl<V> CaseInsensitiveMap<V> {
    pub fn new() -> Self {
        Self {
            entries: IndexMap::with_hasher(FxBuildHasher),
        }
    }

    /// Insert a value, returning the previous value for the same folded key.
    /// The original spelling of an existing key is kept.
    pub fn insert(&mut self, key: &str, value: V) -> Option<V> {
        match self.entries.entry(fold_name(key).into_owned()) {
            Entry::Occupied(mut slot) => Some(std::mem::replace(&mut slot.get_mut().1, value)),
            Entry::Vacant(slot) => {
                slot.insert((key.to_string(), value));
                None
            }
        }
    }

    pub fn get(&self, key: &str) -> Option<&V> {
        self.entries.get(fold_name(key).as_ref()).map(|(_, v)| v)
    }

    pub fn get_mut(&mut self, key: &str) -> Option<&mut V> {
        self.entries.get_mut(fold_name(key).as_ref()).map(|(_, v)| v)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(fold_name(key).as_ref())
    }

    /// Remove an entry, preserving the order of the remaining entries.
    pub fn remove(&mut self, key: &str) -> Option<V> {
        self.entries.shift_remove(fold_name(key).as_ref()).map(|(_, v)| v)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate entries in insertion order, yielding original key spellings.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &V)> {
        self.entries.values().map(|(k, v)| (k.as_str(), v))
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (&str, &mut V)> {
        self.entries.values_mut().map(|(k, v)| (k.as_str(), v))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.values().map(|(k, _)| k.as_str())
    }

    pub fn values(&self) -> impl Iterator<Item = &V> {
        self.entries.values().map(|(_, v)| v)
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

impl<V> Default for CaseInsensitiveMap<V> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_ignores_case() {
        let mut map = CaseInsensitiveMap::new();
        map.insert("ErrorAction", 1);
        assert_eq!(map.get("erroraction"), Some(&1));
        assert_eq!(map.get("ERRORACTION"), Some(&1));
        assert!(map.contains_key("errorAction"));
    }

    #[test]
    fn test_update_keeps_first_spelling() {
        let mut map = CaseInsensitiveMap::new();
        map.insert("Path", 1);
        let old = map.insert("PATH", 2);
        assert_eq!(old, Some(1));
        assert_eq!(map.keys().collect::<Vec<_>>(), vec!["Path"]);
        assert_eq!(map.get("Path"), Some(&2));
        assert_eq!(map.len(), 1);
    }

    #[test]
    fn test_preserves_order_across_removal() {
        let mut map = CaseInsensitiveMap::new();
        map.insert("c", 3);
        map.insert("a", 1);
        map.insert("b", 2);
        map.remove("A");

        let keys: Vec<_> = map.keys().collect();
        assert_eq!(keys, vec!["c", "b"]);
    }
}
