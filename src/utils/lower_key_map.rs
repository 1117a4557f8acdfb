use serde::ser::{Serialize, SerializeMap, Serializer};
use std::collections::HashMap;
use std::collections::hash_map;

/// A string-keyed map whose keys are case-insensitive.
///
/// Keys are lower-cased on insert and on lookup, so `"USER_ID"` and
/// `"user_id"` address the same entry. Column labels are compared this way
/// throughout the crate.
#[derive(Debug, Clone, PartialEq)]
pub struct LowerKeyMap<V> {
    inner: HashMap<String, V>,
}

impl<V> LowerKeyMap<V> {
    pub fn new() -> Self {
        Self {
            inner: HashMap::new(),
        }
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            inner: HashMap::with_capacity(capacity),
        }
    }

    pub fn insert(&mut self, key: &str, value: V) -> Option<V> {
        self.inner.insert(key.to_lowercase(), value)
    }

    pub fn get(&self, key: &str) -> Option<&V> {
        self.inner.get(&key.to_lowercase())
    }

    pub fn get_mut(&mut self, key: &str) -> Option<&mut V> {
        self.inner.get_mut(&key.to_lowercase())
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.inner.contains_key(&key.to_lowercase())
    }

    pub fn remove(&mut self, key: &str) -> Option<V> {
        self.inner.remove(&key.to_lowercase())
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// Entries with their normalized (lower-case) keys.
    pub fn iter(&self) -> hash_map::Iter<'_, String, V> {
        self.inner.iter()
    }

    pub fn keys(&self) -> hash_map::Keys<'_, String, V> {
        self.inner.keys()
    }

    pub fn values(&self) -> hash_map::Values<'_, String, V> {
        self.inner.values()
    }
}

impl<V> Default for LowerKeyMap<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: AsRef<str>, V> Extend<(K, V)> for LowerKeyMap<V> {
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (key, value) in iter {
            self.insert(key.as_ref(), value);
        }
    }
}

impl<K: AsRef<str>, V> FromIterator<(K, V)> for LowerKeyMap<V> {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = Self::new();
        map.extend(iter);
        map
    }
}

impl<V> IntoIterator for LowerKeyMap<V> {
    type Item = (String, V);
    type IntoIter = hash_map::IntoIter<String, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.inner.into_iter()
    }
}

impl<V: Serialize> Serialize for LowerKeyMap<V> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.inner.len()))?;
        for (key, value) in &self.inner {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keys_are_case_insensitive() {
        let mut map = LowerKeyMap::new();
        map.insert("User_Id", 1);

        assert!(map.contains_key("USER_ID"));
        assert_eq!(map.get("user_id"), Some(&1));
        assert_eq!(map.insert("USER_ID", 2), Some(1));
        assert_eq!(map.len(), 1);
        assert_eq!(map.keys().next().map(String::as_str), Some("user_id"));

        *map.get_mut("user_ID").unwrap() += 1;
        assert_eq!(map.remove("uSeR_iD"), Some(3));
        assert!(map.is_empty());
    }

    #[test]
    fn test_extend_normalizes_keys() {
        let map: LowerKeyMap<&str> = [("A", "x"), ("b", "y")].into_iter().collect();
        assert_eq!(map.get("a"), Some(&"x"));
        assert_eq!(map.get("B"), Some(&"y"));
    }
}
