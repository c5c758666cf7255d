//! The private key/value store owned by each container.

use std::collections::HashMap;

use crate::Value;

/// Key/value storage that remembers insertion order.
///
/// Overwriting a key keeps its original position; removing and re-inserting
/// moves it to the end.
#[derive(Clone, Debug, Default)]
pub struct Store {
    entries: HashMap<String, Value>,
    order: Vec<String>,
}

impl Store {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries.get(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Insert or overwrite, returning the previous value.
    pub fn insert(&mut self, key: impl Into<String>, value: Value) -> Option<Value> {
        let key = key.into();
        if !self.entries.contains_key(&key) {
            self.order.push(key.clone());
        }
        self.entries.insert(key, value)
    }

    pub fn remove(&mut self, key: &str) -> Option<Value> {
        let removed = self.entries.remove(key)?;
        self.order.retain(|k| k != key);
        Some(removed)
    }

    /// Keys in insertion order.
    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.order.iter()
    }

    /// Entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.order
            .iter()
            .filter_map(move |k| self.entries.get(k).map(|v| (k, v)))
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Insert every entry in order, later entries overriding.
    pub fn extend<I, K>(&mut self, entries: I)
    where
        I: IntoIterator<Item = (K, Value)>,
        K: Into<String>,
    {
        for (k, v) in entries {
            self.insert(k, v);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keeps_insertion_order() {
        let mut store = Store::new();
        store.insert("b", Value::from(1));
        store.insert("a", Value::from(2));
        store.insert("c", Value::from(3));
        let keys: Vec<&String> = store.keys().collect();
        assert_eq!(keys, ["b", "a", "c"]);
    }

    #[test]
    fn overwrite_keeps_position() {
        let mut store = Store::new();
        store.insert("x", Value::from(1));
        store.insert("y", Value::from(2));
        assert_eq!(store.insert("x", Value::from(10)), Some(Value::from(1)));
        let entries: Vec<(&String, &Value)> = store.iter().collect();
        assert_eq!(entries[0], (&"x".to_string(), &Value::from(10)));
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn remove_then_reinsert_moves_to_end() {
        let mut store = Store::new();
        store.insert("x", Value::from(1));
        store.insert("y", Value::from(2));
        assert_eq!(store.remove("x"), Some(Value::from(1)));
        assert_eq!(store.remove("x"), None);
        store.insert("x", Value::from(3));
        let keys: Vec<&String> = store.keys().collect();
        assert_eq!(keys, ["y", "x"]);
    }
}
