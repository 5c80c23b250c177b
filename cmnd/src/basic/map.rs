use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::hash::{BuildHasher, Hash};

use crate::command::{Accessor, Editable, Stable};

/// A keyed container the map commands can edit.
pub trait KeyedMap {
    type Key;
    type Value;

    fn contains(&self, key: &Self::Key) -> bool;

    fn insert_entry(&mut self, key: Self::Key, value: Self::Value);

    fn remove_entry(&mut self, key: &Self::Key) -> Option<Self::Value>;
}

impl<K: Ord, V> KeyedMap for BTreeMap<K, V> {
    type Key = K;
    type Value = V;

    fn contains(&self, key: &K) -> bool {
        self.contains_key(key)
    }

    fn insert_entry(&mut self, key: K, value: V) {
        self.insert(key, value);
    }

    fn remove_entry(&mut self, key: &K) -> Option<V> {
        self.remove(key)
    }
}

impl<K: Eq + Hash, V, H: BuildHasher> KeyedMap for HashMap<K, V, H> {
    type Key = K;
    type Value = V;

    fn contains(&self, key: &K) -> bool {
        self.contains_key(key)
    }

    fn insert_entry(&mut self, key: K, value: V) {
        self.insert(key, value);
    }

    fn remove_entry(&mut self, key: &K) -> Option<V> {
        self.remove(key)
    }
}

/// Inserts a new key. The key must be absent when applied and present when
/// reverted.
pub struct InsertMap<T, M: KeyedMap> {
    access: Accessor<T, M>,
    key: M::Key,
    held: Option<M::Value>,
}

impl<T, M> InsertMap<T, M>
where
    T: Editable,
    M: KeyedMap + 'static,
    M::Key: Clone + Send,
    M::Value: Send,
{
    pub fn new<F>(access: F, key: M::Key, value: M::Value) -> Self
    where
        F: Fn(&mut T) -> &mut M + Send + 'static,
    {
        Self {
            access: Box::new(access),
            key,
            held: Some(value),
        }
    }
}

impl<T, M: KeyedMap> fmt::Debug for InsertMap<T, M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InsertMap")
            .field("applied", &self.held.is_none())
            .finish_non_exhaustive()
    }
}

impl<T, M> Stable<T> for InsertMap<T, M>
where
    T: Editable,
    M: KeyedMap + 'static,
    M::Key: Clone + Send,
    M::Value: Send,
{
    fn undo(&mut self, target: &mut T) {
        self.held = (self.access)(target).remove_entry(&self.key);
        assert!(self.held.is_some(), "inserted key is missing");
    }

    fn redo(&mut self, target: &mut T) {
        let map = (self.access)(target);
        assert!(!map.contains(&self.key), "key is already present");
        let Some(value) = self.held.take() else {
            panic!("value is already in the map");
        };
        map.insert_entry(self.key.clone(), value);
    }
}

/// Removes an existing key. The removed value is kept for undo.
pub struct RemoveMap<T, M: KeyedMap> {
    access: Accessor<T, M>,
    key: M::Key,
    held: Option<M::Value>,
}

impl<T, M> RemoveMap<T, M>
where
    T: Editable,
    M: KeyedMap + 'static,
    M::Key: Clone + Send,
    M::Value: Send,
{
    pub fn new<F>(access: F, key: M::Key) -> Self
    where
        F: Fn(&mut T) -> &mut M + Send + 'static,
    {
        Self {
            access: Box::new(access),
            key,
            held: None,
        }
    }

    /// The removed value while the removal is applied.
    pub fn removed(&self) -> Option<&M::Value> {
        self.held.as_ref()
    }
}

impl<T, M: KeyedMap> fmt::Debug for RemoveMap<T, M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RemoveMap")
            .field("applied", &self.held.is_some())
            .finish_non_exhaustive()
    }
}

impl<T, M> Stable<T> for RemoveMap<T, M>
where
    T: Editable,
    M: KeyedMap + 'static,
    M::Key: Clone + Send,
    M::Value: Send,
{
    fn undo(&mut self, target: &mut T) {
        let map = (self.access)(target);
        assert!(!map.contains(&self.key), "removed key came back");
        let Some(value) = self.held.take() else {
            panic!("nothing was removed");
        };
        map.insert_entry(self.key.clone(), value);
    }

    fn redo(&mut self, target: &mut T) {
        self.held = (self.access)(target).remove_entry(&self.key);
        assert!(self.held.is_some(), "key to remove is missing");
    }
}
