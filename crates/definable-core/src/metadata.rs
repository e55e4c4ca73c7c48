//! General-purpose metadata bag attached to definable objects.
//!
//! The bag is the escape hatch for third parties that want to extend a
//! type's definition vocabulary without touching the type itself: a
//! [`AssignMetadataKey`](crate::AssignMetadataKey) strategy writes into it
//! during resolution, and consumers read it back with typed lookups.
//!
//! Values are stored behind `Arc`, so a [`Metadata`] snapshot is cheap to
//! clone and shares the stored values rather than deep-copying them.

use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use static_assertions::assert_impl_all;

/// Arbitrary key-value storage for a definable object.
///
/// Keys are strings; values are type-erased and read back with
/// [`get`](Self::get). Unset keys are absent, not null-valued.
#[derive(Clone, Default)]
pub struct Metadata {
    entries: HashMap<String, Arc<dyn Any + Send + Sync>>,
}

impl Metadata {
    /// Create an empty bag.
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a value under `key`, returning the displaced value if any.
    pub fn insert<V: Any + Send + Sync>(
        &mut self,
        key: impl Into<String>,
        value: V,
    ) -> Option<Arc<dyn Any + Send + Sync>> {
        self.entries.insert(key.into(), Arc::new(value))
    }

    pub(crate) fn insert_shared(
        &mut self,
        key: String,
        value: Arc<dyn Any + Send + Sync>,
    ) -> Option<Arc<dyn Any + Send + Sync>> {
        self.entries.insert(key, value)
    }

    /// Typed lookup. Returns `None` when the key is absent or the stored
    /// value is not a `V`.
    pub fn get<V: Any>(&self, key: &str) -> Option<&V> {
        self.entries.get(key).and_then(|v| v.downcast_ref::<V>())
    }

    /// Whether `key` has a value.
    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Iterate over the stored keys (unordered).
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(|k| k.as_str())
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the bag is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl fmt::Debug for Metadata {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut keys: Vec<&str> = self.keys().collect();
        keys.sort_unstable();
        f.debug_struct("Metadata").field("keys", &keys).finish()
    }
}

assert_impl_all!(Metadata: Send, Sync, Clone);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_and_typed_get() {
        let mut bag = Metadata::new();
        bag.insert("all_wheel_drive", true);
        bag.insert("label", "baja".to_string());

        assert_eq!(bag.get::<bool>("all_wheel_drive"), Some(&true));
        assert_eq!(bag.get::<String>("label").map(String::as_str), Some("baja"));
        assert_eq!(bag.len(), 2);
    }

    #[test]
    fn test_unset_keys_are_absent() {
        let bag = Metadata::new();
        assert!(bag.is_empty());
        assert!(!bag.contains_key("missing"));
        assert_eq!(bag.get::<bool>("missing"), None);
    }

    #[test]
    fn test_wrong_type_lookup_is_none() {
        let mut bag = Metadata::new();
        bag.insert("count", 3usize);
        assert_eq!(bag.get::<String>("count"), None);
        assert_eq!(bag.get::<usize>("count"), Some(&3));
    }

    #[test]
    fn test_insert_displaces_previous_value() {
        let mut bag = Metadata::new();
        assert!(bag.insert("k", 1u8).is_none());
        assert!(bag.insert("k", 2u8).is_some());
        assert_eq!(bag.get::<u8>("k"), Some(&2));
    }

    #[test]
    fn test_clone_shares_values() {
        let mut bag = Metadata::new();
        bag.insert("k", "v".to_string());
        let snapshot = bag.clone();
        assert_eq!(snapshot.get::<String>("k").map(String::as_str), Some("v"));
    }
}
