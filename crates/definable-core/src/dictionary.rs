//! Per-type definition dictionaries with ancestor merge.
//!
//! A [`TypeDictionary`] is owned by a type (one per type, usually in a
//! `OnceLock` static) and maps configuration-key names to
//! [`AssignStrategy`] values. Dictionaries form an explicit parent chain:
//! the *effective* dictionary of a type is the union of its own
//! registrations and every ancestor's, with the closest registration for a
//! key winning.
//!
//! Registration is open: unrelated features can keep adding keys to a type's
//! dictionary after it was declared, including to ancestors that already
//! have descendants. For that reason [`effective`](TypeDictionary::effective)
//! is computed on demand per resolution rather than cached eagerly.
//!
//! # Example
//!
//! ```
//! use definable_core::TypeDictionary;
//! use parking_lot::RwLock;
//! use std::sync::Arc;
//!
//! #[derive(Default)]
//! struct Car {
//!     make: RwLock<String>,
//! }
//!
//! let vehicle: Arc<TypeDictionary<Car>> = Arc::new(TypeDictionary::new("Vehicle"));
//! vehicle.register_attribute("make", |car: &Car, make: String| *car.make.write() = make);
//!
//! let car = TypeDictionary::with_parent("Car", vehicle);
//! assert!(car.contains("make"));
//! ```

use std::any::Any;
use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;

use crate::definable::Definable;
use crate::error::DefineResult;
use crate::logging::targets;
use crate::strategy::{assign_with, AssignAttribute, AssignMetadataKey, AssignStrategy};
use crate::value::DefineValue;

/// The definition vocabulary owned by one type.
///
/// Registration goes through `&self`: dictionaries live in statics and are
/// extended at load time (and occasionally later) from multiple features.
/// Reads and writes are `RwLock`-synchronized; resolution always works from
/// an immutable [`Dictionary`] snapshot.
pub struct TypeDictionary<T> {
    type_name: &'static str,
    parent: Option<Arc<TypeDictionary<T>>>,
    own: RwLock<HashMap<String, Arc<dyn AssignStrategy<T>>>>,
}

impl<T: Send + Sync + 'static> TypeDictionary<T> {
    /// Create a root dictionary for `type_name`.
    pub fn new(type_name: &'static str) -> Self {
        Self {
            type_name,
            parent: None,
            own: RwLock::new(HashMap::new()),
        }
    }

    /// Create a dictionary whose lookups fall back to `parent`.
    pub fn with_parent(type_name: &'static str, parent: Arc<TypeDictionary<T>>) -> Self {
        Self {
            type_name,
            parent: Some(parent),
            own: RwLock::new(HashMap::new()),
        }
    }

    /// The name of the type this dictionary belongs to.
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// The closest ancestor dictionary, if any.
    pub fn parent(&self) -> Option<&Arc<TypeDictionary<T>>> {
        self.parent.as_ref()
    }

    /// Bind `key` to `strategy` at this level.
    ///
    /// Overwrites any previous binding for `key` at this level only;
    /// ancestor registrations are never touched.
    pub fn register(&self, key: impl Into<String>, strategy: Arc<dyn AssignStrategy<T>>) {
        let key = key.into();
        tracing::trace!(
            target: targets::DICTIONARY,
            type_name = self.type_name,
            key = %key,
            "registered definition key"
        );
        self.own.write().insert(key, strategy);
    }

    /// Bind `key` to a direct setter.
    ///
    /// This is the plain-attribute form: the supplied value is downcast to
    /// `V` and handed to `setter`.
    pub fn register_attribute<V: Any>(
        &self,
        key: impl Into<String>,
        setter: impl Fn(&T, V) + Send + Sync + 'static,
    ) {
        self.register(key, Arc::new(AssignAttribute::new(setter)));
    }

    /// Bind `key` so that its value lands in the target's metadata bag under
    /// the same key.
    pub fn register_metadata_key(&self, key: impl Into<String>)
    where
        T: Definable,
    {
        let key = key.into();
        self.register(key.clone(), Arc::new(AssignMetadataKey::new(key)));
    }

    /// Bind `key` to a closure strategy.
    pub fn register_with(
        &self,
        key: impl Into<String>,
        apply: impl Fn(&T, DefineValue) -> DefineResult<()> + Send + Sync + 'static,
    ) {
        self.register(key, assign_with(apply));
    }

    /// Whether `key` is registered at this level or any ancestor.
    pub fn contains(&self, key: &str) -> bool {
        self.own.read().contains_key(key)
            || self.parent.as_ref().is_some_and(|p| p.contains(key))
    }

    /// Keys registered at this level only, sorted.
    pub fn own_keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.own.read().keys().cloned().collect();
        keys.sort_unstable();
        keys
    }

    /// Merge this level over the whole ancestor chain.
    ///
    /// Computed fresh on every call so registrations made on an ancestor
    /// after this dictionary was created are visible. Closest registrations
    /// win ties.
    pub fn effective(&self) -> Dictionary<T> {
        let mut entries = HashMap::new();
        self.collect_into(&mut entries);
        Dictionary {
            type_name: self.type_name,
            entries,
        }
    }

    fn collect_into(&self, entries: &mut HashMap<String, Arc<dyn AssignStrategy<T>>>) {
        if let Some(parent) = &self.parent {
            parent.collect_into(entries);
        }
        for (key, strategy) in self.own.read().iter() {
            entries.insert(key.clone(), strategy.clone());
        }
    }
}

/// An immutable effective-dictionary snapshot.
///
/// Produced by [`TypeDictionary::effective`] and consumed by exactly one
/// resolution; registration happening concurrently affects only later
/// snapshots.
pub struct Dictionary<T> {
    type_name: &'static str,
    entries: HashMap<String, Arc<dyn AssignStrategy<T>>>,
}

impl<T> Dictionary<T> {
    /// The name of the type the snapshot was taken for.
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// Look up the strategy bound to `key`.
    pub fn get(&self, key: &str) -> Option<&Arc<dyn AssignStrategy<T>>> {
        self.entries.get(key)
    }

    /// Whether `key` is bound.
    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// All bound keys, sorted.
    pub fn keys(&self) -> Vec<&str> {
        let mut keys: Vec<&str> = self.entries.keys().map(|k| k.as_str()).collect();
        keys.sort_unstable();
        keys
    }

    /// Number of bound keys.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the snapshot is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
