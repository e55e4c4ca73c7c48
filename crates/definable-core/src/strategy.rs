//! Assignment strategies: how one configuration key's value reaches a target.
//!
//! A strategy is a small, pure "apply this value to that target" behavior.
//! The dictionary binds each key to one strategy; the scope proxy invokes it
//! during resolution. Strategies share no mutable state between invocations
//! and never recover from errors — failures propagate to the caller of
//! [`ensure_defined`](crate::DefinableExt::ensure_defined).
//!
//! Two canonical variants are provided:
//!
//! - [`AssignAttribute`]: wraps a typed setter; the statically-typed
//!   rendition of "call the setter named after the key".
//! - [`AssignMetadataKey`]: writes the value into the target's metadata bag,
//!   the extension point for vocabularies added from outside the type.
//!
//! Any closure of the right shape is also a valid strategy via
//! [`assign_with`].

use std::any::Any;
use std::sync::Arc;

use crate::definable::Definable;
use crate::error::DefineResult;
use crate::value::DefineValue;

/// Applies the value supplied for one configuration key to a target.
///
/// `key` is the dictionary key the strategy was resolved under; it is passed
/// in so errors can name it.
pub trait AssignStrategy<T>: Send + Sync {
    /// Apply `value` to `target`.
    fn apply(&self, target: &T, key: &str, value: DefineValue) -> DefineResult<()>;
}

/// Strategy backed by a typed setter.
///
/// Downcasts the supplied value to `V` and hands it to the setter. A failed
/// downcast is reported as
/// [`ValueTypeMismatch`](crate::DefineError::ValueTypeMismatch).
pub struct AssignAttribute<T, V> {
    setter: Box<dyn Fn(&T, V) + Send + Sync>,
}

impl<T, V: Any> AssignAttribute<T, V> {
    /// Build the strategy from a setter closure.
    pub fn new(setter: impl Fn(&T, V) + Send + Sync + 'static) -> Self {
        Self {
            setter: Box::new(setter),
        }
    }
}

impl<T: Send + Sync, V: Any> AssignStrategy<T> for AssignAttribute<T, V> {
    fn apply(&self, target: &T, key: &str, value: DefineValue) -> DefineResult<()> {
        let value = value.downcast_for::<V>(key)?;
        (self.setter)(target, value);
        Ok(())
    }
}

/// Strategy that writes the value into the target's metadata bag.
///
/// Constructed with the bag key to populate, which may differ from the
/// dictionary key it is registered under. The bag is materialized on first
/// write.
pub struct AssignMetadataKey {
    key: String,
}

impl AssignMetadataKey {
    /// Build the strategy for a metadata key.
    pub fn new(key: impl Into<String>) -> Self {
        Self { key: key.into() }
    }

    /// The metadata key this strategy populates.
    pub fn key(&self) -> &str {
        &self.key
    }
}

impl<T: Definable> AssignStrategy<T> for AssignMetadataKey {
    fn apply(&self, target: &T, _key: &str, value: DefineValue) -> DefineResult<()> {
        target
            .define_base()
            .insert_metadata_value(self.key.clone(), value);
        Ok(())
    }
}

/// Strategy backed by an arbitrary closure.
struct FnStrategy<F> {
    apply: F,
}

impl<T, F> AssignStrategy<T> for FnStrategy<F>
where
    T: Send + Sync,
    F: Fn(&T, DefineValue) -> DefineResult<()> + Send + Sync,
{
    fn apply(&self, target: &T, _key: &str, value: DefineValue) -> DefineResult<()> {
        (self.apply)(target, value)
    }
}

/// Lift a closure into a strategy.
///
/// The closure receives the target and the still-erased value; use
/// [`DefineValue::downcast_for`] to recover the concrete type, and
/// [`DefineError::strategy`](crate::DefineError::strategy) to report
/// domain failures.
pub fn assign_with<T, F>(apply: F) -> Arc<dyn AssignStrategy<T>>
where
    T: Send + Sync + 'static,
    F: Fn(&T, DefineValue) -> DefineResult<()> + Send + Sync + 'static,
{
    Arc::new(FnStrategy { apply })
}
