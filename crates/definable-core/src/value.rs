//! Type-erased payloads for builder calls.
//!
//! Each call made inside a definition (a keyword entry or a block call)
//! carries exactly one value whose concrete type is only known to the
//! strategy that will apply it. [`DefineValue`] erases the type while keeping
//! the concrete type name around, so a failed downcast can name both sides.

use std::any::Any;
use std::fmt;

use crate::error::{DefineError, DefineResult};

/// The value supplied for one configuration key.
///
/// Constructed by the definition builder from whatever the caller passed;
/// consumed exactly once by the strategy bound to the key.
pub struct DefineValue {
    value: Box<dyn Any + Send + Sync>,
    type_name: &'static str,
}

impl DefineValue {
    /// Erase a concrete value, capturing its type name for diagnostics.
    pub fn new<V: Any + Send + Sync>(value: V) -> Self {
        Self {
            value: Box::new(value),
            type_name: std::any::type_name::<V>(),
        }
    }

    /// The type name of the erased value.
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// Whether the erased value is a `V`.
    pub fn is<V: Any>(&self) -> bool {
        self.value.is::<V>()
    }

    /// Recover the concrete value, or get `self` back on a type mismatch.
    pub fn downcast<V: Any>(self) -> Result<V, Self> {
        match self.value.downcast::<V>() {
            Ok(v) => Ok(*v),
            Err(value) => Err(Self {
                value,
                type_name: self.type_name,
            }),
        }
    }

    /// Recover the concrete value, reporting a mismatch against `key`.
    ///
    /// This is the form strategies use: the error names the configuration key
    /// together with the expected and supplied types.
    pub fn downcast_for<V: Any>(self, key: &str) -> DefineResult<V> {
        self.downcast::<V>().map_err(|value| DefineError::ValueTypeMismatch {
            key: key.to_string(),
            expected: std::any::type_name::<V>(),
            got: value.type_name(),
        })
    }

    pub(crate) fn into_any(self) -> Box<dyn Any + Send + Sync> {
        self.value
    }
}

impl fmt::Debug for DefineValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DefineValue")
            .field("type_name", &self.type_name)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_downcast_success() {
        let value = DefineValue::new(42usize);
        assert!(value.is::<usize>());
        assert_eq!(value.downcast::<usize>().unwrap(), 42);
    }

    #[test]
    fn test_downcast_mismatch_returns_self() {
        let value = DefineValue::new("four".to_string());
        let value = value.downcast::<usize>().unwrap_err();
        // The original value survives the failed downcast.
        assert_eq!(value.downcast::<String>().unwrap(), "four");
    }

    #[test]
    fn test_downcast_for_names_both_types() {
        let value = DefineValue::new(4i32);
        let err = value.downcast_for::<String>("doors").unwrap_err();
        let message = err.to_string();
        assert!(message.contains("doors"));
        assert!(message.contains("i32"));
        assert!(message.contains("String"));
    }

    #[test]
    fn test_type_name_captured_at_construction() {
        let value = DefineValue::new(1.5f64);
        assert_eq!(value.type_name(), "f64");
    }
}
