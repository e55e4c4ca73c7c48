//! Example client: named argument assignment.
//!
//! This module is not part of the generic machinery; it shows the shape a
//! consumer API is expected to take. An [`Argument`] is a definable entity
//! with its own dictionary, an [`ArgumentSet`] is the owner-side collection
//! some other definable entity (a field, say) would hold, and
//! [`assign_argument`] is the helper such an owner exposes to turn
//! "name plus options plus optional block" into a configured entry.
//!
//! The getters demonstrate the lazy-accessor convention: every accessor
//! whose value a definition could have set calls
//! [`ensure_defined`](crate::DefinableExt::ensure_defined) first.

use std::any::Any;
use std::collections::HashMap;
use std::sync::{Arc, OnceLock};

use parking_lot::RwLock;

use crate::definable::{Definable, DefinableExt, DefineBase, DefineBlock};
use crate::dictionary::TypeDictionary;
use crate::error::DefineResult;
use crate::value::DefineValue;

/// A named argument accepted by some owning entity.
///
/// `name` is always present; type, description and default are optional.
/// "No default" is distinct from any supplied default: a present entry may
/// hold any value, including one that means "null" to the consumer.
#[derive(Default)]
pub struct Argument {
    base: DefineBase<Argument>,
    name: RwLock<String>,
    value_type: RwLock<Option<String>>,
    description: RwLock<Option<String>>,
    default_value: RwLock<Option<Arc<dyn Any + Send + Sync>>>,
}

impl Argument {
    /// Set the argument name.
    pub fn set_name(&self, name: impl Into<String>) {
        *self.name.write() = name.into();
    }

    /// Set the declared type.
    pub fn set_value_type(&self, value_type: impl Into<String>) {
        *self.value_type.write() = Some(value_type.into());
    }

    /// Set the human-readable description.
    pub fn set_description(&self, description: impl Into<String>) {
        *self.description.write() = Some(description.into());
    }

    /// Set the default value.
    pub fn set_default_value<V: Any + Send + Sync>(&self, value: V) {
        *self.default_value.write() = Some(Arc::new(value));
    }

    fn set_default_value_shared(&self, value: Arc<dyn Any + Send + Sync>) {
        *self.default_value.write() = Some(value);
    }

    /// The argument name.
    pub fn name(&self) -> DefineResult<String> {
        self.ensure_defined()?;
        Ok(self.name.read().clone())
    }

    /// The declared type, if one was supplied.
    pub fn value_type(&self) -> DefineResult<Option<String>> {
        self.ensure_defined()?;
        Ok(self.value_type.read().clone())
    }

    /// The description, if one was supplied.
    pub fn description(&self) -> DefineResult<Option<String>> {
        self.ensure_defined()?;
        Ok(self.description.read().clone())
    }

    /// Whether a default was supplied at all.
    pub fn has_default(&self) -> DefineResult<bool> {
        self.ensure_defined()?;
        Ok(self.default_value.read().is_some())
    }

    /// The default value, if one of type `V` was supplied.
    pub fn default_value<V: Any + Clone>(&self) -> DefineResult<Option<V>> {
        self.ensure_defined()?;
        Ok(self
            .default_value
            .read()
            .as_ref()
            .and_then(|v| v.downcast_ref::<V>())
            .cloned())
    }
}

static ARGUMENT_DICTIONARY: OnceLock<Arc<TypeDictionary<Argument>>> = OnceLock::new();

impl Definable for Argument {
    fn define_base(&self) -> &DefineBase<Self> {
        &self.base
    }

    fn dictionary() -> Arc<TypeDictionary<Self>> {
        ARGUMENT_DICTIONARY
            .get_or_init(|| {
                let dict = TypeDictionary::new("Argument");
                dict.register_attribute("name", |a: &Argument, v: String| a.set_name(v));
                dict.register_attribute("value_type", |a: &Argument, v: String| {
                    a.set_value_type(v)
                });
                dict.register_attribute("description", |a: &Argument, v: String| {
                    a.set_description(v)
                });
                dict.register_with("default_value", |a: &Argument, value: DefineValue| {
                    a.set_default_value_shared(Arc::from(value.into_any()));
                    Ok(())
                });
                Arc::new(dict)
            })
            .clone()
    }
}

/// The arguments owned by some definable entity, keyed by name.
#[derive(Default)]
pub struct ArgumentSet {
    entries: RwLock<HashMap<String, Arc<Argument>>>,
}

impl ArgumentSet {
    /// Create an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert `argument` under `name`, returning any displaced entry.
    pub fn insert(
        &self,
        name: impl Into<String>,
        argument: Arc<Argument>,
    ) -> Option<Arc<Argument>> {
        self.entries.write().insert(name.into(), argument)
    }

    /// Look up an argument by name.
    pub fn get(&self, name: &str) -> Option<Arc<Argument>> {
        self.entries.read().get(name).cloned()
    }

    /// Number of arguments.
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    /// Whether the set is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    /// The argument names, sorted.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.entries.read().keys().cloned().collect();
        names.sort_unstable();
        names
    }
}

/// Optional pieces of an argument assignment.
///
/// `None` means "not supplied": the corresponding field is left alone, which
/// keeps it distinguishable from any explicitly supplied value.
#[derive(Default)]
pub struct ArgumentOptions {
    /// The declared type.
    pub value_type: Option<String>,
    /// The human-readable description.
    pub description: Option<String>,
    /// The default value.
    pub default_value: Option<Arc<dyn Any + Send + Sync>>,
    /// A definition block for anything the direct options do not cover.
    pub block: Option<DefineBlock<Argument>>,
}

/// Turn an argument config into an [`Argument`] owned by `arguments`.
///
/// When a block is supplied the argument is built through the deferred
/// `define` factory (the block runs lazily, on first observation);
/// otherwise it is constructed directly. `name` is always assigned
/// verbatim; the optional pieces are assigned only when supplied. The
/// result is inserted under `name`, overwriting any prior entry.
pub fn assign_argument(
    arguments: &ArgumentSet,
    name: &str,
    options: ArgumentOptions,
) -> DefineResult<Arc<Argument>> {
    let argument = match options.block {
        Some(block) => Argument::define().block(block).build()?,
        None => Argument::default(),
    };
    argument.set_name(name);
    if let Some(value_type) = options.value_type {
        argument.set_value_type(value_type);
    }
    if let Some(description) = options.description {
        argument.set_description(description);
    }
    if let Some(default_value) = options.default_value {
        argument.set_default_value_shared(default_value);
    }

    let argument = Arc::new(argument);
    arguments.insert(name, argument.clone());
    Ok(argument)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scope::DefinitionScope;

    #[test]
    fn test_direct_assignment() {
        let arguments = ArgumentSet::new();
        let options = ArgumentOptions {
            value_type: Some("Int".to_string()),
            default_value: Some(Arc::new(10i64)),
            ..Default::default()
        };

        assign_argument(&arguments, "first", options).unwrap();

        let argument = arguments.get("first").unwrap();
        assert_eq!(argument.name().unwrap(), "first");
        assert_eq!(argument.value_type().unwrap().as_deref(), Some("Int"));
        assert_eq!(argument.description().unwrap(), None);
        assert_eq!(argument.default_value::<i64>().unwrap(), Some(10));
    }

    #[test]
    fn test_block_assignment_is_deferred() {
        let arguments = ArgumentSet::new();
        let options = ArgumentOptions {
            block: Some(Box::new(|d: &DefinitionScope<Argument>| {
                d.set("description", "counts things".to_string())
            })),
            ..Default::default()
        };

        assign_argument(&arguments, "count", options).unwrap();

        let argument = arguments.get("count").unwrap();
        assert!(argument.define_base().is_pending());
        assert_eq!(
            argument.description().unwrap().as_deref(),
            Some("counts things")
        );
        assert_eq!(argument.name().unwrap(), "count");
    }

    #[test]
    fn test_no_default_is_distinct_from_supplied_default() {
        let arguments = ArgumentSet::new();
        assign_argument(&arguments, "bare", ArgumentOptions::default()).unwrap();
        assign_argument(
            &arguments,
            "defaulted",
            ArgumentOptions {
                default_value: Some(Arc::new(0i64)),
                ..Default::default()
            },
        )
        .unwrap();

        assert!(!arguments.get("bare").unwrap().has_default().unwrap());
        assert!(arguments.get("defaulted").unwrap().has_default().unwrap());
        assert_eq!(
            arguments.get("defaulted").unwrap().default_value::<i64>().unwrap(),
            Some(0)
        );
    }

    #[test]
    fn test_reassignment_overwrites_by_name() {
        let arguments = ArgumentSet::new();
        assign_argument(
            &arguments,
            "limit",
            ArgumentOptions {
                value_type: Some("Int".to_string()),
                ..Default::default()
            },
        )
        .unwrap();
        assign_argument(
            &arguments,
            "limit",
            ArgumentOptions {
                value_type: Some("BigInt".to_string()),
                ..Default::default()
            },
        )
        .unwrap();

        assert_eq!(arguments.len(), 1);
        let argument = arguments.get("limit").unwrap();
        assert_eq!(argument.value_type().unwrap().as_deref(), Some("BigInt"));
    }

    #[test]
    fn test_names_are_sorted() {
        let arguments = ArgumentSet::new();
        assign_argument(&arguments, "b", ArgumentOptions::default()).unwrap();
        assign_argument(&arguments, "a", ArgumentOptions::default()).unwrap();
        assert_eq!(arguments.names(), vec!["a", "b"]);
    }
}
