//! The evaluation context handed to definition blocks.
//!
//! A [`DefinitionScope`] is the only surface a definition block sees: it
//! borrows one target and one effective-dictionary snapshot, forwards each
//! call to the matching strategy, and is discarded when the block returns.
//! Exactly one scope is created per resolution; it exposes nothing of the
//! target beyond dictionary-bound calls, so builder syntax never leaks into
//! the target's real API.

use std::any::Any;

use crate::dictionary::Dictionary;
use crate::error::{DefineError, DefineResult};
use crate::value::DefineValue;

/// Ephemeral call-forwarding surface for one resolution.
pub struct DefinitionScope<'a, T> {
    target: &'a T,
    dictionary: &'a Dictionary<T>,
}

impl<'a, T> DefinitionScope<'a, T> {
    pub(crate) fn new(target: &'a T, dictionary: &'a Dictionary<T>) -> Self {
        Self { target, dictionary }
    }

    /// Apply `value` to the configuration key `key`.
    ///
    /// Fails with [`DefineError::UnknownKey`] when `key` is not in the
    /// effective dictionary; in that case no strategy runs.
    pub fn set<V: Any + Send + Sync>(&self, key: &str, value: V) -> DefineResult<()> {
        self.apply(key, DefineValue::new(value))
    }

    pub(crate) fn apply(&self, key: &str, value: DefineValue) -> DefineResult<()> {
        match self.dictionary.get(key) {
            Some(strategy) => strategy.apply(self.target, key, value),
            None => Err(DefineError::UnknownKey {
                key: key.to_string(),
                type_name: self.dictionary.type_name(),
            }),
        }
    }

    /// The keys this scope will accept, sorted.
    pub fn keys(&self) -> Vec<&str> {
        self.dictionary.keys()
    }
}
