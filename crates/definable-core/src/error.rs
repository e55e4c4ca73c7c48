//! Error types for deferred definition.

use std::error::Error;
use std::fmt;

/// The main error type for definition operations.
///
/// All variants are programmer-usage errors reported synchronously to the
/// caller; none are transient and none are retried. In particular, a failure
/// raised while a pending definition is being applied leaves the instance
/// resolved: the definition is never re-run (see
/// [`DefinableExt::ensure_defined`](crate::DefinableExt::ensure_defined)).
#[derive(Debug)]
pub enum DefineError {
    /// A definition was attached to an instance that already has one.
    ///
    /// The first attachment is left untouched.
    AlreadyDefined {
        /// Type name of the instance being defined.
        type_name: &'static str,
    },
    /// A definition block used a key that is not in the effective dictionary.
    UnknownKey {
        /// The unrecognized configuration key.
        key: String,
        /// Type name whose dictionary was consulted.
        type_name: &'static str,
    },
    /// A supplied value did not have the type the key's strategy expects.
    ValueTypeMismatch {
        /// The configuration key being applied.
        key: String,
        /// The expected type name.
        expected: &'static str,
        /// The actual type name that was supplied.
        got: &'static str,
    },
    /// A custom strategy failed while applying a value to the target.
    ///
    /// The underlying failure propagates unmodified; it is wrapped only to
    /// name the key that was being applied.
    Strategy {
        /// The configuration key whose strategy failed.
        key: String,
        /// The underlying failure.
        source: Box<dyn Error + Send + Sync>,
    },
}

impl DefineError {
    /// Wrap a strategy failure, naming the key that was being applied.
    pub fn strategy(
        key: impl Into<String>,
        source: impl Into<Box<dyn Error + Send + Sync>>,
    ) -> Self {
        Self::Strategy {
            key: key.into(),
            source: source.into(),
        }
    }
}

impl fmt::Display for DefineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AlreadyDefined { type_name } => {
                write!(
                    f,
                    "{type_name} has already been given a definition; a second definition is not supported"
                )
            }
            Self::UnknownKey { key, type_name } => {
                write!(f, "Unknown definition key '{key}' for {type_name}")
            }
            Self::ValueTypeMismatch { key, expected, got } => {
                write!(
                    f,
                    "Value for definition key '{key}' has the wrong type: expected {expected}, got {got}"
                )
            }
            Self::Strategy { key, source } => {
                write!(f, "Strategy for definition key '{key}' failed: {source}")
            }
        }
    }
}

impl Error for DefineError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Strategy { source, .. } => Some(source.as_ref()),
            _ => None,
        }
    }
}

/// A specialized Result type for definition operations.
pub type DefineResult<T> = std::result::Result<T, DefineError>;
