//! The definable-object contract: deferred, one-shot configuration.
//!
//! A definable type embeds a [`DefineBase`] and implements [`Definable`];
//! everything else comes from the blanket [`DefinableExt`]. Instances are
//! built through a [`Definition`] builder, which records keyword entries and
//! an optional block without evaluating anything. The first observation of
//! configured state calls [`ensure_defined`](DefinableExt::ensure_defined),
//! which consumes the pending definition exactly once inside a fresh
//! [`DefinitionScope`].
//!
//! # Definition lifecycle
//!
//! ```text
//! Unconfigured --attach--> Pending --ensure_defined--> Resolving --> Resolved
//!      \__________________________ensure_defined____________________/^
//! ```
//!
//! No transition leaves `Resolved`. A second attach fails in every state but
//! `Unconfigured`. `Resolving` carries the winning thread's id so that
//! re-entrant observation from inside a strategy is a no-op while other
//! threads block until resolution finishes.
//!
//! # Example
//!
//! ```
//! use std::sync::{Arc, OnceLock};
//! use definable_core::{Definable, DefinableExt, DefineBase, DefineResult, TypeDictionary};
//! use parking_lot::RwLock;
//!
//! #[derive(Default)]
//! struct Car {
//!     base: DefineBase<Car>,
//!     make: RwLock<String>,
//! }
//!
//! impl Car {
//!     fn set_make(&self, make: String) {
//!         *self.make.write() = make;
//!     }
//!
//!     fn make(&self) -> DefineResult<String> {
//!         self.ensure_defined()?;
//!         Ok(self.make.read().clone())
//!     }
//! }
//!
//! static CAR_DICTIONARY: OnceLock<Arc<TypeDictionary<Car>>> = OnceLock::new();
//!
//! impl Definable for Car {
//!     fn define_base(&self) -> &DefineBase<Self> {
//!         &self.base
//!     }
//!
//!     fn dictionary() -> Arc<TypeDictionary<Self>> {
//!         CAR_DICTIONARY
//!             .get_or_init(|| {
//!                 let dict = TypeDictionary::new("Car");
//!                 dict.register_attribute("make", Car::set_make);
//!                 Arc::new(dict)
//!             })
//!             .clone()
//!     }
//! }
//!
//! let car = Car::define().set("make", "Subaru".to_string()).build()?;
//! assert!(car.define_base().is_pending()); // nothing evaluated yet
//! assert_eq!(car.make()?, "Subaru");       // first read resolves
//! assert!(car.define_base().is_resolved());
//! # Ok::<(), definable_core::DefineError>(())
//! ```

use std::any::Any;
use std::mem;
use std::sync::Arc;
use std::thread::{self, ThreadId};

use parking_lot::{Condvar, Mutex, RwLock};
use static_assertions::assert_impl_all;

use crate::dictionary::TypeDictionary;
use crate::error::{DefineError, DefineResult};
use crate::logging::targets;
use crate::metadata::Metadata;
use crate::scope::DefinitionScope;
use crate::value::DefineValue;

/// A deferred definition block, run once against a [`DefinitionScope`].
pub type DefineBlock<T> =
    Box<dyn FnOnce(&DefinitionScope<'_, T>) -> DefineResult<()> + Send>;

/// The not-yet-evaluated configuration captured by a builder call.
///
/// Keyword entries are applied first, in insertion order, then the block.
pub(crate) struct PendingDefinition<T> {
    keywords: Vec<(String, DefineValue)>,
    block: Option<DefineBlock<T>>,
}

impl<T> PendingDefinition<T> {
    fn run(self, scope: &DefinitionScope<'_, T>) -> DefineResult<()> {
        for (key, value) in self.keywords {
            scope.apply(&key, value)?;
        }
        if let Some(block) = self.block {
            block(scope)?;
        }
        Ok(())
    }
}

enum DefinitionState<T> {
    /// No definition attached, nothing resolved.
    Unconfigured,
    /// A definition is attached but has not been run.
    Pending(PendingDefinition<T>),
    /// The thread named here is running the definition right now.
    Resolving(ThreadId),
    /// The definition (or its absence) has been consumed. Terminal.
    Resolved,
}

/// Embedded base for definable types.
///
/// Holds the definition state machine and the lazily-materialized metadata
/// bag. Include one as a field and return it from
/// [`Definable::define_base`]:
///
/// ```
/// use definable_core::DefineBase;
///
/// #[derive(Default)]
/// struct Field {
///     base: DefineBase<Field>,
/// }
/// ```
pub struct DefineBase<T> {
    type_name: &'static str,
    state: Mutex<DefinitionState<T>>,
    resolved: Condvar,
    metadata: RwLock<Option<Metadata>>,
}

impl<T: 'static> DefineBase<T> {
    /// Create an unconfigured base.
    pub fn new() -> Self {
        Self {
            type_name: std::any::type_name::<T>(),
            state: Mutex::new(DefinitionState::Unconfigured),
            resolved: Condvar::new(),
            metadata: RwLock::new(None),
        }
    }

    /// Whether a definition is attached and still unevaluated.
    pub fn is_pending(&self) -> bool {
        matches!(*self.state.lock(), DefinitionState::Pending(_))
    }

    /// Whether the definition mechanism has finished for this instance.
    ///
    /// Note that a failed resolution still counts as resolved: the instance
    /// may be partially configured, and the definition is never retried.
    pub fn is_resolved(&self) -> bool {
        matches!(*self.state.lock(), DefinitionState::Resolved)
    }

    pub(crate) fn attach(&self, pending: PendingDefinition<T>) -> DefineResult<()> {
        let mut state = self.state.lock();
        match *state {
            DefinitionState::Unconfigured => {
                *state = DefinitionState::Pending(pending);
                Ok(())
            }
            _ => Err(DefineError::AlreadyDefined {
                type_name: self.type_name,
            }),
        }
    }

    /// Store a value in the metadata bag, materializing the bag if absent.
    ///
    /// Custom strategies may call this directly; the common path is a
    /// [`AssignMetadataKey`](crate::AssignMetadataKey) registration.
    pub fn insert_metadata<V: Any + Send + Sync>(&self, key: impl Into<String>, value: V) {
        self.metadata
            .write()
            .get_or_insert_with(Metadata::new)
            .insert(key, value);
    }

    pub(crate) fn insert_metadata_value(&self, key: String, value: DefineValue) {
        self.metadata
            .write()
            .get_or_insert_with(Metadata::new)
            .insert_shared(key, Arc::from(value.into_any()));
    }

    pub(crate) fn metadata_snapshot(&self) -> Metadata {
        self.metadata.read().clone().unwrap_or_default()
    }
}

impl<T: 'static> Default for DefineBase<T> {
    fn default() -> Self {
        Self::new()
    }
}

assert_impl_all!(DefineBase<()>: Send, Sync);

/// Marks the state resolved and wakes blocked observers, even if the
/// definition panicked mid-application.
struct ResolveGuard<'a, T> {
    base: &'a DefineBase<T>,
}

impl<T> Drop for ResolveGuard<'_, T> {
    fn drop(&mut self) {
        *self.base.state.lock() = DefinitionState::Resolved;
        self.base.resolved.notify_all();
    }
}

/// A type whose instances accept a deferred definition.
///
/// Implementors embed a [`DefineBase`] and expose their type's
/// [`TypeDictionary`] (usually a `OnceLock` static). All instance-level
/// operations come from the blanket [`DefinableExt`].
pub trait Definable: Any + Send + Sync + Sized {
    /// The embedded definition base.
    fn define_base(&self) -> &DefineBase<Self>;

    /// The dictionary for this type, including its ancestor chain.
    fn dictionary() -> Arc<TypeDictionary<Self>>;
}

/// Instance-level definition operations, blanket-implemented for every
/// [`Definable`] type.
pub trait DefinableExt: Definable {
    /// Start a definition for a new instance.
    ///
    /// Equivalent to [`Definition::new`]; see [`Definition::build`].
    fn define() -> Definition<Self>
    where
        Self: Default,
    {
        Definition::new()
    }

    /// Run the pending definition if it has not been run yet.
    ///
    /// The pending definition is taken and cleared in one atomic step, so it
    /// runs at most once no matter how often or from how many threads this
    /// is called. The taking thread evaluates it against a fresh
    /// [`DefinitionScope`] bound to the type's effective dictionary; other
    /// threads block until that evaluation finishes; re-entrant calls from
    /// the evaluating thread itself return immediately.
    ///
    /// Call this before reading any state a definition could have set.
    ///
    /// # Errors
    ///
    /// Propagates the first strategy failure. The instance still transitions
    /// to resolved: a failed definition leaves the instance partially
    /// configured and is never retried, so callers should discard such
    /// instances rather than reuse them.
    fn ensure_defined(&self) -> DefineResult<()> {
        let base = self.define_base();
        let pending = {
            let mut state = base.state.lock();
            loop {
                match &mut *state {
                    DefinitionState::Resolved => return Ok(()),
                    DefinitionState::Unconfigured => {
                        *state = DefinitionState::Resolved;
                        return Ok(());
                    }
                    DefinitionState::Resolving(owner) => {
                        if *owner == thread::current().id() {
                            return Ok(());
                        }
                        base.resolved.wait(&mut state);
                    }
                    DefinitionState::Pending(_) => {
                        let taken = mem::replace(
                            &mut *state,
                            DefinitionState::Resolving(thread::current().id()),
                        );
                        match taken {
                            DefinitionState::Pending(pending) => break pending,
                            _ => unreachable!("state was pending"),
                        }
                    }
                }
            }
        };

        tracing::trace!(
            target: targets::DEFINABLE,
            type_name = base.type_name,
            "resolving deferred definition"
        );

        let guard = ResolveGuard { base };
        let dictionary = Self::dictionary().effective();
        let scope = DefinitionScope::new(self, &dictionary);
        let result = pending.run(&scope);
        drop(guard);
        result
    }

    /// Resolve the pending definition, then snapshot the metadata bag.
    ///
    /// Returns an empty bag when no strategy ever materialized one.
    fn metadata(&self) -> DefineResult<Metadata> {
        self.ensure_defined()?;
        Ok(self.define_base().metadata_snapshot())
    }
}

impl<T: Definable> DefinableExt for T {}

/// Builder for a deferred definition.
///
/// Records keyword entries (in insertion order) and at most one block, then
/// either constructs a fresh instance ([`build`](Self::build)) or attaches
/// to an existing one ([`attach_to`](Self::attach_to)). Nothing is evaluated
/// until the instance's configured state is first observed.
pub struct Definition<T> {
    keywords: Vec<(String, DefineValue)>,
    block: Option<DefineBlock<T>>,
}

impl<T: Definable> Definition<T> {
    /// Start an empty definition.
    pub fn new() -> Self {
        Self {
            keywords: Vec::new(),
            block: None,
        }
    }

    /// Record a keyword entry.
    ///
    /// Entries are applied before the block, in the order they were given.
    pub fn set<V: Any + Send + Sync>(mut self, key: impl Into<String>, value: V) -> Self {
        self.keywords.push((key.into(), DefineValue::new(value)));
        self
    }

    /// Record the definition block, applied after all keyword entries.
    ///
    /// A later call replaces an earlier block.
    pub fn block<F>(mut self, block: F) -> Self
    where
        F: FnOnce(&DefinitionScope<'_, T>) -> DefineResult<()> + Send + 'static,
    {
        self.block = Some(Box::new(block));
        self
    }

    /// Construct a new instance carrying this definition, unevaluated.
    ///
    /// # Errors
    ///
    /// [`DefineError::AlreadyDefined`] only if `T::default()` itself attaches
    /// a definition, which a conventional `Default` impl never does.
    pub fn build(self) -> DefineResult<T>
    where
        T: Default,
    {
        let instance = T::default();
        instance.define_base().attach(self.into_pending())?;
        Ok(instance)
    }

    /// Attach this definition to an existing instance, unevaluated.
    ///
    /// # Errors
    ///
    /// [`DefineError::AlreadyDefined`] if the instance has ever been given a
    /// definition (pending or already resolved); the first definition is
    /// left untouched.
    pub fn attach_to(self, target: &T) -> DefineResult<()> {
        target.define_base().attach(self.into_pending())
    }

    fn into_pending(self) -> PendingDefinition<T> {
        PendingDefinition {
            keywords: self.keywords,
            block: self.block,
        }
    }
}

impl<T: Definable> Default for Definition<T> {
    fn default() -> Self {
        Self::new()
    }
}
