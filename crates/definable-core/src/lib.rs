//! Deferred, declarative object definition.
//!
//! This crate provides the machinery that lets a type declare a fixed
//! vocabulary of "definition keys" and lets instances be built from those
//! keys without evaluating anything up front:
//!
//! - **Dictionaries**: per-type registries mapping key names to assignment
//!   strategies, merged across an explicit ancestor chain
//! - **Strategies**: pluggable "apply this value to that target" behaviors,
//!   from plain setters to metadata writes to arbitrary closures
//! - **Definitions**: builder-recorded keyword entries plus an optional
//!   block, attached to an instance and consumed lazily, exactly once
//! - **Scopes**: the narrow call-forwarding surface a definition block sees
//! - **Metadata**: an arbitrary key-value bag for vocabulary added by third
//!   parties
//!
//! The goals, inherited from the systems this pattern comes from:
//!
//! - Minimal overhead in consuming types: one embedded [`DefineBase`] field
//!   and a [`Definable`] impl
//! - Independence between consuming types: each owns its dictionary
//! - Extendable from outside: any feature can register new keys on a type's
//!   dictionary, or route values into the metadata bag, without touching the
//!   type's source
//!
//! # Example
//!
//! ```
//! use std::sync::{Arc, OnceLock};
//! use definable_core::{Definable, DefinableExt, DefineBase, DefineResult, TypeDictionary};
//! use parking_lot::{Mutex, RwLock};
//!
//! struct Door;
//!
//! #[derive(Default)]
//! struct Car {
//!     base: DefineBase<Car>,
//!     make: RwLock<String>,
//!     model: RwLock<String>,
//!     doors: Mutex<Vec<Door>>,
//! }
//!
//! impl Car {
//!     fn make(&self) -> DefineResult<String> {
//!         self.ensure_defined()?;
//!         Ok(self.make.read().clone())
//!     }
//!
//!     fn door_count(&self) -> DefineResult<usize> {
//!         self.ensure_defined()?;
//!         Ok(self.doors.lock().len())
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
//!                 // Plain setters take the value as-is.
//!                 dict.register_attribute("make", |car: &Car, v: String| *car.make.write() = v);
//!                 dict.register_attribute("model", |car: &Car, v: String| *car.model.write() = v);
//!                 // A custom strategy applies the value however it likes.
//!                 dict.register_with("doors", |car: &Car, value| {
//!                     let count = value.downcast_for::<usize>("doors")?;
//!                     let mut doors = car.doors.lock();
//!                     for _ in 0..count {
//!                         doors.push(Door);
//!                     }
//!                     Ok(())
//!                 });
//!                 Arc::new(dict)
//!             })
//!             .clone()
//!     }
//! }
//!
//! let car = Car::define()
//!     .set("make", "Subaru".to_string())
//!     .block(|d| {
//!         d.set("model", "Baja".to_string())?;
//!         d.set("doors", 4usize)
//!     })
//!     .build()?;
//!
//! // Nothing has been applied yet; the first read resolves the definition.
//! assert_eq!(car.make()?, "Subaru");
//! assert_eq!(car.door_count()?, 4);
//! # Ok::<(), definable_core::DefineError>(())
//! ```
//!
//! # Extending a vocabulary from outside
//!
//! ```
//! # use std::sync::{Arc, OnceLock};
//! # use definable_core::{Definable, DefinableExt, DefineBase, TypeDictionary};
//! # #[derive(Default)]
//! # struct Car { base: DefineBase<Car> }
//! # static CAR_DICTIONARY: OnceLock<Arc<TypeDictionary<Car>>> = OnceLock::new();
//! # impl Definable for Car {
//! #     fn define_base(&self) -> &DefineBase<Self> { &self.base }
//! #     fn dictionary() -> Arc<TypeDictionary<Self>> {
//! #         CAR_DICTIONARY.get_or_init(|| Arc::new(TypeDictionary::new("Car"))).clone()
//! #     }
//! # }
//! // A third party adds a key without touching Car's source:
//! Car::dictionary().register_metadata_key("all_wheel_drive");
//!
//! let car = Car::define()
//!     .block(|d| d.set("all_wheel_drive", true))
//!     .build()?;
//! assert_eq!(car.metadata()?.get::<bool>("all_wheel_drive"), Some(&true));
//! # Ok::<(), definable_core::DefineError>(())
//! ```

pub mod arguments;
pub mod definable;
pub mod dictionary;
mod error;
pub mod logging;
pub mod metadata;
pub mod scope;
pub mod strategy;
pub mod value;

pub use definable::{Definable, DefinableExt, DefineBase, DefineBlock, Definition};
pub use dictionary::{Dictionary, TypeDictionary};
pub use error::{DefineError, DefineResult};
pub use metadata::Metadata;
pub use scope::DefinitionScope;
pub use strategy::{assign_with, AssignAttribute, AssignMetadataKey, AssignStrategy};
pub use value::DefineValue;
