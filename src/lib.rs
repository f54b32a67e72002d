//! Runtime default value resolution.
//!
//! A [`DefaultProvider`] produces a usable value of a type without the caller
//! passing any construction arguments. Types are described to the provider
//! through a [`TypeRegistry`], which lists their constructors, fields,
//! methods, supertypes and markers. The provider then picks a strategy for
//! each requested type, caches that choice, and runs it each time a value is
//! requested.
//!
//! # Strategies
//!
//! For each type, the first of these that applies is used:
//!
//! 1. An explicit binding from the provider's [`Bindings`].
//! 2. The provider itself, when a [`DefaultProvider`] is requested.
//! 3. The finder chain. The built-in marker finders run first, then the
//!    finders given to the provider, then the built-in convention finders
//!    (fields, factory methods, the null marker, and constructors). See
//!    [`Finder`].
//! 4. The provider itself, when a `dyn ProvideDefaults` is requested.
//! 5. The zero value of a primitive type.
//! 6. A new, empty container like [`String`] or [`Vec<String>`].
//! 7. The provider's failure handler, if it has one. Otherwise abstract
//!    types are an error and every other type resolves to null.
//!
//! # Cycles
//!
//! A type whose construction requires a value of itself can't be resolved
//! and fails with [`InjectError::CyclicDependency`]. Parameters that are
//! [lazy](Parameter::lazy), [optional](Parameter::optional), or
//! [nullable](Parameter::nullable) don't fail in that case, since they either
//! defer the request or allow the value to be absent.
//!
//! # Example
//!
//! ```
//! use runtime_defaults::{
//!     interface, Constructor, DefaultProvider, Parameter, Service,
//!     Svc, TypeMetadata, TypeRegistry,
//! };
//!
//! trait Greeter: Service {
//!     fn greet(&self, name: &str) -> String;
//! }
//!
//! interface!(Greeter);
//!
//! struct Polite {
//!     punctuation: String,
//! }
//!
//! impl Greeter for Polite {
//!     fn greet(&self, name: &str) -> String {
//!         format!("Good day, {}{}", name, self.punctuation)
//!     }
//! }
//!
//! struct Front {
//!     greeter: Svc<dyn Greeter>,
//! }
//!
//! let mut registry = TypeRegistry::new();
//! registry
//!     .register(
//!         TypeMetadata::interface::<dyn Greeter>().implemented_by::<Polite>(),
//!     )
//!     .register(
//!         TypeMetadata::concrete::<Polite>()
//!             .implements::<dyn Greeter>()
//!             .constructor(
//!                 Constructor::new(|args| {
//!                     let punctuation: Option<Svc<String>> = args.value(0)?;
//!                     Ok(Polite {
//!                         punctuation: punctuation
//!                             .map(|p| (*p).clone())
//!                             .unwrap_or_default(),
//!                     })
//!                 })
//!                 .param(Parameter::of::<String>()),
//!             ),
//!     )
//!     .register(
//!         TypeMetadata::concrete::<Front>().constructor(
//!             Constructor::new(|args| {
//!                 Ok(Front {
//!                     greeter: args.value(0)?.ok_or("no greeter")?,
//!                 })
//!             })
//!             .param(Parameter::of::<dyn Greeter>()),
//!         ),
//!     );
//!
//! let provider = DefaultProvider::builder().registry(registry).build();
//! let front: Svc<Front> = provider.get().unwrap().unwrap();
//! assert_eq!("Good day, there", front.greeter.greet("there"));
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![allow(
    clippy::module_name_repetitions,
    clippy::missing_errors_doc,
    clippy::needless_pass_by_value
)]

mod bindings;
mod builder;
mod context;
mod defaults;
mod discovery;
mod finders;
mod interface;
pub mod markers;
mod metadata;
mod parameters;
mod provider;
mod service;
mod supplier;

pub use bindings::{Bindings, BindingsBuilder};
pub use builder::*;
pub use context::*;
pub use discovery::*;
pub use finders::*;
pub use interface::*;
pub use metadata::*;
pub use parameters::{Arguments, Lazy};
pub use provider::{DefaultProvider, FailureHandler};
pub use service::*;
pub use supplier::Supplier;

pub(crate) use metadata::Held;

#[cfg(test)]
mod tests;
