use crate::{DefaultProvider, InjectResult, Supplier, TypeDescriptor};

mod constructor;
mod enumeration;
mod field;
mod implementation;
mod interface;
mod method;
mod null;

pub use constructor::*;
pub use enumeration::*;
pub use field::*;
pub use implementation::*;
pub use interface::*;
pub use method::*;
pub use null::*;

/// A strategy for choosing how default values of a type are supplied.
///
/// Finders are consulted in order until one of them returns a supplier. The
/// provider runs a fixed group of finders for declarative markers first, then
/// the finders it was built with, then a fixed group of convention-based
/// finders.
///
/// ## Example
///
/// ```
/// use runtime_defaults::{
///     DefaultProvider, Finder, InjectResult, Supplier, Svc, TypeDescriptor,
/// };
///
/// struct Answer;
///
/// impl Finder for Answer {
///     fn find(
///         &self,
///         descriptor: TypeDescriptor,
///         _provider: &DefaultProvider,
///     ) -> InjectResult<Option<Supplier>> {
///         if descriptor == TypeDescriptor::of::<u32>() {
///             Ok(Some(Supplier::constant(Svc::new(42u32))))
///         } else {
///             Ok(None)
///         }
///     }
/// }
///
/// let provider = DefaultProvider::builder().finder(Answer).build();
/// let answer: Svc<u32> = provider.get().unwrap().unwrap();
/// assert_eq!(42, *answer);
/// ```
pub trait Finder: Send + Sync + 'static {
    /// Chooses a supplier for the type. Returns `Ok(None)` if this finder
    /// doesn't apply to the type. Errors stop the search.
    fn find(
        &self,
        descriptor: TypeDescriptor,
        provider: &DefaultProvider,
    ) -> InjectResult<Option<Supplier>>;

    /// Gets a name for this finder, used when logging.
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }
}

pub(crate) const BEFORE: &[&dyn Finder] = &[
    &ImplementationMarkerFinder,
    &InterfaceBindingFinder,
    &EnumDefaultFinder,
    &DefaultInterfaceFinder,
];

pub(crate) const AFTER: &[&dyn Finder] = &[
    &SingletonFieldFinder,
    &FactoryMethodFinder,
    &NullMarkerFinder,
    &ConstructorFinder,
];
