use crate::{
    DefaultProvider, InjectError, InjectResult, InterfaceFor, ResolutionContext,
    Resolvable, Resolved, Service, Supplier, Svc, TypeDescriptor,
};
use std::{
    collections::HashMap,
    fmt::{Debug, Formatter},
};

type FactoryFn = Svc<
    dyn Fn(&DefaultProvider, &ResolutionContext) -> InjectResult<Resolved>
        + Send
        + Sync,
>;
type AliasFn = Svc<dyn Fn(Resolved) -> InjectResult<Resolved> + Send + Sync>;

/// An explicit override for how a type is resolved.
#[derive(Clone)]
pub(crate) enum Binding {
    Constant(Resolved),
    Alias {
        target: TypeDescriptor,
        convert: AliasFn,
    },
    Factory(FactoryFn),
}

impl Binding {
    /// Creates the supplier delegating to this binding.
    pub fn supplier(&self) -> Supplier {
        match self.clone() {
            Binding::Constant(value) => {
                Supplier::new(move |_: &DefaultProvider, _: &ResolutionContext| {
                    Ok(value.clone())
                })
            }
            Binding::Alias { target, convert } => Supplier::new(
                move |provider: &DefaultProvider, context: &ResolutionContext| {
                    convert(provider.get_with(target, context)?)
                },
            ),
            Binding::Factory(factory) => Supplier::new(
                move |provider: &DefaultProvider, context: &ResolutionContext| {
                    factory(provider, context)
                },
            ),
        }
    }
}

impl Debug for Binding {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Binding::Constant(value) => f
                .debug_tuple("Constant")
                .field(&value.is_some())
                .finish(),
            Binding::Alias { target, .. } => {
                f.debug_struct("Alias").field("target", target).finish()
            }
            Binding::Factory(_) => f.write_str("Factory(..)"),
        }
    }
}

/// An immutable table of explicit overrides, consulted before any other
/// strategy when resolving a type.
///
/// ## Example
///
/// ```
/// use runtime_defaults::{Bindings, DefaultProvider, Svc};
///
/// let mut first = Bindings::builder();
/// first.bind(Svc::new(1u8));
///
/// let mut second = Bindings::builder();
/// second.bind(Svc::new(2u8));
///
/// let bindings = first.build().merged(second.build());
/// let provider = DefaultProvider::builder().bindings(bindings).build();
/// let value: Svc<u8> = provider.get().unwrap().unwrap();
/// assert_eq!(2, *value);
/// ```
#[derive(Clone, Debug, Default)]
pub struct Bindings {
    bindings: HashMap<TypeDescriptor, Binding>,
}

impl Bindings {
    /// Creates a new builder for a binding table.
    #[must_use]
    pub fn builder() -> BindingsBuilder {
        BindingsBuilder::default()
    }

    /// Creates a table without bindings.
    #[must_use]
    pub fn empty() -> Self {
        Bindings::default()
    }

    /// Creates a new table holding the bindings of both tables. Bindings
    /// from `other` replace bindings for the same type in `self`.
    #[must_use]
    pub fn merged(self, other: Bindings) -> Self {
        let mut builder = BindingsBuilder { bindings: self.bindings };
        builder.merge(other);
        builder.build()
    }

    /// Whether the type has a binding.
    #[must_use]
    pub fn contains(&self, descriptor: TypeDescriptor) -> bool {
        self.bindings.contains_key(&descriptor)
    }

    /// Gets the number of bound types.
    #[must_use]
    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    /// Whether no types are bound.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    pub(crate) fn get(&self, descriptor: TypeDescriptor) -> Option<&Binding> {
        self.bindings.get(&descriptor)
    }
}

/// A builder for [`Bindings`]. Binding a type again replaces its earlier
/// binding.
#[derive(Default)]
pub struct BindingsBuilder {
    bindings: HashMap<TypeDescriptor, Binding>,
}

impl BindingsBuilder {
    /// Binds a type to a constant value.
    pub fn bind<T: ?Sized + Resolvable>(&mut self, value: Svc<T>) -> &mut Self {
        self.insert::<T>(Binding::Constant(Some(T::into_dyn(value))))
    }

    /// Binds a type to null.
    pub fn bind_null<T: ?Sized + Resolvable>(&mut self) -> &mut Self {
        self.insert::<T>(Binding::Constant(None))
    }

    /// Binds a type to another type. Requests for `T` resolve `U` instead
    /// and convert the value into a `T`.
    pub fn bind_alias<T, U>(&mut self) -> &mut Self
    where
        T: ?Sized + InterfaceFor<U>,
        U: Service,
    {
        let convert: AliasFn = Svc::new(|value: Resolved| {
            value
                .map(|value| {
                    U::from_dyn(value)
                        .map(|value| T::into_dyn(<T as InterfaceFor<U>>::from_svc(value)))
                        .ok_or(InjectError::InvalidProvider {
                            descriptor: TypeDescriptor::of::<U>(),
                        })
                })
                .transpose()
        });
        self.insert::<T>(Binding::Alias {
            target: TypeDescriptor::of::<U>(),
            convert,
        })
    }

    /// Binds a type to a factory. The factory is called each time the type
    /// is requested, with the provider and context handling the request.
    /// Nested values should be requested with
    /// [`DefaultProvider::get_in`] and the given context so cycles through
    /// the factory are detected.
    pub fn bind_factory<T, F>(&mut self, factory: F) -> &mut Self
    where
        T: ?Sized + Resolvable,
        F: Fn(&DefaultProvider, &ResolutionContext) -> InjectResult<Option<Svc<T>>>
            + Send
            + Sync
            + 'static,
    {
        let factory: FactoryFn = Svc::new(
            move |provider: &DefaultProvider, context: &ResolutionContext| {
                factory(provider, context).map(|value| value.map(T::into_dyn))
            },
        );
        self.insert::<T>(Binding::Factory(factory))
    }

    /// Adds every binding from another table, replacing bindings for the
    /// same types.
    pub fn merge(&mut self, other: Bindings) -> &mut Self {
        self.bindings.extend(other.bindings);
        self
    }

    /// Builds the binding table.
    #[must_use]
    pub fn build(self) -> Bindings {
        Bindings {
            bindings: self.bindings,
        }
    }

    fn insert<T: ?Sized + Resolvable>(&mut self, binding: Binding) -> &mut Self {
        self.bindings.insert(TypeDescriptor::of::<T>(), binding);
        self
    }
}
