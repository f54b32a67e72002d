use crate::{
    defaults,
    finders::{AFTER, BEFORE},
    supplier::SupplierCache,
    Bindings, DynSvc, Finder, InjectError, InjectResult, ProvideDefaults,
    ProviderBuilder, ResolutionContext, Resolvable, Resolved, Supplier, Svc,
    TypeDescriptor, TypeRegistry,
};
use std::fmt::{Debug, Formatter};
use tracing::{debug, trace};

/// Called when no strategy can supply a default value for a type.
pub type FailureHandler = Svc<
    dyn Fn(&DefaultProvider, TypeDescriptor, &ResolutionContext) -> InjectResult<Resolved>
        + Send
        + Sync,
>;

pub(crate) struct ProviderParts {
    pub registry: Svc<TypeRegistry>,
    pub bindings: Svc<Bindings>,
    pub finders: Vec<Svc<dyn Finder>>,
    pub parent: Option<DefaultProvider>,
    pub failure_handler: Option<FailureHandler>,
}

struct ProviderInner {
    parts: ProviderParts,
    cache: SupplierCache,
}

/// Resolves default values for types. Providers never change after they are
/// built. Operations like [`DefaultProvider::with_bindings`] create a new
/// provider instead.
///
/// The strategy chosen for each type is cached, so later requests for the
/// same type skip choosing a strategy. The values themselves are not cached
/// unless the strategy returns the same value each time. Cloning a provider
/// is cheap, and clones share the same cache.
///
/// ## Example
///
/// ```
/// use runtime_defaults::{
///     Constructor, DefaultProvider, Parameter, Svc, TypeMetadata,
///     TypeRegistry,
/// };
///
/// #[derive(Debug)]
/// struct Retry {
///     attempts: u32,
///     label: String,
/// }
///
/// let mut registry = TypeRegistry::new();
/// registry.register(
///     TypeMetadata::concrete::<Retry>().constructor(
///         Constructor::new(|args| {
///             Ok(Retry {
///                 attempts: args.value::<u32>(0)?.map_or(0, |v| *v),
///                 label: args.value::<String>(1)?.map(|v| (*v).clone()).unwrap_or_default(),
///             })
///         })
///         .param(Parameter::of::<u32>())
///         .param(Parameter::of::<String>()),
///     ),
/// );
///
/// let provider = DefaultProvider::builder().registry(registry).build();
/// let retry: Svc<Retry> = provider.get().unwrap().unwrap();
/// assert_eq!(0, retry.attempts);
/// assert_eq!("", retry.label);
/// ```
#[derive(Clone)]
pub struct DefaultProvider {
    inner: Svc<ProviderInner>,
}

impl DefaultProvider {
    /// Creates a builder for a provider.
    #[must_use]
    pub fn builder() -> ProviderBuilder {
        ProviderBuilder::default()
    }

    pub(crate) fn from_parts(parts: ProviderParts) -> Self {
        DefaultProvider {
            inner: Svc::new(ProviderInner {
                parts,
                cache: SupplierCache::default(),
            }),
        }
    }

    fn to_builder(&self) -> ProviderBuilder {
        let parts = &self.inner.parts;
        ProviderBuilder::from_parts(ProviderParts {
            registry: parts.registry.clone(),
            bindings: parts.bindings.clone(),
            finders: parts.finders.clone(),
            parent: parts.parent.clone(),
            failure_handler: parts.failure_handler.clone(),
        })
    }

    /// Gets a default value of a type. Returns `None` if the type resolves to
    /// null.
    pub fn get<T: ?Sized + Resolvable>(&self) -> InjectResult<Option<Svc<T>>> {
        self.get_in(&ResolutionContext::new())
    }

    /// Gets a default value of a type as part of an ongoing request. This is
    /// the typed form of [`DefaultProvider::get_with`].
    pub fn get_in<T: ?Sized + Resolvable>(
        &self,
        context: &ResolutionContext,
    ) -> InjectResult<Option<Svc<T>>> {
        let descriptor = TypeDescriptor::of::<T>();
        self.get_with(descriptor, context)?
            .map(|value| {
                T::from_dyn(value).ok_or(InjectError::InvalidProvider { descriptor })
            })
            .transpose()
    }

    /// Gets a default value of a type without knowing the type statically.
    pub fn get_dyn(&self, descriptor: TypeDescriptor) -> InjectResult<Resolved> {
        self.get_with(descriptor, &ResolutionContext::new())
    }

    /// Gets a default value of a type as part of an ongoing request. Finders
    /// and factories resolving nested values should call this with the
    /// context they were given so cycles can be detected.
    pub fn get_with(
        &self,
        descriptor: TypeDescriptor,
        context: &ResolutionContext,
    ) -> InjectResult<Resolved> {
        if let Some(cycle) = context.cycle(descriptor) {
            return Err(InjectError::CyclicDependency { descriptor, cycle });
        }

        let context = context.with_request(descriptor);
        trace!(
            service = descriptor.name(),
            depth = context.service_path().len(),
            "resolving default value"
        );

        let supplier = match self.inner.cache.get(descriptor) {
            Some(supplier) => supplier,
            None => {
                let supplier = self.new_supplier_for(descriptor)?;
                self.inner.cache.insert(descriptor, supplier)
            }
        };

        supplier.supply(self, &context)
    }

    /// Gets a default value of a type. Returns `None` if the type resolves to
    /// null or can't be resolved.
    #[must_use]
    pub fn optional<T: ?Sized + Resolvable>(&self) -> Option<Svc<T>> {
        self.get::<T>().unwrap_or_else(|error| {
            debug!(
                service = std::any::type_name::<T>(),
                %error,
                "optional default value is unavailable"
            );
            None
        })
    }

    /// Gets a default value of a type without knowing the type statically.
    /// Returns `None` if the type resolves to null or can't be resolved.
    #[must_use]
    pub fn optional_dyn(&self, descriptor: TypeDescriptor) -> Resolved {
        self.get_dyn(descriptor).unwrap_or_else(|error| {
            debug!(
                service = descriptor.name(),
                %error,
                "optional default value is unavailable"
            );
            None
        })
    }

    /// Creates a new provider which resolves nested values through `parent`.
    #[must_use]
    pub fn with_parent(&self, parent: DefaultProvider) -> Self {
        self.to_builder().parent(parent).build()
    }

    /// Creates a new provider with a different list of finders. The finders
    /// run after the built-in marker finders and before the built-in
    /// convention finders.
    #[must_use]
    pub fn with_finders<I>(&self, finders: I) -> Self
    where
        I: IntoIterator<Item = Svc<dyn Finder>>,
    {
        self.to_builder().clear_finders().finders(finders).build()
    }

    /// Creates a new provider with a different binding table.
    #[must_use]
    pub fn with_bindings(&self, bindings: Bindings) -> Self {
        self.to_builder().bindings(bindings).build()
    }

    /// Creates a new provider with a different failure handler.
    #[must_use]
    pub fn with_failure_handler<F>(&self, handler: F) -> Self
    where
        F: Fn(&DefaultProvider, TypeDescriptor, &ResolutionContext) -> InjectResult<Resolved>
            + Send
            + Sync
            + 'static,
    {
        self.to_builder().failure_handler(handler).build()
    }

    /// Creates a new provider with a different type registry.
    #[must_use]
    pub fn with_registry(&self, registry: TypeRegistry) -> Self {
        self.to_builder().registry(registry).build()
    }

    /// Gets the registry describing the types this provider can introspect.
    #[must_use]
    pub fn registry(&self) -> &TypeRegistry {
        &self.inner.parts.registry
    }

    /// Gets the explicit bindings of this provider.
    #[must_use]
    pub fn bindings(&self) -> &Bindings {
        &self.inner.parts.bindings
    }

    /// Gets the provider nested values are resolved through, if any.
    #[must_use]
    pub fn parent(&self) -> Option<&DefaultProvider> {
        self.inner.parts.parent.as_ref()
    }

    fn lookup_provider(&self) -> &DefaultProvider {
        self.parent().unwrap_or(self)
    }

    fn finders(&self) -> Vec<&dyn Finder> {
        let custom = &self.inner.parts.finders;
        let mut finders: Vec<&dyn Finder> =
            Vec::with_capacity(BEFORE.len() + custom.len() + AFTER.len());
        finders.extend_from_slice(BEFORE);
        finders.extend(custom.iter().map(|finder| finder.as_ref()));
        finders.extend_from_slice(AFTER);
        finders
    }

    fn new_supplier_for(&self, descriptor: TypeDescriptor) -> InjectResult<Supplier> {
        if let Some(binding) = self.bindings().get(descriptor) {
            debug!(service = descriptor.name(), ?binding, "using explicit binding");
            return Ok(binding.supplier());
        }

        if descriptor == TypeDescriptor::of::<DefaultProvider>() {
            return Ok(Supplier::new(
                |provider: &DefaultProvider, _: &ResolutionContext| {
                    Ok(Some(Svc::new(provider.clone()) as DynSvc))
                },
            ));
        }

        let lookup = self.lookup_provider();
        for finder in self.finders() {
            if let Some(supplier) = finder.find(descriptor, lookup)? {
                debug!(
                    service = descriptor.name(),
                    finder = finder.name(),
                    "finder chose a supplier"
                );
                return Ok(match self.parent() {
                    Some(parent) => {
                        let parent = parent.clone();
                        Supplier::new(
                            move |_: &DefaultProvider, context: &ResolutionContext| {
                                supplier.supply(&parent, context)
                            },
                        )
                    }
                    None => supplier,
                });
            }
        }

        if descriptor == TypeDescriptor::of::<dyn ProvideDefaults>() {
            return Ok(Supplier::new(
                |provider: &DefaultProvider, _: &ResolutionContext| {
                    let provider: Svc<dyn ProvideDefaults> = Svc::new(provider.clone());
                    Ok(Some(<dyn ProvideDefaults as Resolvable>::into_dyn(provider)))
                },
            ));
        }

        if let Some(value) = defaults::zero_value(descriptor) {
            return Ok(Supplier::constant(value));
        }

        if let Some(create) = defaults::empty_value(descriptor) {
            return Ok(Supplier::new(
                move |_: &DefaultProvider, _: &ResolutionContext| Ok(Some(create())),
            ));
        }

        let metadata = lookup.registry().get(descriptor).cloned();
        if let Some(metadata) = metadata.clone().filter(|metadata| metadata.has_empty()) {
            return Ok(Supplier::new(
                move |_: &DefaultProvider, _: &ResolutionContext| {
                    Ok(metadata.empty_instance())
                },
            ));
        }

        if let Some(handler) = &self.inner.parts.failure_handler {
            let handler = handler.clone();
            return Ok(Supplier::new(
                move |provider: &DefaultProvider, context: &ResolutionContext| {
                    handler(provider, descriptor, context)
                },
            ));
        }

        if metadata.map_or(false, |metadata| metadata.kind().is_abstract()) {
            return Ok(Supplier::new(
                move |_: &DefaultProvider, _: &ResolutionContext| {
                    Err(InjectError::AbstractClassCreation { descriptor })
                },
            ));
        }

        debug!(service = descriptor.name(), "no strategy applies, using null");
        Ok(Supplier::null())
    }
}

impl Debug for DefaultProvider {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let parts = &self.inner.parts;
        f.debug_struct("DefaultProvider")
            .field("registry", &parts.registry.len())
            .field("bindings", &parts.bindings.len())
            .field(
                "finders",
                &parts
                    .finders
                    .iter()
                    .map(|finder| finder.name())
                    .collect::<Vec<_>>(),
            )
            .field("parent", &parts.parent)
            .field("cache", &self.inner.cache)
            .finish_non_exhaustive()
    }
}
