use crate::{
    provider::ProviderParts, Bindings, DefaultProvider, FailureHandler, Finder,
    InjectResult, ResolutionContext, Resolved, Svc, TypeDescriptor,
    TypeRegistry,
};

/// A builder for a [`DefaultProvider`].
pub struct ProviderBuilder {
    parts: ProviderParts,
}

impl ProviderBuilder {
    pub(crate) fn from_parts(parts: ProviderParts) -> Self {
        ProviderBuilder { parts }
    }

    /// Sets the registry describing the types the provider can introspect.
    #[must_use]
    pub fn registry(mut self, registry: TypeRegistry) -> Self {
        self.parts.registry = Svc::new(registry);
        self
    }

    /// Sets the provider that nested values are resolved through.
    #[must_use]
    pub fn parent(mut self, parent: DefaultProvider) -> Self {
        self.parts.parent = Some(parent);
        self
    }

    /// Adds a finder. Finders run in the order they were added.
    #[must_use]
    pub fn finder(mut self, finder: impl Finder) -> Self {
        self.parts.finders.push(Svc::new(finder));
        self
    }

    /// Adds several finders.
    #[must_use]
    pub fn finders<I>(mut self, finders: I) -> Self
    where
        I: IntoIterator<Item = Svc<dyn Finder>>,
    {
        self.parts.finders.extend(finders);
        self
    }

    pub(crate) fn clear_finders(mut self) -> Self {
        self.parts.finders.clear();
        self
    }

    /// Sets the binding table.
    #[must_use]
    pub fn bindings(mut self, bindings: Bindings) -> Self {
        self.parts.bindings = Svc::new(bindings);
        self
    }

    /// Sets the function called when no strategy applies to a type.
    #[must_use]
    pub fn failure_handler<F>(mut self, handler: F) -> Self
    where
        F: Fn(&DefaultProvider, TypeDescriptor, &ResolutionContext) -> InjectResult<Resolved>
            + Send
            + Sync
            + 'static,
    {
        let handler: FailureHandler = Svc::new(handler);
        self.parts.failure_handler = Some(handler);
        self
    }

    /// Builds the provider.
    #[must_use]
    pub fn build(self) -> DefaultProvider {
        DefaultProvider::from_parts(self.parts)
    }
}

impl Default for ProviderBuilder {
    fn default() -> Self {
        ProviderBuilder::from_parts(ProviderParts {
            registry: Svc::new(TypeRegistry::new()),
            bindings: Svc::new(Bindings::empty()),
            finders: Vec::new(),
            parent: None,
            failure_handler: None,
        })
    }
}
