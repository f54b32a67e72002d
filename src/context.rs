use crate::TypeDescriptor;

/// The types currently being resolved by one call tree. A fresh context is
/// created for each root request, and each nested request gets a child
/// context with the requested type appended to its path. Dropping the child
/// context when the nested request returns is what removes the type from the
/// in-flight set, whether the request succeeded or not.
#[derive(Clone, Debug, Default)]
pub struct ResolutionContext {
    service_path: Vec<TypeDescriptor>,
}

impl ResolutionContext {
    /// Creates a new, empty context for a root request.
    #[must_use]
    pub fn new() -> Self {
        ResolutionContext::default()
    }

    /// Creates a new child context with the given type appended to the end of
    /// the request path.
    #[must_use]
    pub fn with_request(&self, descriptor: TypeDescriptor) -> Self {
        let mut child = self.clone();
        child.service_path.push(descriptor);
        child
    }

    /// Gets the current request path, starting at the root request.
    ///
    /// # Example
    ///
    /// ```
    /// use runtime_defaults::{ResolutionContext, TypeDescriptor};
    ///
    /// let context = ResolutionContext::new()
    ///     .with_request(TypeDescriptor::of::<String>())
    ///     .with_request(TypeDescriptor::of::<u8>());
    ///
    /// assert_eq!(
    ///     &[TypeDescriptor::of::<String>(), TypeDescriptor::of::<u8>()],
    ///     context.service_path()
    /// );
    /// ```
    #[must_use]
    pub fn service_path(&self) -> &[TypeDescriptor] {
        &self.service_path
    }

    /// Whether the type is in flight.
    #[must_use]
    pub fn is_resolving(&self, descriptor: TypeDescriptor) -> bool {
        self.service_path.contains(&descriptor)
    }

    /// Gets the cycle that requesting the type would close, from its first
    /// request through the repeated one. Returns `None` if the type isn't in
    /// flight.
    #[must_use]
    pub fn cycle(&self, descriptor: TypeDescriptor) -> Option<Vec<TypeDescriptor>> {
        let start = self
            .service_path
            .iter()
            .position(|&requested| requested == descriptor)?;
        let mut cycle = self.service_path[start..].to_vec();
        cycle.push(descriptor);
        Some(cycle)
    }
}
