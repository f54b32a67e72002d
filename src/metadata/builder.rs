use crate::{
    markers, Constructor, DynSvc, EnumMember, InterfaceFor, Marker, Markers,
    Method, MethodSignature, Resolvable, Service, StaticField, Svc,
    TypeDescriptor,
};
use std::{
    any::Any,
    borrow::Cow,
    fmt::{Debug, Formatter},
    marker::PhantomData,
};

/// Converts an erased value into an erased value of one of its supertypes.
/// Returns `None` if the value doesn't hold the expected type.
pub type Cast = Svc<dyn Fn(DynSvc) -> Option<DynSvc> + Send + Sync>;

pub(crate) type Synthesizer = Svc<dyn Fn() -> DynSvc + Send + Sync>;

/// The kind of a registered type.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum TypeKind {
    /// A type that can be constructed.
    Concrete,

    /// A type that can't be constructed directly.
    Abstract,

    /// A trait object type.
    Interface,

    /// A type with a fixed list of members.
    Enum,
}

impl TypeKind {
    /// Whether values of this kind can only be created through another type.
    #[must_use]
    pub fn is_abstract(self) -> bool {
        matches!(self, TypeKind::Abstract | TypeKind::Interface)
    }
}

/// A supertype of a registered type.
#[derive(Clone)]
pub struct Supertype {
    descriptor: TypeDescriptor,
    cast: Option<Cast>,
}

impl Supertype {
    /// Gets the supertype.
    #[must_use]
    pub fn descriptor(&self) -> TypeDescriptor {
        self.descriptor
    }

    /// Gets the conversion into the supertype, if one was registered.
    #[must_use]
    pub fn cast(&self) -> Option<&Cast> {
        self.cast.as_ref()
    }
}

impl Debug for Supertype {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Supertype")
            .field("descriptor", &self.descriptor)
            .field("has_cast", &self.cast.is_some())
            .finish()
    }
}

/// Everything the engine knows about a type.
#[derive(Clone)]
pub struct TypeMetadata {
    descriptor: TypeDescriptor,
    alias: Option<String>,
    kind: TypeKind,
    markers: Markers,
    supertypes: Vec<Supertype>,
    constructors: Vec<Constructor>,
    fields: Vec<StaticField>,
    methods: Vec<Method>,
    members: Vec<EnumMember>,
    signatures: Vec<MethodSignature>,
    synthesizer: Option<Synthesizer>,
    empty: Option<Synthesizer>,
}

impl TypeMetadata {
    fn of<T: ?Sized + Any>(kind: TypeKind) -> Self {
        TypeMetadata {
            descriptor: TypeDescriptor::of::<T>(),
            alias: None,
            kind,
            markers: Markers::new(),
            supertypes: Vec::new(),
            constructors: Vec::new(),
            fields: Vec::new(),
            methods: Vec::new(),
            members: Vec::new(),
            signatures: Vec::new(),
            synthesizer: None,
            empty: None,
        }
    }

    /// Starts describing a concrete type.
    #[must_use]
    pub fn concrete<T: Service>() -> MetadataBuilder<T> {
        MetadataBuilder::new(TypeKind::Concrete)
    }

    /// Starts describing an abstract type.
    #[must_use]
    pub fn abstract_type<T: ?Sized + Resolvable>() -> MetadataBuilder<T> {
        MetadataBuilder::new(TypeKind::Abstract)
    }

    /// Starts describing an interface (a `dyn Trait` type).
    #[must_use]
    pub fn interface<T: ?Sized + Resolvable>() -> MetadataBuilder<T> {
        MetadataBuilder::new(TypeKind::Interface)
    }

    /// Starts describing an enumerated type.
    #[must_use]
    pub fn enumeration<T: Service>() -> MetadataBuilder<T> {
        MetadataBuilder::new(TypeKind::Enum)
    }

    /// Gets the described type.
    #[must_use]
    pub fn descriptor(&self) -> TypeDescriptor {
        self.descriptor
    }

    /// Gets the additional name the type can be found by.
    #[must_use]
    pub fn alias(&self) -> Option<&str> {
        self.alias.as_deref()
    }

    /// Gets the kind of the type.
    #[must_use]
    pub fn kind(&self) -> TypeKind {
        self.kind
    }

    /// Gets the markers attached to the type.
    #[must_use]
    pub fn markers(&self) -> &Markers {
        &self.markers
    }

    /// Gets the direct supertypes of the type.
    #[must_use]
    pub fn supertypes(&self) -> &[Supertype] {
        &self.supertypes
    }

    /// Gets the constructors of the type.
    #[must_use]
    pub fn constructors(&self) -> &[Constructor] {
        &self.constructors
    }

    /// Gets the fields of the type.
    #[must_use]
    pub fn fields(&self) -> &[StaticField] {
        &self.fields
    }

    /// Gets the methods of the type.
    #[must_use]
    pub fn methods(&self) -> &[Method] {
        &self.methods
    }

    /// Gets the members of an enumerated type, in declaration order.
    #[must_use]
    pub fn members(&self) -> &[EnumMember] {
        &self.members
    }

    /// Gets the method signatures declared by an interface.
    #[must_use]
    pub fn signatures(&self) -> &[MethodSignature] {
        &self.signatures
    }

    pub(crate) fn synthesize(&self) -> Option<DynSvc> {
        self.synthesizer.as_ref().map(|synthesize| synthesize())
    }

    pub(crate) fn has_synthesizer(&self) -> bool {
        self.synthesizer.is_some()
    }

    pub(crate) fn has_empty(&self) -> bool {
        self.empty.is_some()
    }

    pub(crate) fn empty_instance(&self) -> Option<DynSvc> {
        self.empty.as_ref().map(|create| create())
    }
}

impl Debug for TypeMetadata {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TypeMetadata")
            .field("descriptor", &self.descriptor)
            .field("alias", &self.alias)
            .field("kind", &self.kind)
            .field("markers", &self.markers)
            .field("supertypes", &self.supertypes)
            .field("constructors", &self.constructors)
            .field("fields", &self.fields)
            .field("methods", &self.methods)
            .field("members", &self.members)
            .field("signatures", &self.signatures)
            .finish_non_exhaustive()
    }
}

/// A builder for [`TypeMetadata`], typed by the described type so values and
/// conversions can be checked at compile time.
///
/// ## Example
///
/// ```
/// use runtime_defaults::{
///     interface, markers, Constructor, Service, TypeMetadata, TypeRegistry,
/// };
///
/// trait Engine: Service {}
/// interface!(Engine);
///
/// #[derive(Default)]
/// struct Diesel;
/// impl Engine for Diesel {}
///
/// let mut registry = TypeRegistry::new();
/// registry.register(
///     TypeMetadata::interface::<dyn Engine>().implemented_by::<Diesel>(),
/// );
/// registry.register(
///     TypeMetadata::concrete::<Diesel>()
///         .implements::<dyn Engine>()
///         .constructor(Constructor::new(|_| Ok(Diesel))),
/// );
///
/// assert_eq!(2, registry.len());
/// ```
pub struct MetadataBuilder<T: ?Sized> {
    metadata: TypeMetadata,
    marker: PhantomData<fn() -> Svc<T>>,
}

impl<T: ?Sized + Resolvable> MetadataBuilder<T> {
    fn new(kind: TypeKind) -> Self {
        MetadataBuilder {
            metadata: TypeMetadata::of::<T>(kind),
            marker: PhantomData,
        }
    }

    /// Sets an additional name the type can be found by.
    #[must_use]
    pub fn named(mut self, alias: impl Into<String>) -> Self {
        self.metadata.alias = Some(alias.into());
        self
    }

    /// Attaches a marker to the type.
    #[must_use]
    pub fn marker(mut self, name: impl Into<Cow<'static, str>>) -> Self {
        self.metadata.markers.insert(Marker::new(name));
        self
    }

    /// Attaches a marker holding a value to the type.
    #[must_use]
    pub fn marker_value(
        mut self,
        name: impl Into<Cow<'static, str>>,
        value: impl Into<String>,
    ) -> Self {
        self.metadata.markers.insert(Marker::with_value(name, value));
        self
    }

    /// Marks `I` as the implementation to use for the type. The
    /// implementation is used only if it is registered and registered as a
    /// subtype of the type.
    #[must_use]
    pub fn implemented_by<I: ?Sized + Any>(self) -> Self {
        self.marker_value(markers::IMPLEMENTED_BY, std::any::type_name::<I>())
    }

    /// Binds the type to `I`. Resolving the type fails if `I` is not
    /// registered as a subtype of the type.
    #[must_use]
    pub fn bind_to<I: ?Sized + Any>(self) -> Self {
        self.marker_value(markers::BIND_TO, std::any::type_name::<I>())
    }

    /// Declares a supertype without a conversion. The supertype takes part
    /// in hierarchy walks, but values can't be converted into it.
    #[must_use]
    pub fn extends<S: ?Sized + Any>(mut self) -> Self {
        self.metadata.supertypes.push(Supertype {
            descriptor: TypeDescriptor::of::<S>(),
            cast: None,
        });
        self
    }

    /// Declares a supertype along with the conversion into it.
    #[must_use]
    pub fn extends_with<S, F>(mut self, cast: F) -> Self
    where
        S: ?Sized + Resolvable,
        F: Fn(Svc<T>) -> Svc<S> + Send + Sync + 'static,
    {
        let cast: Cast = Svc::new(move |value: DynSvc| {
            T::from_dyn(value).map(|value| S::into_dyn(cast(value)))
        });
        self.metadata.supertypes.push(Supertype {
            descriptor: TypeDescriptor::of::<S>(),
            cast: Some(cast),
        });
        self
    }

    /// Adds a field.
    #[must_use]
    pub fn static_field(mut self, field: StaticField) -> Self {
        self.metadata.fields.push(field);
        self
    }

    /// Adds a method.
    #[must_use]
    pub fn method(mut self, method: Method) -> Self {
        self.metadata.methods.push(method);
        self
    }

    /// Declares an interface method without a default body.
    #[must_use]
    pub fn abstract_method(mut self, signature: impl Into<String>) -> Self {
        self.metadata
            .signatures
            .push(MethodSignature::new(signature, false));
        self
    }

    /// Declares an interface method with a default body.
    #[must_use]
    pub fn default_method(mut self, signature: impl Into<String>) -> Self {
        self.metadata
            .signatures
            .push(MethodSignature::new(signature, true));
        self
    }

    /// Registers `S` as the trivial implementation used when the interface
    /// is synthesized. `S` should override none of the interface's methods.
    #[must_use]
    pub fn synthesized_by<S>(mut self) -> Self
    where
        S: Service + Default,
        T: InterfaceFor<S>,
    {
        self.metadata.synthesizer = Some(Svc::new(|| {
            T::into_dyn(<T as InterfaceFor<S>>::from_svc(Svc::new(S::default())))
        }));
        self
    }

    /// Finishes describing the type.
    #[must_use]
    pub fn build(self) -> TypeMetadata {
        self.metadata
    }
}

impl<T: Service> MetadataBuilder<T> {
    /// Declares that the type implements the interface `I`.
    #[must_use]
    pub fn implements<I: ?Sized + InterfaceFor<T>>(self) -> Self {
        self.extends_with::<I, _>(I::from_svc)
    }

    /// Adds a constructor.
    #[must_use]
    pub fn constructor(mut self, constructor: Constructor) -> Self {
        self.metadata.constructors.push(constructor);
        self
    }

    /// Adds a member of an enumerated type.
    #[must_use]
    pub fn member(mut self, name: &'static str, value: T) -> Self {
        self.metadata.members.push(EnumMember::new(name, value));
        self
    }

    /// Adds a member of an enumerated type marked
    /// [`DEFAULT`](markers::DEFAULT).
    #[must_use]
    pub fn default_member(mut self, name: &'static str, value: T) -> Self {
        let mut member = EnumMember::new(name, value);
        member.markers_mut().insert(Marker::new(markers::DEFAULT));
        self.metadata.members.push(member);
        self
    }

    /// Declares the type as a container that can be created empty.
    #[must_use]
    pub fn empty_with<F>(mut self, create: F) -> Self
    where
        F: Fn() -> T + Send + Sync + 'static,
    {
        self.metadata.empty =
            Some(Svc::new(move || Svc::new(create()) as DynSvc));
        self
    }
}

impl<T: ?Sized + Resolvable> From<MetadataBuilder<T>> for TypeMetadata {
    fn from(builder: MetadataBuilder<T>) -> Self {
        builder.build()
    }
}
