use crate::{
    markers, Arguments, BoxError, DynSvc, InjectError, Marker, Markers,
    Resolvable, Resolved, Service, Svc, TypeDescriptor,
};
use std::{
    borrow::Cow,
    fmt::{Debug, Formatter},
};

/// Accessibility of a member.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub enum Visibility {
    /// Usable by the engine.
    #[default]
    Public,

    /// Only usable for post-construct hooks.
    Private,
}

/// How a parameter, field, or return value holds its element type.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Shape {
    /// The element type itself.
    Plain,

    /// An absence box (`Option<Svc<T>>`).
    Optional,

    /// A deferred computation of the element type.
    Lazy,
}

pub(crate) type LazyValue =
    Svc<dyn Fn() -> Result<Resolved, BoxError> + Send + Sync>;

/// A value held by a static field or returned by a method, before it is
/// unwrapped into the element type.
#[derive(Clone)]
pub(crate) enum Held {
    Value(Resolved),
    Lazy(LazyValue),
}

impl Held {
    pub(crate) fn into_resolved(self) -> Result<Resolved, BoxError> {
        match self {
            Held::Value(value) => Ok(value),
            Held::Lazy(compute) => compute(),
        }
    }
}

fn erase<T: ?Sized + Resolvable>(value: Option<Svc<T>>) -> Resolved {
    value.map(T::into_dyn)
}

fn lazy_value<T, F>(compute: F) -> LazyValue
where
    T: ?Sized + Resolvable,
    F: Fn() -> Result<Option<Svc<T>>, BoxError> + Send + Sync + 'static,
{
    Svc::new(move || compute().map(erase))
}

/// A formal parameter of a constructor or a method.
#[derive(Clone, Debug)]
pub struct Parameter {
    descriptor: TypeDescriptor,
    shape: Shape,
    markers: Markers,
}

impl Parameter {
    fn with_shape<T: ?Sized + Resolvable>(shape: Shape) -> Self {
        Parameter {
            descriptor: TypeDescriptor::of::<T>(),
            shape,
            markers: Markers::new(),
        }
    }

    /// A plain parameter. Failing to resolve it fails the whole resolution.
    #[must_use]
    pub fn of<T: ?Sized + Resolvable>() -> Self {
        Self::with_shape::<T>(Shape::Plain)
    }

    /// An absence box parameter. Failing to resolve it produces an empty box.
    #[must_use]
    pub fn optional<T: ?Sized + Resolvable>() -> Self {
        Self::with_shape::<T>(Shape::Optional)
    }

    /// A lazily resolved parameter, read with
    /// [`Arguments::lazy`](crate::Arguments::lazy).
    #[must_use]
    pub fn lazy<T: ?Sized + Resolvable>() -> Self {
        Self::with_shape::<T>(Shape::Lazy)
    }

    /// A plain parameter marked [`NULLABLE`](markers::NULLABLE). Failing to
    /// resolve it produces null.
    #[must_use]
    pub fn nullable<T: ?Sized + Resolvable>() -> Self {
        Self::of::<T>().marker(markers::NULLABLE)
    }

    /// Attaches a marker to this parameter.
    #[must_use]
    pub fn marker(mut self, name: impl Into<Cow<'static, str>>) -> Self {
        self.markers.insert(Marker::new(name));
        self
    }

    /// Gets the element type of this parameter.
    #[must_use]
    pub fn descriptor(&self) -> TypeDescriptor {
        self.descriptor
    }

    /// Gets the shape of this parameter.
    #[must_use]
    pub fn shape(&self) -> Shape {
        self.shape
    }

    /// Gets the markers attached to this parameter.
    #[must_use]
    pub fn markers(&self) -> &Markers {
        &self.markers
    }
}

type ConstructorFn =
    Svc<dyn Fn(&Arguments) -> Result<DynSvc, BoxError> + Send + Sync>;

/// A constructor of a concrete type.
///
/// ## Example
///
/// ```
/// use runtime_defaults::{Constructor, Parameter, Svc};
///
/// struct Engine;
/// struct Car(Option<Svc<Engine>>);
///
/// let constructor = Constructor::new(|args| Ok(Car(args.value(0)?)))
///     .param(Parameter::of::<Engine>());
/// assert_eq!(1, constructor.parameters().len());
/// ```
#[derive(Clone)]
pub struct Constructor {
    visibility: Visibility,
    parameters: Vec<Parameter>,
    markers: Markers,
    invoke: ConstructorFn,
}

impl Constructor {
    /// Creates a public constructor without parameters. Parameters are added
    /// with [`Constructor::param`] and are passed to `invoke` in the same
    /// order.
    #[must_use]
    pub fn new<T, F>(invoke: F) -> Self
    where
        T: Service,
        F: Fn(&Arguments) -> Result<T, BoxError> + Send + Sync + 'static,
    {
        Constructor {
            visibility: Visibility::Public,
            parameters: Vec::new(),
            markers: Markers::new(),
            invoke: Svc::new(move |args: &Arguments| {
                invoke(args).map(|value| Svc::new(value) as DynSvc)
            }),
        }
    }

    /// Appends a parameter.
    #[must_use]
    pub fn param(mut self, parameter: Parameter) -> Self {
        self.parameters.push(parameter);
        self
    }

    /// Attaches a marker to this constructor.
    #[must_use]
    pub fn marker(mut self, name: impl Into<Cow<'static, str>>) -> Self {
        self.markers.insert(Marker::new(name));
        self
    }

    /// Hides this constructor from the engine.
    #[must_use]
    pub fn private(mut self) -> Self {
        self.visibility = Visibility::Private;
        self
    }

    /// Gets the visibility of this constructor.
    #[must_use]
    pub fn visibility(&self) -> Visibility {
        self.visibility
    }

    /// Gets the parameters of this constructor.
    #[must_use]
    pub fn parameters(&self) -> &[Parameter] {
        &self.parameters
    }

    /// Gets the markers attached to this constructor.
    #[must_use]
    pub fn markers(&self) -> &Markers {
        &self.markers
    }

    pub(crate) fn invoke(&self, args: &Arguments) -> Result<DynSvc, BoxError> {
        (self.invoke)(args)
    }
}

impl Debug for Constructor {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Constructor")
            .field("visibility", &self.visibility)
            .field("parameters", &self.parameters)
            .field("markers", &self.markers)
            .finish_non_exhaustive()
    }
}

/// A field holding a value of (or a wrapper around) some element type.
#[derive(Clone)]
pub struct StaticField {
    name: &'static str,
    element: TypeDescriptor,
    shape: Shape,
    visibility: Visibility,
    is_static: bool,
    is_final: bool,
    markers: Markers,
    value: Held,
}

impl StaticField {
    fn with_value(
        name: &'static str,
        element: TypeDescriptor,
        shape: Shape,
        value: Held,
    ) -> Self {
        StaticField {
            name,
            element,
            shape,
            visibility: Visibility::Public,
            is_static: true,
            is_final: true,
            markers: Markers::new(),
            value,
        }
    }

    /// A public, static, immutable field holding a value.
    #[must_use]
    pub fn new<T: ?Sized + Resolvable>(name: &'static str, value: Svc<T>) -> Self {
        Self::with_value(
            name,
            TypeDescriptor::of::<T>(),
            Shape::Plain,
            Held::Value(Some(T::into_dyn(value))),
        )
    }

    /// A public, static, immutable field holding an absence box.
    #[must_use]
    pub fn optional<T: ?Sized + Resolvable>(
        name: &'static str,
        value: Option<Svc<T>>,
    ) -> Self {
        Self::with_value(
            name,
            TypeDescriptor::of::<T>(),
            Shape::Optional,
            Held::Value(erase(value)),
        )
    }

    /// A public, static, immutable field holding a deferred value. The
    /// computation runs each time the field is read.
    #[must_use]
    pub fn lazy<T, F>(name: &'static str, compute: F) -> Self
    where
        T: ?Sized + Resolvable,
        F: Fn() -> Result<Option<Svc<T>>, BoxError> + Send + Sync + 'static,
    {
        Self::with_value(
            name,
            TypeDescriptor::of::<T>(),
            Shape::Lazy,
            Held::Lazy(lazy_value(compute)),
        )
    }

    /// Attaches a marker to this field.
    #[must_use]
    pub fn marker(mut self, name: impl Into<Cow<'static, str>>) -> Self {
        self.markers.insert(Marker::new(name));
        self
    }

    /// Hides this field from the engine.
    #[must_use]
    pub fn private(mut self) -> Self {
        self.visibility = Visibility::Private;
        self
    }

    /// Declares this field as mutable.
    #[must_use]
    pub fn mutable(mut self) -> Self {
        self.is_final = false;
        self
    }

    /// Declares this field as an instance field.
    #[must_use]
    pub fn instance(mut self) -> Self {
        self.is_static = false;
        self
    }

    /// Gets the name of this field.
    #[must_use]
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Gets the element type held by this field.
    #[must_use]
    pub fn element(&self) -> TypeDescriptor {
        self.element
    }

    /// Gets how this field holds its element type.
    #[must_use]
    pub fn shape(&self) -> Shape {
        self.shape
    }

    /// Gets the visibility of this field.
    #[must_use]
    pub fn visibility(&self) -> Visibility {
        self.visibility
    }

    /// Whether this field is static.
    #[must_use]
    pub fn is_static(&self) -> bool {
        self.is_static
    }

    /// Whether this field is immutable.
    #[must_use]
    pub fn is_final(&self) -> bool {
        self.is_final
    }

    /// Gets the markers attached to this field.
    #[must_use]
    pub fn markers(&self) -> &Markers {
        &self.markers
    }

    pub(crate) fn read(&self) -> Result<Resolved, BoxError> {
        self.value.clone().into_resolved()
    }
}

impl Debug for StaticField {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StaticField")
            .field("name", &self.name)
            .field("element", &self.element)
            .field("shape", &self.shape)
            .field("visibility", &self.visibility)
            .field("is_static", &self.is_static)
            .field("is_final", &self.is_final)
            .field("markers", &self.markers)
            .finish_non_exhaustive()
    }
}

type MethodFn = Svc<
    dyn Fn(Option<&DynSvc>, &Arguments) -> Result<Held, BoxError> + Send + Sync,
>;

/// A method of a type: either a static factory or an instance method taking
/// the value as its receiver.
#[derive(Clone)]
pub struct Method {
    name: &'static str,
    element: TypeDescriptor,
    shape: Shape,
    visibility: Visibility,
    is_static: bool,
    markers: Markers,
    parameters: Vec<Parameter>,
    invoke: MethodFn,
}

impl Method {
    fn with_invoke(
        name: &'static str,
        element: TypeDescriptor,
        shape: Shape,
        is_static: bool,
        invoke: MethodFn,
    ) -> Self {
        Method {
            name,
            element,
            shape,
            visibility: Visibility::Public,
            is_static,
            markers: Markers::new(),
            parameters: Vec::new(),
            invoke,
        }
    }

    /// A public static method returning the element type.
    #[must_use]
    pub fn factory<T, F>(name: &'static str, invoke: F) -> Self
    where
        T: ?Sized + Resolvable,
        F: Fn(&Arguments) -> Result<Svc<T>, BoxError> + Send + Sync + 'static,
    {
        Self::with_invoke(
            name,
            TypeDescriptor::of::<T>(),
            Shape::Plain,
            true,
            Svc::new(move |_: Option<&DynSvc>, args: &Arguments| {
                invoke(args).map(|value| Held::Value(Some(T::into_dyn(value))))
            }),
        )
    }

    /// A public static method returning an absence box of the element type.
    #[must_use]
    pub fn optional_factory<T, F>(name: &'static str, invoke: F) -> Self
    where
        T: ?Sized + Resolvable,
        F: Fn(&Arguments) -> Result<Option<Svc<T>>, BoxError>
            + Send
            + Sync
            + 'static,
    {
        Self::with_invoke(
            name,
            TypeDescriptor::of::<T>(),
            Shape::Optional,
            true,
            Svc::new(move |_: Option<&DynSvc>, args: &Arguments| {
                invoke(args).map(|value| Held::Value(erase(value)))
            }),
        )
    }

    /// A public static method returning a deferred computation of the
    /// element type.
    #[must_use]
    pub fn lazy_factory<T, F, G>(name: &'static str, invoke: F) -> Self
    where
        T: ?Sized + Resolvable,
        F: Fn(&Arguments) -> Result<G, BoxError> + Send + Sync + 'static,
        G: Fn() -> Result<Option<Svc<T>>, BoxError> + Send + Sync + 'static,
    {
        Self::with_invoke(
            name,
            TypeDescriptor::of::<T>(),
            Shape::Lazy,
            true,
            Svc::new(move |_: Option<&DynSvc>, args: &Arguments| {
                invoke(args).map(|compute| Held::Lazy(lazy_value(compute)))
            }),
        )
    }

    /// A public instance method without parameters or a result.
    #[must_use]
    pub fn instance<T, F>(name: &'static str, invoke: F) -> Self
    where
        T: ?Sized + Resolvable,
        F: Fn(&T) -> Result<(), BoxError> + Send + Sync + 'static,
    {
        Self::with_invoke(
            name,
            TypeDescriptor::of::<()>(),
            Shape::Plain,
            false,
            Svc::new(move |receiver: Option<&DynSvc>, _: &Arguments| {
                let receiver = receiver
                    .cloned()
                    .and_then(T::from_dyn)
                    .ok_or_else(|| InjectError::InvalidProvider {
                        descriptor: TypeDescriptor::of::<T>(),
                    })?;
                invoke(&*receiver)?;
                Ok(Held::Value(None))
            }),
        )
    }

    /// An instance method marked [`POST_CONSTRUCT`](markers::POST_CONSTRUCT).
    #[must_use]
    pub fn post_construct<T, F>(name: &'static str, invoke: F) -> Self
    where
        T: ?Sized + Resolvable,
        F: Fn(&T) -> Result<(), BoxError> + Send + Sync + 'static,
    {
        Self::instance(name, invoke).marker(markers::POST_CONSTRUCT)
    }

    /// Appends a parameter.
    #[must_use]
    pub fn param(mut self, parameter: Parameter) -> Self {
        self.parameters.push(parameter);
        self
    }

    /// Attaches a marker to this method.
    #[must_use]
    pub fn marker(mut self, name: impl Into<Cow<'static, str>>) -> Self {
        self.markers.insert(Marker::new(name));
        self
    }

    /// Hides this method. Private post-construct hooks still run.
    #[must_use]
    pub fn private(mut self) -> Self {
        self.visibility = Visibility::Private;
        self
    }

    /// Gets the name of this method.
    #[must_use]
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Gets the element type returned by this method.
    #[must_use]
    pub fn element(&self) -> TypeDescriptor {
        self.element
    }

    /// Gets how the return value holds its element type.
    #[must_use]
    pub fn shape(&self) -> Shape {
        self.shape
    }

    /// Gets the visibility of this method.
    #[must_use]
    pub fn visibility(&self) -> Visibility {
        self.visibility
    }

    /// Whether this method is static.
    #[must_use]
    pub fn is_static(&self) -> bool {
        self.is_static
    }

    /// Gets the markers attached to this method.
    #[must_use]
    pub fn markers(&self) -> &Markers {
        &self.markers
    }

    /// Gets the parameters of this method.
    #[must_use]
    pub fn parameters(&self) -> &[Parameter] {
        &self.parameters
    }

    pub(crate) fn invoke(
        &self,
        receiver: Option<&DynSvc>,
        args: &Arguments,
    ) -> Result<Held, BoxError> {
        (self.invoke)(receiver, args)
    }
}

impl Debug for Method {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Method")
            .field("name", &self.name)
            .field("element", &self.element)
            .field("shape", &self.shape)
            .field("visibility", &self.visibility)
            .field("is_static", &self.is_static)
            .field("markers", &self.markers)
            .field("parameters", &self.parameters)
            .finish_non_exhaustive()
    }
}

/// A member of an enumerated type.
#[derive(Clone)]
pub struct EnumMember {
    name: &'static str,
    markers: Markers,
    value: DynSvc,
}

impl EnumMember {
    pub(crate) fn new<T: Service>(name: &'static str, value: T) -> Self {
        EnumMember {
            name,
            markers: Markers::new(),
            value: Svc::new(value),
        }
    }

    pub(crate) fn markers_mut(&mut self) -> &mut Markers {
        &mut self.markers
    }

    /// Gets the name of this member.
    #[must_use]
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Gets the markers attached to this member.
    #[must_use]
    pub fn markers(&self) -> &Markers {
        &self.markers
    }

    pub(crate) fn value(&self) -> DynSvc {
        self.value.clone()
    }
}

impl Debug for EnumMember {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EnumMember")
            .field("name", &self.name)
            .field("markers", &self.markers)
            .finish_non_exhaustive()
    }
}

/// A method declared by an interface, identified by its signature.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct MethodSignature {
    signature: String,
    has_default: bool,
}

impl MethodSignature {
    pub(crate) fn new(signature: impl Into<String>, has_default: bool) -> Self {
        MethodSignature {
            signature: signature.into(),
            has_default,
        }
    }

    /// Gets the signature of this method.
    #[must_use]
    pub fn signature(&self) -> &str {
        &self.signature
    }

    /// Whether the declaration carries a default body.
    #[must_use]
    pub fn has_default(&self) -> bool {
        self.has_default
    }
}
