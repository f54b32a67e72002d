use derive_more::Display;
use std::{
    any::{Any, TypeId},
    collections::BTreeMap,
    error::Error,
    sync::Arc,
};

/// A reference-counted pointer holding a resolved value.
pub type Svc<T> = Arc<T>;

/// A reference-counted pointer holding an instance of `dyn Any`. Sized values
/// are stored directly as `Svc<T>`, while trait objects are stored as
/// `Svc<Svc<dyn Trait>>` (see [`Resolvable`](crate::Resolvable)).
pub type DynSvc = Arc<dyn Any + Send + Sync>;

/// The outcome of a successful resolution. `None` means the type resolved to
/// null.
pub type Resolved = Option<DynSvc>;

/// An error raised by code outside of the engine, like a constructor or a
/// factory method.
pub type BoxError = Box<dyn Error + Send + Sync>;

/// A result from attempting to resolve a default value for a type.
pub type InjectResult<T> = Result<T, InjectError>;

/// Implemented automatically on types that are capable of being resolved.
pub trait Service: Any + Send + Sync {}
impl<T: ?Sized + Any + Send + Sync> Service for T {}

/// Identity of a type the engine can be asked about.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Debug, Hash, Display)]
#[display(fmt = "{}", name)]
pub struct TypeDescriptor {
    id: TypeId,
    name: &'static str,
}

impl TypeDescriptor {
    /// Creates a [`TypeDescriptor`] for the given type.
    #[inline]
    #[must_use]
    pub fn of<T: ?Sized + Any>() -> Self {
        TypeDescriptor {
            id: TypeId::of::<T>(),
            name: std::any::type_name::<T>(),
        }
    }

    /// Gets the [`TypeId`] for this type.
    #[inline]
    #[must_use]
    pub fn id(&self) -> TypeId {
        self.id
    }

    /// Gets the name of this type.
    #[inline]
    #[must_use]
    pub fn name(&self) -> &'static str {
        self.name
    }
}

/// An error that has occurred while resolving a default value.
#[derive(Debug, Display)]
#[non_exhaustive]
pub enum InjectError {
    /// The type was requested while it was already being resolved by the
    /// same call tree.
    #[display(
        fmt = "a cyclic dependency was detected while resolving {} [{}]",
        "descriptor.name()",
        "fmt_cycle(cycle)"
    )]
    CyclicDependency {
        /// The type that was requested.
        descriptor: TypeDescriptor,

        /// The in-flight path, starting at the first request for the type and
        /// ending with the repeated request.
        cycle: Vec<TypeDescriptor>,
    },

    /// No strategy produced a value and the type is abstract.
    #[display(fmt = "cannot create a default for abstract type {}", "descriptor.name()")]
    AbstractClassCreation {
        /// The type that was requested.
        descriptor: TypeDescriptor,
    },

    /// The interface has methods without a default body anywhere in its
    /// hierarchy.
    #[display(
        fmt = "{} cannot be synthesized, methods without a default: {}",
        "descriptor.name()",
        "fmt_methods(methods)"
    )]
    NonDefaultInterface {
        /// The interface that was requested.
        descriptor: TypeDescriptor,

        /// Method signatures lacking a default body, mapped to the interface
        /// declaring them.
        methods: BTreeMap<String, TypeDescriptor>,
    },

    /// A required implementation marker names a type that isn't registered.
    #[display(
        fmt = "implementation {} of {} does not exist",
        implementation,
        "descriptor.name()"
    )]
    ImplementedClassNotExist {
        /// The type that was requested.
        descriptor: TypeDescriptor,

        /// The name carried by the marker.
        implementation: String,
    },

    /// A required implementation marker names a type that can't be used as
    /// the requested type.
    #[display(
        fmt = "{} is not compatible with {}",
        "implementation.name()",
        "descriptor.name()"
    )]
    ImplementedClassNotCompatible {
        /// The type that was requested.
        descriptor: TypeDescriptor,

        /// The implementation named by the marker.
        implementation: TypeDescriptor,
    },

    /// A constructor, factory, or field access failed.
    #[display(
        fmt = "an error occurred while creating a default {}: {}",
        "descriptor.name()",
        inner
    )]
    DefaultCreation {
        /// The type that was requested.
        descriptor: TypeDescriptor,

        /// The error that was raised.
        inner: BoxError,
    },

    /// A supplier produced a value of the wrong type.
    #[display(fmt = "the supplier for {} returned the wrong type", "descriptor.name()")]
    InvalidProvider {
        /// The type that was requested.
        descriptor: TypeDescriptor,
    },

    /// An argument was read with the wrong type or an index out of range.
    #[display(
        fmt = "argument {} cannot be read as {}",
        index,
        "descriptor.name()"
    )]
    InvalidArgument {
        /// The type the argument was read as.
        descriptor: TypeDescriptor,

        /// The position of the argument.
        index: usize,
    },
}

impl InjectError {
    /// Wraps an error raised while running a chosen strategy. Errors that
    /// already are an [`InjectError`] are unwrapped and returned as-is.
    #[must_use]
    pub fn from_foreign(descriptor: TypeDescriptor, error: BoxError) -> Self {
        match error.downcast::<InjectError>() {
            Ok(error) => *error,
            Err(inner) => InjectError::DefaultCreation { descriptor, inner },
        }
    }

    /// Gets the type this error is about.
    #[must_use]
    pub fn descriptor(&self) -> TypeDescriptor {
        match self {
            InjectError::CyclicDependency { descriptor, .. }
            | InjectError::AbstractClassCreation { descriptor }
            | InjectError::NonDefaultInterface { descriptor, .. }
            | InjectError::ImplementedClassNotExist { descriptor, .. }
            | InjectError::ImplementedClassNotCompatible { descriptor, .. }
            | InjectError::DefaultCreation { descriptor, .. }
            | InjectError::InvalidProvider { descriptor }
            | InjectError::InvalidArgument { descriptor, .. } => *descriptor,
        }
    }
}

impl Error for InjectError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            InjectError::DefaultCreation { inner, .. } => Some(inner.as_ref()),
            _ => None,
        }
    }
}

fn fmt_cycle(cycle: &[TypeDescriptor]) -> String {
    cycle
        .iter()
        .map(TypeDescriptor::name)
        .collect::<Vec<_>>()
        .join(" -> ")
}

fn fmt_methods(methods: &BTreeMap<String, TypeDescriptor>) -> String {
    methods
        .iter()
        .map(|(signature, owner)| format!("{} ({})", signature, owner.name()))
        .collect::<Vec<_>>()
        .join(", ")
}
