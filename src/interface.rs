use crate::{DynSvc, Service, Svc};

/// Indicates that values of a type can pass through the engine. Each sized
/// type can resolve itself, stored directly as a [`DynSvc`]. Trait objects
/// (`dyn Trait`) can't be stored that way, so they are wrapped in an
/// additional service pointer. This trait should be implemented for trait
/// objects by the [`interface!`] macro.
pub trait Resolvable: Service {
    /// Erases a service pointer.
    fn into_dyn(service: Svc<Self>) -> DynSvc;

    /// Recovers a service pointer. Returns `None` if the erased value holds a
    /// different type.
    fn from_dyn(service: DynSvc) -> Option<Svc<Self>>;
}

impl<T: Service> Resolvable for T {
    fn into_dyn(service: Svc<Self>) -> DynSvc {
        service
    }

    fn from_dyn(service: DynSvc) -> Option<Svc<Self>> {
        service.downcast().ok()
    }
}

/// Marker trait that indicates that a type is an interface for another type.
/// Each sized type is an interface for itself, and each `dyn Trait` is an
/// interface for the types implementing it. This trait should usually be
/// implemented automatically by the [`interface!`] macro.
pub trait InterfaceFor<S: Service>: Resolvable {
    /// Converts a pointer to the implementation into a pointer to the
    /// interface.
    fn from_svc(service: Svc<S>) -> Svc<Self>;
}

impl<T: Service> InterfaceFor<T> for T {
    fn from_svc(service: Svc<T>) -> Svc<Self> {
        service
    }
}

/// Marks a trait as being an interface. Requests for `dyn Trait` can then be
/// resolved by the engine, and each implementor of the trait can be used as
/// an implementation of it.
///
/// The trait must be a subtrait of [`Send`] and [`Sync`], and instances of it
/// must have a `'static` lifetime. This can be done easily by making your
/// interface a subtrait of [`Service`].
///
/// ## Example
///
/// ```
/// use runtime_defaults::{interface, InterfaceFor, Service, Svc};
///
/// trait Greeter: Service {
///     fn greet(&self, name: &str) -> String {
///         format!("Hello: {}", name)
///     }
/// }
///
/// struct English;
/// impl Greeter for English {}
///
/// interface!(Greeter);
///
/// let greeter: Svc<dyn Greeter> =
///     <dyn Greeter as InterfaceFor<English>>::from_svc(Svc::new(English));
/// assert_eq!("Hello: there", greeter.greet("there"));
/// ```
#[macro_export]
macro_rules! interface {
    ($interface:tt) => {
        impl $crate::Resolvable for dyn $interface {
            fn into_dyn(service: $crate::Svc<Self>) -> $crate::DynSvc {
                $crate::Svc::new(service)
            }

            fn from_dyn(
                service: $crate::DynSvc,
            ) -> ::std::option::Option<$crate::Svc<Self>> {
                service
                    .downcast::<$crate::Svc<Self>>()
                    .ok()
                    .map(|service| $crate::Svc::clone(&*service))
            }
        }

        impl<T: $interface> $crate::InterfaceFor<T> for dyn $interface {
            fn from_svc(service: $crate::Svc<T>) -> $crate::Svc<Self> {
                service
            }
        }
    };
}
