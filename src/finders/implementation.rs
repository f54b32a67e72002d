use crate::{
    markers, DefaultProvider, Finder, InjectError, InjectResult,
    ResolutionContext, Supplier, TypeDescriptor,
};
use tracing::debug;

/// Resolves types marked [`IMPLEMENTED_BY`](markers::IMPLEMENTED_BY) through
/// the named implementation. An implementation that isn't registered, or
/// that isn't a subtype of the marked type, is ignored.
#[derive(Clone, Copy, Debug, Default)]
pub struct ImplementationMarkerFinder;

impl Finder for ImplementationMarkerFinder {
    fn find(
        &self,
        descriptor: TypeDescriptor,
        provider: &DefaultProvider,
    ) -> InjectResult<Option<Supplier>> {
        let registry = provider.registry();
        let name = match registry
            .get(descriptor)
            .and_then(|metadata| metadata.markers().value(markers::IMPLEMENTED_BY))
        {
            Some(name) => name,
            None => return Ok(None),
        };

        let implementation = match registry.find_by_name(name) {
            Some(implementation) => implementation,
            None => {
                debug!(
                    service = descriptor.name(),
                    implementation = name,
                    "implementation is not registered, ignoring marker"
                );
                return Ok(None);
            }
        };

        if !registry.is_assignable(implementation, descriptor) {
            debug!(
                service = descriptor.name(),
                implementation = implementation.name(),
                "implementation is not compatible, ignoring marker"
            );
            return Ok(None);
        }

        Ok(Some(delegate(descriptor, implementation)))
    }
}

/// Resolves types marked [`BIND_TO`](markers::BIND_TO) through the named
/// implementation. Unlike [`ImplementationMarkerFinder`], an implementation
/// that can't be used is an error.
#[derive(Clone, Copy, Debug, Default)]
pub struct InterfaceBindingFinder;

impl Finder for InterfaceBindingFinder {
    fn find(
        &self,
        descriptor: TypeDescriptor,
        provider: &DefaultProvider,
    ) -> InjectResult<Option<Supplier>> {
        let registry = provider.registry();
        let name = match registry
            .get(descriptor)
            .and_then(|metadata| metadata.markers().value(markers::BIND_TO))
        {
            Some(name) => name,
            None => return Ok(None),
        };

        let implementation = registry.find_by_name(name).ok_or_else(|| {
            InjectError::ImplementedClassNotExist {
                descriptor,
                implementation: name.to_owned(),
            }
        })?;
        if !registry.is_assignable(implementation, descriptor) {
            return Err(InjectError::ImplementedClassNotCompatible {
                descriptor,
                implementation,
            });
        }

        Ok(Some(delegate(descriptor, implementation)))
    }
}

fn delegate(descriptor: TypeDescriptor, implementation: TypeDescriptor) -> Supplier {
    Supplier::new(
        move |provider: &DefaultProvider, context: &ResolutionContext| {
            provider
                .get_with(implementation, context)?
                .map(|value| {
                    provider
                        .registry()
                        .cast(value, implementation, descriptor)
                        .ok_or(InjectError::ImplementedClassNotCompatible {
                            descriptor,
                            implementation,
                        })
                })
                .transpose()
        },
    )
}
