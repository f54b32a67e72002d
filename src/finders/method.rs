use crate::{
    markers, parameters::resolve_parameters, DefaultProvider, Finder, Held,
    InjectError, InjectResult, ResolutionContext, Supplier, TypeDescriptor,
    Visibility,
};

/// Resolves types by calling a public static method of the type marked
/// [`DEFAULT`](markers::DEFAULT). The method is called each time a value is
/// requested.
#[derive(Clone, Copy, Debug, Default)]
pub struct FactoryMethodFinder;

impl Finder for FactoryMethodFinder {
    fn find(
        &self,
        descriptor: TypeDescriptor,
        provider: &DefaultProvider,
    ) -> InjectResult<Option<Supplier>> {
        let method = provider.registry().get(descriptor).and_then(|metadata| {
            metadata
                .methods()
                .iter()
                .find(|method| {
                    method.visibility() == Visibility::Public
                        && method.is_static()
                        && method.element() == descriptor
                        && method.markers().has(markers::DEFAULT)
                })
                .cloned()
        });

        Ok(method.map(|method| {
            Supplier::new(
                move |provider: &DefaultProvider, context: &ResolutionContext| {
                    let args =
                        resolve_parameters(provider, method.parameters(), context)?;
                    method
                        .invoke(None, &args)
                        .and_then(Held::into_resolved)
                        .map_err(|error| InjectError::from_foreign(descriptor, error))
                },
            )
        }))
    }
}
