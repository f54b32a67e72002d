use crate::{
    markers, DefaultProvider, Finder, InjectError, InjectResult,
    ResolutionContext, Supplier, TypeDescriptor, Visibility,
};

/// Resolves types to a public, static, immutable field of the type marked
/// [`DEFAULT`](markers::DEFAULT). The field may hold the value directly, in
/// an absence box, or as a deferred computation.
#[derive(Clone, Copy, Debug, Default)]
pub struct SingletonFieldFinder;

impl Finder for SingletonFieldFinder {
    fn find(
        &self,
        descriptor: TypeDescriptor,
        provider: &DefaultProvider,
    ) -> InjectResult<Option<Supplier>> {
        let field = provider.registry().get(descriptor).and_then(|metadata| {
            metadata
                .fields()
                .iter()
                .find(|field| {
                    field.visibility() == Visibility::Public
                        && field.is_static()
                        && field.is_final()
                        && field.element() == descriptor
                        && field.markers().has(markers::DEFAULT)
                })
                .cloned()
        });

        Ok(field.map(|field| {
            Supplier::new(move |_: &DefaultProvider, _: &ResolutionContext| {
                field
                    .read()
                    .map_err(|error| InjectError::from_foreign(descriptor, error))
            })
        }))
    }
}
