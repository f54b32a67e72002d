use crate::{
    markers, DefaultProvider, Finder, InjectResult, Supplier, TypeDescriptor,
};

/// Resolves types marked [`DEFAULT_TO_NULL`](markers::DEFAULT_TO_NULL) to
/// null.
#[derive(Clone, Copy, Debug, Default)]
pub struct NullMarkerFinder;

impl Finder for NullMarkerFinder {
    fn find(
        &self,
        descriptor: TypeDescriptor,
        provider: &DefaultProvider,
    ) -> InjectResult<Option<Supplier>> {
        let marked = provider
            .registry()
            .get(descriptor)
            .map_or(false, |metadata| {
                metadata.markers().has(markers::DEFAULT_TO_NULL)
            });
        Ok(marked.then(Supplier::null))
    }
}
