use crate::{
    markers, DefaultProvider, Finder, InjectError, InjectResult,
    ResolutionContext, Supplier, TypeDescriptor, TypeKind,
};
use std::collections::{BTreeMap, HashSet};
use tracing::warn;

/// Synthesizes interfaces marked
/// [`DEFAULT_INTERFACE`](markers::DEFAULT_INTERFACE) when every method in
/// their hierarchy has a default body.
///
/// A default body declared anywhere in the hierarchy satisfies the same
/// signature declared without one elsewhere. An interface with an
/// unsatisfied method is an error.
#[derive(Clone, Copy, Debug, Default)]
pub struct DefaultInterfaceFinder;

impl Finder for DefaultInterfaceFinder {
    fn find(
        &self,
        descriptor: TypeDescriptor,
        provider: &DefaultProvider,
    ) -> InjectResult<Option<Supplier>> {
        let registry = provider.registry();
        let metadata = match registry.get(descriptor) {
            Some(metadata)
                if metadata.kind() == TypeKind::Interface
                    && metadata.markers().has(markers::DEFAULT_INTERFACE) =>
            {
                metadata
            }
            _ => return Ok(None),
        };

        let mut defaulted = HashSet::new();
        let mut methods = BTreeMap::new();
        let hierarchy = std::iter::once(descriptor)
            .chain(registry.ancestors(descriptor))
            .filter_map(|owner| registry.get(owner));
        for owner in hierarchy {
            for signature in owner.signatures() {
                if signature.has_default() {
                    defaulted.insert(signature.signature().to_owned());
                } else {
                    methods
                        .entry(signature.signature().to_owned())
                        .or_insert_with(|| owner.descriptor());
                }
            }
        }

        methods.retain(|signature, _| !defaulted.contains(signature));
        if !methods.is_empty() {
            return Err(InjectError::NonDefaultInterface {
                descriptor,
                methods,
            });
        }

        if !metadata.has_synthesizer() {
            warn!(
                service = descriptor.name(),
                "interface has no synthesizer registered, skipping synthesis"
            );
            return Ok(None);
        }

        let metadata = metadata.clone();
        Ok(Some(Supplier::new(
            move |_: &DefaultProvider, _: &ResolutionContext| {
                Ok(metadata.synthesize())
            },
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{interface, Service, TypeMetadata, TypeRegistry};

    trait Base: Service {}
    trait Derived: Base {}

    interface!(Base);
    interface!(Derived);

    fn registry(base_default: bool) -> TypeRegistry {
        let base = TypeMetadata::interface::<dyn Base>().abstract_method("fn id(&self) -> u32");
        let base = if base_default {
            base.default_method("fn name(&self) -> String")
        } else {
            base.abstract_method("fn name(&self) -> String")
        };

        let mut registry = TypeRegistry::new();
        registry.register(base).register(
            TypeMetadata::interface::<dyn Derived>()
                .marker(markers::DEFAULT_INTERFACE)
                .extends::<dyn Base>()
                .default_method("fn id(&self) -> u32"),
        );
        registry
    }

    #[test]
    fn defaults_anywhere_in_hierarchy_satisfy_methods() {
        let provider = DefaultProvider::builder().registry(registry(true)).build();
        let supplier = DefaultInterfaceFinder
            .find(TypeDescriptor::of::<dyn Derived>(), &provider)
            .unwrap();

        // No synthesizer is registered, so the finder steps aside.
        assert!(supplier.is_none());
    }

    #[test]
    fn unsatisfied_methods_are_reported() {
        let provider = DefaultProvider::builder().registry(registry(false)).build();
        match DefaultInterfaceFinder.find(TypeDescriptor::of::<dyn Derived>(), &provider) {
            Err(InjectError::NonDefaultInterface { methods, .. }) => {
                let expected = BTreeMap::from([(
                    "fn name(&self) -> String".to_owned(),
                    TypeDescriptor::of::<dyn Base>(),
                )]);
                assert_eq!(expected, methods);
            }
            result => panic!("unexpected result: {:?}", result),
        }
    }

    #[test]
    fn unmarked_interfaces_are_skipped() {
        let provider = DefaultProvider::builder().registry(registry(false)).build();
        assert!(DefaultInterfaceFinder
            .find(TypeDescriptor::of::<dyn Base>(), &provider)
            .unwrap()
            .is_none());
    }
}
