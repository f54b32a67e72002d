use crate::{
    markers, parameters::resolve_parameters, Arguments, Constructor,
    DefaultProvider, Finder, InjectError, InjectResult, Method,
    ResolutionContext, Supplier, TypeDescriptor, TypeRegistry, Visibility,
};

/// Resolves types by calling one of their public constructors, then the
/// [`POST_CONSTRUCT`](markers::POST_CONSTRUCT) hooks of the type and its
/// supertypes.
///
/// A type with a single public constructor uses it. A type with several uses
/// the one marked [`DEFAULT`](markers::DEFAULT) if exactly one is marked, or
/// else its constructor without parameters. Otherwise the type isn't handled
/// by this finder.
///
/// Hooks of the farthest supertypes run first, and the hooks of the type
/// itself run last. Hooks run in the order they were declared, including
/// private ones.
#[derive(Clone, Copy, Debug, Default)]
pub struct ConstructorFinder;

impl Finder for ConstructorFinder {
    fn find(
        &self,
        descriptor: TypeDescriptor,
        provider: &DefaultProvider,
    ) -> InjectResult<Option<Supplier>> {
        let registry = provider.registry();
        let constructor = match registry.get(descriptor) {
            Some(metadata) if !metadata.kind().is_abstract() => {
                choose_constructor(metadata.constructors())
            }
            _ => None,
        };
        let constructor = match constructor {
            Some(constructor) => constructor.clone(),
            None => return Ok(None),
        };

        let hooks = post_construct_hooks(registry, descriptor);
        Ok(Some(Supplier::new(
            move |provider: &DefaultProvider, context: &ResolutionContext| {
                let args =
                    resolve_parameters(provider, constructor.parameters(), context)?;
                let instance = constructor
                    .invoke(&args)
                    .map_err(|error| InjectError::from_foreign(descriptor, error))?;

                for (owner, hook) in &hooks {
                    let receiver = provider
                        .registry()
                        .cast(instance.clone(), descriptor, *owner)
                        .ok_or(InjectError::InvalidProvider { descriptor: *owner })?;
                    hook.invoke(Some(&receiver), &Arguments::new())
                        .map_err(|error| InjectError::from_foreign(descriptor, error))?;
                }

                Ok(Some(instance))
            },
        )))
    }
}

fn choose_constructor(constructors: &[Constructor]) -> Option<&Constructor> {
    let public: Vec<_> = constructors
        .iter()
        .filter(|constructor| constructor.visibility() == Visibility::Public)
        .collect();
    if let [constructor] = public.as_slice() {
        return Some(*constructor);
    }

    let mut marked = public
        .iter()
        .filter(|constructor| constructor.markers().has(markers::DEFAULT));
    match (marked.next(), marked.next()) {
        (Some(constructor), None) => Some(*constructor),
        _ => public
            .iter()
            .copied()
            .find(|constructor| constructor.parameters().is_empty()),
    }
}

fn post_construct_hooks(
    registry: &TypeRegistry,
    descriptor: TypeDescriptor,
) -> Vec<(TypeDescriptor, Method)> {
    let mut owners = registry.ancestors(descriptor);
    owners.reverse();
    owners.push(descriptor);

    owners
        .into_iter()
        .filter_map(|owner| registry.get(owner).map(|metadata| (owner, metadata)))
        .flat_map(|(owner, metadata)| {
            metadata
                .methods()
                .iter()
                .filter(|method| {
                    !method.is_static()
                        && method.parameters().is_empty()
                        && method.markers().has(markers::POST_CONSTRUCT)
                })
                .map(move |method| (owner, method.clone()))
                .collect::<Vec<_>>()
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Parameter;

    struct Point;

    fn constructor() -> Constructor {
        Constructor::new(|_| Ok(Point))
    }

    #[test]
    fn single_public_constructor_is_chosen() {
        let constructors = [
            constructor().param(Parameter::of::<u8>()),
            constructor().private(),
        ];
        assert_eq!(
            1,
            choose_constructor(&constructors).unwrap().parameters().len()
        );
    }

    #[test]
    fn marked_constructor_is_chosen() {
        let constructors = [
            constructor(),
            constructor()
                .param(Parameter::of::<u8>())
                .marker(markers::DEFAULT),
        ];
        assert_eq!(
            1,
            choose_constructor(&constructors).unwrap().parameters().len()
        );
    }

    #[test]
    fn parameterless_constructor_is_the_fallback() {
        let constructors = [
            constructor().param(Parameter::of::<u8>()),
            constructor(),
            constructor().param(Parameter::of::<u16>()),
        ];
        assert!(choose_constructor(&constructors)
            .unwrap()
            .parameters()
            .is_empty());
    }

    #[test]
    fn ambiguous_constructors_are_skipped() {
        let constructors = [
            constructor().param(Parameter::of::<u8>()),
            constructor().param(Parameter::of::<u16>()),
        ];
        assert!(choose_constructor(&constructors).is_none());

        let constructors = [
            constructor().param(Parameter::of::<u8>()).marker(markers::DEFAULT),
            constructor().param(Parameter::of::<u16>()).marker(markers::DEFAULT),
        ];
        assert!(choose_constructor(&constructors).is_none());
    }
}
