use crate::{DynSvc, Svc, TypeDescriptor, TypeMetadata};
use std::collections::{HashMap, HashSet, VecDeque};

/// A side registry describing the types the engine can introspect. Types
/// that aren't registered can still be resolved through bindings, finders
/// supplied by the caller, and the built-in zero values.
#[derive(Clone, Debug, Default)]
pub struct TypeRegistry {
    types: HashMap<TypeDescriptor, Svc<TypeMetadata>>,
    names: HashMap<String, TypeDescriptor>,
}

impl TypeRegistry {
    /// Creates a new, empty registry.
    #[must_use]
    pub fn new() -> Self {
        TypeRegistry::default()
    }

    /// Registers a type. Registering the same type again replaces its
    /// metadata.
    pub fn register(&mut self, metadata: impl Into<TypeMetadata>) -> &mut Self {
        let metadata = metadata.into();
        let descriptor = metadata.descriptor();
        self.names.insert(descriptor.name().to_owned(), descriptor);
        if let Some(alias) = metadata.alias() {
            self.names.insert(alias.to_owned(), descriptor);
        }

        self.types.insert(descriptor, Svc::new(metadata));
        self
    }

    /// Gets the metadata for a type.
    #[must_use]
    pub fn get(&self, descriptor: TypeDescriptor) -> Option<&Svc<TypeMetadata>> {
        self.types.get(&descriptor)
    }

    /// Finds a registered type by its type name or alias.
    #[must_use]
    pub fn find_by_name(&self, name: &str) -> Option<TypeDescriptor> {
        self.names.get(name).copied()
    }

    /// Gets every transitive supertype of a type, nearest first. Each
    /// supertype appears once.
    #[must_use]
    pub fn ancestors(&self, descriptor: TypeDescriptor) -> Vec<TypeDescriptor> {
        let mut seen = HashSet::from([descriptor]);
        let mut queue = VecDeque::from([descriptor]);
        let mut ancestors = Vec::new();
        while let Some(current) = queue.pop_front() {
            let supertypes = self
                .get(current)
                .into_iter()
                .flat_map(|metadata| metadata.supertypes());
            for supertype in supertypes {
                if seen.insert(supertype.descriptor()) {
                    ancestors.push(supertype.descriptor());
                    queue.push_back(supertype.descriptor());
                }
            }
        }

        ancestors
    }

    /// Whether values of `from` can be used where `to` is expected.
    #[must_use]
    pub fn is_assignable(&self, from: TypeDescriptor, to: TypeDescriptor) -> bool {
        from == to || self.ancestors(from).contains(&to)
    }

    /// Converts a value of `from` into a value of its supertype `to` by
    /// composing the conversions registered along the supertype graph.
    /// Returns `None` if no chain of conversions leads to `to`, or if the
    /// value doesn't hold a `from`.
    #[must_use]
    pub fn cast(
        &self,
        value: DynSvc,
        from: TypeDescriptor,
        to: TypeDescriptor,
    ) -> Option<DynSvc> {
        if from == to {
            return Some(value);
        }

        let mut seen = HashSet::from([from]);
        let mut queue = VecDeque::from([(from, value)]);
        while let Some((current, value)) = queue.pop_front() {
            let supertypes = match self.get(current) {
                Some(metadata) => metadata.supertypes(),
                None => continue,
            };

            for supertype in supertypes {
                let cast = match supertype.cast() {
                    Some(cast) => cast,
                    None => continue,
                };
                if !seen.insert(supertype.descriptor()) {
                    continue;
                }

                let converted = match cast(value.clone()) {
                    Some(converted) => converted,
                    None => continue,
                };
                if supertype.descriptor() == to {
                    return Some(converted);
                }

                queue.push_back((supertype.descriptor(), converted));
            }
        }

        None
    }

    /// Gets the number of registered types.
    #[must_use]
    pub fn len(&self) -> usize {
        self.types.len()
    }

    /// Whether no types are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}
