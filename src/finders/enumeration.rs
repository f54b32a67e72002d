use crate::{
    markers, DefaultProvider, Finder, InjectResult, Supplier, TypeDescriptor,
    TypeKind,
};

/// Resolves enumerated types to their member marked
/// [`DEFAULT`](markers::DEFAULT), or to their first member. Enumerated types
/// without members resolve to null.
#[derive(Clone, Copy, Debug, Default)]
pub struct EnumDefaultFinder;

impl Finder for EnumDefaultFinder {
    fn find(
        &self,
        descriptor: TypeDescriptor,
        provider: &DefaultProvider,
    ) -> InjectResult<Option<Supplier>> {
        let metadata = match provider.registry().get(descriptor) {
            Some(metadata) if metadata.kind() == TypeKind::Enum => metadata,
            _ => return Ok(None),
        };

        let members = metadata.members();
        let member = members
            .iter()
            .find(|member| member.markers().has(markers::DEFAULT))
            .or_else(|| members.first());
        Ok(Some(match member {
            Some(member) => Supplier::constant(member.value()),
            None => Supplier::null(),
        }))
    }
}
