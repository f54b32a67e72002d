use crate::{
    DefaultProvider, DynSvc, InjectResult, ResolutionContext, Resolved, Svc,
    TypeDescriptor,
};
use std::{
    collections::HashMap,
    fmt::{Debug, Formatter},
    sync::{PoisonError, RwLock},
};

type SupplierFn = dyn Fn(&DefaultProvider, &ResolutionContext) -> InjectResult<Resolved>
    + Send
    + Sync;

/// A lazy producer of default values for one type. Suppliers are chosen once
/// per provider and type, but each invocation may produce a new value.
///
/// Suppliers receive the provider and context of the request invoking them
/// instead of capturing a provider, so a provider can cache suppliers without
/// keeping itself alive.
#[derive(Clone)]
pub struct Supplier(Svc<SupplierFn>);

impl Supplier {
    /// Creates a supplier from a function.
    pub fn new<F>(supply: F) -> Self
    where
        F: Fn(&DefaultProvider, &ResolutionContext) -> InjectResult<Resolved>
            + Send
            + Sync
            + 'static,
    {
        Supplier(Svc::new(supply))
    }

    /// Creates a supplier that always returns the same value.
    #[must_use]
    pub fn constant(value: DynSvc) -> Self {
        Supplier::new(move |_: &DefaultProvider, _: &ResolutionContext| {
            Ok(Some(value.clone()))
        })
    }

    /// Creates a supplier that always returns null.
    #[must_use]
    pub fn null() -> Self {
        Supplier::new(|_: &DefaultProvider, _: &ResolutionContext| Ok(None))
    }

    /// Produces a value.
    pub fn supply(
        &self,
        provider: &DefaultProvider,
        context: &ResolutionContext,
    ) -> InjectResult<Resolved> {
        (self.0)(provider, context)
    }
}

impl Debug for Supplier {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str("Supplier(..)")
    }
}

/// Suppliers chosen by a provider, by type. Entries are only ever added, so
/// a lock poisoned by a panicking thread still guards a consistent map.
#[derive(Default)]
pub(crate) struct SupplierCache {
    suppliers: RwLock<HashMap<TypeDescriptor, Supplier>>,
}

impl SupplierCache {
    pub fn get(&self, descriptor: TypeDescriptor) -> Option<Supplier> {
        self.suppliers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&descriptor)
            .cloned()
    }

    /// Caches a supplier unless another one was cached first, and returns
    /// the supplier that ends up cached.
    pub fn insert(&self, descriptor: TypeDescriptor, supplier: Supplier) -> Supplier {
        self.suppliers
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(descriptor)
            .or_insert(supplier)
            .clone()
    }

    pub fn len(&self) -> usize {
        self.suppliers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

impl Debug for SupplierCache {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SupplierCache")
            .field("len", &self.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_inserted_supplier_wins() {
        let cache = SupplierCache::default();
        let descriptor = TypeDescriptor::of::<u8>();
        let first = cache.insert(descriptor, Supplier::constant(Svc::new(1u8)));
        let second = cache.insert(descriptor, Supplier::null());

        let provider = DefaultProvider::builder().build();
        let context = ResolutionContext::new();
        for supplier in [first, second, cache.get(descriptor).unwrap()] {
            let value = supplier.supply(&provider, &context).unwrap().unwrap();
            assert_eq!(Some(&1), value.downcast_ref::<u8>());
        }
        assert_eq!(1, cache.len());
    }

    #[test]
    fn missing_supplier_is_none() {
        let cache = SupplierCache::default();
        assert!(cache.get(TypeDescriptor::of::<u8>()).is_none());
    }
}
