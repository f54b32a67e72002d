use crate::{DynSvc, Svc, TypeDescriptor};
use once_cell::sync::Lazy;
use std::{any::TypeId, collections::HashMap, path::PathBuf};

type Create = fn() -> DynSvc;

fn create<T: Default + Send + Sync + 'static>() -> DynSvc {
    Svc::new(T::default())
}

macro_rules! table {
    ($($ty:ty),* $(,)?) => {
        Lazy::new(|| {
            HashMap::from([
                $((TypeId::of::<$ty>(), create::<$ty> as Create)),*
            ])
        })
    };
}

static ZERO_VALUES: Lazy<HashMap<TypeId, Create>> = table![
    bool, char, i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize,
    f32, f64, (),
];

static EMPTY_VALUES: Lazy<HashMap<TypeId, Create>> =
    table![String, PathBuf, Vec<String>];

/// Gets the canonical zero value of a primitive type.
pub(crate) fn zero_value(descriptor: TypeDescriptor) -> Option<DynSvc> {
    ZERO_VALUES.get(&descriptor.id()).map(|create| create())
}

/// Gets the constructor for a freshly created, empty container.
pub(crate) fn empty_value(descriptor: TypeDescriptor) -> Option<Create> {
    EMPTY_VALUES.get(&descriptor.id()).copied()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn primitives_have_zero_values() {
        let zero = zero_value(TypeDescriptor::of::<i64>()).unwrap();
        assert_eq!(Some(&0), zero.downcast_ref::<i64>());

        let zero = zero_value(TypeDescriptor::of::<char>()).unwrap();
        assert_eq!(Some(&'\0'), zero.downcast_ref::<char>());

        assert!(zero_value(TypeDescriptor::of::<String>()).is_none());
    }

    #[test]
    fn empty_containers_are_fresh() {
        let create = empty_value(TypeDescriptor::of::<Vec<String>>()).unwrap();
        let first = create();
        let second = create();
        assert!(!Svc::ptr_eq(&first, &second));
        assert_eq!(Some(&Vec::<String>::new()), first.downcast_ref::<Vec<String>>());
    }
}
