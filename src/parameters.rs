use crate::{
    markers, DefaultProvider, InjectError, InjectResult, Parameter,
    ResolutionContext, Resolvable, Resolved, Shape, Svc, TypeDescriptor,
};
use std::{
    fmt::{Debug, Formatter},
    marker::PhantomData,
};
use tracing::debug;

/// A resolved argument of a constructor or method.
#[derive(Clone)]
pub(crate) enum Argument {
    Value(Resolved),
    Lazy(DefaultProvider, TypeDescriptor),
}

/// The arguments passed to a constructor or method, in parameter order.
///
/// ## Example
///
/// ```
/// use runtime_defaults::{
///     Constructor, DefaultProvider, Parameter, Svc, TypeMetadata,
///     TypeRegistry,
/// };
///
/// struct Config {
///     retries: Option<Svc<u32>>,
/// }
///
/// let mut registry = TypeRegistry::new();
/// registry.register(
///     TypeMetadata::concrete::<Config>().constructor(
///         Constructor::new(|args| {
///             Ok(Config {
///                 retries: args.value(0)?,
///             })
///         })
///         .param(Parameter::of::<u32>()),
///     ),
/// );
///
/// let provider = DefaultProvider::builder().registry(registry).build();
/// let config: Svc<Config> = provider.get().unwrap().unwrap();
/// assert_eq!(Some(0), config.retries.as_deref().copied());
/// ```
#[derive(Clone, Default)]
pub struct Arguments {
    values: Vec<Argument>,
}

impl Arguments {
    /// Creates an empty argument list.
    #[must_use]
    pub fn new() -> Self {
        Arguments::default()
    }

    /// Reads an argument. Returns `None` if the argument resolved to null
    /// or to an empty absence box.
    pub fn value<T: ?Sized + Resolvable>(
        &self,
        index: usize,
    ) -> InjectResult<Option<Svc<T>>> {
        let invalid = || InjectError::InvalidArgument {
            descriptor: TypeDescriptor::of::<T>(),
            index,
        };

        match self.values.get(index) {
            Some(Argument::Value(Some(value))) => {
                T::from_dyn(value.clone()).map(Some).ok_or_else(invalid)
            }
            Some(Argument::Value(None)) => Ok(None),
            Some(Argument::Lazy(..)) | None => Err(invalid()),
        }
    }

    /// Reads a lazily resolved argument.
    pub fn lazy<T: ?Sized + Resolvable>(&self, index: usize) -> InjectResult<Lazy<T>> {
        match self.values.get(index) {
            Some(Argument::Lazy(provider, descriptor))
                if *descriptor == TypeDescriptor::of::<T>() =>
            {
                Ok(Lazy {
                    provider: provider.clone(),
                    marker: PhantomData,
                })
            }
            _ => Err(InjectError::InvalidArgument {
                descriptor: TypeDescriptor::of::<T>(),
                index,
            }),
        }
    }

    /// Gets the number of arguments.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether there are no arguments.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl Debug for Arguments {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Arguments")
            .field("len", &self.values.len())
            .finish_non_exhaustive()
    }
}

/// A deferred request for a default value. Each call to [`Lazy::get`]
/// resolves the type again as a new root request, so a type may hold a lazy
/// reference to itself.
pub struct Lazy<T: ?Sized> {
    provider: DefaultProvider,
    marker: PhantomData<fn() -> Svc<T>>,
}

impl<T: ?Sized + Resolvable> Lazy<T> {
    /// Resolves the value.
    pub fn get(&self) -> InjectResult<Option<Svc<T>>> {
        self.provider.get::<T>()
    }
}

impl<T: ?Sized> Clone for Lazy<T> {
    fn clone(&self) -> Self {
        Lazy {
            provider: self.provider.clone(),
            marker: PhantomData,
        }
    }
}

impl<T: ?Sized> Debug for Lazy<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Lazy")
            .field("type", &std::any::type_name::<T>())
            .finish_non_exhaustive()
    }
}

/// Resolves the arguments for a list of parameters. Parameters that allow
/// absence resolve to null when their type can't be resolved; failures of
/// any other parameter are returned.
pub(crate) fn resolve_parameters(
    provider: &DefaultProvider,
    parameters: &[Parameter],
    context: &ResolutionContext,
) -> InjectResult<Arguments> {
    let mut values = Vec::with_capacity(parameters.len());
    for parameter in parameters {
        let descriptor = parameter.descriptor();
        let argument = match parameter.shape() {
            Shape::Lazy => Argument::Lazy(provider.clone(), descriptor),
            Shape::Optional => Argument::Value(resolve_or_null(
                provider, descriptor, context,
            )),
            Shape::Plain if parameter.markers().has(markers::NULLABLE) => {
                Argument::Value(resolve_or_null(provider, descriptor, context))
            }
            Shape::Plain => {
                Argument::Value(provider.get_with(descriptor, context)?)
            }
        };

        values.push(argument);
    }

    Ok(Arguments { values })
}

fn resolve_or_null(
    provider: &DefaultProvider,
    descriptor: TypeDescriptor,
    context: &ResolutionContext,
) -> Resolved {
    provider
        .get_with(descriptor, context)
        .unwrap_or_else(|error| {
            debug!(
                parameter = descriptor.name(),
                %error,
                "parameter allows absence, substituting null"
            );
            None
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Bindings;

    #[test]
    fn arguments_are_typed() {
        let mut builder = Bindings::builder();
        builder.bind(Svc::new(5u32));
        let provider = DefaultProvider::builder()
            .bindings(builder.build())
            .build();

        let parameters = [
            Parameter::of::<u32>(),
            Parameter::lazy::<u32>(),
            Parameter::optional::<String>(),
        ];
        let args = resolve_parameters(
            &provider,
            &parameters,
            &ResolutionContext::new(),
        )
        .unwrap();

        assert_eq!(3, args.len());
        assert_eq!(Some(5), args.value::<u32>(0).unwrap().map(|v| *v));
        assert_eq!(Some(5), args.lazy::<u32>(1).unwrap().get().unwrap().map(|v| *v));
        assert_eq!(
            Some(String::new()),
            args.value::<String>(2).unwrap().map(|v| (*v).clone())
        );
    }

    #[test]
    fn mismatched_arguments_are_rejected() {
        let provider = DefaultProvider::builder().build();
        let args = resolve_parameters(
            &provider,
            &[Parameter::of::<u32>(), Parameter::lazy::<u32>()],
            &ResolutionContext::new(),
        )
        .unwrap();

        match args.value::<u8>(0) {
            Err(InjectError::InvalidArgument { index: 0, .. }) => {}
            result => panic!("unexpected result: {:?}", result.map(|_| ())),
        }
        match args.value::<u32>(1) {
            Err(InjectError::InvalidArgument { index: 1, .. }) => {}
            result => panic!("unexpected result: {:?}", result.map(|_| ())),
        }
        match args.lazy::<u8>(1) {
            Err(InjectError::InvalidArgument { index: 1, .. }) => {}
            result => panic!("unexpected result: {:?}", result.map(|_| ())),
        }
        match args.value::<u32>(5) {
            Err(InjectError::InvalidArgument { index: 5, .. }) => {}
            result => panic!("unexpected result: {:?}", result.map(|_| ())),
        }
    }

    #[test]
    fn plain_parameter_failures_propagate() {
        let descriptor = TypeDescriptor::of::<u32>();
        let context = ResolutionContext::new().with_request(descriptor);
        let provider = DefaultProvider::builder().build();

        match resolve_parameters(&provider, &[Parameter::of::<u32>()], &context) {
            Err(InjectError::CyclicDependency { .. }) => {}
            result => panic!("unexpected result: {:?}", result),
        }

        let args = resolve_parameters(
            &provider,
            &[Parameter::nullable::<u32>(), Parameter::optional::<u32>()],
            &context,
        )
        .unwrap();
        assert!(args.value::<u32>(0).unwrap().is_none());
        assert!(args.value::<u32>(1).unwrap().is_none());
    }
}
