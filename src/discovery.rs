use crate::{
    interface, Arguments, BoxError, DefaultProvider, InjectError, InjectResult,
    Resolvable, Resolved, Service, Svc, TypeDescriptor, TypeRegistry,
    Visibility,
};
use derive_more::Display;
use figment::{providers::Env, Figment};
use once_cell::sync::OnceCell;
use serde::{Deserialize, Serialize};
use std::{
    collections::HashMap,
    error::Error,
    fmt::{Debug, Formatter},
};
use tracing::{debug, warn};

/// The name of the catalog entry used when no provider is configured.
pub const DEFAULT_PROVIDER: &str = "default";

/// Something that can resolve default values. Requests for
/// `dyn ProvideDefaults` resolve to the provider handling the request.
pub trait ProvideDefaults: Service {
    /// Gets a default value of a type. Returns `None` if the type resolves to
    /// null.
    fn get_dyn(&self, descriptor: TypeDescriptor) -> InjectResult<Resolved>;
}

interface!(ProvideDefaults);

impl dyn ProvideDefaults {
    /// Gets a default value of a type. Returns `None` if the type resolves to
    /// null.
    pub fn get<T: ?Sized + Resolvable>(&self) -> InjectResult<Option<Svc<T>>> {
        let descriptor = TypeDescriptor::of::<T>();
        self.get_dyn(descriptor)?
            .map(|value| {
                T::from_dyn(value).ok_or(InjectError::InvalidProvider { descriptor })
            })
            .transpose()
    }

    /// Gets a default value of a type. Returns `None` if the type resolves to
    /// null or can't be resolved.
    #[must_use]
    pub fn optional<T: ?Sized + Resolvable>(&self) -> Option<Svc<T>> {
        self.get::<T>().ok().flatten()
    }
}

impl ProvideDefaults for DefaultProvider {
    fn get_dyn(&self, descriptor: TypeDescriptor) -> InjectResult<Resolved> {
        DefaultProvider::get_dyn(self, descriptor)
    }
}

/// A minimal provider which only calls public constructors without
/// parameters. Every other type resolves to null.
#[derive(Clone, Debug, Default)]
pub struct ConstructorOnlyProvider {
    registry: Svc<TypeRegistry>,
}

impl ConstructorOnlyProvider {
    /// Creates a provider calling the constructors described by `registry`.
    #[must_use]
    pub fn new(registry: TypeRegistry) -> Self {
        ConstructorOnlyProvider {
            registry: Svc::new(registry),
        }
    }
}

impl ProvideDefaults for ConstructorOnlyProvider {
    fn get_dyn(&self, descriptor: TypeDescriptor) -> InjectResult<Resolved> {
        let constructor = self.registry.get(descriptor).and_then(|metadata| {
            metadata.constructors().iter().find(|constructor| {
                constructor.visibility() == Visibility::Public
                    && constructor.parameters().is_empty()
            })
        });

        match constructor {
            Some(constructor) => constructor
                .invoke(&Arguments::new())
                .map(Some)
                .map_err(|error| InjectError::from_foreign(descriptor, error)),
            None => Ok(None),
        }
    }
}

type ProviderFactory =
    Svc<dyn Fn() -> Result<Svc<dyn ProvideDefaults>, BoxError> + Send + Sync>;

/// Named factories for providers which can back the process-wide provider.
#[derive(Clone, Default)]
pub struct ProviderCatalog {
    factories: HashMap<String, ProviderFactory>,
}

impl ProviderCatalog {
    /// Creates an empty catalog.
    #[must_use]
    pub fn new() -> Self {
        ProviderCatalog::default()
    }

    /// Creates a catalog with an empty [`DefaultProvider`] registered as
    /// [`DEFAULT_PROVIDER`].
    #[must_use]
    pub fn with_builtin() -> Self {
        let mut catalog = ProviderCatalog::new();
        catalog.register(DEFAULT_PROVIDER, || {
            Ok(Svc::new(DefaultProvider::builder().build()))
        });
        catalog
    }

    /// Registers a factory under a name, replacing any factory registered
    /// under the same name.
    pub fn register<P, F>(&mut self, name: impl Into<String>, factory: F) -> &mut Self
    where
        P: ProvideDefaults,
        F: Fn() -> Result<Svc<P>, BoxError> + Send + Sync + 'static,
    {
        let factory: ProviderFactory = Svc::new(move || {
            factory().map(|provider| provider as Svc<dyn ProvideDefaults>)
        });
        self.factories.insert(name.into(), factory);
        self
    }

    /// Whether a factory is registered under the name.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.factories.contains_key(name)
    }

    fn load(&self, name: &str) -> Option<Result<Svc<dyn ProvideDefaults>, BoxError>> {
        self.factories.get(name).map(|factory| factory())
    }
}

impl Debug for ProviderCatalog {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_set().entries(self.factories.keys()).finish()
    }
}

/// Which catalog entries back the process-wide provider.
#[derive(Clone, PartialEq, Eq, Debug, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct DiscoveryConfig {
    /// An entry which must be used. Failing to load it is an error.
    pub required: Option<String>,

    /// An entry which should be used if it can be loaded.
    pub suggested: Option<String>,
}

impl DiscoveryConfig {
    /// The prefix of the environment variables read by
    /// [`DiscoveryConfig::from_env`].
    pub const ENV_PREFIX: &'static str = "RUNTIME_DEFAULTS_";

    /// Reads the configuration from `RUNTIME_DEFAULTS_REQUIRED` and
    /// `RUNTIME_DEFAULTS_SUGGESTED`.
    pub fn from_env() -> Result<Self, DiscoveryError> {
        Self::from_figment(Figment::new().merge(Env::prefixed(Self::ENV_PREFIX)))
    }

    /// Reads the configuration from any figment.
    pub fn from_figment(figment: Figment) -> Result<Self, DiscoveryError> {
        figment.extract().map_err(DiscoveryError::Config)
    }
}

/// An error that has occurred while choosing the process-wide provider.
#[derive(Debug, Display)]
#[non_exhaustive]
pub enum DiscoveryError {
    /// The required provider isn't registered or failed to load.
    #[display(fmt = "required provider {} is unavailable", name)]
    RequiredUnavailable {
        /// The name of the required provider.
        name: String,

        /// The error raised while loading it, if it is registered.
        inner: Option<BoxError>,
    },

    /// The configuration couldn't be read.
    #[display(fmt = "invalid discovery configuration: {}", _0)]
    Config(figment::Error),
}

impl Error for DiscoveryError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            DiscoveryError::RequiredUnavailable {
                inner: Some(inner), ..
            } => Some(inner.as_ref()),
            DiscoveryError::RequiredUnavailable { inner: None, .. } => None,
            DiscoveryError::Config(inner) => Some(inner),
        }
    }
}

/// Chooses the provider backing a process, once.
///
/// The configured required entry is used if set. Otherwise the suggested
/// entry is tried, then the [`DEFAULT_PROVIDER`] entry, then a
/// [`ConstructorOnlyProvider`].
///
/// ## Example
///
/// ```
/// use runtime_defaults::{Discovery, DiscoveryConfig, ProviderCatalog, Svc};
///
/// let discovery = Discovery::new(
///     ProviderCatalog::with_builtin(),
///     DiscoveryConfig {
///         required: None,
///         suggested: Some("missing".to_owned()),
///     },
/// );
///
/// let provider = discovery.provider().unwrap();
/// let value: Svc<u32> = provider.get().unwrap().unwrap();
/// assert_eq!(0, *value);
/// ```
pub struct Discovery {
    catalog: ProviderCatalog,
    config: DiscoveryConfig,
    fallback_registry: Svc<TypeRegistry>,
    provider: OnceCell<Svc<dyn ProvideDefaults>>,
}

impl Discovery {
    /// Creates a discovery over the given catalog.
    #[must_use]
    pub fn new(catalog: ProviderCatalog, config: DiscoveryConfig) -> Self {
        Discovery {
            catalog,
            config,
            fallback_registry: Svc::new(TypeRegistry::new()),
            provider: OnceCell::new(),
        }
    }

    /// Creates a discovery over the built-in catalog, configured from the
    /// environment.
    pub fn from_env() -> Result<Self, DiscoveryError> {
        Ok(Discovery::new(
            ProviderCatalog::with_builtin(),
            DiscoveryConfig::from_env()?,
        ))
    }

    /// Sets the registry used by the [`ConstructorOnlyProvider`] fallback.
    #[must_use]
    pub fn fallback_registry(mut self, registry: TypeRegistry) -> Self {
        self.fallback_registry = Svc::new(registry);
        self
    }

    /// Gets the chosen provider, choosing it on first use.
    pub fn provider(&self) -> Result<Svc<dyn ProvideDefaults>, DiscoveryError> {
        self.provider.get_or_try_init(|| self.discover()).cloned()
    }

    fn discover(&self) -> Result<Svc<dyn ProvideDefaults>, DiscoveryError> {
        if let Some(name) = &self.config.required {
            return match self.catalog.load(name) {
                Some(Ok(provider)) => {
                    debug!(provider = name.as_str(), "using required provider");
                    Ok(provider)
                }
                Some(Err(inner)) => Err(DiscoveryError::RequiredUnavailable {
                    name: name.clone(),
                    inner: Some(inner),
                }),
                None => Err(DiscoveryError::RequiredUnavailable {
                    name: name.clone(),
                    inner: None,
                }),
            };
        }

        let candidates = self
            .config
            .suggested
            .iter()
            .map(String::as_str)
            .chain(std::iter::once(DEFAULT_PROVIDER));
        for name in candidates {
            match self.catalog.load(name) {
                Some(Ok(provider)) => {
                    debug!(provider = name, "using provider");
                    return Ok(provider);
                }
                Some(Err(error)) => {
                    warn!(provider = name, %error, "provider failed to load, falling back");
                }
                None => {
                    warn!(provider = name, "provider is not registered, falling back");
                }
            }
        }

        Ok(Svc::new(ConstructorOnlyProvider {
            registry: self.fallback_registry.clone(),
        }))
    }
}

impl Debug for Discovery {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Discovery")
            .field("catalog", &self.catalog)
            .field("config", &self.config)
            .field("resolved", &self.provider.get().is_some())
            .finish_non_exhaustive()
    }
}

static GLOBAL: OnceCell<Discovery> = OnceCell::new();

/// Installs the discovery backing [`global`]. Returns the discovery back if
/// one was already installed or [`global`] was already used.
pub fn install_global(discovery: Discovery) -> Result<(), Discovery> {
    GLOBAL.set(discovery)
}

/// Gets the process-wide provider. If no discovery was installed, one is
/// created over the built-in catalog and configured from the environment.
pub fn global() -> Result<Svc<dyn ProvideDefaults>, DiscoveryError> {
    GLOBAL.get_or_try_init(Discovery::from_env)?.provider()
}
