use super::config::TransportConfig;
use super::convert::ObjectConverter;
use super::error_handler::ErrorHandler;
use super::serialize::{BodySerializer, ParamPathBuilder};
use super::uri::UriHandler;
use crate::error::ClientError;
use crate::overrides::ProviderKey;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use tracing::{debug, warn};

/// The six pluggable SPI seams of the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProviderKind {
    BodySerializer,
    ParamPathBuilder,
    ObjectConverter,
    TransportConfig,
    ErrorHandler,
    UriHandler,
}

impl std::fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ProviderKind::BodySerializer => "BodySerializer",
            ProviderKind::ParamPathBuilder => "ParamPathBuilder",
            ProviderKind::ObjectConverter => "ObjectConverter",
            ProviderKind::TransportConfig => "TransportConfig",
            ProviderKind::ErrorHandler => "ErrorHandler",
            ProviderKind::UriHandler => "UriHandler",
        };
        write!(f, "{s}")
    }
}

/// A singleton provider implementation, tagged with the seam it serves.
#[derive(Clone)]
pub enum ProviderInstance {
    BodySerializer(Arc<dyn BodySerializer>),
    ParamPathBuilder(Arc<dyn ParamPathBuilder>),
    ObjectConverter(Arc<dyn ObjectConverter>),
    TransportConfig(Arc<dyn TransportConfig>),
    ErrorHandler(Arc<dyn ErrorHandler>),
    UriHandler(Arc<dyn UriHandler>),
}

impl ProviderInstance {
    #[must_use]
    pub fn kind(&self) -> ProviderKind {
        match self {
            ProviderInstance::BodySerializer(_) => ProviderKind::BodySerializer,
            ProviderInstance::ParamPathBuilder(_) => ProviderKind::ParamPathBuilder,
            ProviderInstance::ObjectConverter(_) => ProviderKind::ObjectConverter,
            ProviderInstance::TransportConfig(_) => ProviderKind::TransportConfig,
            ProviderInstance::ErrorHandler(_) => ProviderKind::ErrorHandler,
            ProviderInstance::UriHandler(_) => ProviderKind::UriHandler,
        }
    }

    pub(crate) fn into_body_serializer(self) -> Result<Arc<dyn BodySerializer>, ClientError> {
        match self {
            ProviderInstance::BodySerializer(p) => Ok(p),
            other => Err(wrong_kind(ProviderKind::BodySerializer, other.kind())),
        }
    }

    pub(crate) fn into_param_path_builder(self) -> Result<Arc<dyn ParamPathBuilder>, ClientError> {
        match self {
            ProviderInstance::ParamPathBuilder(p) => Ok(p),
            other => Err(wrong_kind(ProviderKind::ParamPathBuilder, other.kind())),
        }
    }

    pub(crate) fn into_object_converter(self) -> Result<Arc<dyn ObjectConverter>, ClientError> {
        match self {
            ProviderInstance::ObjectConverter(p) => Ok(p),
            other => Err(wrong_kind(ProviderKind::ObjectConverter, other.kind())),
        }
    }

    pub(crate) fn into_transport_config(self) -> Result<Arc<dyn TransportConfig>, ClientError> {
        match self {
            ProviderInstance::TransportConfig(p) => Ok(p),
            other => Err(wrong_kind(ProviderKind::TransportConfig, other.kind())),
        }
    }

    pub(crate) fn into_error_handler(self) -> Result<Arc<dyn ErrorHandler>, ClientError> {
        match self {
            ProviderInstance::ErrorHandler(p) => Ok(p),
            other => Err(wrong_kind(ProviderKind::ErrorHandler, other.kind())),
        }
    }

    pub(crate) fn into_uri_handler(self) -> Result<Arc<dyn UriHandler>, ClientError> {
        match self {
            ProviderInstance::UriHandler(p) => Ok(p),
            other => Err(wrong_kind(ProviderKind::UriHandler, other.kind())),
        }
    }
}

fn wrong_kind(expected: ProviderKind, actual: ProviderKind) -> ClientError {
    ClientError::construction(format!(
        "provider registered for {actual} was requested as {expected}"
    ))
}

/// Supplies externally registered provider implementations, keyed by
/// [`ProviderKey`]. Populated by an upfront configuration step; the registry
/// queries it once per provider kind.
pub trait ProviderDiscovery: Send + Sync {
    fn discover(&self, kind: ProviderKind) -> Vec<(ProviderKey, ProviderInstance)>;
}

struct KindProviders {
    all: HashMap<ProviderKey, ProviderInstance>,
    default_instance: ProviderInstance,
}

/// Singleton cache of provider instances, one bucket per [`ProviderKind`].
///
/// Buckets populate lazily under double-checked locking: a read-locked fast
/// path, then a write lock that re-checks before building, so concurrent
/// client construction populates each bucket exactly once. Entries are
/// immutable for the registry's lifetime; there is no refresh or eviction.
pub struct ProviderRegistry {
    discovery: Option<Arc<dyn ProviderDiscovery>>,
    kinds: RwLock<HashMap<ProviderKind, Arc<KindProviders>>>,
}

impl ProviderRegistry {
    #[must_use]
    pub fn new(discovery: Option<Arc<dyn ProviderDiscovery>>) -> Self {
        Self {
            discovery,
            kinds: RwLock::new(HashMap::new()),
        }
    }

    /// Look up the provider registered under `requested`, falling back to the
    /// default instance when the key is absent or `None`.
    ///
    /// `default_factory` runs at most once per kind, and only when discovery
    /// did not already supply an instance under the default key.
    pub fn obtain<F>(
        &self,
        kind: ProviderKind,
        requested: Option<&str>,
        default_factory: F,
    ) -> ProviderInstance
    where
        F: FnOnce() -> (ProviderKey, ProviderInstance),
    {
        let providers = self.providers_for(kind, default_factory);
        match requested.and_then(|key| providers.all.get(key)) {
            Some(instance) => instance.clone(),
            None => providers.default_instance.clone(),
        }
    }

    fn providers_for<F>(&self, kind: ProviderKind, default_factory: F) -> Arc<KindProviders>
    where
        F: FnOnce() -> (ProviderKey, ProviderInstance),
    {
        if let Ok(kinds) = self.kinds.read() {
            if let Some(providers) = kinds.get(&kind) {
                return Arc::clone(providers);
            }
        }
        let mut kinds = match self.kinds.write() {
            Ok(kinds) => kinds,
            Err(poisoned) => poisoned.into_inner(),
        };
        // Re-check under the write lock: another caller may have populated
        // the bucket while we waited.
        if let Some(providers) = kinds.get(&kind) {
            return Arc::clone(providers);
        }

        let mut all = HashMap::new();
        if let Some(discovery) = &self.discovery {
            for (key, instance) in discovery.discover(kind) {
                if instance.kind() != kind {
                    warn!(
                        provider_key = %key,
                        expected = %kind,
                        actual = %instance.kind(),
                        "discovered provider registered under wrong kind, skipping"
                    );
                    continue;
                }
                all.insert(key, instance);
            }
        }
        // A discovered instance under the default key takes precedence over
        // the factory-built one.
        let (default_key, factory_instance) = default_factory();
        let default_instance = all
            .entry(default_key)
            .or_insert(factory_instance)
            .clone();
        debug!(kind = %kind, provider_count = all.len(), "provider bucket populated");

        let providers = Arc::new(KindProviders {
            all,
            default_instance,
        });
        kinds.insert(kind, Arc::clone(&providers));
        providers
    }
}
