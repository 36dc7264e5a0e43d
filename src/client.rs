//! # Client Module
//!
//! Assembly of a runnable [`RestClient`] from declarative configuration:
//! the counterpart of the upfront registration step that replaces runtime
//! reflection. [`RestClientBuilder`] resolves the provider override cascade,
//! obtains singleton providers from the registry, compiles endpoint
//! metadata, and registers one [`MethodBinding`] per method with the
//! dispatcher.
//!
//! A hand-written (or generated) typed client struct wraps the built
//! [`RestClient`], delegating each interface method to
//! [`RestClient::invoke`] / [`RestClient::invoke_plain`] with its method
//! name and positional arguments.

use crate::dispatcher::{Dispatcher, MethodBinding, PassthroughFn};
use crate::engine::ExecutionEngine;
use crate::envelope::ResponseEnvelope;
use crate::error::ClientError;
use crate::host::{DefaultHostResolver, HostResolver};
use crate::interceptor::{RemoveEmptyQueryInterceptor, RequestInterceptor};
use crate::meta::{compile_bare, compile_endpoint, ClientDefaults, EndpointConfig, EnvelopeSetting};
use crate::overrides::ProviderSlots;
use crate::spi::{
    ChainErrorHandler, DefaultBodySerializer, DefaultObjectConverter, DefaultParamPathBuilder,
    DefaultTransportConfig, ErrorReceiver, ProviderDiscovery, ProviderInstance, ProviderKind,
    ProviderRegistry, SimpleErrorHandler, SimpleUriHandler,
};
use crate::template::CallArg;
use crate::transport::{HttpTransport, Transport};
use once_cell::sync::Lazy;
use serde::de::DeserializeOwned;
use std::sync::Arc;
use tracing::info;

/// Key the built-in default implementation of every provider kind registers
/// under.
pub const DEFAULT_PROVIDER_KEY: &str = "default";

static DEFAULT_INTERCEPTOR: Lazy<Arc<dyn RequestInterceptor>> =
    Lazy::new(|| Arc::new(RemoveEmptyQueryInterceptor));

/// A built client: a named dispatcher with every method binding registered.
pub struct RestClient {
    name: String,
    dispatcher: Dispatcher,
}

impl RestClient {
    #[must_use]
    pub fn builder(name: impl Into<String>) -> RestClientBuilder {
        RestClientBuilder::new(name)
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    /// Invoke a method whose response decodes through the envelope `E`.
    ///
    /// # Errors
    ///
    /// See [`Dispatcher::invoke`].
    pub fn invoke<T, E>(&self, method: &str, args: &[CallArg]) -> Result<Option<T>, ClientError>
    where
        T: DeserializeOwned,
        E: ResponseEnvelope<T> + DeserializeOwned,
    {
        self.dispatcher.invoke::<T, E>(method, args)
    }

    /// Invoke a method decoded directly as `T`.
    ///
    /// # Errors
    ///
    /// See [`Dispatcher::invoke_plain`].
    pub fn invoke_plain<T>(&self, method: &str, args: &[CallArg]) -> Result<Option<T>, ClientError>
    where
        T: DeserializeOwned,
    {
        self.dispatcher.invoke_plain::<T>(method, args)
    }
}

/// Declarative client assembly.
pub struct RestClientBuilder {
    name: String,
    host: String,
    defaults: ClientDefaults,
    host_resolver: Option<Arc<dyn HostResolver>>,
    interceptor: Option<Arc<dyn RequestInterceptor>>,
    explicit_slots: ProviderSlots,
    type_slots: Option<ProviderSlots>,
    package_slots: Option<ProviderSlots>,
    discovery: Option<Arc<dyn ProviderDiscovery>>,
    registry: Option<Arc<ProviderRegistry>>,
    receivers: Vec<Arc<dyn ErrorReceiver>>,
    transport: Option<Arc<dyn Transport>>,
    endpoints: Vec<(EndpointConfig, Option<Arc<dyn RequestInterceptor>>)>,
    bare_methods: Vec<String>,
    passthroughs: Vec<(String, PassthroughFn)>,
}

impl RestClientBuilder {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            host: String::new(),
            defaults: ClientDefaults::default(),
            host_resolver: None,
            interceptor: None,
            explicit_slots: ProviderSlots::default(),
            type_slots: None,
            package_slots: None,
            discovery: None,
            registry: None,
            receivers: Vec::new(),
            transport: None,
            endpoints: Vec::new(),
            bare_methods: Vec::new(),
            passthroughs: Vec::new(),
        }
    }

    /// Host the default resolver serves; `${VAR}` placeholders are resolved
    /// from the environment. Ignored when a custom resolver is set.
    #[must_use]
    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.host = host.into();
        self
    }

    /// Base path prepended to every method path.
    #[must_use]
    pub fn base_path(mut self, base_path: impl Into<String>) -> Self {
        self.defaults.base_path = base_path.into();
        self
    }

    /// Content type used by methods that do not declare one.
    #[must_use]
    pub fn content_type(mut self, content_type: impl Into<String>) -> Self {
        self.defaults.content_type = content_type.into();
        self
    }

    /// Envelope decoding applied when a method leaves it unset.
    #[must_use]
    pub fn envelope(mut self, setting: EnvelopeSetting) -> Self {
        self.defaults.envelope = setting;
        self
    }

    /// Class-level default interceptor for every endpoint.
    #[must_use]
    pub fn interceptor(mut self, interceptor: Arc<dyn RequestInterceptor>) -> Self {
        self.interceptor = Some(interceptor);
        self
    }

    /// Custom host resolver shared by every endpoint.
    #[must_use]
    pub fn host_resolver(mut self, resolver: Arc<dyn HostResolver>) -> Self {
        self.host_resolver = Some(resolver);
        self
    }

    /// Provider slots attached directly to the client — the highest
    /// precedence level of the override cascade.
    #[must_use]
    pub fn provider_slots(mut self, slots: ProviderSlots) -> Self {
        self.explicit_slots = slots;
        self
    }

    /// Type-level provider slots, the middle cascade level.
    #[must_use]
    pub fn type_level_slots(mut self, slots: ProviderSlots) -> Self {
        self.type_slots = Some(slots);
        self
    }

    /// Package-level provider slots, the lowest cascade level.
    #[must_use]
    pub fn package_level_slots(mut self, slots: ProviderSlots) -> Self {
        self.package_slots = Some(slots);
        self
    }

    /// Discovery step supplying externally registered provider
    /// implementations.
    #[must_use]
    pub fn discovery(mut self, discovery: Arc<dyn ProviderDiscovery>) -> Self {
        self.discovery = Some(discovery);
        self
    }

    /// Share a provider registry across clients. Takes precedence over
    /// [`RestClientBuilder::discovery`].
    #[must_use]
    pub fn provider_registry(mut self, registry: Arc<ProviderRegistry>) -> Self {
        self.registry = Some(registry);
        self
    }

    /// Append a failure receiver. Receivers are consulted in registration
    /// order by the chain error handler.
    #[must_use]
    pub fn error_receiver(mut self, receiver: Arc<dyn ErrorReceiver>) -> Self {
        self.receivers.push(receiver);
        self
    }

    /// Replace the HTTP transport. The transport-config provider is not
    /// consulted for a custom transport.
    #[must_use]
    pub fn transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Register one endpoint method.
    #[must_use]
    pub fn endpoint(mut self, config: EndpointConfig) -> Self {
        self.endpoints.push((config, None));
        self
    }

    /// Register one endpoint method with its own interceptor.
    #[must_use]
    pub fn endpoint_with_interceptor(
        mut self,
        config: EndpointConfig,
        interceptor: Arc<dyn RequestInterceptor>,
    ) -> Self {
        self.endpoints.push((config, Some(interceptor)));
        self
    }

    /// Register a method without endpoint configuration: base path, GET and
    /// the client defaults across the board.
    #[must_use]
    pub fn bare_method(mut self, name: impl Into<String>) -> Self {
        self.bare_methods.push(name.into());
        self
    }

    /// Register a non-endpoint helper method. Calls bypass HTTP entirely and
    /// run the handler directly.
    #[must_use]
    pub fn passthrough<F>(mut self, name: impl Into<String>, handler: F) -> Self
    where
        F: Fn(&[CallArg]) -> Result<serde_json::Value, ClientError> + Send + Sync + 'static,
    {
        self.passthroughs.push((name.into(), Arc::new(handler)));
        self
    }

    /// Resolve the cascade, obtain providers, compile metadata and register
    /// every method.
    ///
    /// # Errors
    ///
    /// Construction faults for invalid configuration; transport build
    /// failures.
    pub fn build(self) -> Result<RestClient, ClientError> {
        if self.name.trim().is_empty() {
            return Err(ClientError::construction("client name must not be blank"));
        }

        let slots = ProviderSlots::resolve(
            &self.explicit_slots,
            self.type_slots.as_ref(),
            self.package_slots.as_ref(),
        );
        let registry = match self.registry {
            Some(registry) => registry,
            None => Arc::new(ProviderRegistry::new(self.discovery)),
        };

        let object_converter = registry
            .obtain(ProviderKind::ObjectConverter, slots.object_converter.as_deref(), || {
                (
                    DEFAULT_PROVIDER_KEY.to_string(),
                    ProviderInstance::ObjectConverter(Arc::new(DefaultObjectConverter)),
                )
            })
            .into_object_converter()?;
        let body_serializer = registry
            .obtain(ProviderKind::BodySerializer, slots.body_serializer.as_deref(), || {
                (
                    DEFAULT_PROVIDER_KEY.to_string(),
                    ProviderInstance::BodySerializer(Arc::new(DefaultBodySerializer::new())),
                )
            })
            .into_body_serializer()?;
        let param_path_builder = registry
            .obtain(
                ProviderKind::ParamPathBuilder,
                slots.param_path_builder.as_deref(),
                || {
                    (
                        DEFAULT_PROVIDER_KEY.to_string(),
                        ProviderInstance::ParamPathBuilder(Arc::new(DefaultParamPathBuilder)),
                    )
                },
            )
            .into_param_path_builder()?;
        let uri_handler = registry
            .obtain(ProviderKind::UriHandler, slots.uri_handler.as_deref(), || {
                (
                    DEFAULT_PROVIDER_KEY.to_string(),
                    ProviderInstance::UriHandler(Arc::new(SimpleUriHandler)),
                )
            })
            .into_uri_handler()?;
        let transport_config = registry
            .obtain(
                ProviderKind::TransportConfig,
                slots.transport_config.as_deref(),
                || {
                    (
                        DEFAULT_PROVIDER_KEY.to_string(),
                        ProviderInstance::TransportConfig(Arc::new(DefaultTransportConfig::from_env())),
                    )
                },
            )
            .into_transport_config()?;
        let receivers = self.receivers;
        let error_handler = registry
            .obtain(ProviderKind::ErrorHandler, slots.error_handler.as_deref(), || {
                let handler: Arc<dyn crate::spi::ErrorHandler> = if receivers.is_empty() {
                    Arc::new(SimpleErrorHandler)
                } else {
                    Arc::new(ChainErrorHandler::new(receivers))
                };
                (
                    DEFAULT_PROVIDER_KEY.to_string(),
                    ProviderInstance::ErrorHandler(handler),
                )
            })
            .into_error_handler()?;

        let transport: Arc<dyn Transport> = match self.transport {
            Some(transport) => transport,
            None => Arc::new(HttpTransport::new(transport_config.as_ref())?),
        };

        let engine = ExecutionEngine::new(
            self.name.clone(),
            transport,
            object_converter,
            body_serializer,
            param_path_builder,
            uri_handler,
            error_handler,
        );
        let dispatcher = Dispatcher::new(engine);

        let host_resolver: Arc<dyn HostResolver> = match self.host_resolver {
            Some(resolver) => resolver,
            None => Arc::new(DefaultHostResolver::new(&self.host)),
        };
        let class_interceptor = self
            .interceptor
            .unwrap_or_else(|| Arc::clone(&DEFAULT_INTERCEPTOR));

        for (config, endpoint_interceptor) in &self.endpoints {
            let metadata = compile_endpoint(&self.defaults, config)?;
            let interceptor = endpoint_interceptor
                .as_ref()
                .map_or_else(|| Arc::clone(&class_interceptor), Arc::clone);
            dispatcher.register_endpoint(MethodBinding {
                metadata: Arc::new(metadata),
                interceptor,
                host_resolver: Arc::clone(&host_resolver),
            });
        }
        for name in &self.bare_methods {
            let metadata = compile_bare(&self.defaults, name);
            dispatcher.register_endpoint(MethodBinding {
                metadata: Arc::new(metadata),
                interceptor: Arc::clone(&class_interceptor),
                host_resolver: Arc::clone(&host_resolver),
            });
        }
        for (name, handler) in self.passthroughs {
            dispatcher.register_passthrough(&name, move |args| handler(args));
        }

        info!(
            client = %self.name,
            endpoint_count = self.endpoints.len() + self.bare_methods.len(),
            "rest client built"
        );
        Ok(RestClient {
            name: self.name,
            dispatcher,
        })
    }
}
