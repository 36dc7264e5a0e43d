//! # Dispatcher Module
//!
//! Per-call entry point of a built client. The dispatcher owns the registry
//! mapping method names to their precomputed [`MethodBinding`]s and routes
//! each invocation to the execution engine — or, for registered passthrough
//! methods, straight to a local handler with no HTTP involved. Passthroughs
//! are what let one client mix declarative endpoints with ordinary helper
//! methods.
//!
//! Registration is safe under concurrent startup: the method table is a
//! concurrent map and bindings are immutable once inserted.

use crate::engine::ExecutionEngine;
use crate::envelope::{NoEnvelope, ResponseEnvelope};
use crate::error::ClientError;
use crate::host::HostResolver;
use crate::interceptor::RequestInterceptor;
use crate::meta::EndpointMetadata;
use crate::template::CallArg;
use dashmap::DashMap;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, warn};

/// Everything one endpoint method needs at call time, resolved once at
/// build time.
pub struct MethodBinding {
    pub metadata: Arc<EndpointMetadata>,
    pub interceptor: Arc<dyn RequestInterceptor>,
    pub host_resolver: Arc<dyn HostResolver>,
}

/// Cached handler of a passthrough (non-endpoint) method.
pub type PassthroughFn = Arc<dyn Fn(&[CallArg]) -> Result<Value, ClientError> + Send + Sync>;

#[derive(Clone)]
enum MethodEntry {
    Endpoint(Arc<MethodBinding>),
    Passthrough(PassthroughFn),
}

/// Routes invocations by method name.
pub struct Dispatcher {
    engine: ExecutionEngine,
    methods: DashMap<String, MethodEntry>,
}

impl Dispatcher {
    pub(crate) fn new(engine: ExecutionEngine) -> Self {
        Self {
            engine,
            methods: DashMap::new(),
        }
    }

    /// Register an endpoint binding. Re-registering a name replaces the old
    /// binding.
    pub fn register_endpoint(&self, binding: MethodBinding) {
        let name = binding.metadata.name().to_string();
        let replaced = self
            .methods
            .insert(name.clone(), MethodEntry::Endpoint(Arc::new(binding)));
        if replaced.is_some() {
            warn!(method_name = %name, "replaced existing method binding");
        } else {
            debug!(
                method_name = %name,
                total_methods = self.methods.len(),
                "method binding registered"
            );
        }
    }

    /// Register a passthrough method: invoked directly, bypassing HTTP.
    pub fn register_passthrough<F>(&self, name: &str, handler: F)
    where
        F: Fn(&[CallArg]) -> Result<Value, ClientError> + Send + Sync + 'static,
    {
        let replaced = self
            .methods
            .insert(name.to_string(), MethodEntry::Passthrough(Arc::new(handler)));
        if replaced.is_some() {
            warn!(method_name = name, "replaced existing method binding");
        }
    }

    /// Invoke a method whose response decodes through the envelope `E`.
    ///
    /// # Errors
    ///
    /// [`ClientError::UnregisteredMethod`] when no binding exists under
    /// `name`; otherwise whatever the execution engine propagates.
    pub fn invoke<T, E>(&self, name: &str, args: &[CallArg]) -> Result<Option<T>, ClientError>
    where
        T: DeserializeOwned,
        E: ResponseEnvelope<T> + DeserializeOwned,
    {
        let entry = match self.methods.get(name) {
            Some(entry) => entry.clone(),
            None => {
                return Err(ClientError::UnregisteredMethod {
                    name: name.to_string(),
                })
            }
        };
        match entry {
            MethodEntry::Endpoint(binding) => self.engine.send_request::<T, E>(&binding, args),
            MethodEntry::Passthrough(handler) => {
                debug!(method_name = name, "bypassing http for passthrough method");
                let value = handler(args)?;
                if value.is_null() {
                    return Ok(None);
                }
                serde_json::from_value(value)
                    .map(Some)
                    .map_err(|source| ClientError::Decode {
                        message: format!(
                            "passthrough result of '{name}' does not match the declared type"
                        ),
                        source,
                    })
            }
        }
    }

    /// Invoke a method decoded directly as `T`, without an envelope.
    ///
    /// # Errors
    ///
    /// Same as [`Dispatcher::invoke`].
    pub fn invoke_plain<T>(&self, name: &str, args: &[CallArg]) -> Result<Option<T>, ClientError>
    where
        T: DeserializeOwned,
    {
        self.invoke::<T, NoEnvelope<T>>(name, args)
    }

    /// Names of every registered method, endpoints and passthroughs alike.
    #[must_use]
    pub fn method_names(&self) -> Vec<String> {
        self.methods.iter().map(|e| e.key().clone()).collect()
    }
}
