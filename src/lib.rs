//! # restbind
//!
//! **restbind** is a declarative REST client engine for Rust. You describe an
//! interface once — per-method paths, HTTP methods, parameter bindings,
//! response envelopes — and restbind compiles that description into immutable
//! per-method metadata. At call time the engine turns positional arguments
//! into an HTTP request, executes it over a pluggable transport, and decodes
//! the response back into your typed result.
//!
//! ## Architecture
//!
//! The library is organized into several key modules:
//!
//! - **[`meta`]** - Compilation of endpoint configuration into per-method metadata
//! - **[`overrides`]** - Three-level provider override cascade
//! - **[`spi`]** - Pluggable provider seams (serializers, converters, error handlers) and their registry
//! - **[`path_template`]** - `{placeholder}` scan and substitution over path templates
//! - **[`template`]** - Per-call request template construction
//! - **[`interceptor`]** - Mutating pre-dispatch hook
//! - **[`host`]** - Host resolution
//! - **[`envelope`]** - Generic success/failure response wrappers
//! - **[`engine`]** - The invocation state machine and suppressible-failure protocol
//! - **[`dispatcher`]** - Method-name routing, endpoint or passthrough
//! - **[`client`]** - Builder assembling all of the above into a [`RestClient`]
//! - **[`transport`]** - The single I/O seam; blocking `reqwest` by default
//!
//! ## Invocation Flow
//!
//! ```text
//! invoke(name, args)
//!   └─ Dispatcher ── passthrough? ──────────────► local handler
//!        └─ ExecutionEngine
//!             ├─ BUILD_TEMPLATE   fields × args → RequestTemplate
//!             ├─ INTERCEPT        interceptor mutates template
//!             ├─ DISPATCH         url + headers + body → Transport
//!             └─ EXTRACT          envelope callback → data()
//! ```
//!
//! Failures from INTERCEPT onward can be absorbed by a matched error
//! receiver, turning the call result into `Ok(None)` instead of a fault.
//!
//! ## Quick Start
//!
//! ```no_run
//! use restbind::client::RestClient;
//! use restbind::meta::{EndpointConfig, FieldKind, FieldSpec};
//! use restbind::template::CallArg;
//! use http::Method;
//!
//! let client = RestClient::builder("user-service")
//!     .host("http://users.internal:8080")
//!     .base_path("/api/v1")
//!     .endpoint(
//!         EndpointConfig::new("get_user", Method::GET, "/users/{id}")
//!             .param_spec("id", true, FieldSpec::new(FieldKind::PathVariable))
//!             .param("verbose", true),
//!     )
//!     .build()
//!     .expect("build client");
//!
//! let user: Option<serde_json::Value> = client
//!     .invoke_plain("get_user", &[CallArg::of(&17).unwrap(), CallArg::of(&true).unwrap()])
//!     .expect("call get_user");
//! ```
//!
//! A hand-written or generated typed client struct typically wraps
//! [`client::RestClient`], one thin method per endpoint.
//!
//! ## What restbind does not do
//!
//! Connection pooling, retries, load balancing and TLS configuration are the
//! transport's business; the default transport delegates them to `reqwest`.

pub mod client;
pub mod context;
pub mod dispatcher;
pub mod engine;
pub mod env;
pub mod envelope;
pub mod error;
pub mod host;
pub mod interceptor;
pub mod meta;
pub mod overrides;
pub mod path_template;
pub mod spi;
pub mod template;
pub mod transport;

pub use client::{RestClient, RestClientBuilder};
pub use context::RequestContext;
pub use dispatcher::{Dispatcher, MethodBinding};
pub use envelope::{NoEnvelope, ResponseEnvelope};
pub use error::{ClientError, TransportFault};
pub use meta::{
    ClientDefaults, EndpointConfig, EndpointMetadata, EnvelopeSetting, FieldDescriptor, FieldKind,
    FieldSpec,
};
pub use overrides::ProviderSlots;
pub use template::{CallArg, RequestTemplate};
