//! # SPI Module
//!
//! The six pluggable provider seams of the invocation engine and their
//! default implementations:
//!
//! - [`BodySerializer`] — request-body map → wire body, per content type
//! - [`ParamPathBuilder`] — query map → `?`-prefixed query path
//! - [`ObjectConverter`] — complex argument → flat entry map
//! - [`TransportConfig`] — connect/read timeouts for the default transport
//! - [`ErrorHandler`] — failing-response observation and absorption
//! - [`UriHandler`] — final URL formatting (query-value encoding)
//!
//! Implementations are singletons cached by the [`ProviderRegistry`]; which
//! implementation a client uses is decided by the override cascade
//! (`crate::overrides`) and an optional [`ProviderDiscovery`] step.

mod config;
mod convert;
mod error_handler;
mod registry;
mod serialize;
mod uri;

pub use config::{DefaultTransportConfig, TransportConfig};
pub use convert::{DefaultObjectConverter, ObjectConverter};
pub use error_handler::{
    ChainErrorHandler, ErrorHandler, ErrorReceiver, RequestMatcher, ResponseSnapshot,
    SimpleErrorHandler,
};
pub use registry::{ProviderDiscovery, ProviderInstance, ProviderKind, ProviderRegistry};
pub use serialize::{
    BodySerializer, DefaultBodySerializer, DefaultParamPathBuilder, ParamPathBuilder, RequestBody,
    TypedSerializer,
};
pub use uri::{SimpleUriHandler, UriHandler};
