//! # Transport Module
//!
//! The single I/O seam of the engine. A [`Transport`] executes one fully
//! assembled request synchronously and hands back the decoded JSON entity;
//! everything the engine does around it — interception, URL assembly, body
//! serialization, envelope extraction — is pure computation.
//!
//! Connection pooling, TLS and timeout enforcement belong to the transport
//! implementation. The default, [`HttpTransport`], is a thin wrapper over a
//! blocking `reqwest` client configured from the transport-config provider.

mod http;

pub use http::HttpTransport;

use crate::error::ClientError;
use crate::spi::RequestBody;
use ::http::Method;
use serde_json::Value;
use std::collections::BTreeMap;

/// Response of a successful (2xx) exchange.
#[derive(Debug, Clone)]
pub struct DecodedEntity {
    pub status: u16,
    /// Parsed JSON body; `None` for an empty response body
    pub body: Option<Value>,
}

/// Executes one HTTP exchange.
pub trait Transport: Send + Sync {
    /// # Errors
    ///
    /// [`ClientError::Transport`] for non-2xx responses and network failures
    /// (carrying url/method/response), [`ClientError::Decode`] when a 2xx
    /// body is not valid JSON.
    fn execute(
        &self,
        url: &str,
        method: &Method,
        headers: &BTreeMap<String, String>,
        body: &RequestBody,
    ) -> Result<DecodedEntity, ClientError>;
}
