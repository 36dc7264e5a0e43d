use http::Method;
use std::fmt;

/// Failing HTTP exchange attached to a [`ClientError::Transport`] fault.
///
/// Carries the full request identity (url + method) and whatever the server
/// sent back, so a caller or an error receiver can decide what to do with it.
/// `status` is `None` when the request never reached the server (connect
/// failure, timeout); `source` keeps the underlying transport error chain.
#[derive(Debug)]
pub struct TransportFault {
    /// Fully expanded request URL
    pub url: String,
    /// HTTP method of the failing request
    pub method: Method,
    /// Response status, absent on network-level failures
    pub status: Option<u16>,
    /// Raw response body, if one was received
    pub body: Option<String>,
    /// Underlying cause from the transport layer
    pub source: Option<anyhow::Error>,
}

impl TransportFault {
    /// Fault for a response with a non-success status code.
    #[must_use]
    pub fn status(url: impl Into<String>, method: Method, status: u16, body: Option<String>) -> Self {
        Self {
            url: url.into(),
            method,
            status: Some(status),
            body,
            source: None,
        }
    }

    /// Fault for a request that failed before a response arrived.
    #[must_use]
    pub fn network(url: impl Into<String>, method: Method, source: anyhow::Error) -> Self {
        Self {
            url: url.into(),
            method,
            status: None,
            body: None,
            source: Some(source),
        }
    }
}

impl fmt::Display for TransportFault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.status {
            Some(status) => write!(f, "{} {} responded with status {}", self.method, self.url, status),
            None => write!(f, "{} {} failed before a response arrived", self.method, self.url),
        }
    }
}

/// Error taxonomy of the invocation engine.
///
/// Each variant has a distinct propagation rule:
///
/// - [`Construction`](ClientError::Construction) faults are programming or
///   configuration errors, raised before any I/O happens and never suppressed.
/// - [`Transport`](ClientError::Transport) faults are offered to the
///   error-handler chain first; a matched receiver may absorb them, turning
///   the call result into `None`.
/// - [`Decode`](ClientError::Decode) faults always propagate.
/// - [`Business`](ClientError::Business) faults come from a response envelope
///   whose `is_failed()` returned true.
/// - [`UnregisteredMethod`](ClientError::UnregisteredMethod) means the
///   dispatcher had no binding for the invoked method name.
#[derive(Debug)]
pub enum ClientError {
    /// Invalid metadata or argument list; detected before dispatch
    Construction { message: String },
    /// Non-2xx response or network failure; suppressible
    Transport(TransportFault),
    /// Response body did not match the declared response shape
    Decode {
        message: String,
        source: serde_json::Error,
    },
    /// Response envelope reported a failed call
    Business { path: String, detail: String },
    /// No method binding registered under this name
    UnregisteredMethod { name: String },
}

impl ClientError {
    pub(crate) fn construction(message: impl Into<String>) -> Self {
        ClientError::Construction {
            message: message.into(),
        }
    }
}

impl fmt::Display for ClientError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClientError::Construction { message } => {
                write!(f, "invalid client construction: {message}")
            }
            ClientError::Transport(fault) => fault.fmt(f),
            ClientError::Decode { message, .. } => {
                write!(f, "failed to decode response: {message}")
            }
            ClientError::Business { path, detail } => {
                write!(f, "call {path} returned a failed response: {detail}")
            }
            ClientError::UnregisteredMethod { name } => {
                write!(f, "no rest client method registered under '{name}'")
            }
        }
    }
}

impl std::error::Error for ClientError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ClientError::Decode { source, .. } => Some(source),
            ClientError::Transport(fault) => fault
                .source
                .as_ref()
                .map(|err| err.as_ref() as &(dyn std::error::Error + 'static)),
            _ => None,
        }
    }
}
