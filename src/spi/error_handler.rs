use crate::context::RequestContext;
use crate::error::ClientError;
use http::Method;
use tracing::{debug, warn};
use url::Url;

/// What the server sent back on a failing exchange, as seen by error
/// receivers. `status` is absent for network-level failures.
#[derive(Debug, Clone)]
pub struct ResponseSnapshot {
    pub status: Option<u16>,
    pub body: Option<String>,
}

/// SPI: observes a failing response before the transport fault propagates.
///
/// Returning `true` means the failure is fully absorbed — the engine marks
/// the call's error-handled signal and the caller receives `None` instead of
/// a fault.
pub trait ErrorHandler: Send + Sync {
    fn handle(
        &self,
        url: &Url,
        method: &Method,
        response: &ResponseSnapshot,
        ctx: &RequestContext,
    ) -> bool;
}

/// Default error handler: never absorbs anything, so the standard transport
/// fault propagates to the caller.
pub struct SimpleErrorHandler;

impl ErrorHandler for SimpleErrorHandler {
    fn handle(
        &self,
        _url: &Url,
        _method: &Method,
        _response: &ResponseSnapshot,
        _ctx: &RequestContext,
    ) -> bool {
        false
    }
}

/// Which requests a receiver is interested in.
///
/// The path may carry `{placeholder}` segments; matching then happens
/// segment-wise with a braced descriptor segment accepting any literal
/// segment. Host `None` is the wildcard. Descriptor paths are normalised to
/// leading-`/`, no-trailing-`/` form at construction.
#[derive(Debug, Clone)]
pub struct RequestMatcher {
    host: Option<String>,
    path: String,
    dynamic: bool,
    method: Method,
}

impl RequestMatcher {
    /// Matcher for any host.
    ///
    /// # Errors
    ///
    /// Construction fault when the path is blank.
    pub fn new(path: &str, method: Method) -> Result<Self, ClientError> {
        Self::build(None, path, method)
    }

    /// Matcher restricted to one host.
    ///
    /// # Errors
    ///
    /// Construction fault when the path is blank.
    pub fn with_host(path: &str, method: Method, host: &str) -> Result<Self, ClientError> {
        let host = Some(host.trim())
            .filter(|h| !h.is_empty())
            .map(String::from);
        Self::build(host, path, method)
    }

    fn build(host: Option<String>, path: &str, method: Method) -> Result<Self, ClientError> {
        if path.trim().is_empty() {
            return Err(ClientError::construction(
                "error receiver path must not be blank",
            ));
        }
        let path = format_path(path);
        let dynamic = path.contains('{') && path.contains('}');
        Ok(Self {
            host,
            path,
            dynamic,
            method,
        })
    }

    /// Does this matcher cover the given request?
    #[must_use]
    pub fn matches(&self, url: &Url, method: &Method) -> bool {
        if *method != self.method {
            return false;
        }
        if !self.path_matches(url.path()) {
            return false;
        }
        match &self.host {
            Some(host) => url.host_str() == Some(host.as_str()),
            None => true,
        }
    }

    fn path_matches(&self, real_path: &str) -> bool {
        if !self.dynamic {
            return real_path == self.path;
        }
        let descriptor: Vec<&str> = self.path.split('/').collect();
        let real: Vec<&str> = real_path.split('/').collect();
        if descriptor.len() != real.len() {
            return false;
        }
        descriptor.iter().zip(real.iter()).all(|(pattern, literal)| {
            (pattern.starts_with('{') && pattern.ends_with('}')) || pattern == literal
        })
    }
}

fn format_path(original: &str) -> String {
    let trimmed = original.strip_suffix('/').unwrap_or(original);
    if trimmed.starts_with('/') {
        trimmed.to_string()
    } else {
        format!("/{trimmed}")
    }
}

/// One registered failure receiver, consulted in declaration order by
/// [`ChainErrorHandler`].
pub trait ErrorReceiver: Send + Sync {
    /// The requests this receiver is interested in.
    fn request_to_handle(&self) -> &RequestMatcher;

    /// Secondary predicate, consulted only after the matcher accepts the
    /// request. Useful when the same path and method can produce responses
    /// that need different handling depending on the request that was sent.
    fn should_handle(&self, _ctx: &RequestContext) -> bool {
        true
    }

    /// Observe the failing response. Return `true` to absorb it.
    fn handle(
        &self,
        url: &Url,
        method: &Method,
        response: &ResponseSnapshot,
        ctx: &RequestContext,
    ) -> bool;
}

/// Error handler that walks registered receivers in declaration order; the
/// first one whose matcher and `should_handle` both accept the request
/// decides the outcome. With no matching receiver the fault propagates.
pub struct ChainErrorHandler {
    receivers: Vec<std::sync::Arc<dyn ErrorReceiver>>,
}

impl ChainErrorHandler {
    #[must_use]
    pub fn new(receivers: Vec<std::sync::Arc<dyn ErrorReceiver>>) -> Self {
        Self { receivers }
    }
}

impl ErrorHandler for ChainErrorHandler {
    fn handle(
        &self,
        url: &Url,
        method: &Method,
        response: &ResponseSnapshot,
        ctx: &RequestContext,
    ) -> bool {
        for (index, receiver) in self.receivers.iter().enumerate() {
            if receiver.request_to_handle().matches(url, method) && receiver.should_handle(ctx) {
                let handled = receiver.handle(url, method, response, ctx);
                debug!(
                    receiver_index = index,
                    url = %url,
                    handled,
                    "error receiver matched failing response"
                );
                return handled;
            }
        }
        warn!(url = %url, status = ?response.status, "no error receiver matched failing response");
        false
    }
}
