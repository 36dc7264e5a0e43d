//! # Response Envelope Module
//!
//! Many services wrap every payload in a common success/failure structure
//! (`{"code": 0, "message": "ok", "data": {...}}`) that is independent of
//! the HTTP status. A [`ResponseEnvelope`] implementation teaches the engine
//! that structure: the decoded envelope's `callback` runs first — raising a
//! business fault when `is_failed()` — and `data()` is what the caller
//! receives.

use crate::context::RequestContext;
use crate::error::ClientError;
use serde::Deserialize;
use std::marker::PhantomData;

/// Generic success/failure wrapper around the payload type `T`.
pub trait ResponseEnvelope<T>: Sized {
    /// Did the service report this call as failed?
    fn is_failed(&self) -> bool;

    /// The wrapped payload; consumed, since the envelope is done after
    /// extraction.
    fn data(self) -> Option<T>;

    /// Runs before `data()` is unwrapped. The default raises a business
    /// fault on failure and is otherwise a no-op; implementations may
    /// override it to tolerate or translate failures.
    ///
    /// # Errors
    ///
    /// [`ClientError::Business`] when `is_failed()` is true.
    fn callback(&self, ctx: &RequestContext) -> Result<(), ClientError> {
        if self.is_failed() {
            return Err(ClientError::Business {
                path: ctx.template_before_interceptor().path.clone(),
                detail: "envelope reported a failed response".to_string(),
            });
        }
        Ok(())
    }
}

/// Stand-in envelope for endpoints decoded without one. Never actually
/// deserialized by the engine — present so plain calls can share the generic
/// invocation path.
#[derive(Debug, Deserialize)]
pub struct NoEnvelope<T> {
    #[serde(skip)]
    _marker: PhantomData<T>,
}

impl<T> ResponseEnvelope<T> for NoEnvelope<T> {
    fn is_failed(&self) -> bool {
        false
    }

    fn data(self) -> Option<T> {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::meta::{compile_bare, ClientDefaults};
    use crate::template::RequestTemplate;
    use http::Method;
    use std::sync::Arc;
    use std::time::Instant;

    #[derive(Debug, Deserialize)]
    struct Wrapped {
        code: i32,
        data: Option<String>,
    }

    impl ResponseEnvelope<String> for Wrapped {
        fn is_failed(&self) -> bool {
            self.code != 0
        }

        fn data(self) -> Option<String> {
            self.data
        }
    }

    fn context() -> RequestContext {
        let metadata = Arc::new(compile_bare(&ClientDefaults::default(), "m"));
        let template = RequestTemplate::new(
            "http://api.local".to_string(),
            "/orders".to_string(),
            Method::GET,
        );
        RequestContext::new("m", metadata, template, Instant::now())
    }

    #[test]
    fn test_callback_raises_business_fault_on_failure() {
        let envelope = Wrapped {
            code: 500,
            data: None,
        };
        let err = envelope.callback(&context()).unwrap_err();
        match err {
            ClientError::Business { path, .. } => assert_eq!(path, "/orders"),
            other => panic!("expected business fault, got {other}"),
        }
    }

    #[test]
    fn test_callback_passes_on_success() {
        let envelope = Wrapped {
            code: 0,
            data: Some("ok".to_string()),
        };
        assert!(envelope.callback(&context()).is_ok());
        assert_eq!(envelope.data(), Some("ok".to_string()));
    }
}
