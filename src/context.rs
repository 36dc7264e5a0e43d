//! # Request Context Module
//!
//! Short-lived per-call state: which endpoint is executing, what the request
//! template looked like before and after interception, when the call started,
//! and whether an error receiver has absorbed a failing response.
//!
//! The context is created by the execution engine after template construction
//! and passed **by reference** to every downstream collaborator — error
//! receivers, envelope callbacks — rather than parked in ambient thread-local
//! state. It is owned by the single in-flight call and dropped on every exit
//! path, so nothing can leak into a reused worker.

use crate::meta::EndpointMetadata;
use crate::template::RequestTemplate;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

/// Per-call execution context.
#[derive(Debug)]
pub struct RequestContext {
    method_name: String,
    metadata: Arc<EndpointMetadata>,
    template_before_interceptor: RequestTemplate,
    template_after_interceptor: Option<RequestTemplate>,
    started_at: Instant,
    error_handled: AtomicBool,
}

impl RequestContext {
    #[must_use]
    pub(crate) fn new(
        method_name: impl Into<String>,
        metadata: Arc<EndpointMetadata>,
        template_before_interceptor: RequestTemplate,
        started_at: Instant,
    ) -> Self {
        Self {
            method_name: method_name.into(),
            metadata,
            template_before_interceptor,
            template_after_interceptor: None,
            started_at,
            error_handled: AtomicBool::new(false),
        }
    }

    pub(crate) fn refresh_template_after_interceptor(&mut self, template: &RequestTemplate) {
        self.template_after_interceptor = Some(template.clone());
    }

    #[must_use]
    pub fn method_name(&self) -> &str {
        &self.method_name
    }

    #[must_use]
    pub fn metadata(&self) -> &EndpointMetadata {
        &self.metadata
    }

    /// Snapshot taken right after template construction.
    #[must_use]
    pub fn template_before_interceptor(&self) -> &RequestTemplate {
        &self.template_before_interceptor
    }

    /// Snapshot taken after the interceptor ran; `None` only if interception
    /// itself failed.
    #[must_use]
    pub fn template_after_interceptor(&self) -> Option<&RequestTemplate> {
        self.template_after_interceptor.as_ref()
    }

    #[must_use]
    pub fn started_at(&self) -> Instant {
        self.started_at
    }

    /// Record that a failing response has been fully absorbed. After this,
    /// the engine swallows the in-flight fault and the call returns `None`.
    pub fn mark_error_handled(&self) {
        self.error_handled.store(true, Ordering::Release);
    }

    #[must_use]
    pub fn error_handled(&self) -> bool {
        self.error_handled.load(Ordering::Acquire)
    }
}
