use crate::context::RequestContext;
use crate::dispatcher::MethodBinding;
use crate::envelope::ResponseEnvelope;
use crate::error::ClientError;
use crate::meta::{EndpointMetadata, EnvelopeMode, APPLICATION_JSON};
use crate::spi::{
    BodySerializer, ErrorHandler, ObjectConverter, ParamPathBuilder, RequestBody,
    ResponseSnapshot, UriHandler,
};
use crate::template::{build_request_template, plain_string, RequestTemplate};
use crate::transport::{DecodedEntity, Transport};
use http::header::CONTENT_TYPE;
use http::Method;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, warn};
use url::Url;

/// Orchestrates one invocation end to end:
/// `BUILD_TEMPLATE → INTERCEPT → DISPATCH → EXTRACT`, with the
/// suppressible-failure protocol wrapped around the last three stages.
///
/// The engine is immutable and shared by every method of a client; all
/// per-call state lives in the [`RequestContext`] created for the call.
pub struct ExecutionEngine {
    client_name: String,
    transport: Arc<dyn Transport>,
    object_converter: Arc<dyn ObjectConverter>,
    body_serializer: Arc<dyn BodySerializer>,
    param_path_builder: Arc<dyn ParamPathBuilder>,
    uri_handler: Arc<dyn UriHandler>,
    error_handler: Arc<dyn ErrorHandler>,
}

impl ExecutionEngine {
    #[must_use]
    pub(crate) fn new(
        client_name: String,
        transport: Arc<dyn Transport>,
        object_converter: Arc<dyn ObjectConverter>,
        body_serializer: Arc<dyn BodySerializer>,
        param_path_builder: Arc<dyn ParamPathBuilder>,
        uri_handler: Arc<dyn UriHandler>,
        error_handler: Arc<dyn ErrorHandler>,
    ) -> Self {
        Self {
            client_name,
            transport,
            object_converter,
            body_serializer,
            param_path_builder,
            uri_handler,
            error_handler,
        }
    }

    /// Execute one endpoint call with positional arguments.
    ///
    /// Template construction faults are always fatal. Faults raised after
    /// the context exists are swallowed — the call returns `Ok(None)` — iff
    /// the error-handled signal was set while the fault was being offered to
    /// the error handler.
    ///
    /// # Errors
    ///
    /// Any unsuppressed [`ClientError`].
    pub fn send_request<T, E>(
        &self,
        binding: &MethodBinding,
        args: &[crate::template::CallArg],
    ) -> Result<Option<T>, ClientError>
    where
        T: DeserializeOwned,
        E: ResponseEnvelope<T> + DeserializeOwned,
    {
        let metadata = &binding.metadata;
        let start = Instant::now();
        debug!(
            client = %self.client_name,
            method_name = metadata.name(),
            "start to parse and send request"
        );

        let mut template = build_request_template(
            metadata,
            binding.host_resolver.host(),
            args,
            self.object_converter.as_ref(),
        )?;
        let mut ctx = RequestContext::new(
            metadata.name(),
            Arc::clone(&binding.metadata),
            template.clone(),
            start,
        );

        let outcome = self.run_to_completion::<T, E>(binding, &mut template, &mut ctx);
        let elapsed_ms = start.elapsed().as_millis() as u64;
        match outcome {
            Ok(value) => {
                debug!(
                    client = %self.client_name,
                    method_name = metadata.name(),
                    elapsed_ms,
                    "end of send request"
                );
                Ok(value)
            }
            Err(err) if ctx.error_handled() => {
                error!(
                    client = %self.client_name,
                    method_name = metadata.name(),
                    error = %err,
                    elapsed_ms,
                    "response error already handled, returning null"
                );
                Ok(None)
            }
            Err(err) => {
                error!(
                    client = %self.client_name,
                    method_name = metadata.name(),
                    error = %err,
                    elapsed_ms,
                    "exception when calling api with rest client"
                );
                Err(err)
            }
        }
    }

    fn run_to_completion<T, E>(
        &self,
        binding: &MethodBinding,
        template: &mut RequestTemplate,
        ctx: &mut RequestContext,
    ) -> Result<Option<T>, ClientError>
    where
        T: DeserializeOwned,
        E: ResponseEnvelope<T> + DeserializeOwned,
    {
        let metadata = &binding.metadata;

        debug!(template = ?template, "request template before interceptor");
        binding.interceptor.apply(template, metadata);
        debug!(template = ?template, "request template after interceptor");
        ctx.refresh_template_after_interceptor(template);

        let full_url = self.build_full_url(binding, template);
        let headers = build_final_headers(template, metadata);
        let body = if template.method == Method::GET || template.method == Method::DELETE {
            RequestBody::None
        } else {
            self.body_serializer.serialize(template)
        };

        debug!(
            url = %full_url,
            http_method = %template.method,
            header_count = headers.len(),
            "dispatching request to transport"
        );
        let entity = match self
            .transport
            .execute(&full_url, &template.method, &headers, &body)
        {
            Ok(entity) => entity,
            Err(err) => {
                self.offer_to_error_handler(&full_url, &template.method, &err, ctx);
                return Err(err);
            }
        };

        extract::<T, E>(entity, metadata, ctx)
    }

    fn build_full_url(&self, binding: &MethodBinding, template: &RequestTemplate) -> String {
        let url = binding.host_resolver.append_path(&template.path, template);
        let param_path = self.param_path_builder.build_path_of_params(&template.query);
        let raw = if param_path.trim().is_empty() {
            url
        } else if !param_path.starts_with('?') && !url.ends_with('?') {
            format!("{url}?{param_path}")
        } else {
            format!("{url}{param_path}")
        };
        self.uri_handler.expand(&raw)
    }

    fn offer_to_error_handler(
        &self,
        full_url: &str,
        method: &Method,
        err: &ClientError,
        ctx: &RequestContext,
    ) {
        let ClientError::Transport(fault) = err else {
            return;
        };
        let Ok(url) = Url::parse(full_url) else {
            warn!(url = full_url, "unparseable request url, skipping error handler");
            return;
        };
        let snapshot = ResponseSnapshot {
            status: fault.status,
            body: fault.body.clone(),
        };
        if self.error_handler.handle(&url, method, &snapshot, ctx) {
            ctx.mark_error_handled();
        }
    }
}

fn build_final_headers(
    template: &RequestTemplate,
    metadata: &EndpointMetadata,
) -> BTreeMap<String, String> {
    let mut headers = BTreeMap::new();
    for (name, value) in &template.header {
        if name.trim().is_empty() || value.is_null() {
            continue;
        }
        headers.insert(name.clone(), plain_string(value));
    }
    let has_content_type = headers
        .keys()
        .any(|name| name.eq_ignore_ascii_case(CONTENT_TYPE.as_str()));
    if !has_content_type {
        let content_type = if metadata.content_type().trim().is_empty() {
            APPLICATION_JSON
        } else {
            metadata.content_type()
        };
        headers.insert(CONTENT_TYPE.as_str().to_string(), content_type.to_string());
    }
    headers
}

fn extract<T, E>(
    entity: DecodedEntity,
    metadata: &EndpointMetadata,
    ctx: &RequestContext,
) -> Result<Option<T>, ClientError>
where
    T: DeserializeOwned,
    E: ResponseEnvelope<T> + DeserializeOwned,
{
    let Some(body) = entity.body else {
        warn!(
            method_name = metadata.name(),
            status = entity.status,
            "response body is empty, returning null"
        );
        return Ok(None);
    };
    match metadata.envelope() {
        EnvelopeMode::Skip => decode::<T>(body, metadata).map(Some),
        EnvelopeMode::Decode => {
            let envelope = decode::<E>(body, metadata)?;
            envelope.callback(ctx)?;
            Ok(envelope.data())
        }
    }
}

fn decode<V: DeserializeOwned>(body: Value, metadata: &EndpointMetadata) -> Result<V, ClientError> {
    serde_json::from_value(body).map_err(|source| ClientError::Decode {
        message: format!(
            "response of '{}' does not match the declared response shape",
            metadata.name()
        ),
        source,
    })
}
