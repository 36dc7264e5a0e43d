use super::types::{
    EndpointMetadata, EnvelopeMode, FieldDescriptor, FieldKind, APPLICATION_JSON,
};
use crate::env::resolve_placeholders;
use crate::error::ClientError;
use http::Method;
use tracing::debug;

/// Response-envelope choice as written in client configuration.
///
/// `Unset` falls back to the client-level default during compilation.
/// `NoEnvelope` is preserved verbatim — it is an explicit opt-out that skips
/// templated decoding entirely even when the client default is `Enveloped`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EnvelopeSetting {
    /// Inherit the client-level default
    #[default]
    Unset,
    /// Explicitly decode the raw response type, never an envelope
    NoEnvelope,
    /// Decode through the response envelope
    Enveloped,
}

/// Interface-level defaults every method of a client starts from.
#[derive(Debug, Clone)]
pub struct ClientDefaults {
    /// Base path prepended to every method path (may contain `${VAR}`)
    pub base_path: String,
    /// Content type used when a method does not declare one
    pub content_type: String,
    /// Envelope decoding applied when a method leaves it unset
    pub envelope: EnvelopeSetting,
}

impl Default for ClientDefaults {
    fn default() -> Self {
        Self {
            base_path: String::new(),
            content_type: APPLICATION_JSON.to_string(),
            envelope: EnvelopeSetting::Unset,
        }
    }
}

/// Explicit per-parameter binding, the counterpart of an inline field
/// annotation. Anything left out falls back to what the parameter itself
/// declares.
#[derive(Debug, Clone)]
pub struct FieldSpec {
    name: Option<String>,
    kind: FieldKind,
    json_format_able: bool,
}

impl FieldSpec {
    #[must_use]
    pub fn new(kind: FieldKind) -> Self {
        Self {
            name: None,
            kind,
            json_format_able: true,
        }
    }

    /// Bind under this name instead of the declared parameter name.
    #[must_use]
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    #[must_use]
    pub fn json_format_able(mut self, flag: bool) -> Self {
        self.json_format_able = flag;
        self
    }
}

/// One declared method parameter: its source-level name, whether its declared
/// type is scalar, and an optional explicit [`FieldSpec`].
#[derive(Debug, Clone)]
pub struct ParamConfig {
    declared_name: String,
    scalar: bool,
    spec: Option<FieldSpec>,
}

/// Declarative configuration of one endpoint method, consumed by
/// [`compile_endpoint`].
#[derive(Debug, Clone)]
pub struct EndpointConfig {
    name: String,
    path: String,
    method: Method,
    content_type: Option<String>,
    envelope: EnvelopeSetting,
    params: Vec<ParamConfig>,
    declared_param_count: Option<usize>,
}

impl EndpointConfig {
    #[must_use]
    pub fn new(name: impl Into<String>, method: Method, path: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
            method,
            content_type: None,
            envelope: EnvelopeSetting::Unset,
            params: Vec::new(),
            declared_param_count: None,
        }
    }

    #[must_use]
    pub fn content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }

    #[must_use]
    pub fn envelope(mut self, setting: EnvelopeSetting) -> Self {
        self.envelope = setting;
        self
    }

    /// Add a parameter bound by its declared name with `Auto` classification.
    #[must_use]
    pub fn param(mut self, declared_name: impl Into<String>, scalar: bool) -> Self {
        self.params.push(ParamConfig {
            declared_name: declared_name.into(),
            scalar,
            spec: None,
        });
        self
    }

    /// Add a parameter with an explicit [`FieldSpec`].
    #[must_use]
    pub fn param_spec(
        mut self,
        declared_name: impl Into<String>,
        scalar: bool,
        spec: FieldSpec,
    ) -> Self {
        self.params.push(ParamConfig {
            declared_name: declared_name.into(),
            scalar,
            spec: Some(spec),
        });
        self
    }

    /// Declared parameter count of the method signature. When set, it must
    /// match the number of configured parameters or compilation fails.
    #[must_use]
    pub fn declared_param_count(mut self, count: usize) -> Self {
        self.declared_param_count = Some(count);
        self
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }
}

/// Compile metadata for a method that carries no endpoint configuration:
/// base path, GET, and the client defaults across the board.
#[must_use]
pub fn compile_bare(defaults: &ClientDefaults, name: &str) -> EndpointMetadata {
    EndpointMetadata::new(
        name,
        resolve_placeholders(&defaults.base_path),
        Method::GET,
        defaults.content_type.clone(),
        envelope_mode(defaults.envelope, defaults.envelope),
    )
}

/// Compile one endpoint configuration against the client defaults.
///
/// Fallback rules:
/// - content type: the client default when the method leaves it blank;
/// - envelope: the client default when `Unset`, except an explicit
///   `NoEnvelope`, which is preserved verbatim;
/// - method path: appended to the base path with exactly one `/` separator,
///   `${VAR}` placeholders resolved from the environment.
///
/// Field descriptors are built per parameter — an explicit spec wins, else
/// the declared name with `Auto` classification and `json_format_able` on.
/// `Auto` resolves to `Query` for GET/DELETE and `Body` otherwise.
///
/// # Errors
///
/// Returns a construction fault when the declared parameter count does not
/// match the number of configured parameters.
pub fn compile_endpoint(
    defaults: &ClientDefaults,
    endpoint: &EndpointConfig,
) -> Result<EndpointMetadata, ClientError> {
    if let Some(declared) = endpoint.declared_param_count {
        if declared != endpoint.params.len() {
            return Err(ClientError::construction(format!(
                "method '{}' declares {} parameters but {} were configured",
                endpoint.name,
                declared,
                endpoint.params.len()
            )));
        }
    }

    let base_path = resolve_placeholders(&defaults.base_path);
    let path = append_url(&base_path, &resolve_placeholders(&endpoint.path));

    let content_type = match endpoint.content_type.as_deref() {
        Some(ct) if !ct.trim().is_empty() => ct.to_string(),
        _ => defaults.content_type.clone(),
    };

    let mut metadata = EndpointMetadata::new(
        &endpoint.name,
        path,
        endpoint.method.clone(),
        content_type,
        envelope_mode(endpoint.envelope, defaults.envelope),
    );

    for param in &endpoint.params {
        let (name, kind, json_format_able) = match &param.spec {
            Some(spec) => {
                let name = spec
                    .name
                    .as_deref()
                    .filter(|n| !n.trim().is_empty())
                    .unwrap_or(&param.declared_name);
                (name.to_string(), spec.kind, spec.json_format_able)
            }
            None => (param.declared_name.clone(), FieldKind::Auto, true),
        };
        let kind = resolve_auto(kind, &endpoint.method);
        metadata.push_field(FieldDescriptor::new(name, kind, param.scalar, json_format_able))?;
    }

    debug!(
        method_name = %endpoint.name,
        http_method = %metadata.method(),
        path = %metadata.path(),
        field_count = metadata.fields().len(),
        "endpoint metadata compiled"
    );
    Ok(metadata)
}

fn resolve_auto(kind: FieldKind, method: &Method) -> FieldKind {
    if kind != FieldKind::Auto {
        return kind;
    }
    if *method == Method::GET || *method == Method::DELETE {
        FieldKind::Query
    } else {
        FieldKind::Body
    }
}

fn envelope_mode(setting: EnvelopeSetting, class_default: EnvelopeSetting) -> EnvelopeMode {
    let resolved = match setting {
        EnvelopeSetting::Unset => class_default,
        explicit => explicit,
    };
    match resolved {
        EnvelopeSetting::Enveloped => EnvelopeMode::Decode,
        EnvelopeSetting::Unset | EnvelopeSetting::NoEnvelope => EnvelopeMode::Skip,
    }
}

fn append_url(url: &str, append: &str) -> String {
    if append.trim().is_empty() {
        return url.to_string();
    }
    if !url.ends_with('/') && !append.starts_with('/') {
        format!("{url}/{append}")
    } else {
        format!("{url}{append}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn defaults() -> ClientDefaults {
        ClientDefaults {
            base_path: "/api/v1".to_string(),
            ..ClientDefaults::default()
        }
    }

    #[test]
    fn test_auto_resolves_to_query_for_get_and_delete() {
        for method in [Method::GET, Method::DELETE] {
            let endpoint = EndpointConfig::new("list", method, "/items").param("limit", true);
            let meta = compile_endpoint(&defaults(), &endpoint).unwrap();
            assert_eq!(meta.fields()[0].kind(), FieldKind::Query);
        }
    }

    #[test]
    fn test_auto_resolves_to_body_otherwise() {
        for method in [Method::POST, Method::PUT, Method::PATCH] {
            let endpoint = EndpointConfig::new("save", method, "/items").param("item", false);
            let meta = compile_endpoint(&defaults(), &endpoint).unwrap();
            assert_eq!(meta.fields()[0].kind(), FieldKind::Body);
        }
    }

    #[test]
    fn test_explicit_spec_wins() {
        let endpoint = EndpointConfig::new("save", Method::POST, "/items").param_spec(
            "trace",
            true,
            FieldSpec::new(FieldKind::Header).named("X-Trace-Id"),
        );
        let meta = compile_endpoint(&defaults(), &endpoint).unwrap();
        assert_eq!(meta.fields()[0].name(), "X-Trace-Id");
        assert_eq!(meta.fields()[0].kind(), FieldKind::Header);
    }

    #[test]
    fn test_blank_spec_name_falls_back_to_declared() {
        let endpoint = EndpointConfig::new("save", Method::POST, "/items").param_spec(
            "payload",
            false,
            FieldSpec::new(FieldKind::Body).named("  "),
        );
        let meta = compile_endpoint(&defaults(), &endpoint).unwrap();
        assert_eq!(meta.fields()[0].name(), "payload");
    }

    #[test]
    fn test_path_appended_with_single_separator() {
        let endpoint = EndpointConfig::new("list", Method::GET, "items");
        let meta = compile_endpoint(&defaults(), &endpoint).unwrap();
        assert_eq!(meta.path(), "/api/v1/items");

        let endpoint = EndpointConfig::new("list", Method::GET, "/items");
        let meta = compile_endpoint(&defaults(), &endpoint).unwrap();
        assert_eq!(meta.path(), "/api/v1/items");
    }

    #[test]
    fn test_blank_content_type_falls_back_to_default() {
        let endpoint = EndpointConfig::new("list", Method::GET, "/items").content_type("  ");
        let meta = compile_endpoint(&defaults(), &endpoint).unwrap();
        assert_eq!(meta.content_type(), APPLICATION_JSON);
    }

    #[test]
    fn test_envelope_fallback_and_no_envelope_preserved() {
        let enveloped_defaults = ClientDefaults {
            envelope: EnvelopeSetting::Enveloped,
            ..defaults()
        };
        let unset = EndpointConfig::new("a", Method::GET, "/a");
        let meta = compile_endpoint(&enveloped_defaults, &unset).unwrap();
        assert_eq!(meta.envelope(), EnvelopeMode::Decode);

        let opted_out =
            EndpointConfig::new("b", Method::GET, "/b").envelope(EnvelopeSetting::NoEnvelope);
        let meta = compile_endpoint(&enveloped_defaults, &opted_out).unwrap();
        assert_eq!(meta.envelope(), EnvelopeMode::Skip);
    }

    #[test]
    fn test_declared_param_count_mismatch_is_fatal() {
        let endpoint = EndpointConfig::new("list", Method::GET, "/items")
            .param("limit", true)
            .declared_param_count(2);
        let err = compile_endpoint(&defaults(), &endpoint).unwrap_err();
        assert!(matches!(err, ClientError::Construction { .. }));
    }

    #[test]
    fn test_bare_method_uses_class_defaults() {
        let meta = compile_bare(&defaults(), "ping");
        assert_eq!(meta.path(), "/api/v1");
        assert_eq!(meta.method(), &Method::GET);
        assert_eq!(meta.content_type(), APPLICATION_JSON);
        assert!(meta.fields().is_empty());
    }

    #[test]
    fn test_buckets_sum_to_field_count() {
        let endpoint = EndpointConfig::new("get_user", Method::GET, "/users/{id}")
            .param_spec("id", true, FieldSpec::new(FieldKind::PathVariable))
            .param("verbose", true)
            .param_spec("token", true, FieldSpec::new(FieldKind::Header));
        let meta = compile_endpoint(&defaults(), &endpoint).unwrap();
        assert_eq!(meta.bucketed_field_count(), meta.fields().len());
    }
}
