//! # Request Template Module
//!
//! Per-call request-in-progress value and its builder.
//!
//! [`build_request_template`] zips the compiled field descriptors of an
//! endpoint with the positional call arguments and produces a
//! [`RequestTemplate`]: path variables substituted, query/body/header maps
//! assembled, content type seeded. The template is deliberately mutable — the
//! request interceptor reworks it in place before dispatch.

use crate::error::ClientError;
use crate::meta::EndpointMetadata;
use crate::path_template::{extract_names, substitute, PathVarVec};
use crate::spi::ObjectConverter;
use http::header::CONTENT_TYPE;
use http::Method;
use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use tracing::debug;

/// Mutable per-call request value. Maps are never absent, only empty.
#[derive(Debug, Clone)]
pub struct RequestTemplate {
    pub host: String,
    pub path: String,
    pub method: Method,
    pub query: BTreeMap<String, Value>,
    pub body: BTreeMap<String, Value>,
    pub header: BTreeMap<String, Value>,
}

impl RequestTemplate {
    #[must_use]
    pub fn new(host: String, path: String, method: Method) -> Self {
        Self {
            host,
            path,
            method,
            query: BTreeMap::new(),
            body: BTreeMap::new(),
            header: BTreeMap::new(),
        }
    }
}

/// One positional call argument.
///
/// `Mapped` carries a value that describes itself as a flat entry map; the
/// template builder merges it directly instead of running the object
/// converter over it.
#[derive(Debug, Clone)]
pub enum CallArg {
    Value(Value),
    Mapped(Map<String, Value>),
}

impl CallArg {
    /// Serialize any `Serialize` value into an argument.
    ///
    /// # Errors
    ///
    /// Construction fault when the value cannot be represented as JSON.
    pub fn of<T: Serialize>(value: &T) -> Result<Self, ClientError> {
        serde_json::to_value(value)
            .map(CallArg::Value)
            .map_err(|err| ClientError::construction(format!("unserializable argument: {err}")))
    }

    #[must_use]
    pub fn null() -> Self {
        CallArg::Value(Value::Null)
    }

    #[must_use]
    pub fn mapped(map: Map<String, Value>) -> Self {
        CallArg::Mapped(map)
    }

    fn is_null(&self) -> bool {
        matches!(self, CallArg::Value(Value::Null))
    }

    fn to_value(&self) -> Value {
        match self {
            CallArg::Value(value) => value.clone(),
            CallArg::Mapped(map) => Value::Object(map.clone()),
        }
    }
}

impl From<Value> for CallArg {
    fn from(value: Value) -> Self {
        CallArg::Value(value)
    }
}

/// Render a value the way it should appear in a path, query string or header:
/// strings verbatim, everything else as compact JSON (`null` included).
#[must_use]
pub fn plain_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Null or a whitespace-only string.
#[must_use]
pub fn value_is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.trim().is_empty(),
        _ => false,
    }
}

/// Build the per-call request template from compiled metadata and positional
/// arguments.
///
/// # Errors
///
/// Construction fault when the argument count differs from the endpoint's
/// field count.
pub fn build_request_template(
    metadata: &EndpointMetadata,
    host: String,
    args: &[CallArg],
    converter: &dyn ObjectConverter,
) -> Result<RequestTemplate, ClientError> {
    let mut template = RequestTemplate::new(host, metadata.path().to_string(), metadata.method().clone());
    template.header.insert(
        CONTENT_TYPE.as_str().to_string(),
        Value::String(metadata.content_type().to_string()),
    );

    let fields = metadata.fields();
    if fields.is_empty() && args.is_empty() {
        return Ok(template);
    }
    if fields.len() != args.len() {
        return Err(ClientError::construction(format!(
            "method '{}' takes {} arguments but {} were supplied",
            metadata.name(),
            fields.len(),
            args.len()
        )));
    }

    // Pass 1: non-null path-variable arguments substitute into the template.
    let mut path_vars = PathVarVec::new();
    for (index, field) in metadata.path_variable_fields() {
        let arg = &args[index];
        if arg.is_null() {
            continue;
        }
        path_vars.push((field.name().to_string(), plain_string(&arg.to_value())));
    }
    template.path = substitute(metadata.path(), &path_vars);

    template.query = flatten_bucket(metadata.query_fields(), args, converter);
    template.body = flatten_bucket(metadata.body_fields(), args, converter);
    let headers = flatten_bucket(metadata.header_fields(), args, converter);
    // Header bucket merges last, overriding the seeded content type.
    template.header.extend(headers);

    // Pass 2: placeholders that survived pass 1 resolve from the query map,
    // then the body map.
    let unresolved = extract_names(&template.path);
    if !unresolved.is_empty() {
        let mut late_vars = PathVarVec::new();
        for name in unresolved {
            let from_query = template
                .query
                .get(&name)
                .filter(|v| !v.is_null() && plain_string(v) != "null");
            let value = from_query.or_else(|| template.body.get(&name));
            let rendered = value.map_or_else(|| "null".to_string(), plain_string);
            late_vars.push((name, rendered));
        }
        template.path = substitute(&template.path, &late_vars);
    }

    debug!(
        method_name = metadata.name(),
        path = %template.path,
        query_entries = template.query.len(),
        body_entries = template.body.len(),
        "request template built"
    );
    Ok(template)
}

fn flatten_bucket<'a>(
    bucket: impl Iterator<Item = (usize, &'a crate::meta::FieldDescriptor)>,
    args: &[CallArg],
    converter: &dyn ObjectConverter,
) -> BTreeMap<String, Value> {
    let mut result = BTreeMap::new();
    for (index, field) in bucket {
        let arg = &args[index];
        if field.json_format_able() {
            let entries = match arg {
                CallArg::Mapped(map) => Some(map.clone()),
                CallArg::Value(value) => converter.convert(value),
            };
            for (key, value) in entries.unwrap_or_default() {
                result.insert(key, value);
            }
        } else {
            result.insert(field.name().to_string(), arg.to_value());
        }
    }
    result
}
