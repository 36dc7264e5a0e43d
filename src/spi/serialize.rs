use crate::meta::{APPLICATION_FORM_URLENCODED, APPLICATION_JSON, MULTIPART_FORM_DATA};
use crate::template::{plain_string, value_is_blank, RequestTemplate};
use http::header::CONTENT_TYPE;
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};
use tracing::error;

/// Serialized request body handed to the transport.
#[derive(Debug, Clone, PartialEq)]
pub enum RequestBody {
    /// No body (GET/DELETE)
    None,
    /// JSON text
    Json(String),
    /// URL-encoded form text
    Form(String),
    /// Multipart field map, one value per key
    Multipart(BTreeMap<String, Value>),
    /// Unrecognised content type: the raw body map, passed through
    Raw(BTreeMap<String, Value>),
}

/// SPI: turns a request template's body map into a [`RequestBody`].
pub trait BodySerializer: Send + Sync {
    fn serialize(&self, template: &RequestTemplate) -> RequestBody;
}

/// One serializer per content type, pluggable into
/// [`DefaultBodySerializer`].
pub trait TypedSerializer: Send + Sync {
    fn content_type(&self) -> &str;
    fn serialize_map(&self, body: &BTreeMap<String, Value>) -> RequestBody;
}

/// Default body serializer: dispatches on the template's content type.
///
/// JSON, URL-encoded form and multipart serializers are pre-registered; an
/// unknown content type falls back to the raw body map.
pub struct DefaultBodySerializer {
    serializers: HashMap<String, Box<dyn TypedSerializer>>,
}

impl DefaultBodySerializer {
    #[must_use]
    pub fn new() -> Self {
        let mut this = Self {
            serializers: HashMap::new(),
        };
        this.add_serializer(Box::new(JsonTypeSerializer));
        this.add_serializer(Box::new(UrlencodedTypeSerializer));
        this.add_serializer(Box::new(FormDataTypeSerializer));
        this
    }

    pub fn add_serializer(&mut self, serializer: Box<dyn TypedSerializer>) {
        let content_type = serializer.content_type().to_string();
        if !content_type.trim().is_empty() {
            self.serializers.insert(content_type, serializer);
        }
    }

    pub fn remove_serializer(&mut self, content_type: &str) {
        self.serializers.remove(content_type);
    }

    fn find_content_type(template: &RequestTemplate) -> String {
        template
            .header
            .get(CONTENT_TYPE.as_str())
            .map(plain_string)
            .filter(|ct| !ct.trim().is_empty())
            .unwrap_or_else(|| APPLICATION_JSON.to_string())
    }
}

impl Default for DefaultBodySerializer {
    fn default() -> Self {
        Self::new()
    }
}

impl BodySerializer for DefaultBodySerializer {
    fn serialize(&self, template: &RequestTemplate) -> RequestBody {
        let content_type = Self::find_content_type(template);
        match self.serializers.get(&content_type) {
            Some(serializer) => serializer.serialize_map(&template.body),
            None => RequestBody::Raw(template.body.clone()),
        }
    }
}

struct JsonTypeSerializer;

impl TypedSerializer for JsonTypeSerializer {
    fn content_type(&self) -> &str {
        APPLICATION_JSON
    }

    fn serialize_map(&self, body: &BTreeMap<String, Value>) -> RequestBody {
        match serde_json::to_string(body) {
            Ok(json) => RequestBody::Json(json),
            Err(err) => {
                error!(error = %err, "failed to serialize json body, passing raw map through");
                RequestBody::Raw(body.clone())
            }
        }
    }
}

struct UrlencodedTypeSerializer;

impl TypedSerializer for UrlencodedTypeSerializer {
    fn content_type(&self) -> &str {
        APPLICATION_FORM_URLENCODED
    }

    fn serialize_map(&self, body: &BTreeMap<String, Value>) -> RequestBody {
        let encoded = body
            .iter()
            .filter(|(_, value)| !value.is_null())
            .map(|(key, value)| format!("{}={}", key.trim(), plain_string(value)))
            .collect::<Vec<_>>()
            .join("&");
        RequestBody::Form(encoded)
    }
}

struct FormDataTypeSerializer;

impl TypedSerializer for FormDataTypeSerializer {
    fn content_type(&self) -> &str {
        MULTIPART_FORM_DATA
    }

    fn serialize_map(&self, body: &BTreeMap<String, Value>) -> RequestBody {
        RequestBody::Multipart(body.clone())
    }
}

/// SPI: renders the query map as the `?`-prefixed query-path suffix of the
/// final URL.
pub trait ParamPathBuilder: Send + Sync {
    fn build_path_of_params(&self, params: &BTreeMap<String, Value>) -> String;
}

/// Separator for array-valued query parameters.
const LIST_PARAM_VALUE_APPENDER: &str = ",";

/// Default query-path builder.
///
/// Null and blank entries are omitted. Array values join their non-blank
/// elements with `,`; an entry whose elements are all blank is dropped
/// entirely. Returns the empty string when nothing survives.
pub struct DefaultParamPathBuilder;

impl ParamPathBuilder for DefaultParamPathBuilder {
    fn build_path_of_params(&self, params: &BTreeMap<String, Value>) -> String {
        if params.is_empty() {
            return String::new();
        }
        let mut pairs = Vec::with_capacity(params.len());
        for (key, value) in params {
            match value {
                Value::Array(values) => {
                    let joined = values
                        .iter()
                        .filter(|v| !value_is_blank(v))
                        .map(plain_string)
                        .collect::<Vec<_>>()
                        .join(LIST_PARAM_VALUE_APPENDER);
                    if !joined.is_empty() {
                        pairs.push(format!("{key}={joined}"));
                    }
                }
                value if value_is_blank(value) => {}
                value => pairs.push(format!("{key}={}", plain_string(value))),
            }
        }
        if pairs.is_empty() {
            String::new()
        } else {
            format!("?{}", pairs.join("&"))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::Method;
    use serde_json::json;

    fn template_with(content_type: &str, body: BTreeMap<String, Value>) -> RequestTemplate {
        let mut template = RequestTemplate::new(
            "http://api.local".to_string(),
            "/items".to_string(),
            Method::POST,
        );
        template
            .header
            .insert(CONTENT_TYPE.as_str().to_string(), json!(content_type));
        template.body = body;
        template
    }

    #[test]
    fn test_json_serializer() {
        let mut body = BTreeMap::new();
        body.insert("name".to_string(), json!("Bella"));
        body.insert("age".to_string(), json!(3));
        let template = template_with(APPLICATION_JSON, body);
        let serialized = DefaultBodySerializer::new().serialize(&template);
        assert_eq!(
            serialized,
            RequestBody::Json(r#"{"age":3,"name":"Bella"}"#.to_string())
        );
    }

    #[test]
    fn test_form_serializer_skips_null_values() {
        let mut body = BTreeMap::new();
        body.insert("a".to_string(), json!("1"));
        body.insert("b".to_string(), Value::Null);
        body.insert("c".to_string(), json!(2));
        let template = template_with(APPLICATION_FORM_URLENCODED, body);
        let serialized = DefaultBodySerializer::new().serialize(&template);
        assert_eq!(serialized, RequestBody::Form("a=1&c=2".to_string()));
    }

    #[test]
    fn test_multipart_serializer_passes_map() {
        let mut body = BTreeMap::new();
        body.insert("file_name".to_string(), json!("report.csv"));
        let template = template_with(MULTIPART_FORM_DATA, body.clone());
        let serialized = DefaultBodySerializer::new().serialize(&template);
        assert_eq!(serialized, RequestBody::Multipart(body));
    }

    #[test]
    fn test_unknown_content_type_falls_back_to_raw() {
        let mut body = BTreeMap::new();
        body.insert("x".to_string(), json!(1));
        let template = template_with("application/x-custom", body.clone());
        let serialized = DefaultBodySerializer::new().serialize(&template);
        assert_eq!(serialized, RequestBody::Raw(body));
    }

    #[test]
    fn test_missing_content_type_defaults_to_json() {
        let mut template = RequestTemplate::new(
            "http://api.local".to_string(),
            "/items".to_string(),
            Method::POST,
        );
        template.body.insert("x".to_string(), json!(1));
        let serialized = DefaultBodySerializer::new().serialize(&template);
        assert_eq!(serialized, RequestBody::Json(r#"{"x":1}"#.to_string()));
    }

    #[test]
    fn test_param_path_drops_blank_entries() {
        let mut params = BTreeMap::new();
        params.insert("a".to_string(), json!("1"));
        params.insert("b".to_string(), json!(""));
        let path = DefaultParamPathBuilder.build_path_of_params(&params);
        assert_eq!(path, "?a=1");
    }

    #[test]
    fn test_param_path_joins_list_values() {
        let mut params = BTreeMap::new();
        params.insert("a".to_string(), json!(["1", "", "2"]));
        let path = DefaultParamPathBuilder.build_path_of_params(&params);
        assert_eq!(path, "?a=1,2");
    }

    #[test]
    fn test_param_path_drops_all_blank_list() {
        let mut params = BTreeMap::new();
        params.insert("a".to_string(), json!(["", "  "]));
        params.insert("b".to_string(), json!(true));
        let path = DefaultParamPathBuilder.build_path_of_params(&params);
        assert_eq!(path, "?b=true");
    }

    #[test]
    fn test_param_path_empty_map() {
        assert_eq!(
            DefaultParamPathBuilder.build_path_of_params(&BTreeMap::new()),
            ""
        );
    }
}
