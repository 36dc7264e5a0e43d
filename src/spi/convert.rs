use serde_json::{Map, Value};
use tracing::warn;

/// SPI: flattens a complex argument value into a string-keyed map whose
/// entries merge into the query, body or header channel.
///
/// Implementations only ever see complex values — scalar arguments are
/// stored under their field name without conversion.
pub trait ObjectConverter: Send + Sync {
    fn convert(&self, value: &Value) -> Option<Map<String, Value>>;
}

/// Default converter: a JSON object becomes its own entry map; anything else
/// cannot be flattened and contributes nothing.
pub struct DefaultObjectConverter;

impl ObjectConverter for DefaultObjectConverter {
    fn convert(&self, value: &Value) -> Option<Map<String, Value>> {
        match value {
            Value::Object(map) => Some(map.clone()),
            Value::Null => None,
            other => {
                warn!(
                    value_kind = value_kind(other),
                    "object converter received a non-object value, skipping"
                );
                None
            }
        }
    }
}

fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
