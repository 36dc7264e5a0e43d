//! # Interceptor Module
//!
//! Synchronous, mutating hook between template construction and dispatch.
//! The resolved interceptor gets the per-call [`RequestTemplate`] and may
//! rework it freely; the engine snapshots the template before and after so
//! error receivers can see both states.

use crate::meta::EndpointMetadata;
use crate::template::{plain_string, value_is_blank, RequestTemplate};
use serde_json::Value;
use std::collections::BTreeMap;

/// Mutates the request template in place before dispatch.
pub trait RequestInterceptor: Send + Sync {
    fn apply(&self, template: &mut RequestTemplate, metadata: &EndpointMetadata);
}

/// Default interceptor: strips query and header entries whose value is null,
/// the literal string `"null"`, or blank.
pub struct RemoveEmptyQueryInterceptor;

impl RequestInterceptor for RemoveEmptyQueryInterceptor {
    fn apply(&self, template: &mut RequestTemplate, _metadata: &EndpointMetadata) {
        remove_empty_entries(&mut template.query);
        remove_empty_entries(&mut template.header);
    }
}

fn remove_empty_entries(map: &mut BTreeMap<String, Value>) {
    map.retain(|_, value| !value_is_blank(value) && plain_string(value) != "null");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::meta::{compile_bare, ClientDefaults};
    use http::Method;
    use serde_json::json;

    #[test]
    fn test_strips_null_and_blank_query_entries() {
        let metadata = compile_bare(&ClientDefaults::default(), "m");
        let mut template =
            RequestTemplate::new("http://h".to_string(), "/p".to_string(), Method::GET);
        template.query.insert("keep".to_string(), json!("1"));
        template.query.insert("null_value".to_string(), Value::Null);
        template.query.insert("null_text".to_string(), json!("null"));
        template.query.insert("blank".to_string(), json!("  "));
        template.header.insert("x-empty".to_string(), json!(""));
        template.header.insert("x-keep".to_string(), json!("v"));

        RemoveEmptyQueryInterceptor.apply(&mut template, &metadata);

        assert_eq!(template.query.len(), 1);
        assert!(template.query.contains_key("keep"));
        assert_eq!(template.header.len(), 1);
        assert!(template.header.contains_key("x-keep"));
    }

    #[test]
    fn test_body_left_untouched() {
        let metadata = compile_bare(&ClientDefaults::default(), "m");
        let mut template =
            RequestTemplate::new("http://h".to_string(), "/p".to_string(), Method::POST);
        template.body.insert("note".to_string(), Value::Null);

        RemoveEmptyQueryInterceptor.apply(&mut template, &metadata);

        assert!(template.body.contains_key("note"));
    }
}
