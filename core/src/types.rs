//! Per-call parameters.
//!
//! # Design
//! `CallParams` carries the overrides a caller may supply on any verb plus a
//! passthrough bag of arbitrary keys that the facade echoes into the result
//! envelope untouched. When a call is deserialized from JSON, every key that
//! is not a recognized request parameter lands in that bag.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::config::{Headers, QueryParams, QueryValue};

/// Caller-supplied keys echoed unchanged into the result envelope.
pub type Passthrough = Map<String, Value>;

/// A request payload.
///
/// JSON strings deserialize as `Text` and are sent verbatim; any other JSON
/// value is sent serialized as `application/json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Body {
    Text(String),
    Json(Value),
}

impl From<Value> for Body {
    fn from(value: Value) -> Self {
        Body::Json(value)
    }
}

impl From<String> for Body {
    fn from(text: String) -> Self {
        Body::Text(text)
    }
}

impl From<&str> for Body {
    fn from(text: &str) -> Self {
        Body::Text(text.to_string())
    }
}

/// Overrides and extra fields for one facade call.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CallParams {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub host: Option<String>,
    /// Appended to the effective host as `{host}/{rest_path}`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rest_path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub headers: Option<Headers>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub query_params: Option<QueryParams>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<Body>,
    #[serde(flatten)]
    pub passthrough: Passthrough,
}

impl CallParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.host = Some(host.into());
        self
    }

    pub fn rest_path(mut self, path: impl Into<String>) -> Self {
        self.rest_path = Some(path.into());
        self
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers
            .get_or_insert_with(Headers::new)
            .insert(name.into(), value.into());
        self
    }

    pub fn query(mut self, name: impl Into<String>, value: impl Into<QueryValue>) -> Self {
        self.query_params
            .get_or_insert_with(QueryParams::new)
            .insert(name.into(), value.into());
        self
    }

    pub fn body(mut self, body: impl Into<Body>) -> Self {
        self.body = Some(body.into());
        self
    }

    pub fn passthrough(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.passthrough.insert(key.into(), value.into());
        self
    }
}

/// A generic request: a method name plus call parameters, as one document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequestSpec {
    pub method: String,
    #[serde(flatten)]
    pub call: CallParams,
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn unknown_keys_become_passthrough() {
        let call: CallParams = serde_json::from_value(json!({
            "restPath": "users/1",
            "headers": {"Authorization": "Bearer x"},
            "correlationId": "abc",
            "attempt": 2
        }))
        .unwrap();

        assert_eq!(call.rest_path.as_deref(), Some("users/1"));
        assert_eq!(call.headers.as_ref().unwrap()["Authorization"], "Bearer x");
        assert_eq!(call.passthrough.len(), 2);
        assert_eq!(call.passthrough["correlationId"], "abc");
        assert_eq!(call.passthrough["attempt"], 2);
    }

    #[test]
    fn body_string_is_text_and_object_is_json() {
        let call: CallParams = serde_json::from_value(json!({"body": "raw"})).unwrap();
        assert_eq!(call.body, Some(Body::Text("raw".to_string())));

        let call: CallParams = serde_json::from_value(json!({"body": {"name": "x"}})).unwrap();
        assert_eq!(call.body, Some(Body::Json(json!({"name": "x"}))));
    }

    #[test]
    fn request_spec_keeps_method_out_of_passthrough() {
        let spec: RequestSpec = serde_json::from_value(json!({
            "method": "post",
            "restPath": "items",
            "requestId": 7
        }))
        .unwrap();

        assert_eq!(spec.method, "post");
        assert_eq!(spec.call.rest_path.as_deref(), Some("items"));
        assert!(!spec.call.passthrough.contains_key("method"));
        assert_eq!(spec.call.passthrough["requestId"], 7);
    }

    #[test]
    fn builder_accumulates_headers_and_query() {
        let call = CallParams::new()
            .header("A", "1")
            .header("B", "2")
            .query("q", "x")
            .passthrough("tag", "t");

        assert_eq!(call.headers.as_ref().unwrap().len(), 2);
        assert_eq!(call.query_params.as_ref().unwrap()["q"], QueryValue::from("x"));
        assert_eq!(call.passthrough["tag"], "t");
    }
}
