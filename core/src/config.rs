//! Facade configuration and per-call override resolution.
//!
//! # Design
//! `FacadeConfig` is built once and never mutated. Every call derives an
//! `EffectiveParams` from it with `resolve_overrides`, a pure function: the
//! call-site host replaces the default when non-empty, and header and query
//! maps are shallow-merged with call-site keys winning.

use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize};

/// Header name to value.
pub type Headers = BTreeMap<String, String>;

/// Query parameter name to one or more values.
pub type QueryParams = BTreeMap<String, QueryValue>;

/// A query parameter value: a single string or a list repeated on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum QueryValue {
    One(String),
    Many(Vec<String>),
}

impl QueryValue {
    pub fn values(&self) -> &[String] {
        match self {
            QueryValue::One(v) => std::slice::from_ref(v),
            QueryValue::Many(vs) => vs,
        }
    }
}

impl From<&str> for QueryValue {
    fn from(value: &str) -> Self {
        QueryValue::One(value.to_string())
    }
}

impl From<String> for QueryValue {
    fn from(value: String) -> Self {
        QueryValue::One(value)
    }
}

impl From<Vec<String>> for QueryValue {
    fn from(values: Vec<String>) -> Self {
        QueryValue::Many(values)
    }
}

impl From<&[&str]> for QueryValue {
    fn from(values: &[&str]) -> Self {
        QueryValue::Many(values.iter().map(|v| v.to_string()).collect())
    }
}

/// Default settings shared by every call made through one facade.
///
/// All fields are optional when deserializing; `null` maps count as empty.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FacadeConfig {
    pub host: Option<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub headers: Headers,
    #[serde(deserialize_with = "null_as_default")]
    pub query_params: QueryParams,
    /// Return transport failures inside the envelope instead of as `Err`.
    pub settle: bool,
    /// Emit a `tracing` debug event for every dispatch and outcome.
    pub debug: bool,
}

impl FacadeConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.host = Some(host.into());
        self
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    pub fn query(mut self, name: impl Into<String>, value: impl Into<QueryValue>) -> Self {
        self.query_params.insert(name.into(), value.into());
        self
    }

    pub fn settle(mut self, settle: bool) -> Self {
        self.settle = settle;
        self
    }

    pub fn debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    /// Merge call-site overrides over these defaults without modifying them.
    pub fn resolve_overrides(
        &self,
        host: Option<&str>,
        headers: Option<&Headers>,
        query_params: Option<&QueryParams>,
    ) -> EffectiveParams {
        let host = match host {
            Some(h) if !h.is_empty() => Some(h.to_string()),
            _ => self.host.clone(),
        };
        EffectiveParams {
            host,
            headers: merge(&self.headers, headers),
            query_params: merge(&self.query_params, query_params),
        }
    }
}

/// Host, headers and query parameters in force for a single call.
#[derive(Debug, Clone, PartialEq)]
pub struct EffectiveParams {
    pub host: Option<String>,
    pub headers: Headers,
    pub query_params: QueryParams,
}

impl EffectiveParams {
    /// The resolved host, treating an empty string as absent.
    pub fn host(&self) -> Option<&str> {
        self.host.as_deref().filter(|h| !h.is_empty())
    }
}

fn merge<V: Clone>(
    defaults: &BTreeMap<String, V>,
    overrides: Option<&BTreeMap<String, V>>,
) -> BTreeMap<String, V> {
    let mut merged = defaults.clone();
    if let Some(overrides) = overrides {
        merged.extend(overrides.iter().map(|(k, v)| (k.clone(), v.clone())));
    }
    merged
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn headers(pairs: &[(&str, &str)]) -> Headers {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn defaults_are_neutral() {
        let config = FacadeConfig::new();
        assert!(config.host.is_none());
        assert!(config.headers.is_empty());
        assert!(config.query_params.is_empty());
        assert!(!config.settle);
        assert!(!config.debug);
    }

    #[test]
    fn call_site_host_wins_when_present() {
        let config = FacadeConfig::new().host("https://default.example.com");
        let resolved = config.resolve_overrides(Some("https://other.example.com"), None, None);
        assert_eq!(resolved.host(), Some("https://other.example.com"));
    }

    #[test]
    fn empty_call_site_host_falls_back_to_default() {
        let config = FacadeConfig::new().host("https://default.example.com");
        assert_eq!(
            config.resolve_overrides(Some(""), None, None).host(),
            Some("https://default.example.com")
        );
        assert_eq!(
            config.resolve_overrides(None, None, None).host(),
            Some("https://default.example.com")
        );
    }

    #[test]
    fn no_host_anywhere_resolves_to_none() {
        let config = FacadeConfig::new();
        assert_eq!(config.resolve_overrides(None, None, None).host(), None);

        let blank = FacadeConfig::new().host("");
        assert_eq!(blank.resolve_overrides(None, None, None).host(), None);
    }

    #[test]
    fn headers_merge_with_override_winning() {
        let config = FacadeConfig::new()
            .header("Accept", "application/json")
            .header("X-Client", "default");
        let call = headers(&[("X-Client", "call"), ("Authorization", "Bearer x")]);

        let resolved = config.resolve_overrides(None, Some(&call), None);
        assert_eq!(
            resolved.headers,
            headers(&[
                ("Accept", "application/json"),
                ("Authorization", "Bearer x"),
                ("X-Client", "call"),
            ])
        );
    }

    #[test]
    fn query_params_merge_with_override_winning() {
        let config = FacadeConfig::new().query("page", "1").query("lang", "en");
        let mut call = QueryParams::new();
        call.insert("page".to_string(), "2".into());
        call.insert("tag".to_string(), QueryValue::from(&["a", "b"][..]));

        let resolved = config.resolve_overrides(None, None, Some(&call));
        assert_eq!(resolved.query_params["page"], QueryValue::from("2"));
        assert_eq!(resolved.query_params["lang"], QueryValue::from("en"));
        assert_eq!(resolved.query_params["tag"].values(), ["a", "b"]);
    }

    #[test]
    fn resolution_leaves_config_untouched() {
        let config = FacadeConfig::new().host("https://a").header("Accept", "text/plain");
        let before = config.clone();
        let call = headers(&[("Accept", "application/json")]);
        let _ = config.resolve_overrides(Some("https://b"), Some(&call), None);
        assert_eq!(config, before);
    }

    #[test]
    fn deserializes_from_json_with_nulls_and_missing_fields() {
        let config: FacadeConfig = serde_json::from_str(
            r#"{"host":"https://api.example.com","headers":null,"queryParams":{"ids":["1","2"]},"settle":true}"#,
        )
        .unwrap();
        assert_eq!(config.host.as_deref(), Some("https://api.example.com"));
        assert!(config.headers.is_empty());
        assert_eq!(config.query_params["ids"].values(), ["1", "2"]);
        assert!(config.settle);
        assert!(!config.debug);
    }

    #[test]
    fn deserializes_from_toml() {
        let config: FacadeConfig = toml::from_str(
            r#"
            host = "https://api.example.com"
            debug = true

            [headers]
            Accept = "application/json"
            "#,
        )
        .unwrap();
        assert_eq!(config.headers["Accept"], "application/json");
        assert!(config.debug);
        assert!(!config.settle);
    }
}
