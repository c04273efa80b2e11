//! Blocking ureq transport, driven from async code.
//!
//! # Design
//! ureq performs the exchange on tokio's blocking pool so the facade's async
//! callers are never stalled. The agent is built with ureq's own status
//! classification disabled: 4xx/5xx responses are read in full and, when
//! `status_as_error` is set, reported as `TransportError::Status` with the
//! response body attached. Bodies are read as raw bytes up to
//! `max_body_bytes`, so binary payloads are never mistaken for failures.

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use ureq::typestate::WithBody;
use ureq::{Agent, RequestBuilder};

use crate::error::TransportError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse, Transport};
use crate::types::Body;

type UreqResponse = ureq::http::Response<ureq::Body>;

/// ureq's own default cap for buffered bodies.
const DEFAULT_MAX_BODY_BYTES: u64 = 10 * 1024 * 1024;

/// Settings for `UreqTransport`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TransportOptions {
    /// Upper bound for a whole exchange; `None` waits indefinitely.
    pub timeout_ms: Option<u64>,
    /// Treat 4xx/5xx responses as failures.
    pub status_as_error: bool,
    /// Largest response body read into memory.
    pub max_body_bytes: u64,
}

impl Default for TransportOptions {
    fn default() -> Self {
        Self {
            timeout_ms: None,
            status_as_error: true,
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
        }
    }
}

/// `Transport` backed by a shared `ureq::Agent`.
#[derive(Clone)]
pub struct UreqTransport {
    agent: Agent,
    status_as_error: bool,
    max_body_bytes: u64,
}

impl UreqTransport {
    pub fn new() -> Self {
        Self::with_options(&TransportOptions::default())
    }

    pub fn with_options(options: &TransportOptions) -> Self {
        let agent = Agent::config_builder()
            .http_status_as_error(false)
            .timeout_global(options.timeout_ms.map(Duration::from_millis))
            .build()
            .new_agent();
        Self {
            agent,
            status_as_error: options.status_as_error,
            max_body_bytes: options.max_body_bytes,
        }
    }
}

impl Default for UreqTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for UreqTransport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UreqTransport")
            .field("status_as_error", &self.status_as_error)
            .field("max_body_bytes", &self.max_body_bytes)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl Transport for UreqTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        let agent = self.agent.clone();
        let limit = self.max_body_bytes;
        let response = tokio::task::spawn_blocking(move || execute(&agent, &request, limit))
            .await
            .map_err(|e| TransportError::Aborted {
                message: e.to_string(),
            })??;

        if self.status_as_error && response.status >= 400 {
            return Err(TransportError::Status {
                status: response.status,
                body: response.text().into_owned(),
            });
        }
        Ok(response)
    }
}

fn execute(agent: &Agent, request: &HttpRequest, limit: u64) -> Result<HttpResponse, TransportError> {
    let url = request.url.as_str();
    let response = match request.method {
        HttpMethod::Options => with_params(agent.options(url), request).call().map_err(from_ureq)?,
        HttpMethod::Head => with_params(agent.head(url), request).call().map_err(from_ureq)?,
        HttpMethod::Get => with_params(agent.get(url), request).call().map_err(from_ureq)?,
        HttpMethod::Delete => with_params(agent.delete(url), request).call().map_err(from_ureq)?,
        HttpMethod::Post => send_body(with_params(agent.post(url), request), request)?,
        HttpMethod::Put => send_body(with_params(agent.put(url), request), request)?,
        HttpMethod::Patch => send_body(with_params(agent.patch(url), request), request)?,
    };
    read(response, limit)
}

fn with_params<B>(mut builder: RequestBuilder<B>, request: &HttpRequest) -> RequestBuilder<B> {
    for (name, value) in &request.headers {
        builder = builder.header(name.as_str(), value.as_str());
    }
    for (name, value) in &request.query {
        builder = builder.query(name, value);
    }
    builder
}

fn send_body(
    builder: RequestBuilder<WithBody>,
    request: &HttpRequest,
) -> Result<UreqResponse, TransportError> {
    let sent = match &request.body {
        None => builder.send_empty(),
        Some(Body::Text(text)) => builder.send(text.as_bytes()),
        Some(Body::Json(value)) => {
            let encoded = serde_json::to_vec(value).map_err(|e| TransportError::Encode {
                message: e.to_string(),
            })?;
            let has_content_type = request
                .headers
                .iter()
                .any(|(name, _)| name.eq_ignore_ascii_case("content-type"));
            let builder = if has_content_type {
                builder
            } else {
                builder.header("content-type", "application/json")
            };
            builder.send(&encoded[..])
        }
    };
    sent.map_err(from_ureq)
}

fn read(mut response: UreqResponse, limit: u64) -> Result<HttpResponse, TransportError> {
    let status = response.status().as_u16();
    let headers = response
        .headers()
        .iter()
        .map(|(name, value)| {
            (
                name.as_str().to_string(),
                String::from_utf8_lossy(value.as_bytes()).into_owned(),
            )
        })
        .collect();
    let body = response
        .body_mut()
        .with_config()
        .limit(limit)
        .read_to_vec()
        .map_err(from_ureq)?;
    Ok(HttpResponse {
        status,
        headers,
        body,
    })
}

fn from_ureq(error: ureq::Error) -> TransportError {
    match error {
        ureq::Error::StatusCode(status) => TransportError::Status {
            status,
            body: String::new(),
        },
        ureq::Error::BodyExceedsLimit(limit) => TransportError::BodyTooLarge { limit },
        e @ ureq::Error::Timeout(_) => TransportError::Timeout {
            message: e.to_string(),
        },
        e => TransportError::Network {
            message: e.to_string(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn options_default_to_status_classification_without_timeout() {
        let options: TransportOptions = serde_json::from_str("{}").unwrap();
        assert_eq!(options, TransportOptions::default());
        assert!(options.status_as_error);
        assert!(options.timeout_ms.is_none());
        assert_eq!(options.max_body_bytes, 10 * 1024 * 1024);
    }

    #[test]
    fn options_deserialize_camel_case() {
        let options: TransportOptions =
            serde_json::from_str(r#"{"timeoutMs":1500,"statusAsError":false,"maxBodyBytes":64}"#)
                .unwrap();
        assert_eq!(options.timeout_ms, Some(1500));
        assert!(!options.status_as_error);
        assert_eq!(options.max_body_bytes, 64);
    }

    #[test]
    fn body_limit_error_maps_to_body_too_large() {
        let err = from_ureq(ureq::Error::BodyExceedsLimit(64));
        assert_eq!(err, TransportError::BodyTooLarge { limit: 64 });
    }

    #[test]
    fn ureq_status_error_maps_to_status() {
        let err = from_ureq(ureq::Error::StatusCode(404));
        assert_eq!(
            err,
            TransportError::Status {
                status: 404,
                body: String::new()
            }
        );
    }

    #[test]
    fn other_ureq_errors_map_to_network() {
        let io = std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "refused");
        let err = from_ureq(ureq::Error::Io(io));
        assert!(matches!(err, TransportError::Network { .. }));
    }
}
