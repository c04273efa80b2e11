//! HTTP transport types and the transport seam.
//!
//! # Design
//! Requests and responses are plain data. The facade builds an `HttpRequest`
//! and hands it to a `Transport`, which performs the actual exchange and
//! answers with an `HttpResponse` or a `TransportError`. The facade never
//! touches the network itself, so any transport (a real client, a spy in
//! tests) can sit behind it.
//!
//! All fields use owned types (`String`, `Vec`) so values move freely across
//! task and thread boundaries.

use std::borrow::Cow;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::{FacadeError, TransportError};
use crate::types::Body;

/// HTTP method supported by the facade.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    Options,
    Head,
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

impl HttpMethod {
    pub const ALL: [HttpMethod; 7] = [
        HttpMethod::Options,
        HttpMethod::Head,
        HttpMethod::Get,
        HttpMethod::Post,
        HttpMethod::Put,
        HttpMethod::Patch,
        HttpMethod::Delete,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            HttpMethod::Options => "OPTIONS",
            HttpMethod::Head => "HEAD",
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Patch => "PATCH",
            HttpMethod::Delete => "DELETE",
        }
    }

    /// Whether query parameters are forwarded for this method.
    pub fn supports_query(self) -> bool {
        !matches!(self, HttpMethod::Options | HttpMethod::Head)
    }

    /// Whether a request body is forwarded for this method.
    pub fn supports_body(self) -> bool {
        matches!(self, HttpMethod::Post | HttpMethod::Put | HttpMethod::Patch)
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Case-insensitive parse; anything outside the supported set is rejected.
impl FromStr for HttpMethod {
    type Err = FacadeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        HttpMethod::ALL
            .into_iter()
            .find(|m| m.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| FacadeError::UnsupportedMethod {
                method: s.to_string(),
            })
    }
}

/// An HTTP request described as plain data.
///
/// Built by `RequestFacade::prepare`. Query parameters are already flattened
/// into pairs: a multi-valued parameter appears once per value.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HttpRequest {
    pub method: HttpMethod,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub query: Vec<(String, String)>,
    pub body: Option<Body>,
}

/// An HTTP response described as plain data.
///
/// The body is kept as raw bytes; use `text` for a UTF-8 view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HttpResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

impl HttpResponse {
    /// The body decoded as UTF-8, with invalid sequences replaced.
    pub fn text(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.body)
    }

    /// First header value matching `name`, compared case-insensitively.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// Performs one HTTP exchange per call.
///
/// Implementations decide which responses count as failures; the facade
/// only looks at whether `send` returned `Err`.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError>;
}

#[async_trait]
impl<T: Transport + ?Sized> Transport for Arc<T> {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        (**self).send(request).await
    }
}
