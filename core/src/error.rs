//! Error types for the request facade.
//!
//! # Design
//! Two layers. `TransportError` is whatever the transport reports for a
//! failed exchange; it is plain data so settling facades can hand it back
//! inside an `Envelope`. `FacadeError` is what a facade call returns as
//! `Err`: precondition failures that are never settled, plus transport
//! failures when the facade raises.

use serde::Serialize;
use thiserror::Error;

use crate::http::HttpMethod;

/// A failed HTTP exchange, as reported by a `Transport`.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TransportError {
    /// The server answered with a status the transport classifies as failure.
    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },

    /// Connection, DNS, TLS or protocol failure.
    #[error("network error: {message}")]
    Network { message: String },

    /// The response body exceeded the transport's size limit.
    #[error("response body exceeds {limit} bytes")]
    BodyTooLarge { limit: u64 },

    #[error("request timed out: {message}")]
    Timeout { message: String },

    /// The request body could not be encoded.
    #[error("failed to encode request body: {message}")]
    Encode { message: String },

    /// The exchange was abandoned before completing (e.g. the worker panicked).
    #[error("request aborted: {message}")]
    Aborted { message: String },
}

/// Errors returned by `RequestFacade` calls.
#[derive(Debug, Error)]
pub enum FacadeError {
    /// Neither the facade nor the call supplied a host.
    #[error("{method} error: no host")]
    MissingHost { method: HttpMethod },

    #[error("unsupported HTTP method: {method}")]
    UnsupportedMethod { method: String },

    #[error(transparent)]
    Transport(#[from] TransportError),
}

impl FacadeError {
    /// The underlying transport failure, if this error carries one.
    pub fn transport(&self) -> Option<&TransportError> {
        match self {
            FacadeError::Transport(e) => Some(e),
            _ => None,
        }
    }
}
