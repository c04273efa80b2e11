//! Configurable HTTP request facade.
//!
//! # Overview
//! A `RequestFacade` wraps any `Transport` and adds per-call overrides of
//! host, headers and query parameters on top of defaults fixed at
//! construction. Every call returns an `Envelope` that echoes the caller's
//! passthrough fields next to the transport's response or error.
//!
//! # Design
//! - Configuration is immutable; per-call parameters are merged by a pure
//!   function (`FacadeConfig::resolve_overrides`).
//! - Building the request (`prepare`) is separate from sending it, so the
//!   exact outgoing `HttpRequest` is inspectable without I/O.
//! - Raising vs. settling transport failures is a type parameter picked at
//!   construction (`Raise` / `Settle`); `Facade` chooses from config.
//! - `UreqTransport` is the bundled transport; anything implementing
//!   `Transport` can replace it.

pub mod config;
pub mod envelope;
pub mod error;
pub mod facade;
pub mod http;
pub mod transport;
pub mod types;

pub use config::{EffectiveParams, FacadeConfig, Headers, QueryParams, QueryValue};
pub use envelope::{Envelope, Outcome};
pub use error::{FacadeError, TransportError};
pub use facade::{Facade, Raise, RequestFacade, Settle, Settlement};
pub use http::{HttpMethod, HttpRequest, HttpResponse, Transport};
pub use transport::{TransportOptions, UreqTransport};
pub use types::{Body, CallParams, Passthrough, RequestSpec};
