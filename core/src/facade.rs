//! The request facade: override merge, method dispatch, result shaping.
//!
//! # Design
//! `RequestFacade` holds an immutable `FacadeConfig` and a `Transport`, and
//! carries no mutable state between calls, so one instance can serve any
//! number of concurrent callers. Each call is split into `prepare` (pure:
//! resolve overrides, check the host, build an `HttpRequest`) and the
//! transport round-trip.
//!
//! Whether transport failures raise or settle is fixed by the `S` type
//! parameter (`Raise` or `Settle`) when the facade is built. `Facade` picks
//! one of the two once, from `FacadeConfig::settle`. The stored config always
//! reports the mode the facade actually runs in.

use std::marker::PhantomData;

use tracing::debug;

use crate::config::FacadeConfig;
use crate::envelope::Envelope;
use crate::error::{FacadeError, TransportError};
use crate::http::{HttpMethod, HttpRequest, HttpResponse, Transport};
use crate::types::{CallParams, Passthrough, RequestSpec};

mod sealed {
    pub trait Sealed {}
    impl Sealed for super::Raise {}
    impl Sealed for super::Settle {}
}

/// How a transport result is turned into a facade result.
pub trait Settlement: sealed::Sealed + Send + Sync + 'static {
    /// Value of `FacadeConfig::settle` for facades in this mode.
    const SETTLES: bool;

    fn settle(
        passthrough: Passthrough,
        result: Result<HttpResponse, TransportError>,
    ) -> Result<Envelope, FacadeError>;
}

/// Transport failures are returned as `Err(FacadeError::Transport)`.
#[derive(Debug, Clone, Copy, Default)]
pub struct Raise;

/// Transport failures are returned as `Ok` envelopes carrying the error.
#[derive(Debug, Clone, Copy, Default)]
pub struct Settle;

impl Settlement for Raise {
    const SETTLES: bool = false;

    fn settle(
        passthrough: Passthrough,
        result: Result<HttpResponse, TransportError>,
    ) -> Result<Envelope, FacadeError> {
        Ok(Envelope::response(passthrough, result?))
    }
}

impl Settlement for Settle {
    const SETTLES: bool = true;

    fn settle(
        passthrough: Passthrough,
        result: Result<HttpResponse, TransportError>,
    ) -> Result<Envelope, FacadeError> {
        Ok(match result {
            Ok(response) => Envelope::response(passthrough, response),
            Err(error) => Envelope::error(passthrough, error),
        })
    }
}

/// One async operation per HTTP verb, all routed through `send`.
macro_rules! verb_methods {
    ($($(#[$doc:meta])* $name:ident => $method:ident;)*) => {
        $(
            $(#[$doc])*
            pub async fn $name(&self, call: CallParams) -> Result<Envelope, FacadeError> {
                self.send(HttpMethod::$method, call).await
            }
        )*
    };
}

/// HTTP facade over a transport, with mode `S` fixed at construction.
#[derive(Debug, Clone)]
pub struct RequestFacade<T, S = Raise> {
    config: FacadeConfig,
    transport: T,
    _mode: PhantomData<S>,
}

impl<T: Transport> RequestFacade<T, Raise> {
    /// A facade whose transport failures are returned as `Err`.
    ///
    /// `config.settle` is cleared to match.
    pub fn raising(config: FacadeConfig, transport: T) -> Self {
        Self::with_mode(config, transport)
    }
}

impl<T: Transport> RequestFacade<T, Settle> {
    /// A facade that never returns transport failures as `Err`.
    ///
    /// `config.settle` is set to match.
    pub fn settling(config: FacadeConfig, transport: T) -> Self {
        Self::with_mode(config, transport)
    }
}

impl<T: Transport, S: Settlement> RequestFacade<T, S> {
    fn with_mode(mut config: FacadeConfig, transport: T) -> Self {
        config.settle = S::SETTLES;
        Self {
            config,
            transport,
            _mode: PhantomData,
        }
    }

    pub fn config(&self) -> &FacadeConfig {
        &self.config
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Build the request `method` would send for `call`, without sending it.
    ///
    /// Fails with `MissingHost` when no host is configured or supplied.
    pub fn prepare(&self, method: HttpMethod, call: &CallParams) -> Result<HttpRequest, FacadeError> {
        let effective = self.config.resolve_overrides(
            call.host.as_deref(),
            call.headers.as_ref(),
            call.query_params.as_ref(),
        );
        let host = effective.host().ok_or(FacadeError::MissingHost { method })?;

        // No slash normalization: the path is appended exactly as given.
        let url = match call.rest_path.as_deref() {
            Some(path) if !path.is_empty() => format!("{host}/{path}"),
            _ => host.to_string(),
        };

        let query: Vec<(String, String)> = if method.supports_query() {
            effective
                .query_params
                .iter()
                .flat_map(|(name, value)| value.values().iter().map(move |v| (name.clone(), v.clone())))
                .collect()
        } else {
            Vec::new()
        };

        let body = if method.supports_body() {
            call.body.clone()
        } else {
            None
        };

        Ok(HttpRequest {
            method,
            url,
            headers: effective.headers.into_iter().collect(),
            query,
            body,
        })
    }

    /// Send `call` with `method` and shape the transport result.
    pub async fn send(&self, method: HttpMethod, call: CallParams) -> Result<Envelope, FacadeError> {
        let request = self.prepare(method, &call)?;
        if self.config.debug {
            debug!(method = %method, url = %request.url, "dispatching request");
        }

        let result = self.transport.send(request).await;
        if self.config.debug {
            match &result {
                Ok(response) => debug!(method = %method, status = response.status, "request completed"),
                Err(error) => debug!(method = %method, error = %error, "request failed"),
            }
        }

        S::settle(call.passthrough, result)
    }

    /// Dispatch by method name, case-insensitively.
    pub async fn request(&self, method: &str, call: CallParams) -> Result<Envelope, FacadeError> {
        self.send(method.parse()?, call).await
    }

    /// Dispatch a method-plus-parameters document.
    pub async fn dispatch(&self, spec: RequestSpec) -> Result<Envelope, FacadeError> {
        self.request(&spec.method, spec.call).await
    }

    verb_methods! {
        /// Query parameters and body are ignored.
        options => Options;
        /// Query parameters and body are ignored.
        head => Head;
        /// The body is ignored.
        get => Get;
        post => Post;
        put => Put;
        patch => Patch;
        /// The body is ignored.
        delete => Delete;
    }
}

/// A facade whose settle mode is chosen from `FacadeConfig::settle`.
#[derive(Debug, Clone)]
pub enum Facade<T> {
    Raise(RequestFacade<T, Raise>),
    Settle(RequestFacade<T, Settle>),
}

impl<T: Transport> Facade<T> {
    pub fn new(config: FacadeConfig, transport: T) -> Self {
        if config.settle {
            Facade::Settle(RequestFacade::settling(config, transport))
        } else {
            Facade::Raise(RequestFacade::raising(config, transport))
        }
    }

    pub fn config(&self) -> &FacadeConfig {
        match self {
            Facade::Raise(f) => f.config(),
            Facade::Settle(f) => f.config(),
        }
    }

    pub fn prepare(&self, method: HttpMethod, call: &CallParams) -> Result<HttpRequest, FacadeError> {
        match self {
            Facade::Raise(f) => f.prepare(method, call),
            Facade::Settle(f) => f.prepare(method, call),
        }
    }

    pub async fn send(&self, method: HttpMethod, call: CallParams) -> Result<Envelope, FacadeError> {
        match self {
            Facade::Raise(f) => f.send(method, call).await,
            Facade::Settle(f) => f.send(method, call).await,
        }
    }

    pub async fn request(&self, method: &str, call: CallParams) -> Result<Envelope, FacadeError> {
        self.send(method.parse()?, call).await
    }

    pub async fn dispatch(&self, spec: RequestSpec) -> Result<Envelope, FacadeError> {
        self.request(&spec.method, spec.call).await
    }

    verb_methods! {
        options => Options;
        head => Head;
        get => Get;
        post => Post;
        put => Put;
        patch => Patch;
        delete => Delete;
    }
}
