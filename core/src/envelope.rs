//! Result envelope returned by every facade call.

use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

use crate::error::TransportError;
use crate::http::HttpResponse;
use crate::types::Passthrough;

/// What the transport produced for a call.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    Response(HttpResponse),
    /// Only produced by settling facades.
    Error(TransportError),
}

impl Outcome {
    /// Key the outcome occupies in a serialized envelope.
    pub fn key(&self) -> &'static str {
        match self {
            Outcome::Response(_) => "response",
            Outcome::Error(_) => "error",
        }
    }
}

/// The caller's passthrough fields alongside exactly one outcome.
///
/// Serializes flat: passthrough keys sit next to a single `response` or
/// `error` key. A passthrough entry under that same key is dropped, so the
/// outcome always wins.
#[derive(Debug, Clone, PartialEq)]
pub struct Envelope {
    pub passthrough: Passthrough,
    pub outcome: Outcome,
}

impl Serialize for Envelope {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let key = self.outcome.key();
        let mut map = serializer.serialize_map(None)?;
        for (name, value) in self.passthrough.iter().filter(|(name, _)| name.as_str() != key) {
            map.serialize_entry(name, value)?;
        }
        match &self.outcome {
            Outcome::Response(response) => map.serialize_entry(key, response)?,
            Outcome::Error(error) => map.serialize_entry(key, error)?,
        }
        map.end()
    }
}

impl Envelope {
    pub fn response(passthrough: Passthrough, response: HttpResponse) -> Self {
        Self {
            passthrough,
            outcome: Outcome::Response(response),
        }
    }

    pub fn error(passthrough: Passthrough, error: TransportError) -> Self {
        Self {
            passthrough,
            outcome: Outcome::Error(error),
        }
    }

    pub fn as_response(&self) -> Option<&HttpResponse> {
        match &self.outcome {
            Outcome::Response(r) => Some(r),
            Outcome::Error(_) => None,
        }
    }

    pub fn as_error(&self) -> Option<&TransportError> {
        match &self.outcome {
            Outcome::Error(e) => Some(e),
            Outcome::Response(_) => None,
        }
    }

    /// Convert into a `Result`, keeping the passthrough bag on both sides.
    pub fn into_result(self) -> Result<(Passthrough, HttpResponse), (Passthrough, TransportError)> {
        match self.outcome {
            Outcome::Response(r) => Ok((self.passthrough, r)),
            Outcome::Error(e) => Err((self.passthrough, e)),
        }
    }
}
