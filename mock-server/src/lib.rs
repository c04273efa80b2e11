use std::collections::BTreeMap;

use axum::{
    extract::{Path, Query},
    http::{header, HeaderMap, Method, StatusCode, Uri},
    response::IntoResponse,
    routing::any,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tokio::net::TcpListener;
use uuid::Uuid;

/// PNG signature followed by bytes that are not valid UTF-8.
pub const BINARY_BODY: &[u8] = &[0x89, b'P', b'N', b'G', 0x0d, 0x0a, 0x1a, 0x0a, 0xff, 0x00];

/// What the server saw for one request.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Echo {
    pub id: Uuid,
    pub method: String,
    pub path: String,
    pub query: Vec<(String, String)>,
    pub headers: BTreeMap<String, String>,
    pub body: String,
}

pub fn app() -> Router {
    Router::new()
        .route("/status/{code}", any(status))
        .route("/binary", any(binary))
        .fallback(echo)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

async fn echo(
    method: Method,
    uri: Uri,
    Query(query): Query<Vec<(String, String)>>,
    headers: HeaderMap,
    body: String,
) -> Json<Echo> {
    tracing::debug!(method = %method, path = %uri.path(), "echo");
    let headers = headers
        .iter()
        .map(|(name, value)| {
            (
                name.as_str().to_string(),
                String::from_utf8_lossy(value.as_bytes()).into_owned(),
            )
        })
        .collect();
    Json(Echo {
        id: Uuid::new_v4(),
        method: method.as_str().to_string(),
        path: uri.path().to_string(),
        query,
        headers,
        body,
    })
}

async fn status(Path(code): Path<u16>) -> (StatusCode, String) {
    let status = StatusCode::from_u16(code).unwrap_or(StatusCode::BAD_REQUEST);
    (status, format!("status {}", status.as_u16()))
}

async fn binary() -> impl IntoResponse {
    ([(header::CONTENT_TYPE, "image/png")], BINARY_BODY)
}
