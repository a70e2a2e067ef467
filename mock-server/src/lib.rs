//! Capture server: records incoming requests as curl commands.
//!
//! Any request that does not hit `/captures` is converted with
//! `http2curl_core` the way a server sees it: an origin-form URL with no
//! scheme, the host taken from the `Host` header, and no TLS. Captures are
//! kept in memory and can be listed, fetched and deleted.
//!
//! `/captures` and `/captures/{id}` are reserved for every method. A method
//! they do not route, such as `POST /captures`, gets `405` and is not
//! captured.

use std::{collections::HashMap, sync::Arc};

use axum::{
    body::Bytes,
    extract::{Path, State},
    http::{header, HeaderMap, Method, StatusCode, Uri},
    routing::get,
    Json, Router,
};
use http2curl_core::{CurlCommand, CurlError, HttpMethod, HttpRequest};
use serde::{Deserialize, Serialize};
use tokio::{net::TcpListener, sync::RwLock};
use tracing::{info, warn};
use uuid::Uuid;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Capture {
    pub id: Uuid,
    pub method: String,
    pub path: String,
    pub tokens: CurlCommand,
    pub command: String,
}

pub type Db = Arc<RwLock<HashMap<Uuid, Capture>>>;

pub fn app() -> Router {
    let db: Db = Arc::new(RwLock::new(HashMap::new()));
    Router::new()
        .route("/captures", get(list_captures))
        .route("/captures/{id}", get(get_capture).delete(delete_capture))
        .fallback(capture)
        .with_state(db)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

/// Rebuild the request as the core sees a server-side capture.
fn captured_request(method: &Method, uri: Uri, headers: &HeaderMap, body: Bytes) -> HttpRequest {
    let host = headers
        .get(header::HOST)
        .and_then(|h| h.to_str().ok())
        .unwrap_or_default()
        .to_string();

    let mut req = HttpRequest::new(HttpMethod::from(method.as_str()), uri).with_host(host);
    for (name, value) in headers {
        if *name == header::HOST {
            continue;
        }
        req.headers
            .append(name.as_str(), String::from_utf8_lossy(value.as_bytes()));
    }
    req.with_body_reader(std::io::Cursor::new(body))
}

fn error_status(err: &CurlError) -> StatusCode {
    match err {
        CurlError::InvalidRequest => StatusCode::BAD_REQUEST,
        CurlError::BodyReadError { .. } => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

async fn capture(
    State(db): State<Db>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Result<(StatusCode, Json<Capture>), (StatusCode, String)> {
    let path = uri.path().to_string();
    let mut req = captured_request(&method, uri, &headers, body);
    let tokens = CurlCommand::from_request(&mut req).map_err(|e| {
        warn!(error = %e, %path, "capture failed");
        (error_status(&e), e.to_string())
    })?;

    let capture = Capture {
        id: Uuid::new_v4(),
        method: method.to_string(),
        path,
        command: tokens.to_string(),
        tokens,
    };
    info!(id = %capture.id, command = %capture.command, "captured request");
    db.write().await.insert(capture.id, capture.clone());
    Ok((StatusCode::CREATED, Json(capture)))
}

async fn list_captures(State(db): State<Db>) -> Json<Vec<Capture>> {
    let captures = db.read().await;
    Json(captures.values().cloned().collect())
}

async fn get_capture(
    State(db): State<Db>,
    Path(id): Path<Uuid>,
) -> Result<Json<Capture>, StatusCode> {
    let captures = db.read().await;
    captures.get(&id).cloned().map(Json).ok_or(StatusCode::NOT_FOUND)
}

async fn delete_capture(
    State(db): State<Db>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, StatusCode> {
    let mut captures = db.write().await;
    captures.remove(&id).map(|_| StatusCode::NO_CONTENT).ok_or(StatusCode::NOT_FOUND)
}
