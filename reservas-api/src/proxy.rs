//! Development passthrough to the reservation backend.
//!
//! `{prefix}/reservas/crear?x=1` is sent to `{target}/reservas/crear?x=1` with the
//! same method, body and content type. The backend's status and body come back
//! unchanged.

use axum::{
    body::Bytes,
    extract::{Path, State},
    http::{header, HeaderMap, Method, StatusCode, Uri},
    response::{IntoResponse, Response},
};
use tracing::{debug, error};

use crate::error::AppError;
use crate::state::AppState;

/// Upstream URL for a proxied path. The prefix has already been stripped by routing.
pub fn upstream_url(target: &str, path: &str, query: Option<&str>) -> String {
    let mut url = format!("{}/{}", target.trim_end_matches('/'), path.trim_start_matches('/'));
    if let Some(q) = query.filter(|q| !q.is_empty()) {
        url.push('?');
        url.push_str(q);
    }
    url
}

pub async fn forward(
    State(state): State<AppState>,
    Path(path): Path<String>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Response, AppError> {
    let proxy = state
        .proxy
        .as_ref()
        .ok_or_else(|| AppError::NotFoundError("Proxy disabled".to_string()))?;

    let url = upstream_url(&proxy.target, &path, uri.query());
    debug!("Proxying {} {}{} -> {}", method, proxy.prefix, uri.path(), url);

    let mut request = proxy.http.request(method, &url).body(body);
    if let Some(content_type) = headers.get(header::CONTENT_TYPE) {
        request = request.header(header::CONTENT_TYPE, content_type);
    }
    if let Some(auth) = headers.get(header::AUTHORIZATION) {
        request = request.header(header::AUTHORIZATION, auth);
    }

    let upstream = request.send().await.map_err(|e| {
        error!("Proxy request to {} failed: {}", url, e);
        AppError::UpstreamError(format!("Backend unreachable: {e}"))
    })?;

    let status = StatusCode::from_u16(upstream.status().as_u16())
        .map_err(|e| AppError::InternalServerError(e.to_string()))?;
    let content_type = upstream.headers().get(header::CONTENT_TYPE).cloned();
    let bytes = upstream
        .bytes()
        .await
        .map_err(|e| AppError::UpstreamError(format!("Backend body unreadable: {e}")))?;

    let mut response = (status, bytes).into_response();
    if let Some(content_type) = content_type {
        response.headers_mut().insert(header::CONTENT_TYPE, content_type);
    }
    Ok(response)
}
