use axum::{
    extract::{ConnectInfo, Path, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use std::net::SocketAddr;
use std::sync::Arc;

use crate::analytics::user_agent;
use crate::models::{NewVisit, ShortUrl};
use crate::storage::Storage;

use super::client_ip::extract_client_ip;

pub struct RedirectState {
    pub storage: Arc<dyn Storage>,
}

/// Resolve a slug and redirect, recording the visit out of band.
pub async fn redirect_url(
    State(state): State<Arc<RedirectState>>,
    Path(slug): Path<String>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    headers: HeaderMap,
) -> Response {
    let url = match state.storage.find_by_slug(&slug).await {
        Ok(Some(url)) => url,
        Ok(None) => return (StatusCode::NOT_FOUND, "URL not found").into_response(),
        Err(err) => {
            tracing::error!(slug = %slug, error = %err, "slug lookup failed");
            return (StatusCode::INTERNAL_SERVER_ERROR, "Server error").into_response();
        }
    };

    if url.disabled {
        return (StatusCode::GONE, "URL is disabled").into_response();
    }

    if url.expired_at(chrono::Utc::now().timestamp()) {
        return (StatusCode::GONE, "URL has expired").into_response();
    }

    // The redirect decision is made; the visit append happens after the
    // response regardless of whether it succeeds.
    record_visit(Arc::clone(&state.storage), &url, &headers, addr.ip());

    (StatusCode::FOUND, [(header::LOCATION, url.long_url)]).into_response()
}

/// Derive a visit record from the request and append it without blocking the
/// redirect. Append failures are logged and dropped.
fn record_visit(
    storage: Arc<dyn Storage>,
    url: &ShortUrl,
    headers: &HeaderMap,
    socket_ip: std::net::IpAddr,
) {
    let user_agent = headers
        .get(header::USER_AGENT)
        .and_then(|h| h.to_str().ok())
        .map(str::to_string);
    let referrer = headers
        .get(header::REFERER)
        .and_then(|h| h.to_str().ok())
        .map(str::to_string);

    let client = user_agent
        .as_deref()
        .map(user_agent::parse)
        .unwrap_or_default();

    let visit = NewVisit {
        url_id: url.id,
        slug: url.slug.clone(),
        created_at: chrono::Utc::now().timestamp(),
        ip_address: Some(extract_client_ip(headers, socket_ip).to_string()),
        referrer,
        user_agent,
        browser: client.browser,
        os: client.os,
        device_type: client.device_type,
    };

    tokio::spawn(async move {
        if let Err(err) = storage.append_visit(&visit).await {
            tracing::warn!(slug = %visit.slug, error = %err, "failed to record visit");
        }
    });
}

/// Health check endpoint
pub async fn health_check() -> impl IntoResponse {
    #[derive(Serialize)]
    struct HealthResponse {
        status: String,
    }

    Json(HealthResponse {
        status: "OK".to_string(),
    })
}
