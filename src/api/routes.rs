use axum::{
    extract::Request,
    http::HeaderMap,
    middleware::{self, Next},
    routing::get,
    Router,
};
use std::sync::Arc;

use crate::analytics::VisitAggregator;
use crate::auth::{identity_middleware, AuthService};
use crate::storage::Storage;

use super::analytics;
use super::handlers::{
    create_url, get_url, health_check, list_urls, update_url, AppState,
};

pub fn create_api_router(storage: Arc<dyn Storage>, auth_service: Arc<AuthService>) -> Router {
    let aggregator = VisitAggregator::new(Arc::clone(&storage));
    let state = Arc::new(AppState {
        storage,
        aggregator,
    });

    Router::new()
        .route("/api/health", get(health_check))
        .route("/api/urls", get(list_urls).post(create_url))
        .route("/api/urls/{slug}", get(get_url).patch(update_url))
        .route(
            "/api/urls/{slug}/analytics/summary",
            get(analytics::get_summary),
        )
        .route(
            "/api/urls/{slug}/analytics/timeseries",
            get(analytics::get_time_series),
        )
        .route(
            "/api/urls/{slug}/analytics/referrers",
            get(analytics::get_referrers),
        )
        .route(
            "/api/urls/{slug}/analytics/devices",
            get(analytics::get_devices),
        )
        .route(
            "/api/urls/{slug}/analytics/browsers",
            get(analytics::get_browsers),
        )
        .route("/api/urls/{slug}/analytics/os", get(analytics::get_os))
        .route_layer(middleware::from_fn(
            move |headers: HeaderMap, request: Request, next: Next| {
                let auth = Arc::clone(&auth_service);
                identity_middleware(auth, headers, request, next)
            },
        ))
        .with_state(state)
}
