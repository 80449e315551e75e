//! Analytics API handlers
//!
//! Six read-only views over one slug's visit log. Each handler resolves the
//! slug through the ownership guard before querying anything; the guard is
//! the only authorization path and behaves identically across all views.

use axum::{
    extract::{Path, State},
    Extension, Json,
};
use std::sync::Arc;

use crate::analytics::{
    BrowserCount, ClickSummary, DayCount, DeviceCount, OsCount, ReferrerCount,
};
use crate::auth::{require_owner, Identity, OwnershipError};

use super::handlers::AppState;

/// GET /api/urls/{slug}/analytics/summary
pub async fn get_summary(
    State(state): State<Arc<AppState>>,
    Path(slug): Path<String>,
    Extension(identity): Extension<Identity>,
) -> Result<Json<ClickSummary>, OwnershipError> {
    require_owner(state.storage.as_ref(), &slug, identity.user_id()).await?;

    Ok(Json(state.aggregator.summary(&slug).await?))
}

/// GET /api/urls/{slug}/analytics/timeseries
pub async fn get_time_series(
    State(state): State<Arc<AppState>>,
    Path(slug): Path<String>,
    Extension(identity): Extension<Identity>,
) -> Result<Json<Vec<DayCount>>, OwnershipError> {
    require_owner(state.storage.as_ref(), &slug, identity.user_id()).await?;

    Ok(Json(state.aggregator.time_series(&slug).await?))
}

/// GET /api/urls/{slug}/analytics/referrers
pub async fn get_referrers(
    State(state): State<Arc<AppState>>,
    Path(slug): Path<String>,
    Extension(identity): Extension<Identity>,
) -> Result<Json<Vec<ReferrerCount>>, OwnershipError> {
    require_owner(state.storage.as_ref(), &slug, identity.user_id()).await?;

    Ok(Json(state.aggregator.referrers(&slug).await?))
}

/// GET /api/urls/{slug}/analytics/devices
pub async fn get_devices(
    State(state): State<Arc<AppState>>,
    Path(slug): Path<String>,
    Extension(identity): Extension<Identity>,
) -> Result<Json<Vec<DeviceCount>>, OwnershipError> {
    require_owner(state.storage.as_ref(), &slug, identity.user_id()).await?;

    Ok(Json(state.aggregator.devices(&slug).await?))
}

/// GET /api/urls/{slug}/analytics/browsers
pub async fn get_browsers(
    State(state): State<Arc<AppState>>,
    Path(slug): Path<String>,
    Extension(identity): Extension<Identity>,
) -> Result<Json<Vec<BrowserCount>>, OwnershipError> {
    require_owner(state.storage.as_ref(), &slug, identity.user_id()).await?;

    Ok(Json(state.aggregator.browsers(&slug).await?))
}

/// GET /api/urls/{slug}/analytics/os
pub async fn get_os(
    State(state): State<Arc<AppState>>,
    Path(slug): Path<String>,
    Extension(identity): Extension<Identity>,
) -> Result<Json<Vec<OsCount>>, OwnershipError> {
    require_owner(state.storage.as_ref(), &slug, identity.user_id()).await?;

    Ok(Json(state.aggregator.operating_systems(&slug).await?))
}
