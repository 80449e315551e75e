use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use rand::{distr::Alphanumeric, RngExt};
use serde::Serialize;
use std::sync::Arc;

use crate::analytics::VisitAggregator;
use crate::auth::{require_owner, Identity, OwnershipError};
use crate::models::{CreateUrlRequest, ShortUrl, UpdateUrlRequest};
use crate::storage::{Storage, StorageError};

pub struct AppState {
    pub storage: Arc<dyn Storage>,
    pub aggregator: VisitAggregator,
}

#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

#[derive(Serialize)]
pub struct SuccessResponse {
    pub message: String,
}

const SLUG_LENGTH: usize = 7;
const MAX_SLUG_ATTEMPTS: usize = 10;
const MAX_CUSTOM_SLUG_LENGTH: usize = 50;

/// Generate a random alphanumeric slug
fn generate_slug() -> String {
    rand::rng()
        .sample_iter(&Alphanumeric)
        .take(SLUG_LENGTH)
        .map(char::from)
        .collect()
}

fn error(status: StatusCode, message: &str) -> (StatusCode, Json<ErrorResponse>) {
    (
        status,
        Json(ErrorResponse {
            error: message.to_string(),
        }),
    )
}

fn server_error(err: anyhow::Error) -> (StatusCode, Json<ErrorResponse>) {
    tracing::error!(error = %err, "request failed");
    error(StatusCode::INTERNAL_SERVER_ERROR, "Server error")
}

/// Create a new shortened URL. The creator is recorded when the caller is
/// authenticated; anonymous creation is allowed but leaves the URL without
/// an analytics owner.
pub async fn create_url(
    State(state): State<Arc<AppState>>,
    Extension(identity): Extension<Identity>,
    Json(payload): Json<CreateUrlRequest>,
) -> Result<(StatusCode, Json<ShortUrl>), (StatusCode, Json<ErrorResponse>)> {
    let Some(long_url) = payload.long_url.filter(|u| !u.is_empty()) else {
        return Err(error(StatusCode::BAD_REQUEST, "longUrl is required"));
    };

    let creator_id = identity.user_id().map(str::to_string);

    let slug = match payload.custom_slug {
        Some(custom) => {
            if custom.is_empty() || custom.len() > MAX_CUSTOM_SLUG_LENGTH {
                return Err(error(
                    StatusCode::BAD_REQUEST,
                    "customSlug must be 1-50 characters",
                ));
            }

            if state
                .storage
                .slug_exists(&custom)
                .await
                .map_err(server_error)?
            {
                return Err(error(StatusCode::CONFLICT, "Slug already exists"));
            }

            custom
        }
        None => {
            let mut slug = generate_slug();
            let mut attempts = 0;
            while state
                .storage
                .slug_exists(&slug)
                .await
                .map_err(server_error)?
            {
                attempts += 1;
                if attempts >= MAX_SLUG_ATTEMPTS {
                    return Err(error(
                        StatusCode::INTERNAL_SERVER_ERROR,
                        "Failed to generate a unique slug",
                    ));
                }
                slug = generate_slug();
            }

            slug
        }
    };

    match state
        .storage
        .create_url(
            &slug,
            &long_url,
            payload.title.as_deref(),
            payload.expires_at,
            creator_id.as_deref(),
        )
        .await
    {
        Ok(url) => Ok((StatusCode::CREATED, Json(url))),
        // A racing create can take the slug between our existence check and
        // the insert; surface it the same way as the upfront check.
        Err(StorageError::Conflict) => Err(error(StatusCode::CONFLICT, "Slug already exists")),
        Err(StorageError::Other(err)) => Err(server_error(err)),
    }
}

/// List the caller's URLs, newest first.
pub async fn list_urls(
    State(state): State<Arc<AppState>>,
    Extension(identity): Extension<Identity>,
) -> Result<Json<Vec<ShortUrl>>, (StatusCode, Json<ErrorResponse>)> {
    let Some(caller_id) = identity.user_id() else {
        return Err(error(StatusCode::UNAUTHORIZED, "Authentication required"));
    };

    state
        .storage
        .list_by_creator(caller_id)
        .await
        .map(Json)
        .map_err(server_error)
}

/// Fetch one URL, ownership-checked.
pub async fn get_url(
    State(state): State<Arc<AppState>>,
    Path(slug): Path<String>,
    Extension(identity): Extension<Identity>,
) -> Result<Json<ShortUrl>, OwnershipError> {
    let url = require_owner(state.storage.as_ref(), &slug, identity.user_id()).await?;

    Ok(Json(url))
}

/// Update the mutable lifecycle fields (disabled, expiresAt) of an owned URL.
pub async fn update_url(
    State(state): State<Arc<AppState>>,
    Path(slug): Path<String>,
    Extension(identity): Extension<Identity>,
    Json(payload): Json<UpdateUrlRequest>,
) -> Result<Json<ShortUrl>, OwnershipError> {
    require_owner(state.storage.as_ref(), &slug, identity.user_id()).await?;

    state
        .storage
        .update_url(&slug, payload.disabled, payload.expires_at)
        .await?;

    let url = state
        .storage
        .find_by_slug(&slug)
        .await?
        .ok_or(OwnershipError::NotFound)?;

    Ok(Json(url))
}

/// Health check endpoint
pub async fn health_check() -> Json<SuccessResponse> {
    Json(SuccessResponse {
        message: "OK".to_string(),
    })
}
