//! Ownership guard binding a slug's analytics and management to its creator
//!
//! Every analytics view and every URL-management endpoint runs this exact
//! check before touching anything else; it is the single authorization path,
//! not per-handler boilerplate.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::models::ShortUrl;
use crate::storage::Storage;

#[derive(Debug, Error)]
pub enum OwnershipError {
    #[error("URL not found")]
    NotFound,
    #[error("Authentication required")]
    Unauthenticated,
    /// The URL was created anonymously; nobody owns its analytics.
    #[error("You do not have permission to access this URL")]
    NoOwner,
    #[error("You do not have permission to access this URL")]
    Forbidden,
    #[error(transparent)]
    Store(#[from] anyhow::Error),
}

impl OwnershipError {
    fn status(&self) -> StatusCode {
        match self {
            OwnershipError::NotFound => StatusCode::NOT_FOUND,
            OwnershipError::Unauthenticated => StatusCode::UNAUTHORIZED,
            OwnershipError::NoOwner | OwnershipError::Forbidden => StatusCode::FORBIDDEN,
            OwnershipError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for OwnershipError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match &self {
            OwnershipError::Store(err) => {
                tracing::error!(error = %err, "storage failure during ownership check");
                "Server error".to_string()
            }
            other => other.to_string(),
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}

/// Resolve a slug and check that the caller is its recorded creator.
///
/// The checks run in a fixed order: unknown slug, missing caller, anonymous
/// URL, creator mismatch. Read-only.
pub async fn require_owner(
    storage: &dyn Storage,
    slug: &str,
    caller_id: Option<&str>,
) -> Result<ShortUrl, OwnershipError> {
    let url = storage
        .find_by_slug(slug)
        .await?
        .ok_or(OwnershipError::NotFound)?;

    let caller_id = caller_id.ok_or(OwnershipError::Unauthenticated)?;

    match url.creator_id.as_deref() {
        None => Err(OwnershipError::NoOwner),
        Some(creator) if creator != caller_id => Err(OwnershipError::Forbidden),
        Some(_) => Ok(url),
    }
}
