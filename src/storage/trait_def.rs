use crate::models::{NewVisit, ShortUrl};
use anyhow::Result;
use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("slug already exists")]
    Conflict,
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type StorageResult<T> = Result<T, StorageError>;

/// Dimension of the visit log that grouped analytics queries run over.
///
/// The variants map to fixed column names so callers can never smuggle
/// arbitrary SQL into a GROUP BY.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VisitDimension {
    Referrer,
    DeviceType,
    Browser,
    Os,
}

impl VisitDimension {
    pub(crate) fn column(self) -> &'static str {
        match self {
            VisitDimension::Referrer => "referrer",
            VisitDimension::DeviceType => "device_type",
            VisitDimension::Browser => "browser",
            VisitDimension::Os => "os",
        }
    }
}

#[async_trait]
pub trait Storage: Send + Sync {
    /// Initialize the storage (create tables and indexes)
    async fn init(&self) -> Result<()>;

    /// Create a shortened URL with the given slug
    async fn create_url(
        &self,
        slug: &str,
        long_url: &str,
        title: Option<&str>,
        expires_at: Option<i64>,
        creator_id: Option<&str>,
    ) -> StorageResult<ShortUrl>;

    /// Look up a URL by slug
    async fn find_by_slug(&self, slug: &str) -> Result<Option<ShortUrl>>;

    /// Whether a slug is already taken
    async fn slug_exists(&self, slug: &str) -> Result<bool>;

    /// Update the mutable lifecycle fields of a URL; `None` leaves a field
    /// untouched. Returns false when the slug is unknown.
    async fn update_url(
        &self,
        slug: &str,
        disabled: Option<bool>,
        expires_at: Option<i64>,
    ) -> Result<bool>;

    /// List URLs created by one user, newest first
    async fn list_by_creator(&self, creator_id: &str) -> Result<Vec<ShortUrl>>;

    /// Append one visit event to the log
    async fn append_visit(&self, visit: &NewVisit) -> Result<()>;

    /// Total visits recorded for a slug
    async fn count_visits(&self, slug: &str) -> Result<i64>;

    /// Distinct (ip_address, user_agent) pairs among a slug's visits
    async fn count_unique_visitors(&self, slug: &str) -> Result<i64>;

    /// Visit counts grouped by UTC calendar day ("YYYY-MM-DD"), unordered
    async fn visits_per_day(&self, slug: &str) -> Result<Vec<(String, i64)>>;

    /// Visit counts grouped by one dimension, unordered
    async fn group_visits(
        &self,
        slug: &str,
        dimension: VisitDimension,
    ) -> Result<Vec<(Option<String>, i64)>>;
}
