use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// One recorded redirect event. Immutable once appended.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Visit {
    pub id: i64,
    pub url_id: i64,
    pub slug: String,
    pub created_at: i64,
    pub ip_address: Option<String>,
    pub referrer: Option<String>,
    pub user_agent: Option<String>,
    pub browser: Option<String>,
    pub os: Option<String>,
    pub device_type: String,
}

/// A visit derived from a redirect request, not yet persisted.
///
/// The browser/os/device fields are parsed from the raw user-agent string at
/// ingest time so analytics never has to re-parse historical events.
#[derive(Debug, Clone)]
pub struct NewVisit {
    pub url_id: i64,
    pub slug: String,
    pub created_at: i64,
    pub ip_address: Option<String>,
    pub referrer: Option<String>,
    pub user_agent: Option<String>,
    pub browser: Option<String>,
    pub os: Option<String>,
    pub device_type: String,
}
