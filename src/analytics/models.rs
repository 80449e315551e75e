//! Wire models for the analytics views

use serde::Serialize;

/// Totals for one slug: every recorded click plus the distinct
/// (ip, user-agent) pair count standing in for unique visitors.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClickSummary {
    pub total_clicks: i64,
    pub unique_visitors: i64,
}

/// One day of the sparse click time series.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DayCount {
    pub date: String,
    pub count: i64,
}

/// Clicks attributed to one referrer; `None` is the no-referrer bucket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReferrerCount {
    pub referrer: Option<String>,
    pub count: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceCount {
    pub device_type: String,
    pub count: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BrowserCount {
    pub browser: Option<String>,
    pub count: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OsCount {
    pub os: Option<String>,
    pub count: i64,
}
