//! Per-slug aggregation of the visit log into the analytics views
//!
//! Every view is a pure read over the Visit Store: the store produces raw
//! grouped rows and this module owns the shaping (ordering, top-N ranking,
//! wire-model mapping). Nothing here mutates the log, so any number of views
//! can run concurrently with each other and with ingest appends; a view may
//! or may not observe a visit appended while it runs.

use std::sync::Arc;

use anyhow::Result;

use crate::analytics::models::{
    BrowserCount, ClickSummary, DayCount, DeviceCount, OsCount, ReferrerCount,
};
use crate::analytics::user_agent::DEFAULT_DEVICE_TYPE;
use crate::storage::{Storage, VisitDimension};

/// Maximum entries returned by the referrer breakdown.
const TOP_REFERRERS: usize = 10;

pub struct VisitAggregator {
    storage: Arc<dyn Storage>,
}

impl VisitAggregator {
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        Self { storage }
    }

    /// Total clicks plus the distinct (ip, user-agent) pair count.
    ///
    /// The pair count is a deliberately crude stand-in for unique humans:
    /// the same IP with two user agents counts twice, and clients behind a
    /// shared NAT collapse into one. Callers depend on these exact
    /// semantics; do not swap in a different uniqueness notion.
    pub async fn summary(&self, slug: &str) -> Result<ClickSummary> {
        let total_clicks = self.storage.count_visits(slug).await?;
        let unique_visitors = self.storage.count_unique_visitors(slug).await?;

        Ok(ClickSummary {
            total_clicks,
            unique_visitors,
        })
    }

    /// Clicks per UTC calendar day, ascending by day string.
    ///
    /// Days without visits are absent; consumers must not assume the series
    /// is contiguous.
    pub async fn time_series(&self, slug: &str) -> Result<Vec<DayCount>> {
        let mut days: Vec<DayCount> = self
            .storage
            .visits_per_day(slug)
            .await?
            .into_iter()
            .map(|(date, count)| DayCount { date, count })
            .collect();

        days.sort_by(|a, b| a.date.cmp(&b.date));

        Ok(days)
    }

    /// The ten most common referrers, most clicks first.
    pub async fn referrers(&self, slug: &str) -> Result<Vec<ReferrerCount>> {
        let rows = self
            .storage
            .group_visits(slug, VisitDimension::Referrer)
            .await?;

        Ok(rank_referrers(rows))
    }

    /// Clicks per device type. Unclassifiable clients were bucketed as
    /// "desktop" at ingest time, so that bucket mixes real desktops with
    /// unknown agents.
    pub async fn devices(&self, slug: &str) -> Result<Vec<DeviceCount>> {
        let rows = self
            .storage
            .group_visits(slug, VisitDimension::DeviceType)
            .await?;

        Ok(rows
            .into_iter()
            .map(|(value, count)| DeviceCount {
                device_type: value.unwrap_or_else(|| DEFAULT_DEVICE_TYPE.to_string()),
                count,
            })
            .collect())
    }

    /// Clicks per browser name; `None` collects visits the parser could not
    /// attribute.
    pub async fn browsers(&self, slug: &str) -> Result<Vec<BrowserCount>> {
        let rows = self
            .storage
            .group_visits(slug, VisitDimension::Browser)
            .await?;

        Ok(rows
            .into_iter()
            .map(|(browser, count)| BrowserCount { browser, count })
            .collect())
    }

    /// Clicks per operating system name; `None` collects unattributed visits.
    pub async fn operating_systems(&self, slug: &str) -> Result<Vec<OsCount>> {
        let rows = self.storage.group_visits(slug, VisitDimension::Os).await?;

        Ok(rows
            .into_iter()
            .map(|(os, count)| OsCount { os, count })
            .collect())
    }
}

/// Rank grouped referrer rows by count descending and keep the top
/// `TOP_REFERRERS`. The sort is stable, so rows with equal counts keep the
/// order the store grouped them in; no secondary tie-break is imposed.
fn rank_referrers(rows: Vec<(Option<String>, i64)>) -> Vec<ReferrerCount> {
    let mut ranked: Vec<ReferrerCount> = rows
        .into_iter()
        .map(|(referrer, count)| ReferrerCount { referrer, count })
        .collect();

    ranked.sort_by(|a, b| b.count.cmp(&a.count));
    ranked.truncate(TOP_REFERRERS);
    ranked
}
