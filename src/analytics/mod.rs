//! Visit analytics
//!
//! Aggregation of the append-only visit log into the per-slug views served
//! by the analytics API, plus the user-agent parsing the ingest path uses to
//! derive visit records.

pub mod aggregator;
pub mod models;
pub mod user_agent;

pub use aggregator::VisitAggregator;
pub use models::{BrowserCount, ClickSummary, DayCount, DeviceCount, OsCount, ReferrerCount};
pub use user_agent::ClientInfo;
