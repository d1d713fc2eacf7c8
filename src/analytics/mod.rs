//! Click analytics
//!
//! Pure aggregate computations over link summaries and click timestamps,
//! plus the request-side helpers that turn a visitor into a click event:
//! client IP extraction and coarse location labelling.

pub mod ip_extractor;
pub mod location;
pub mod models;
pub mod summary;
pub mod trends;

pub use ip_extractor::extract_client_ip;
pub use location::coarse_location;
pub use models::{AggregateAnalytics, AnalyticsStats, AnalyticsSummary, DailyClicks, TimeRange};
pub use summary::compute_analytics_summary;
pub use trends::compute_click_trends;
