//! Aggregate statistics over a set of links

use chrono::{DateTime, Utc};

use crate::analytics::models::{AnalyticsStats, AnalyticsSummary};
use crate::models::LinkSummary;

/// Number of links reported in `top_urls`
pub const TOP_URLS_LIMIT: usize = 10;

/// Summarize the links created at or after `since`.
///
/// `top_urls` is ordered by click count descending; links with equal counts
/// keep their relative input order.
pub fn compute_analytics_summary(records: &[LinkSummary], since: DateTime<Utc>) -> AnalyticsSummary {
    let mut in_range: Vec<&LinkSummary> = records
        .iter()
        .filter(|summary| summary.record.created_at >= since)
        .collect();

    let total_urls = in_range.len();
    let total_clicks: u64 = in_range.iter().map(|s| s.record.click_count).sum();
    let active_urls = in_range.iter().filter(|s| s.is_valid).count();

    let stats = AnalyticsStats {
        total_urls,
        total_clicks,
        active_urls,
        expired_urls: total_urls - active_urls,
        avg_clicks_per_url: rounded_average(total_clicks, total_urls as u64),
    };

    // sort_by is stable
    in_range.sort_by(|a, b| b.record.click_count.cmp(&a.record.click_count));
    let top_urls = in_range
        .into_iter()
        .take(TOP_URLS_LIMIT)
        .cloned()
        .collect();

    AnalyticsSummary { stats, top_urls }
}

/// Integer average rounded half up; 0 for an empty set
fn rounded_average(total: u64, count: u64) -> u64 {
    if count == 0 {
        return 0;
    }
    (2 * total + count) / (2 * count)
}
