//! Aggregate analytics API handler

use axum::{
    extract::{Query, State},
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::analytics::{AnalyticsStats, DailyClicks, TimeRange};

use super::handlers::{AppState, LinkListItem};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsQueryParams {
    /// `24h`, `7d`, `30d` or `90d`; anything else means `7d`
    pub time_range: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregateAnalyticsData {
    pub stats: AnalyticsStats,
    pub top_urls: Vec<LinkListItem>,
    pub click_trends: Vec<DailyClicks>,
    pub time_range: TimeRange,
    pub total_urls: usize,
}

#[derive(Debug, Serialize)]
pub struct AggregateAnalyticsResponse {
    pub success: bool,
    pub data: AggregateAnalyticsData,
}

/// Stats, top links and daily click trends for links created in a window
pub async fn get_aggregate_analytics(
    State(state): State<Arc<AppState>>,
    Query(params): Query<AnalyticsQueryParams>,
) -> Json<AggregateAnalyticsResponse> {
    let time_range = TimeRange::parse_or_default(params.time_range.as_deref());
    let aggregate = state.store.aggregate_analytics(time_range);

    tracing::debug!(
        time_range = %time_range,
        urls_in_range = aggregate.stats.total_urls,
        "computed aggregate analytics"
    );

    let top_urls = aggregate
        .top_urls
        .into_iter()
        .map(|summary| LinkListItem::new(summary, &state.config))
        .collect();

    Json(AggregateAnalyticsResponse {
        success: true,
        data: AggregateAnalyticsData {
            stats: aggregate.stats,
            top_urls,
            click_trends: aggregate.click_trends,
            time_range: aggregate.time_range,
            total_urls: aggregate.total_urls,
        },
    })
}
