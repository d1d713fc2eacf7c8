//! Data models for aggregate analytics

use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::Serialize;
use std::fmt;
use std::str::FromStr;

use crate::models::LinkSummary;

/// Look-back window for aggregate analytics
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum TimeRange {
    #[serde(rename = "24h")]
    Last24Hours,
    #[default]
    #[serde(rename = "7d")]
    Last7Days,
    #[serde(rename = "30d")]
    Last30Days,
    #[serde(rename = "90d")]
    Last90Days,
}

impl TimeRange {
    /// Parse a selector such as `24h` or `30d`, falling back to 7 days for
    /// anything unrecognized
    pub fn parse_or_default(value: Option<&str>) -> Self {
        value.and_then(|v| v.parse().ok()).unwrap_or_default()
    }

    pub fn duration(&self) -> Duration {
        match self {
            TimeRange::Last24Hours => Duration::hours(24),
            TimeRange::Last7Days => Duration::days(7),
            TimeRange::Last30Days => Duration::days(30),
            TimeRange::Last90Days => Duration::days(90),
        }
    }

    /// Earliest creation time included in the window ending at `now`
    pub fn start(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        now - self.duration()
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TimeRange::Last24Hours => "24h",
            TimeRange::Last7Days => "7d",
            TimeRange::Last30Days => "30d",
            TimeRange::Last90Days => "90d",
        }
    }
}

impl FromStr for TimeRange {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "24h" => Ok(TimeRange::Last24Hours),
            "7d" => Ok(TimeRange::Last7Days),
            "30d" => Ok(TimeRange::Last30Days),
            "90d" => Ok(TimeRange::Last90Days),
            other => Err(format!("unknown time range '{other}'")),
        }
    }
}

impl fmt::Display for TimeRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Counters over the links in a time window
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsStats {
    pub total_urls: usize,
    pub total_clicks: u64,
    pub active_urls: usize,
    pub expired_urls: usize,
    pub avg_clicks_per_url: u64,
}

/// Result of [`crate::analytics::compute_analytics_summary`]
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsSummary {
    pub stats: AnalyticsStats,
    pub top_urls: Vec<LinkSummary>,
}

/// Clicks observed on one UTC calendar day
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DailyClicks {
    pub date: NaiveDate,
    pub clicks: u64,
}

/// Everything the aggregate analytics endpoint reports
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregateAnalytics {
    pub stats: AnalyticsStats,
    pub top_urls: Vec<LinkSummary>,
    pub click_trends: Vec<DailyClicks>,
    pub time_range: TimeRange,
    /// Links in the store regardless of the window
    pub total_urls: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_time_range() {
        assert_eq!("24h".parse::<TimeRange>().unwrap(), TimeRange::Last24Hours);
        assert_eq!("7D".parse::<TimeRange>().unwrap(), TimeRange::Last7Days);
        assert_eq!("30d".parse::<TimeRange>().unwrap(), TimeRange::Last30Days);
        assert_eq!("90d".parse::<TimeRange>().unwrap(), TimeRange::Last90Days);
        assert!("1y".parse::<TimeRange>().is_err());
    }

    #[test]
    fn test_unknown_time_range_falls_back_to_week() {
        assert_eq!(TimeRange::parse_or_default(None), TimeRange::Last7Days);
        assert_eq!(TimeRange::parse_or_default(Some("forever")), TimeRange::Last7Days);
        assert_eq!(TimeRange::parse_or_default(Some("30d")), TimeRange::Last30Days);
    }

    #[test]
    fn test_time_range_serializes_as_selector() {
        assert_eq!(
            serde_json::to_value(TimeRange::Last90Days).unwrap(),
            serde_json::json!("90d")
        );
        assert_eq!(TimeRange::Last24Hours.to_string(), "24h");
    }
}
