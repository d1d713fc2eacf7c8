//! Daily click trends bucketed from recorded click timestamps

use chrono::{DateTime, Days, NaiveDate, Utc};

use crate::analytics::models::DailyClicks;

/// Days shown in the aggregate analytics trend
pub const TREND_DAYS: u32 = 7;

/// Count clicks per UTC calendar day for the `days` days ending at `today`,
/// oldest first. Clicks outside the window are ignored.
pub fn compute_click_trends(
    timestamps: &[DateTime<Utc>],
    today: NaiveDate,
    days: u32,
) -> Vec<DailyClicks> {
    let mut buckets: Vec<DailyClicks> = (0..days)
        .rev()
        .filter_map(|back| today.checked_sub_days(Days::new(u64::from(back))))
        .map(|date| DailyClicks { date, clicks: 0 })
        .collect();

    let Some(first_day) = buckets.first().map(|b| b.date) else {
        return buckets;
    };

    for timestamp in timestamps {
        let day = timestamp.date_naive();
        if day < first_day || day > today {
            continue;
        }
        let index = (day - first_day).num_days() as usize;
        if let Some(bucket) = buckets.get_mut(index) {
            bucket.clicks += 1;
        }
    }

    buckets
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(day: u32, hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, day, hour, 30, 0).unwrap()
    }

    fn date(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, day).unwrap()
    }

    #[test]
    fn test_buckets_cover_window_oldest_first() {
        let trends = compute_click_trends(&[], date(10), 7);

        let dates: Vec<NaiveDate> = trends.iter().map(|t| t.date).collect();
        assert_eq!(dates, (4..=10).map(date).collect::<Vec<_>>());
        assert!(trends.iter().all(|t| t.clicks == 0));
    }

    #[test]
    fn test_clicks_counted_per_day() {
        let clicks = vec![at(10, 1), at(10, 23), at(9, 12), at(4, 0), at(7, 6)];

        let trends = compute_click_trends(&clicks, date(10), 7);
        let counts: Vec<u64> = trends.iter().map(|t| t.clicks).collect();

        assert_eq!(counts, vec![1, 0, 0, 1, 0, 1, 2]);
    }

    #[test]
    fn test_clicks_outside_window_ignored() {
        let clicks = vec![at(1, 12), at(3, 23), at(11, 0), at(10, 0)];

        let trends = compute_click_trends(&clicks, date(10), 7);

        assert_eq!(trends.iter().map(|t| t.clicks).sum::<u64>(), 1);
        assert_eq!(trends.last().unwrap().clicks, 1);
    }

    #[test]
    fn test_zero_days() {
        assert!(compute_click_trends(&[at(10, 0)], date(10), 0).is_empty());
    }
}
