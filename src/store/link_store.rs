use chrono::Duration;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::analytics::location::coarse_location;
use crate::analytics::summary::compute_analytics_summary;
use crate::analytics::trends::{compute_click_trends, TREND_DAYS};
use crate::analytics::{AggregateAnalytics, TimeRange};
use crate::config::StoreConfig;
use crate::models::{
    ClickContext, ClickEvent, LinkAnalytics, LinkRecord, LinkSummary, NewLink, Validity,
    DEFAULT_CUSTOM_NAME, DIRECT_REFERRER,
};

use super::clock::{Clock, SystemClock};
use super::generator::{
    is_reserved_shortcode, is_valid_custom_shortcode, RandomShortcodeGenerator, ShortcodeGenerator,
};
use super::{StoreError, StoreResult};

/// Upper bound on random shortcode draws per create
pub const DEFAULT_MAX_GENERATION_ATTEMPTS: u32 = 10;

/// A record together with its click log; removed as one unit
struct LinkEntry {
    record: LinkRecord,
    clicks: Vec<ClickEvent>,
}

#[derive(Default)]
struct StoreState {
    links: HashMap<String, LinkEntry>,
    /// Shortcodes in creation order
    order: Vec<String>,
}

/// In-memory short-link store.
///
/// Every operation runs under a single lock, so shortcode allocation and
/// click counting are serialized across request tasks.
pub struct LinkStore {
    state: Mutex<StoreState>,
    clock: Arc<dyn Clock>,
    generator: Arc<dyn ShortcodeGenerator>,
    max_generation_attempts: u32,
}

impl LinkStore {
    pub fn new() -> Self {
        Self::with_parts(
            Arc::new(SystemClock),
            Arc::new(RandomShortcodeGenerator::default()),
            DEFAULT_MAX_GENERATION_ATTEMPTS,
        )
    }

    pub fn from_config(config: &StoreConfig) -> Self {
        Self::with_parts(
            Arc::new(SystemClock),
            Arc::new(RandomShortcodeGenerator::new(config.shortcode_length)),
            config.max_generation_attempts,
        )
    }

    pub fn with_parts(
        clock: Arc<dyn Clock>,
        generator: Arc<dyn ShortcodeGenerator>,
        max_generation_attempts: u32,
    ) -> Self {
        Self {
            state: Mutex::new(StoreState::default()),
            clock,
            generator,
            max_generation_attempts: max_generation_attempts.max(1),
        }
    }

    /// Create a new short link.
    ///
    /// All validation happens before the store is touched, so a failed
    /// create leaves nothing behind.
    pub fn create_short_url(&self, new_link: NewLink) -> StoreResult<LinkRecord> {
        let NewLink {
            original_url,
            validity,
            custom_shortcode,
            custom_name,
        } = new_link;

        info!(
            original_url = %original_url,
            validity = ?validity,
            custom_shortcode = ?custom_shortcode,
            "creating short URL"
        );

        if let Err(err) = url::Url::parse(&original_url) {
            warn!(original_url = %original_url, error = %err, "invalid URL format");
            return Err(StoreError::InvalidUrl);
        }

        if validity == Validity::Minutes(0) {
            return Err(StoreError::InvalidValidity);
        }

        let custom_shortcode = custom_shortcode.filter(|code| !code.is_empty());
        if let Some(code) = custom_shortcode.as_deref() {
            if !is_valid_custom_shortcode(code) {
                warn!(custom_shortcode = %code, "invalid custom shortcode format");
                return Err(StoreError::InvalidShortcodeFormat);
            }
        }

        let mut state = self.state.lock();

        let shortcode = match custom_shortcode {
            Some(code) => {
                if is_reserved_shortcode(&code) {
                    warn!(custom_shortcode = %code, "shortcode collides with a reserved route");
                    return Err(StoreError::ShortcodeCollision);
                }
                if state.links.contains_key(&code) {
                    warn!(custom_shortcode = %code, "shortcode collision detected");
                    return Err(StoreError::ShortcodeCollision);
                }
                code
            }
            None => self.generate_unique(&state)?,
        };

        let created_at = self.clock.now();
        let expires_at = match validity {
            Validity::Minutes(minutes) => Some(
                created_at
                    .checked_add_signed(Duration::minutes(i64::from(minutes)))
                    .ok_or(StoreError::InvalidValidity)?,
            ),
            Validity::Never => None,
        };

        let custom_name = custom_name
            .map(|name| name.trim().to_string())
            .filter(|name| !name.is_empty())
            .unwrap_or_else(|| DEFAULT_CUSTOM_NAME.to_string());

        let record = LinkRecord {
            shortcode: shortcode.clone(),
            original_url,
            custom_name,
            created_at,
            validity,
            expires_at,
            click_count: 0,
        };

        state.links.insert(
            shortcode.clone(),
            LinkEntry {
                record: record.clone(),
                clicks: Vec::new(),
            },
        );
        state.order.push(shortcode);

        info!(
            shortcode = %record.shortcode,
            original_url = %record.original_url,
            expires_at = ?record.expires_at,
            "short URL created"
        );

        Ok(record)
    }

    fn generate_unique(&self, state: &StoreState) -> StoreResult<String> {
        for attempt in 1..=self.max_generation_attempts {
            let candidate = self.generator.generate();
            if !is_reserved_shortcode(&candidate) && !state.links.contains_key(&candidate) {
                return Ok(candidate);
            }
            debug!(attempt, candidate = %candidate, "generated shortcode already taken");
        }

        warn!(
            attempts = self.max_generation_attempts,
            "failed to generate a unique shortcode"
        );
        Err(StoreError::StoreExhausted {
            attempts: self.max_generation_attempts,
        })
    }

    /// Look up a live link, distinguishing missing from expired
    pub fn resolve(&self, shortcode: &str) -> StoreResult<LinkRecord> {
        let state = self.state.lock();
        let Some(entry) = state.links.get(shortcode) else {
            debug!(shortcode, "shortcode not found");
            return Err(StoreError::NotFound);
        };

        if entry.record.is_expired_at(self.clock.now()) {
            debug!(shortcode, expires_at = ?entry.record.expires_at, "shortcode expired");
            return Err(StoreError::Expired);
        }

        Ok(entry.record.clone())
    }

    /// Look up a live link; missing and expired links are both `None`
    pub fn get_original_url(&self, shortcode: &str) -> Option<LinkRecord> {
        self.resolve(shortcode).ok()
    }

    /// Append a click to the link's log. Unknown shortcodes are ignored.
    pub fn record_click(&self, shortcode: &str, context: ClickContext) {
        let timestamp = self.clock.now();
        let mut state = self.state.lock();
        let Some(entry) = state.links.get_mut(shortcode) else {
            debug!(shortcode, "ignoring click for unknown shortcode");
            return;
        };

        let source_ip = context.source_ip.unwrap_or_default();
        let event = ClickEvent {
            timestamp,
            referrer: context
                .referrer
                .filter(|r| !r.is_empty())
                .unwrap_or_else(|| DIRECT_REFERRER.to_string()),
            user_agent: context.user_agent.unwrap_or_default(),
            location: coarse_location(&source_ip).to_string(),
            source_ip,
        };

        entry.clicks.push(event);
        entry.record.click_count += 1;

        debug!(
            shortcode,
            total_clicks = entry.record.click_count,
            "click recorded"
        );
    }

    /// Click history for a link, expired or not
    pub fn get_analytics(&self, shortcode: &str) -> Option<LinkAnalytics> {
        let state = self.state.lock();
        let entry = state.links.get(shortcode)?;

        Some(LinkAnalytics {
            record: entry.record.clone(),
            total_clicks: entry.record.click_count,
            click_events: entry.clicks.clone(),
        })
    }

    /// All links in creation order with their current validity
    pub fn get_all_urls(&self) -> Vec<LinkSummary> {
        let now = self.clock.now();
        let state = self.state.lock();

        state
            .order
            .iter()
            .filter_map(|code| state.links.get(code))
            .map(|entry| LinkSummary {
                is_valid: entry.record.is_valid_at(now),
                record: entry.record.clone(),
            })
            .collect()
    }

    /// Remove a link and its click log. Returns false if it did not exist.
    pub fn delete_url(&self, shortcode: &str) -> bool {
        let mut state = self.state.lock();
        if state.links.remove(shortcode).is_none() {
            return false;
        }
        state.order.retain(|code| code != shortcode);

        info!(shortcode, "short URL deleted");
        true
    }

    /// Aggregate stats, top links and daily click trends for links created
    /// within `range`
    pub fn aggregate_analytics(&self, range: TimeRange) -> AggregateAnalytics {
        let now = self.clock.now();
        let since = range.start(now);

        let (summaries, click_times) = {
            let state = self.state.lock();
            let mut summaries = Vec::with_capacity(state.order.len());
            let mut click_times = Vec::new();

            for entry in state.order.iter().filter_map(|code| state.links.get(code)) {
                if entry.record.created_at >= since {
                    click_times.extend(entry.clicks.iter().map(|click| click.timestamp));
                }
                summaries.push(LinkSummary {
                    is_valid: entry.record.is_valid_at(now),
                    record: entry.record.clone(),
                });
            }

            (summaries, click_times)
        };

        let total_urls = summaries.len();
        let summary = compute_analytics_summary(&summaries, since);
        let click_trends = compute_click_trends(&click_times, now.date_naive(), TREND_DAYS);

        AggregateAnalytics {
            stats: summary.stats,
            top_urls: summary.top_urls,
            click_trends,
            time_range: range,
            total_urls,
        }
    }

    pub fn len(&self) -> usize {
        self.state.lock().links.len()
    }

    pub fn is_empty(&self) -> bool {
        self.state.lock().links.is_empty()
    }
}

impl Default for LinkStore {
    fn default() -> Self {
        Self::new()
    }
}
