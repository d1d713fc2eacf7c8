use chrono::{DateTime, Utc};
use serde::{Serialize, Serializer};

use crate::store::StoreError;

/// Display label used when a link is created without a custom name
pub const DEFAULT_CUSTOM_NAME: &str = "Untitled Link";

/// Referrer recorded when the visitor sent no Referer header
pub const DIRECT_REFERRER: &str = "direct";

/// Lifetime of a short link
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Validity {
    /// Expires this many minutes after creation (always > 0)
    Minutes(u32),
    /// Never expires
    Never,
}

impl Validity {
    pub const NEVER_KEYWORD: &'static str = "never";

    /// Parse a validity from its textual form: a positive integer or `never`
    pub fn parse(value: &str) -> Result<Self, StoreError> {
        let value = value.trim();
        if value.eq_ignore_ascii_case(Self::NEVER_KEYWORD) {
            return Ok(Validity::Never);
        }

        match value.parse::<u32>() {
            Ok(minutes) if minutes > 0 => Ok(Validity::Minutes(minutes)),
            _ => Err(StoreError::InvalidValidity),
        }
    }

    /// Interpret a JSON value supplied by an API caller.
    ///
    /// `null`/absent yields `default`. Numbers must be positive integers that
    /// fit in `u32`; strings go through [`Validity::parse`].
    pub fn from_json(
        value: Option<&serde_json::Value>,
        default: Validity,
    ) -> Result<Self, StoreError> {
        match value {
            None | Some(serde_json::Value::Null) => Ok(default),
            Some(serde_json::Value::Number(n)) => n
                .as_u64()
                .filter(|m| *m > 0)
                .and_then(|m| u32::try_from(m).ok())
                .map(Validity::Minutes)
                .ok_or(StoreError::InvalidValidity),
            Some(serde_json::Value::String(s)) => Self::parse(s),
            Some(_) => Err(StoreError::InvalidValidity),
        }
    }
}

impl Serialize for Validity {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Validity::Minutes(m) => serializer.serialize_u32(*m),
            Validity::Never => serializer.serialize_str(Self::NEVER_KEYWORD),
        }
    }
}

/// A short link as held by the store
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkRecord {
    pub shortcode: String,
    pub original_url: String,
    pub custom_name: String,
    pub created_at: DateTime<Utc>,
    pub validity: Validity,
    /// `None` for links that never expire
    pub expires_at: Option<DateTime<Utc>>,
    pub click_count: u64,
}

impl LinkRecord {
    pub fn never_expires(&self) -> bool {
        self.expires_at.is_none()
    }

    /// Lookup-side expiry: a link is still served at exactly `expires_at`
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        match self.expires_at {
            None => false,
            Some(expires_at) => now > expires_at,
        }
    }

    /// Listing-side validity: active strictly before `expires_at`
    pub fn is_valid_at(&self, now: DateTime<Utc>) -> bool {
        match self.expires_at {
            None => true,
            Some(expires_at) => now < expires_at,
        }
    }
}

/// One recorded redirect traversal
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClickEvent {
    pub timestamp: DateTime<Utc>,
    pub referrer: String,
    pub user_agent: String,
    pub source_ip: String,
    pub location: String,
}

/// Request metadata captured for a click
#[derive(Debug, Clone, Default)]
pub struct ClickContext {
    pub referrer: Option<String>,
    pub user_agent: Option<String>,
    pub source_ip: Option<String>,
}

/// Input to [`crate::store::LinkStore::create_short_url`]
#[derive(Debug, Clone)]
pub struct NewLink {
    pub original_url: String,
    pub validity: Validity,
    pub custom_shortcode: Option<String>,
    pub custom_name: Option<String>,
}

impl NewLink {
    pub fn new(original_url: impl Into<String>, validity: Validity) -> Self {
        Self {
            original_url: original_url.into(),
            validity,
            custom_shortcode: None,
            custom_name: None,
        }
    }

    pub fn with_shortcode(mut self, shortcode: impl Into<String>) -> Self {
        self.custom_shortcode = Some(shortcode.into());
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.custom_name = Some(name.into());
        self
    }
}

/// A record with its validity evaluated at listing time
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkSummary {
    #[serde(flatten)]
    pub record: LinkRecord,
    pub is_valid: bool,
}

/// Full click history for one link
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkAnalytics {
    #[serde(flatten)]
    pub record: LinkRecord,
    pub total_clicks: u64,
    pub click_events: Vec<ClickEvent>,
}
