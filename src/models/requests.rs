use serde::Deserialize;

/// Body of `POST /api/urls` and of each bulk item.
///
/// Older clients send `originalUrl` / `validityPeriod` / `shortcode`; those
/// spellings are accepted as aliases.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateUrlRequest {
    #[serde(default, alias = "originalUrl")]
    pub url: Option<String>,
    /// Positive integer minutes, a numeric string, or `"never"`
    #[serde(default, alias = "validityPeriod")]
    pub validity: Option<serde_json::Value>,
    #[serde(default, alias = "shortcode")]
    pub custom_code: Option<String>,
    #[serde(default)]
    pub custom_name: Option<String>,
}

impl CreateUrlRequest {
    /// Interpret one bulk item. Bare strings are treated as the URL.
    pub fn from_bulk_item(item: serde_json::Value) -> Result<Self, serde_json::Error> {
        match item {
            serde_json::Value::String(url) => Ok(Self {
                url: Some(url),
                ..Self::default()
            }),
            other => serde_json::from_value(other),
        }
    }
}

/// Body of `POST /api/urls/bulk`
#[derive(Debug, Clone, Deserialize)]
pub struct BulkCreateRequest {
    #[serde(default)]
    pub urls: Option<Vec<serde_json::Value>>,
}
