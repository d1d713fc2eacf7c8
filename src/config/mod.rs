use anyhow::{bail, Context};
use axum::http::StatusCode;
use ipnet::IpNet;
use serde::{Deserialize, Serialize};

use crate::models::Validity;
use crate::store::DEFAULT_MAX_GENERATION_ATTEMPTS;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    /// Prefix for short links handed back to API callers
    pub base_url: String,
    pub store: StoreConfig,
    pub api: ApiConfig,
    pub proxy: ProxyConfig,
    pub redirect_status: RedirectMode,
    pub log_format: LogFormat,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    pub shortcode_length: usize,
    pub max_generation_attempts: u32,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            shortcode_length: 6,
            max_generation_attempts: DEFAULT_MAX_GENERATION_ATTEMPTS,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Minutes applied when a create request omits validity
    pub default_validity_minutes: u32,
    pub max_bulk_items: usize,
}

impl ApiConfig {
    pub fn default_validity(&self) -> Validity {
        Validity::Minutes(self.default_validity_minutes)
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            default_validity_minutes: 30,
            max_bulk_items: 100,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrustedProxyMode {
    /// Use the socket peer address
    #[default]
    None,
    /// Trust CF-Connecting-IP
    Cloudflare,
    /// Parse Forwarded / X-Forwarded-For
    Standard,
}

impl TrustedProxyMode {
    fn parse(value: &str) -> anyhow::Result<Self> {
        match value.trim().to_lowercase().as_str() {
            "none" | "" => Ok(TrustedProxyMode::None),
            "cloudflare" => Ok(TrustedProxyMode::Cloudflare),
            "standard" => Ok(TrustedProxyMode::Standard),
            other => bail!(
                "Unsupported TRUSTED_PROXY_MODE '{other}'. Supported values: none, cloudflare, standard"
            ),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProxyConfig {
    pub trusted_proxy_mode: TrustedProxyMode,
    #[serde(default)]
    pub trusted_proxies: Vec<IpNet>,
    #[serde(default)]
    pub num_trusted_proxies: Option<usize>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RedirectMode {
    /// 302 Found
    #[default]
    Found,
    /// 307 Temporary Redirect
    Temporary,
    /// 308 Permanent Redirect
    Permanent,
}

impl RedirectMode {
    pub fn status_code(&self) -> StatusCode {
        match self {
            RedirectMode::Found => StatusCode::FOUND,
            RedirectMode::Temporary => StatusCode::TEMPORARY_REDIRECT,
            RedirectMode::Permanent => StatusCode::PERMANENT_REDIRECT,
        }
    }

    fn parse(value: &str) -> anyhow::Result<Self> {
        match value.trim().to_lowercase().as_str() {
            "302" | "found" => Ok(RedirectMode::Found),
            "307" | "temporary" => Ok(RedirectMode::Temporary),
            "308" | "permanent" => Ok(RedirectMode::Permanent),
            other => bail!("Unsupported REDIRECT_STATUS '{other}'. Supported values: 302, 307, 308"),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 3000,
            },
            base_url: "http://localhost:3000".to_string(),
            store: StoreConfig::default(),
            api: ApiConfig::default(),
            proxy: ProxyConfig::default(),
            redirect_status: RedirectMode::default(),
            log_format: LogFormat::default(),
        }
    }
}

fn parse_value<T: std::str::FromStr>(key: &str, value: &str) -> anyhow::Result<T>
where
    T::Err: std::error::Error + Send + Sync + 'static,
{
    value
        .trim()
        .parse::<T>()
        .with_context(|| format!("{key} has an invalid value '{value}'"))
}

fn env_opt<T: std::str::FromStr>(key: &str) -> anyhow::Result<Option<T>>
where
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(key) {
        Ok(value) => parse_value(key, &value).map(Some),
        Err(_) => Ok(None),
    }
}

fn env_or<T: std::str::FromStr>(key: &str, default: T) -> anyhow::Result<T>
where
    T::Err: std::error::Error + Send + Sync + 'static,
{
    Ok(env_opt(key)?.unwrap_or(default))
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let defaults = Config::default();

        let host = std::env::var("HOST").unwrap_or(defaults.server.host);
        let port = env_or("PORT", defaults.server.port)?;

        let base_url = std::env::var("BASE_URL")
            .map(|url| url.trim_end_matches('/').to_string())
            .unwrap_or_else(|_| format!("http://localhost:{port}"));

        let shortcode_length = env_or("SHORTCODE_LENGTH", defaults.store.shortcode_length)?;
        if !(4..=20).contains(&shortcode_length) {
            bail!("SHORTCODE_LENGTH must be between 4 and 20, got {shortcode_length}");
        }
        let max_generation_attempts =
            env_or("MAX_GENERATION_ATTEMPTS", defaults.store.max_generation_attempts)?;
        if max_generation_attempts == 0 {
            bail!("MAX_GENERATION_ATTEMPTS must be at least 1");
        }

        let default_validity_minutes =
            env_or("DEFAULT_VALIDITY_MINUTES", defaults.api.default_validity_minutes)?;
        if default_validity_minutes == 0 {
            bail!("DEFAULT_VALIDITY_MINUTES must be a positive number of minutes");
        }
        let max_bulk_items = env_or("MAX_BULK_ITEMS", defaults.api.max_bulk_items)?;

        let redirect_status = match std::env::var("REDIRECT_STATUS") {
            Ok(value) => RedirectMode::parse(&value)?,
            Err(_) => RedirectMode::default(),
        };

        let trusted_proxy_mode = match std::env::var("TRUSTED_PROXY_MODE") {
            Ok(value) => TrustedProxyMode::parse(&value)?,
            Err(_) => TrustedProxyMode::default(),
        };

        let trusted_proxies = std::env::var("TRUSTED_PROXIES")
            .ok()
            .map(|list| {
                list.split(',')
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(|cidr| {
                        cidr.parse::<IpNet>()
                            .with_context(|| format!("TRUSTED_PROXIES entry '{cidr}' is not a CIDR"))
                    })
                    .collect::<anyhow::Result<Vec<_>>>()
            })
            .transpose()?
            .unwrap_or_default();

        let num_trusted_proxies = env_opt::<usize>("NUM_TRUSTED_PROXIES")?;

        let log_format = match std::env::var("LOG_FORMAT")
            .unwrap_or_default()
            .to_lowercase()
            .as_str()
        {
            "json" => LogFormat::Json,
            _ => LogFormat::Text,
        };

        Ok(Config {
            server: ServerConfig { host, port },
            base_url,
            store: StoreConfig {
                shortcode_length,
                max_generation_attempts,
            },
            api: ApiConfig {
                default_validity_minutes,
                max_bulk_items,
            },
            proxy: ProxyConfig {
                trusted_proxy_mode,
                trusted_proxies,
                num_trusted_proxies,
            },
            redirect_status,
            log_format,
        })
    }

    /// Public URL of a short link
    pub fn short_link(&self, shortcode: &str) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), shortcode)
    }
}
