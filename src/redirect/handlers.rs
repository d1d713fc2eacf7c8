use axum::{
    extract::{ConnectInfo, Path, State},
    http::{
        header::{self, HeaderMap, HeaderValue},
        StatusCode,
    },
    response::{IntoResponse, Response},
    Json,
};
use std::net::SocketAddr;
use std::sync::Arc;

use crate::analytics::extract_client_ip;
use crate::api::handlers::ErrorResponse;
use crate::config::{ProxyConfig, RedirectMode};
use crate::models::ClickContext;
use crate::store::LinkStore;

pub struct RedirectState {
    pub store: Arc<LinkStore>,
    pub proxy: ProxyConfig,
    pub redirect_status: RedirectMode,
}

fn header_string(headers: &HeaderMap, name: header::HeaderName) -> Option<String> {
    headers
        .get(name)
        .and_then(|value| value.to_str().ok())
        .map(str::to_string)
}

/// Location header for a stored URL. Falls back to the URL's normalized
/// form when the raw string is not a valid header value.
fn location_header(original_url: &str) -> Option<HeaderValue> {
    HeaderValue::from_str(original_url).ok().or_else(|| {
        url::Url::parse(original_url)
            .ok()
            .and_then(|url| HeaderValue::from_str(url.as_str()).ok())
    })
}

/// Redirect to original URL
pub async fn redirect_url(
    State(state): State<Arc<RedirectState>>,
    Path(shortcode): Path<String>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    headers: HeaderMap,
) -> Response {
    let Some(record) = state.store.get_original_url(&shortcode) else {
        tracing::warn!(shortcode = %shortcode, "shortcode not found or expired");
        return (
            StatusCode::NOT_FOUND,
            Json(ErrorResponse {
                error: "Not Found".to_string(),
                message: "Short URL not found or has expired".to_string(),
            }),
        )
            .into_response();
    };

    let Some(location) = location_header(&record.original_url) else {
        tracing::error!(
            shortcode = %shortcode,
            original_url = %record.original_url,
            "stored URL cannot be used as a Location header"
        );
        return (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error").into_response();
    };

    let client_ip = extract_client_ip(&headers, addr.ip(), &state.proxy);
    let context = ClickContext {
        referrer: header_string(&headers, header::REFERER),
        user_agent: header_string(&headers, header::USER_AGENT),
        source_ip: Some(client_ip.to_string()),
    };

    tracing::info!(
        shortcode = %shortcode,
        original_url = %record.original_url,
        referrer = ?context.referrer,
        client_ip = %client_ip,
        "redirecting to original URL"
    );

    state.store.record_click(&shortcode, context);

    (
        state.redirect_status.status_code(),
        [(header::LOCATION, location)],
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_location_header_keeps_valid_urls() {
        let value = location_header("https://example.com/path?q=1").unwrap();
        assert_eq!(value, "https://example.com/path?q=1");
    }

    #[test]
    fn test_location_header_normalizes_invalid_values() {
        let value = location_header("https://example.com/a\nb").unwrap();
        assert_eq!(value, "https://example.com/ab");
    }
}
