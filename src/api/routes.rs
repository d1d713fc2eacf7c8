use axum::{
    routing::{delete, get, post},
    Router,
};
use std::sync::Arc;
use std::time::Instant;

use crate::config::Config;
use crate::store::LinkStore;

use super::analytics::get_aggregate_analytics;
use super::handlers::{
    bulk_create_urls, create_url, delete_url, get_url_analytics, health_check, list_urls, AppState,
};

pub fn create_api_router(store: Arc<LinkStore>, config: Arc<Config>) -> Router {
    let state = Arc::new(AppState {
        store,
        config,
        started_at: Instant::now(),
    });

    Router::new()
        .route("/health", get(health_check))
        .route("/api/urls", post(create_url).get(list_urls))
        .route("/api/urls/bulk", post(bulk_create_urls))
        .route("/api/urls/{shortcode}", delete(delete_url))
        .route("/api/urls/{shortcode}/analytics", get(get_url_analytics))
        .route("/api/analytics", get(get_aggregate_analytics))
        .with_state(state)
}
