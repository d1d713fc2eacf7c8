use axum::{routing::get, Router};
use std::sync::Arc;

use crate::config::{ProxyConfig, RedirectMode};
use crate::store::LinkStore;

use super::handlers::{redirect_url, RedirectState};

pub fn create_redirect_router(
    store: Arc<LinkStore>,
    proxy: ProxyConfig,
    redirect_status: RedirectMode,
) -> Router {
    let state = Arc::new(RedirectState {
        store,
        proxy,
        redirect_status,
    });

    Router::new()
        .route("/{shortcode}", get(redirect_url))
        .with_state(state)
}
