use axum::{middleware, Router};
use std::sync::Arc;
use tower_http::cors::CorsLayer;

use crate::api::create_api_router;
use crate::config::Config;
use crate::middleware::log_requests;
use crate::redirect::create_redirect_router;
use crate::store::LinkStore;

/// The complete application: API routes, health check and redirects
pub fn create_app(store: Arc<LinkStore>, config: Arc<Config>) -> Router {
    let redirect_router = create_redirect_router(
        Arc::clone(&store),
        config.proxy.clone(),
        config.redirect_status,
    );
    let api_router = create_api_router(store, config);

    api_router
        .merge(redirect_router)
        .layer(middleware::from_fn(log_requests))
        .layer(CorsLayer::permissive())
}
