pub mod analytics;
pub mod api;
pub mod config;
pub mod logging;
pub mod middleware;
pub mod models;
pub mod redirect;
pub mod server;
pub mod store;
