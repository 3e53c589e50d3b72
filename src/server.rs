//! Application assembly — routes, CORS, and the shared store.

use std::sync::Arc;

use axum::Router;
use axum::http::{HeaderValue, Method, header};
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tracing::warn;

use crate::config::ServerConfig;
use crate::emails::{EmailPriorityService, email_routes};
use crate::store::EmailStore;

/// Build the full application router on top of a store.
pub fn build_app(store: Arc<dyn EmailStore>, config: &ServerConfig) -> Router {
    email_routes(EmailPriorityService::new(store)).layer(cors_layer(config))
}

/// CORS for the upstream agent and browser clients on other origins.
pub fn cors_layer(config: &ServerConfig) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::PATCH])
        .allow_headers([header::CONTENT_TYPE]);

    if config.cors_allows_any() {
        return layer.allow_origin(Any);
    }

    let origins: Vec<HeaderValue> = config
        .cors_origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(e) => {
                warn!(origin = %origin, error = %e, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();
    layer.allow_origin(AllowOrigin::list(origins))
}
