//! Router assembly for catalog-service.

use axum::{
    extract::Request,
    http::{HeaderValue, Method, StatusCode},
    middleware::{from_fn, from_fn_with_state, Next},
    response::Response,
    routing::get,
    Router,
};
use service_core::middleware::{
    metrics::metrics_middleware,
    rate_limit::{ip_rate_limit_middleware, FixedWindowLimiter, RateLimitState},
    tracing::request_id_middleware,
};
use std::{sync::Arc, time::Duration};
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::config::CatalogConfig;
use crate::handlers::{
    catalog::{list_branches, list_documents, list_specialities},
    health::health_check,
    metrics::metrics,
};
use crate::AppState;

pub fn build_router(state: AppState, config: &CatalogConfig) -> Router {
    let rate_limit = RateLimitState {
        limiter: Arc::new(FixedWindowLimiter::new(
            config.rate_limit.max_requests,
            Duration::from_secs(config.rate_limit.window_seconds),
        )),
        message: config.rate_limit.message.clone(),
        trust_proxy: config.security.trust_proxy,
    };

    Router::new()
        .route("/specialities", get(list_specialities))
        .route("/branches/:speciality_id", get(list_branches))
        .route("/documents/:branch_id", get(list_documents))
        .route("/health", get(health_check))
        .route("/metrics", get(metrics))
        // Rate limiting sits inside CORS so preflights never consume quota
        .layer(from_fn_with_state(rate_limit, ip_rate_limit_middleware))
        .layer(from_fn(metrics_middleware))
        // Add tracing layer
        .layer(
            TraceLayer::new_for_http().make_span_with(|request: &axum::http::Request<_>| {
                let request_id = request
                    .headers()
                    .get("x-request-id")
                    .and_then(|value| value.to_str().ok())
                    .unwrap_or("-");

                tracing::info_span!(
                    "http_request",
                    request_id = %request_id,
                    method = %request.method(),
                    uri = %request.uri(),
                    version = ?request.version(),
                )
            }),
        )
        // Add tracing middleware for request_id
        .layer(from_fn(request_id_middleware))
        // Add CORS layer
        .layer(cors_layer(config))
        .layer(from_fn(preflight_status_middleware))
        .with_state(state)
}

/// Build the CORS layer from the configured origin list.
///
/// A wildcard entry allows any origin with credentials off; tower-http
/// refuses the wildcard-plus-credentials combination browsers reject
/// anyway. Only GET is ever allowed.
fn cors_layer(config: &CatalogConfig) -> CorsLayer {
    let origins = &config.security.allowed_origins;
    let layer = CorsLayer::new().allow_methods([Method::GET]);

    if origins.iter().any(|o| o == "*") {
        return layer.allow_origin(Any);
    }

    let parsed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(error) => {
                tracing::error!(%origin, %error, "Invalid CORS origin, skipping");
                None
            }
        })
        .collect();

    layer
        .allow_origin(AllowOrigin::list(parsed))
        .allow_credentials(config.security.allow_credentials)
}

/// tower-http answers preflights with 200; the public contract is 204 with
/// an empty body.
async fn preflight_status_middleware(request: Request, next: Next) -> Response {
    let is_preflight = request.method() == Method::OPTIONS;
    let mut response = next.run(request).await;

    if is_preflight && response.status() == StatusCode::OK {
        *response.status_mut() = StatusCode::NO_CONTENT;
    }

    response
}
