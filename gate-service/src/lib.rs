pub mod config;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod services;

#[cfg(test)]
pub(crate) mod testing;

use gate_core::axum::{
    middleware::{from_fn, from_fn_with_state},
    routing::get,
    Router,
};
use gate_core::error::AppError;
use gate_core::middleware::{
    rate_limit::ip_rate_limit_middleware, security_headers::security_headers_middleware,
    tracing::request_id_middleware,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::config::GateConfig;
use crate::services::{IssuerTrustGate, TenantRegistry, TokenVerifier};

#[derive(Clone)]
pub struct AppState {
    pub config: GateConfig,
    pub verifier: TokenVerifier,
    pub registry: TenantRegistry,
    pub gate: IssuerTrustGate,
    pub ip_rate_limiter: gate_core::middleware::rate_limit::IpRateLimiter,
}

pub fn build_router(state: AppState) -> Result<Router, AppError> {
    // Routes behind the full chain: bearer auth, then the issuer trust
    // gate, then per-route capability checks.
    let protected_routes = Router::new()
        .route("/auth/context", get(handlers::context::get_auth_context))
        .route("/auth/check", get(handlers::context::check_capability))
        .route(
            "/registry/tenants",
            get(handlers::registry::list_tenants).layer(from_fn(|req, next| {
                middleware::require_capability(req, next, "registry:read")
            })),
        )
        .layer(from_fn_with_state(
            state.clone(),
            middleware::issuer_gate_middleware,
        ))
        .layer(from_fn_with_state(state.clone(), middleware::auth_middleware));

    let ip_limiter = state.ip_rate_limiter.clone();

    let app = Router::new()
        .route("/health", get(health_check))
        .merge(protected_routes)
        .with_state(state.clone())
        // Global IP rate limiting
        .layer(from_fn_with_state(ip_limiter, ip_rate_limit_middleware))
        // Add tracing layer
        .layer(TraceLayer::new_for_http().make_span_with(
            |request: &gate_core::axum::http::Request<_>| {
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
            },
        ))
        // Add tracing middleware for request_id
        .layer(from_fn(request_id_middleware))
        // Add security headers middleware
        .layer(from_fn(security_headers_middleware))
        // Add CORS layer
        .layer(
            CorsLayer::new()
                .allow_origin(
                    state
                        .config
                        .security
                        .allowed_origins
                        .iter()
                        .map(|o| {
                            o.parse::<gate_core::axum::http::HeaderValue>()
                                .unwrap_or_else(|e| {
                                    tracing::error!(
                                        "Invalid CORS origin '{}': {}. Using fallback.",
                                        o,
                                        e
                                    );
                                    gate_core::axum::http::HeaderValue::from_static("*")
                                })
                        })
                        .collect::<Vec<gate_core::axum::http::HeaderValue>>(),
                )
                .allow_methods([
                    gate_core::axum::http::Method::GET,
                    gate_core::axum::http::Method::OPTIONS,
                ])
                .allow_headers([
                    gate_core::axum::http::header::AUTHORIZATION,
                    gate_core::axum::http::header::CONTENT_TYPE,
                ]),
        );

    Ok(app)
}

/// Service health check
pub async fn health_check(
    gate_core::axum::extract::State(state): gate_core::axum::extract::State<AppState>,
) -> gate_core::axum::Json<serde_json::Value> {
    let snapshot = state.registry.snapshot();

    gate_core::axum::Json(serde_json::json!({
        "status": "healthy",
        "service": state.config.service_name,
        "version": state.config.service_version,
        "environment": format!("{:?}", state.config.environment),
        "registry": {
            "snapshot_version": snapshot.version,
            "tenant_count": snapshot.len()
        }
    }))
}
