use gate_core::observability::logging::init_tracing;
use gate_service::{
    build_router,
    config::GateConfig,
    services::{spawn_refresh_task, FileTenantStore, IssuerTrustGate, TenantRegistry, TokenVerifier},
    AppState,
};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::signal;

#[tokio::main]
async fn main() -> Result<(), gate_core::error::AppError> {
    // Load configuration - fail fast if invalid
    let config = GateConfig::from_env()?;

    init_tracing(&config.log_level);

    tracing::info!(
        service = %config.service_name,
        version = %config.service_version,
        environment = ?config.environment,
        "Starting issuer gate service"
    );

    // Initialize token verifier
    let verifier = TokenVerifier::new(&config.jwt)?;

    // Load the tenant registry - fail fast on a broken registry
    let store: Arc<dyn gate_service::services::TenantStore> =
        Arc::new(FileTenantStore::new(config.registry.tenants_path.clone()));
    let registry = TenantRegistry::load(store.as_ref()).await?;

    let gate = IssuerTrustGate::new(
        registry.clone(),
        store.clone(),
        Duration::from_millis(config.registry.lookup_timeout_ms),
    );

    // Keep the registry fresh in the background
    let refresh_handle = spawn_refresh_task(
        registry.clone(),
        store,
        config.registry.refresh_interval_seconds,
    );

    let ip_rate_limiter = gate_core::middleware::rate_limit::create_ip_rate_limiter(
        config.rate_limit.global_ip_limit,
        config.rate_limit.global_ip_window_seconds,
    );

    // Create application state
    let state = AppState {
        config: config.clone(),
        verifier,
        registry,
        gate,
        ip_rate_limiter,
    };

    // Build application router
    let app = build_router(state)?;

    // Start server
    let addr = SocketAddr::new(config.common.host, config.common.port);

    tracing::info!(address = %addr, "Listening");

    let listener = tokio::net::TcpListener::bind(addr).await?;

    gate_core::axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    refresh_handle.abort();
    tracing::info!("Service shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received SIGINT, starting graceful shutdown");
        },
        _ = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown");
        },
    }
}
