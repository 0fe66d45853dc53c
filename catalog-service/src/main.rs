use catalog_service::config::CatalogConfig;
use catalog_service::services::Database;
use catalog_service::startup::build_router;
use catalog_service::AppState;
use dotenvy::dotenv;
use service_core::middleware::metrics::install_recorder;
use service_core::observability::logging::init_tracing;
use std::net::SocketAddr;
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();

    let config = CatalogConfig::from_env().map_err(|e| {
        eprintln!("Failed to read configuration: {}", e);
        anyhow::anyhow!("Configuration error: {}", e)
    })?;

    init_tracing(&config.service_name, &config.common.log_level);

    let metrics = install_recorder();

    let db = Database::connect(&config.database.url).await.map_err(|e| {
        tracing::error!("Failed to open catalog store: {}", e);
        anyhow::anyhow!("Store error: {}", e)
    })?;

    let state = AppState { db, metrics };
    let app = build_router(state, &config);

    let address = format!("{}:{}", config.common.host, config.common.port);
    let listener = tokio::net::TcpListener::bind(&address).await.map_err(|e| {
        tracing::error!("Failed to bind TCP listener to {}: {}", address, e);
        anyhow::anyhow!("Failed to bind to address {}: {}", address, e)
    })?;

    info!("Starting {} on {}", config.service_name, address);
    // ConnectInfo gives the rate limiter the socket peer address when no
    // forwarded header is present.
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await
    .map_err(|e| {
        tracing::error!("Server error: {}", e);
        anyhow::anyhow!("Server error: {}", e)
    })?;

    Ok(())
}
