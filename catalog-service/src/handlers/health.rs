use axum::{extract::State, Json};
use service_core::error::AppError;

use crate::AppState;

/// Service health check: pings the store with `SELECT 1`.
pub async fn health_check(
    State(state): State<AppState>,
) -> Result<Json<serde_json::Value>, AppError> {
    state.db.health_check().await.map_err(|e| {
        tracing::error!(error = %e, "store health check failed");
        AppError::ServiceUnavailable
    })?;

    Ok(Json(serde_json::json!({
        "status": "healthy",
        "service": "catalog-service",
    })))
}
