use axum::{extract::State, response::IntoResponse};

use crate::AppState;

/// Prometheus exposition endpoint.
pub async fn metrics(State(state): State<AppState>) -> impl IntoResponse {
    state.metrics.render()
}
