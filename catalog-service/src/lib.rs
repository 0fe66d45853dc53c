//! catalog-service: read-only HTTP API over a three-level catalog of
//! specialities, branches and documents.

pub mod config;
pub mod handlers;
pub mod models;
pub mod services;
pub mod startup;

use metrics_exporter_prometheus::PrometheusHandle;

use crate::services::Database;

/// State shared with every handler.
#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    pub metrics: PrometheusHandle,
}
