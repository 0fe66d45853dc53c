//! Database service for catalog-service.

use crate::models::{Branch, Document, Speciality};
use service_core::error::AppError;
use sqlx::sqlite::{SqlitePool, SqlitePoolOptions};
use tracing::{info, instrument};

/// Handle to the catalog store, opened once at startup and injected into
/// the router state.
#[derive(Debug, Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Open the catalog database file.
    #[instrument(skip(database_url), fields(service = "catalog-service"))]
    pub async fn connect(database_url: &str) -> Result<Self, AppError> {
        info!("Connecting to SQLite catalog store");

        // One long-lived connection, reused for every query.
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect(database_url)
            .await
            .map_err(|e| AppError::Database(anyhow::anyhow!("Failed to connect: {}", e)))?;

        info!("Catalog store connection established");

        Ok(Self { pool })
    }

    /// Get a reference to the connection pool.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Check store health.
    #[instrument(skip(self))]
    pub async fn health_check(&self) -> Result<(), AppError> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::Database(anyhow::anyhow!("Health check failed: {}", e)))?;
        Ok(())
    }

    /// List every speciality. An empty catalog is a valid state, not an
    /// error.
    #[instrument(skip(self))]
    pub async fn list_specialities(&self) -> Result<Vec<Speciality>, AppError> {
        let specialities = sqlx::query_as::<_, Speciality>(
            r#"
            SELECT id, title
            FROM specialities
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::Database(anyhow::anyhow!("Failed to list specialities: {}", e)))?;

        Ok(specialities)
    }

    /// List the branches of one speciality.
    ///
    /// The identifier arrives verbatim from the request path and is bound
    /// as a query parameter, never concatenated into the statement.
    #[instrument(skip(self), fields(speciality_id = %speciality_id))]
    pub async fn list_branches(&self, speciality_id: &str) -> Result<Vec<Branch>, AppError> {
        let branches = sqlx::query_as::<_, Branch>(
            r#"
            SELECT id, title
            FROM branches
            WHERE speciality_id = ?
            "#,
        )
        .bind(speciality_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::Database(anyhow::anyhow!("Failed to list branches: {}", e)))?;

        Ok(branches)
    }

    /// List the documents of one branch. Same binding discipline as
    /// [`list_branches`](Self::list_branches).
    #[instrument(skip(self), fields(branch_id = %branch_id))]
    pub async fn list_documents(&self, branch_id: &str) -> Result<Vec<Document>, AppError> {
        let documents = sqlx::query_as::<_, Document>(
            r#"
            SELECT title, pdf_url
            FROM documents
            WHERE branch_id = ?
            "#,
        )
        .bind(branch_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::Database(anyhow::anyhow!("Failed to list documents: {}", e)))?;

        Ok(documents)
    }
}
