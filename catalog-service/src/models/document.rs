//! Document model for catalog-service.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Downloadable record belonging to exactly one branch: a title plus the
/// location of its PDF.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Document {
    pub title: String,
    pub pdf_url: String,
}
