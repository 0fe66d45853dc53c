//! Speciality model for catalog-service.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Top-level catalog category.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Speciality {
    pub id: i64,
    pub title: String,
}
