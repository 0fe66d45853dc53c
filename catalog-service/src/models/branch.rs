//! Branch model for catalog-service.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Sub-category belonging to exactly one speciality.
///
/// Listings expose only `id` and `title`; the parent reference stays in the
/// store.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Branch {
    pub id: i64,
    pub title: String,
}
