//! Catalog listing handlers.
//!
//! `/specialities` answers an empty catalog with an empty array, while the
//! two child listings answer zero rows with 404. The asymmetry is part of
//! the public contract: an empty catalog is a valid state, but a parent
//! with no children is indistinguishable from a parent that does not exist.

use axum::{
    extract::{Path, State},
    Json,
};
use service_core::error::AppError;

use crate::models::{Branch, Document, Speciality};
use crate::AppState;

/// `GET /specialities` — every speciality row.
pub async fn list_specialities(
    State(state): State<AppState>,
) -> Result<Json<Vec<Speciality>>, AppError> {
    let specialities = state.db.list_specialities().await?;
    Ok(Json(specialities))
}

/// `GET /branches/:speciality_id` — the branches of one speciality.
///
/// The identifier is an opaque path segment; malformed or unknown values
/// take the same empty-result path as a childless speciality.
pub async fn list_branches(
    State(state): State<AppState>,
    Path(speciality_id): Path<String>,
) -> Result<Json<Vec<Branch>>, AppError> {
    let branches = state.db.list_branches(&speciality_id).await?;

    if branches.is_empty() {
        return Err(AppError::NotFound(anyhow::anyhow!(
            "no branches for speciality {}",
            speciality_id
        )));
    }

    Ok(Json(branches))
}

/// `GET /documents/:branch_id` — the documents of one branch.
pub async fn list_documents(
    State(state): State<AppState>,
    Path(branch_id): Path<String>,
) -> Result<Json<Vec<Document>>, AppError> {
    let documents = state.db.list_documents(&branch_id).await?;

    if documents.is_empty() {
        return Err(AppError::NotFound(anyhow::anyhow!(
            "no documents for branch {}",
            branch_id
        )));
    }

    Ok(Json(documents))
}
