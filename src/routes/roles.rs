use axum::{
    extract::{Path, State},
    Json,
};

use crate::error::{Error, Result};
use crate::AppState;

pub async fn get_role(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<impl axum::response::IntoResponse> {
    let role = state
        .role_service
        .get_role_information(id)
        .await?
        .ok_or_else(|| Error::NotFound("Role not found".into()))?;
    Ok(Json(role))
}

pub async fn list_role_candidates(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<impl axum::response::IntoResponse> {
    let candidates = state.candidate_service.list_for_role(id).await?;
    Ok(Json(candidates))
}
