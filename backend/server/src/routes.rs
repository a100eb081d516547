use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, State, rejection::JsonRejection},
    http::StatusCode,
    response::IntoResponse,
};
use serde_json::json;
use tracing::info;

use crate::{
    auth::AuthUser,
    error::AppError,
    state::AppState,
    store::LIST_LIMIT,
    utils::{InspectionPayload, get_inspection_from_payload},
};

pub async fn api_root_handler() -> impl IntoResponse {
    Json(json!({ "message": "Food Quality Inspection API is running" }))
}

pub async fn create_inspection_handler(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    payload: Result<Json<InspectionPayload>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Json(payload) = payload?;
    let inspection = get_inspection_from_payload(payload)?;

    let record = state.inspections.create(inspection).await?;

    info!(
        id = %record.id,
        package_id = %record.package_id,
        status = %record.status,
        user_id = %auth.id,
        "Inspection recorded"
    );

    Ok((StatusCode::CREATED, Json(record)))
}

pub async fn list_inspections_handler(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, AppError> {
    Ok(Json(state.inspections.list(LIST_LIMIT).await?))
}

pub async fn inspection_stats_handler(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, AppError> {
    Ok(Json(state.inspections.stats().await?))
}

pub async fn delete_inspection_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    state.inspections.delete_by_id(&id).await?;

    info!(id = %id, "Inspection removed");

    Ok(Json(json!({ "message": "Inspection removed" })))
}
