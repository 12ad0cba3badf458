//! Detection history endpoints.

use axum::extract::{Path, State};
use axum::Json;

use crate::api::error::ApiError;
use crate::api::types::{ApiContext, DetectionResponse};
use crate::db;

/// `GET /api/results`: most recent detections, newest first.
pub async fn list(State(ctx): State<ApiContext>) -> Result<Json<Vec<DetectionResponse>>, ApiError> {
    let core = ctx.core.clone();
    let records = tokio::task::spawn_blocking(move || -> Result<_, ApiError> {
        let conn = core.open_db()?;
        Ok(db::list_recent_detections(&conn, core.config.history_limit)?)
    })
    .await??;

    Ok(Json(records.into_iter().map(DetectionResponse::from).collect()))
}

/// `GET /api/result/:id`: one detection.
pub async fn detail(
    State(ctx): State<ApiContext>,
    Path(id): Path<i64>,
) -> Result<Json<DetectionResponse>, ApiError> {
    let core = ctx.core.clone();
    let record = tokio::task::spawn_blocking(move || -> Result<_, ApiError> {
        let conn = core.open_db()?;
        Ok(db::get_detection(&conn, id)?)
    })
    .await??
    .ok_or_else(|| ApiError::NotFound(format!("Result {id} not found")))?;

    Ok(Json(record.into()))
}
