//! Treatment advice endpoint.

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::api::error::ApiError;
use crate::api::types::ApiContext;

#[derive(Deserialize)]
pub struct TreatmentRequest {
    pub disease: Option<String>,
}

#[derive(Serialize)]
pub struct TreatmentResponse {
    pub treatment: String,
}

/// `POST /api/get_treatment`: Markdown advice for a disease label.
///
/// Any label string is accepted; unknown ones still get advice.
pub async fn get_treatment(
    State(ctx): State<ApiContext>,
    payload: Result<Json<TreatmentRequest>, JsonRejection>,
) -> Result<Json<TreatmentResponse>, ApiError> {
    let disease = payload
        .ok()
        .and_then(|Json(req)| req.disease)
        .filter(|d| !d.trim().is_empty())
        .ok_or_else(|| ApiError::BadRequest("Disease name is required".into()))?;

    let core = ctx.core.clone();
    let treatment = tokio::task::spawn_blocking(move || core.advisor.recommend(&disease)).await?;

    Ok(Json(TreatmentResponse { treatment }))
}
