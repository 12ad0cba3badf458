//! Assistant chat endpoint.

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::api::error::ApiError;
use crate::api::types::ApiContext;

#[derive(Deserialize)]
pub struct ChatRequest {
    pub message: Option<String>,
    pub session_id: Option<String>,
}

#[derive(Serialize)]
pub struct ChatResponse {
    pub response: String,
    pub session_id: String,
}

/// `POST /api/chat`: one conversational turn.
///
/// Clients keep the returned `session_id` and send it back to continue the
/// same conversation; without one a fresh session is started.
pub async fn send(
    State(ctx): State<ApiContext>,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> Result<Json<ChatResponse>, ApiError> {
    let req = payload
        .map(|Json(req)| req)
        .map_err(|_| ApiError::BadRequest("Message is required".into()))?;

    let message = req
        .message
        .filter(|m| !m.trim().is_empty())
        .ok_or_else(|| ApiError::BadRequest("Message is required".into()))?;

    let session_id = req
        .session_id
        .filter(|s| !s.trim().is_empty())
        .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());

    let core = ctx.core.clone();
    let sid = session_id.clone();
    let response = tokio::task::spawn_blocking(move || core.chat.reply(&sid, &message)).await?;

    Ok(Json(ChatResponse {
        response,
        session_id,
    }))
}
