//! Image upload → detection → persistence.

use std::path::Path;

use axum::extract::multipart::MultipartError;
use axum::extract::{Multipart, State};
use axum::http::StatusCode;
use axum::Json;
use tracing::info;

use crate::api::error::ApiError;
use crate::api::types::{ApiContext, DetectionResponse, UPLOAD_URL_PREFIX};
use crate::core_state::CoreState;
use crate::db;
use crate::models::{DetectionRecord, NewDetectionRecord};

/// `POST /api/upload`: multipart field `file`.
pub async fn upload(
    State(ctx): State<ApiContext>,
    mut multipart: Multipart,
) -> Result<Json<DetectionResponse>, ApiError> {
    let mut file: Option<(String, Vec<u8>)> = None;

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        if field.name() != Some("file") {
            continue;
        }
        let filename = field.file_name().unwrap_or("").to_string();
        let bytes = field.bytes().await.map_err(multipart_error)?;
        file = Some((filename, bytes.to_vec()));
        break;
    }

    let (filename, bytes) = file.ok_or_else(|| ApiError::BadRequest("No file part".into()))?;
    if filename.trim().is_empty() {
        return Err(ApiError::BadRequest("No selected file".into()));
    }

    let core = ctx.core.clone();
    let record =
        tokio::task::spawn_blocking(move || store_and_detect(&core, &filename, &bytes)).await??;

    Ok(Json(record.into()))
}

fn multipart_error(e: MultipartError) -> ApiError {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        ApiError::PayloadTooLarge
    } else {
        ApiError::BadRequest(format!("Malformed upload: {}", e.body_text()))
    }
}

/// Save under a fresh name, classify, and persist the outcome.
fn store_and_detect(
    core: &CoreState,
    original_name: &str,
    bytes: &[u8],
) -> Result<DetectionRecord, ApiError> {
    let stored_name = format!("{}{}", uuid::Uuid::new_v4(), safe_extension(original_name));
    let file_path = core.config.upload_dir.join(&stored_name);
    std::fs::write(&file_path, bytes)?;

    let result = core.detector.detect(&file_path)?;

    let conn = core.open_db()?;
    let record = db::insert_detection(
        &conn,
        &NewDetectionRecord::now(
            format!("{UPLOAD_URL_PREFIX}/{stored_name}"),
            result.label.as_str(),
            result.confidence,
        ),
    )?;

    info!(
        id = record.id,
        prediction = %record.prediction,
        confidence = record.confidence,
        source = ?result.source,
        "Detection stored"
    );
    Ok(record)
}

/// Extension of the client's filename, with the dot, if it is plain ASCII
/// alphanumerics. Anything else is dropped.
fn safe_extension(filename: &str) -> String {
    let base = filename.rsplit(['/', '\\']).next().unwrap_or(filename);
    Path::new(base)
        .extension()
        .and_then(|e| e.to_str())
        .filter(|e| !e.is_empty() && e.len() <= 10 && e.chars().all(|c| c.is_ascii_alphanumeric()))
        .map(|e| format!(".{e}"))
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extension_is_kept() {
        assert_eq!(safe_extension("leaf.png"), ".png");
        assert_eq!(safe_extension("photo.final.JPG"), ".JPG");
    }

    #[test]
    fn unsafe_or_missing_extension_is_dropped() {
        assert_eq!(safe_extension("leaf"), "");
        assert_eq!(safe_extension("leaf.p/ng"), "");
        assert_eq!(safe_extension("..\\evil.$x"), "");
        assert_eq!(safe_extension(".hidden"), "");
    }
}
