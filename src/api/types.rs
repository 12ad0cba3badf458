//! Shared types for the API layer.

use std::sync::Arc;

use serde::Serialize;

use crate::core_state::CoreState;
use crate::models::DetectionRecord;

/// URL prefix the upload directory is served under.
pub const UPLOAD_URL_PREFIX: &str = "static/uploads";

// ═══════════════════════════════════════════════════════════
// API context
// ═══════════════════════════════════════════════════════════

#[derive(Clone)]
pub struct ApiContext {
    pub core: Arc<CoreState>,
}

impl ApiContext {
    pub fn new(core: Arc<CoreState>) -> Self {
        Self { core }
    }
}

// ═══════════════════════════════════════════════════════════
// Detection payload
// ═══════════════════════════════════════════════════════════

/// Public view of a stored detection. Timestamp is ISO-8601 (UTC, no offset).
#[derive(Debug, Clone, Serialize)]
pub struct DetectionResponse {
    pub id: i64,
    pub image_path: String,
    pub prediction: String,
    pub confidence: f64,
    pub timestamp: String,
}

impl From<DetectionRecord> for DetectionResponse {
    fn from(record: DetectionRecord) -> Self {
        Self {
            id: record.id,
            image_path: record.image_path,
            prediction: record.prediction,
            confidence: record.confidence,
            timestamp: record.timestamp.format("%Y-%m-%dT%H:%M:%S%.f").to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;

    #[test]
    fn response_drops_user_and_formats_timestamp() {
        let record = DetectionRecord {
            id: 7,
            image_path: "static/uploads/a.png".into(),
            prediction: "Corn_Common_rust".into(),
            confidence: 0.817,
            user_id: Some(3),
            timestamp: NaiveDate::from_ymd_opt(2024, 5, 1)
                .unwrap()
                .and_hms_opt(10, 30, 0)
                .unwrap(),
        };
        let json = serde_json::to_value(DetectionResponse::from(record)).unwrap();
        assert_eq!(json["timestamp"], "2024-05-01T10:30:00");
        assert_eq!(json["prediction"], "Corn_Common_rust");
        assert!(json.get("user_id").is_none());
    }
}
