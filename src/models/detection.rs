use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// A persisted detection outcome (`plant_disease_results` row).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectionRecord {
    pub id: i64,
    pub image_path: String,
    pub prediction: String,
    pub confidence: f64,
    pub user_id: Option<i64>,
    /// UTC
    pub timestamp: NaiveDateTime,
}

/// A detection outcome before the database assigns its id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewDetectionRecord {
    pub image_path: String,
    pub prediction: String,
    pub confidence: f64,
    pub user_id: Option<i64>,
    pub timestamp: NaiveDateTime,
}

impl NewDetectionRecord {
    /// Anonymous record stamped with the current UTC time.
    pub fn now(image_path: impl Into<String>, prediction: impl Into<String>, confidence: f64) -> Self {
        Self {
            image_path: image_path.into(),
            prediction: prediction.into(),
            confidence,
            user_id: None,
            timestamp: chrono::Utc::now().naive_utc(),
        }
    }

    pub fn into_record(self, id: i64) -> DetectionRecord {
        DetectionRecord {
            id,
            image_path: self.image_path,
            prediction: self.prediction,
            confidence: self.confidence,
            user_id: self.user_id,
            timestamp: self.timestamp,
        }
    }
}
