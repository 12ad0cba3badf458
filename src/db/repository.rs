//! Entity-scoped database operations.
//!
//! Every write is one `INSERT` statement, so a failed call leaves nothing
//! behind.

use rusqlite::{params, Connection, ErrorCode, OptionalExtension, Row};

use super::DatabaseError;
use crate::models::*;

// ═══════════════════════════════════════════
// Detection results
// ═══════════════════════════════════════════

const DETECTION_COLUMNS: &str = "id, image_path, prediction, confidence, user_id, timestamp";

fn detection_from_row(row: &Row<'_>) -> rusqlite::Result<DetectionRecord> {
    Ok(DetectionRecord {
        id: row.get(0)?,
        image_path: row.get(1)?,
        prediction: row.get(2)?,
        confidence: row.get(3)?,
        user_id: row.get(4)?,
        timestamp: row.get(5)?,
    })
}

/// Persist a detection and return it with its assigned id.
pub fn insert_detection(
    conn: &Connection,
    record: &NewDetectionRecord,
) -> Result<DetectionRecord, DatabaseError> {
    conn.execute(
        "INSERT INTO plant_disease_results (image_path, prediction, confidence, user_id, timestamp)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![
            record.image_path,
            record.prediction,
            record.confidence,
            record.user_id,
            record.timestamp,
        ],
    )
    .map_err(constraint_or_sqlite)?;

    Ok(record.clone().into_record(conn.last_insert_rowid()))
}

pub fn get_detection(conn: &Connection, id: i64) -> Result<Option<DetectionRecord>, DatabaseError> {
    let record = conn
        .query_row(
            &format!("SELECT {DETECTION_COLUMNS} FROM plant_disease_results WHERE id = ?1"),
            params![id],
            detection_from_row,
        )
        .optional()?;
    Ok(record)
}

/// Newest first; equal timestamps fall back to the higher id.
pub fn list_recent_detections(
    conn: &Connection,
    limit: usize,
) -> Result<Vec<DetectionRecord>, DatabaseError> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {DETECTION_COLUMNS} FROM plant_disease_results
         ORDER BY timestamp DESC, id DESC LIMIT ?1"
    ))?;
    let limit = i64::try_from(limit).unwrap_or(i64::MAX);
    let rows = stmt.query_map(params![limit], detection_from_row)?;
    rows.collect::<Result<Vec<_>, _>>().map_err(DatabaseError::from)
}

// ═══════════════════════════════════════════
// Users
// ═══════════════════════════════════════════

pub fn insert_user(conn: &Connection, user: &NewUser) -> Result<User, DatabaseError> {
    if user.username.chars().count() > USERNAME_MAX_LEN {
        return Err(DatabaseError::ConstraintViolation(format!(
            "username longer than {USERNAME_MAX_LEN} characters"
        )));
    }
    if user.email.chars().count() > EMAIL_MAX_LEN {
        return Err(DatabaseError::ConstraintViolation(format!(
            "email longer than {EMAIL_MAX_LEN} characters"
        )));
    }

    conn.execute(
        "INSERT INTO users (username, email, password_hash) VALUES (?1, ?2, ?3)",
        params![user.username, user.email, user.password_hash],
    )
    .map_err(constraint_or_sqlite)?;

    Ok(User {
        id: conn.last_insert_rowid(),
        username: user.username.clone(),
        email: user.email.clone(),
        password_hash: user.password_hash.clone(),
    })
}

pub fn get_user_by_username(conn: &Connection, username: &str) -> Result<Option<User>, DatabaseError> {
    let user = conn
        .query_row(
            "SELECT id, username, email, password_hash FROM users WHERE username = ?1",
            params![username],
            |row| {
                Ok(User {
                    id: row.get(0)?,
                    username: row.get(1)?,
                    email: row.get(2)?,
                    password_hash: row.get(3)?,
                })
            },
        )
        .optional()?;
    Ok(user)
}

fn constraint_or_sqlite(e: rusqlite::Error) -> DatabaseError {
    match e.sqlite_error_code() {
        Some(ErrorCode::ConstraintViolation) => DatabaseError::ConstraintViolation(e.to_string()),
        _ => DatabaseError::Sqlite(e),
    }
}
