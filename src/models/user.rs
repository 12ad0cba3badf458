use serde::{Deserialize, Serialize};

pub const USERNAME_MAX_LEN: usize = 64;
pub const EMAIL_MAX_LEN: usize = 120;

/// Account row. Nothing authenticates against it yet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub password_hash: Option<String>,
}
