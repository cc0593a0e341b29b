//! Represents the credential account behind a student.

use crate::errors::FieldErrors;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A login account. The id equals the owning student's id, mirroring how
/// registration provisions the two rows together.
#[derive(Serialize, Deserialize, Clone, FromRow, Debug)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    pub id: i64,

    /// Login identity, unique.
    pub email: String,

    /// Argon2id password hash. Never serialized.
    #[serde(skip_serializing)]
    pub password_hash: String,

    pub created_at: DateTime<Utc>,
}

/// Credentials posted to `/user/login`.
#[derive(Debug, Deserialize)]
pub struct LoginBody {
    pub email: String,
    pub password: String,
}

impl LoginBody {
    pub fn validate(&self) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::new();
        if self.email.trim().is_empty() {
            errors
                .entry("email")
                .or_default()
                .push("The email field is required.".into());
        }
        if self.password.is_empty() {
            errors
                .entry("password")
                .or_default()
                .push("The password field is required.".into());
        }
        if errors.is_empty() { Ok(()) } else { Err(errors) }
    }
}
