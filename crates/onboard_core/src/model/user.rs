//! Operator aggregate that owns stored biometrics.
//!
//! # Invariants
//! - `id` is compared case-insensitively by the store.
//! - Owned biometrics reference the user through `user_biometric.user_detail_id`
//!   and must be detached before the user's biometric set is deleted.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserDetail {
    pub id: String,
    pub name: String,
    pub email: Option<String>,
    pub mobile: Option<String>,
    pub status_code: String,
    pub language_code: String,
    pub is_active: bool,
    pub created_by: String,
    /// Epoch ms, UTC.
    pub created_at: i64,
}

impl UserDetail {
    /// Creates an active user with no contact details.
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        language_code: impl Into<String>,
        created_by: impl Into<String>,
        created_at: i64,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            email: None,
            mobile: None,
            status_code: "ACTIVE".to_string(),
            language_code: language_code.into(),
            is_active: true,
            created_by: created_by.into(),
            created_at,
        }
    }
}
