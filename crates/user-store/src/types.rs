//! User record types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Input collected for one registration attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistrationData {
    /// Phone number in E.164 format
    pub phone_number: String,
    /// Cleaned full name
    pub full_name: String,
    /// CPF digits, if the user provided one
    pub national_id: Option<String>,
}

/// A registered user, keyed by the identity provider's subject id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[serde(rename = "uid")]
    pub id: String,

    /// Phone number in E.164 format (e.g. "+5511999999999")
    pub phone_number: String,

    pub full_name: String,

    #[serde(rename = "cpf", default, skip_serializing_if = "Option::is_none")]
    pub national_id: Option<String>,

    pub created_at: DateTime<Utc>,

    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Create a new user from registration input.
    pub fn new(subject_id: impl Into<String>, data: RegistrationData) -> Self {
        let now = Utc::now();
        Self {
            id: subject_id.into(),
            phone_number: data.phone_number,
            full_name: data.full_name,
            national_id: data.national_id,
            created_at: now,
            updated_at: now,
        }
    }

    /// Bump the update timestamp.
    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}
