//! API request and response types.

use crate::coordinator::{Phase, RegistrationSession};
use br_format::{
    format_national_id_for_display, format_phone_for_display, is_national_id_valid,
    is_phone_valid, normalize_national_id, normalize_phone_digits, normalize_verification_code,
    VERIFICATION_CODE_LENGTH,
};
use serde::{Deserialize, Serialize};
use user_store::User;

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub session_count: usize,
    pub user_count: usize,
}

/// Response after creating a session.
#[derive(Debug, Serialize)]
pub struct CreateSessionResponse {
    pub session_id: String,
    pub phase: Phase,
}

/// Client-facing view of a registration session.
#[derive(Debug, Serialize)]
pub struct SessionView {
    pub session_id: String,
    pub phase: Phase,
    pub is_loading: bool,
    pub ready_for_code_entry: bool,
    pub signed_in: bool,
    pub error_message: Option<String>,
    pub success_message: Option<String>,
    pub full_name: String,
    /// Phone number punctuated for display
    pub phone_number: String,
    /// CPF punctuated for display
    pub national_id: String,
    pub created_at: String,
}

impl SessionView {
    pub fn new(session_id: impl Into<String>, session: &RegistrationSession) -> Self {
        Self {
            session_id: session_id.into(),
            phase: session.phase(),
            is_loading: session.is_loading(),
            ready_for_code_entry: session.ready_for_code_entry(),
            signed_in: session.provider_subject().is_some(),
            error_message: session.error_message().map(String::from),
            success_message: session.success_message().map(String::from),
            full_name: session.full_name().to_string(),
            phone_number: format_phone_for_display(session.phone_number()),
            national_id: format_national_id_for_display(session.national_id()),
            created_at: session.created_at().to_rfc3339(),
        }
    }
}

/// Response after requesting an SMS code.
#[derive(Debug, Serialize)]
pub struct StartRegistrationResponse {
    pub phase: Phase,
    pub message: String,
}

/// Request to confirm the SMS code.
#[derive(Debug, Deserialize)]
pub struct VerifyRequest {
    pub code: String,
}

impl VerifyRequest {
    /// Digits of the submitted code, at most six.
    pub fn normalized_code(&self) -> String {
        normalize_verification_code(&self.code, VERIFICATION_CODE_LENGTH)
    }
}

/// Request to log in on the session's provider session.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub phone_number: String,
}

/// A stored user record.
#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub id: String,
    pub phone_number: String,
    pub full_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub national_id: Option<String>,
    pub created_at: String,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            phone_number: user.phone_number,
            full_name: user.full_name,
            national_id: user.national_id,
            created_at: user.created_at.to_rfc3339(),
        }
    }
}

/// Query for the field formatting endpoints.
#[derive(Debug, Deserialize)]
pub struct FormatQuery {
    #[serde(default)]
    pub value: String,
}

/// Formatted field value.
#[derive(Debug, Serialize)]
pub struct FormatResponse {
    pub display: String,
    pub digits: String,
    pub valid: bool,
}

impl FormatResponse {
    pub fn phone(value: &str) -> Self {
        Self {
            display: format_phone_for_display(value),
            digits: normalize_phone_digits(value),
            valid: is_phone_valid(value),
        }
    }

    pub fn national_id(value: &str) -> Self {
        Self {
            display: format_national_id_for_display(value),
            digits: normalize_national_id(value),
            valid: is_national_id_valid(value),
        }
    }
}
