//! Error types for the registration service.

use crate::coordinator::RegistrationError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use identity_client::ProviderError;
use serde::Serialize;
use thiserror::Error;

/// API error types.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Registration(#[from] RegistrationError),

    #[error("Session not found: {0}")]
    SessionNotFound(String),

    #[error("Rate limit exceeded")]
    RateLimitExceeded,
}

/// Error response body.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
    /// User-facing message
    pub message: String,
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Registration(e) => registration_status(e),
            ApiError::SessionNotFound(_) => StatusCode::NOT_FOUND,
            ApiError::RateLimitExceeded => StatusCode::TOO_MANY_REQUESTS,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            ApiError::Registration(e) => e.code(),
            ApiError::SessionNotFound(_) => "SESSION_NOT_FOUND",
            ApiError::RateLimitExceeded => "RATE_LIMIT_EXCEEDED",
        }
    }

    pub fn user_message(&self) -> &'static str {
        match self {
            ApiError::Registration(e) => e.user_message(),
            ApiError::SessionNotFound(_) => "Sessão não encontrada. Inicie novamente.",
            ApiError::RateLimitExceeded => "Muitas tentativas. Aguarde alguns minutos.",
        }
    }
}

fn registration_status(err: &RegistrationError) -> StatusCode {
    match err {
        RegistrationError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
        RegistrationError::Provider(e) => match e {
            ProviderError::InvalidPhoneNumber | ProviderError::InvalidVerificationCode => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            ProviderError::ExpiredSession => StatusCode::CONFLICT,
            ProviderError::RateLimited | ProviderError::QuotaExceeded => {
                StatusCode::TOO_MANY_REQUESTS
            }
            ProviderError::Timeout => StatusCode::GATEWAY_TIMEOUT,
            ProviderError::Unknown(_) => StatusCode::BAD_GATEWAY,
        },
        RegistrationError::Persistence { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        RegistrationError::UserNotFound => StatusCode::NOT_FOUND,
        RegistrationError::NoPendingVerification
        | RegistrationError::NotVerified
        | RegistrationError::Busy
        | RegistrationError::AlreadyCompleted
        | RegistrationError::RecordPending
        | RegistrationError::Superseded => StatusCode::CONFLICT,
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = ErrorResponse {
            error: self.to_string(),
            code: self.code().to_string(),
            message: self.user_message().to_string(),
        };

        (status, Json(body)).into_response()
    }
}
