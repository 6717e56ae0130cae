//! Identity provider errors.

use thiserror::Error;

/// Failure reported by the identity provider, classified at the adapter
/// boundary.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProviderError {
    #[error("Invalid phone number")]
    InvalidPhoneNumber,

    #[error("Invalid verification code")]
    InvalidVerificationCode,

    #[error("Verification session expired")]
    ExpiredSession,

    #[error("Too many requests")]
    RateLimited,

    #[error("SMS quota exceeded")]
    QuotaExceeded,

    #[error("Identity provider timed out")]
    Timeout,

    #[error("Identity provider error: {0}")]
    Unknown(String),
}

impl ProviderError {
    /// Classify a provider error message such as `INVALID_CODE : detail`.
    pub fn from_provider_message(message: &str) -> Self {
        let code = message
            .split(|c: char| c == ':' || c.is_whitespace())
            .next()
            .unwrap_or_default();

        match code {
            "INVALID_PHONE_NUMBER" | "MISSING_PHONE_NUMBER" => ProviderError::InvalidPhoneNumber,
            "INVALID_CODE" | "MISSING_CODE" => ProviderError::InvalidVerificationCode,
            "SESSION_EXPIRED" | "INVALID_SESSION_INFO" | "MISSING_SESSION_INFO" => {
                ProviderError::ExpiredSession
            }
            "TOO_MANY_ATTEMPTS_TRY_LATER" => ProviderError::RateLimited,
            "QUOTA_EXCEEDED" => ProviderError::QuotaExceeded,
            _ => ProviderError::Unknown(message.to_string()),
        }
    }

    /// Message shown to the user.
    pub fn user_message(&self) -> &'static str {
        match self {
            ProviderError::InvalidPhoneNumber => "Número de telefone inválido.",
            ProviderError::InvalidVerificationCode => "Código de verificação inválido.",
            ProviderError::ExpiredSession => "Sessão de verificação expirada. Tente novamente.",
            ProviderError::RateLimited => "Muitas tentativas. Aguarde alguns minutos.",
            ProviderError::QuotaExceeded => "Limite de SMS excedido. Tente novamente mais tarde.",
            ProviderError::Timeout => "O serviço demorou para responder. Tente novamente.",
            ProviderError::Unknown(_) => "Ocorreu um erro inesperado. Tente novamente.",
        }
    }

    /// Whether the user has to request a new code before trying again.
    pub fn requires_resend(&self) -> bool {
        matches!(self, ProviderError::ExpiredSession | ProviderError::RateLimited)
    }
}

impl From<reqwest::Error> for ProviderError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            ProviderError::Timeout
        } else {
            ProviderError::Unknown(e.to_string())
        }
    }
}
