//! Registration errors.

use identity_client::ProviderError;
use thiserror::Error;
use user_store::StoreError;

/// Local input validation failure. Never reaches the provider.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Full name is empty")]
    NameEmpty,

    #[error("Full name is shorter than 2 characters")]
    NameTooShort,

    #[error("Phone number must have 10 or 11 digits")]
    InvalidPhone,

    #[error("Password is empty")]
    PasswordEmpty,

    #[error("Password is shorter than 6 characters")]
    PasswordTooShort,

    #[error("Password confirmation is empty")]
    ConfirmPasswordEmpty,

    #[error("Passwords do not match")]
    PasswordMismatch,

    #[error("CPF must have 11 digits")]
    InvalidNationalId,

    #[error("Verification code is empty")]
    CodeEmpty,
}

impl ValidationError {
    pub fn user_message(&self) -> &'static str {
        match self {
            ValidationError::NameEmpty => "Por favor, digite seu nome completo.",
            ValidationError::NameTooShort => "Nome deve ter pelo menos 2 caracteres.",
            ValidationError::InvalidPhone => "Por favor, digite um telefone válido.",
            ValidationError::PasswordEmpty => "Por favor, digite uma senha.",
            ValidationError::PasswordTooShort => "Senha deve ter pelo menos 6 caracteres.",
            ValidationError::ConfirmPasswordEmpty => "Por favor, confirme sua senha.",
            ValidationError::PasswordMismatch => "As senhas não coincidem.",
            ValidationError::InvalidNationalId => "Por favor, digite um CPF válido.",
            ValidationError::CodeEmpty => "Por favor, digite o código de verificação.",
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            ValidationError::NameEmpty => "NAME_EMPTY",
            ValidationError::NameTooShort => "NAME_TOO_SHORT",
            ValidationError::InvalidPhone => "INVALID_PHONE",
            ValidationError::PasswordEmpty => "PASSWORD_EMPTY",
            ValidationError::PasswordTooShort => "PASSWORD_TOO_SHORT",
            ValidationError::ConfirmPasswordEmpty => "CONFIRM_PASSWORD_EMPTY",
            ValidationError::PasswordMismatch => "PASSWORD_MISMATCH",
            ValidationError::InvalidNationalId => "INVALID_NATIONAL_ID",
            ValidationError::CodeEmpty => "CODE_EMPTY",
        }
    }
}

/// Outcome of a failed coordinator operation.
#[derive(Error, Debug)]
pub enum RegistrationError {
    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationError),

    #[error("Identity provider error: {0}")]
    Provider(#[from] ProviderError),

    /// The provider verified the phone but the user record was not written.
    #[error("Verified subject {subject_id} could not be stored: {source}")]
    Persistence {
        subject_id: String,
        #[source]
        source: StoreError,
    },

    #[error("User not found")]
    UserNotFound,

    #[error("No pending verification for this session")]
    NoPendingVerification,

    #[error("Session has no verified subject awaiting a user record")]
    NotVerified,

    #[error("A request is already in flight for this session")]
    Busy,

    #[error("Registration already completed")]
    AlreadyCompleted,

    /// A verified subject is waiting for its user record to be stored.
    #[error("Verified user record has not been stored yet")]
    RecordPending,

    #[error("Session was reset while the request was in flight")]
    Superseded,
}

impl RegistrationError {
    /// Message shown to the user.
    pub fn user_message(&self) -> &'static str {
        match self {
            RegistrationError::Validation(e) => e.user_message(),
            RegistrationError::Provider(e) => e.user_message(),
            RegistrationError::Persistence { .. } => {
                "Não foi possível salvar seu cadastro. Tente novamente."
            }
            RegistrationError::UserNotFound => "Usuário não encontrado.",
            RegistrationError::NoPendingVerification => {
                "Nenhuma verificação pendente. Solicite um novo código."
            }
            RegistrationError::NotVerified => "Telefone ainda não verificado.",
            RegistrationError::Busy => "Aguarde, uma solicitação já está em andamento.",
            RegistrationError::AlreadyCompleted => "Cadastro já concluído.",
            RegistrationError::RecordPending => {
                "Telefone já verificado. Tente salvar seu cadastro novamente."
            }
            RegistrationError::Superseded => "A solicitação foi cancelada.",
        }
    }

    /// Stable machine-readable code.
    pub fn code(&self) -> &'static str {
        match self {
            RegistrationError::Validation(e) => e.code(),
            RegistrationError::Provider(e) => match e {
                ProviderError::InvalidPhoneNumber => "PROVIDER_INVALID_PHONE_NUMBER",
                ProviderError::InvalidVerificationCode => "INVALID_VERIFICATION_CODE",
                ProviderError::ExpiredSession => "VERIFICATION_EXPIRED",
                ProviderError::RateLimited => "PROVIDER_RATE_LIMITED",
                ProviderError::QuotaExceeded => "SMS_QUOTA_EXCEEDED",
                ProviderError::Timeout => "PROVIDER_TIMEOUT",
                ProviderError::Unknown(_) => "PROVIDER_ERROR",
            },
            RegistrationError::Persistence { .. } => "VERIFIED_UNREGISTERED",
            RegistrationError::UserNotFound => "USER_NOT_FOUND",
            RegistrationError::NoPendingVerification => "NO_PENDING_VERIFICATION",
            RegistrationError::NotVerified => "NOT_VERIFIED",
            RegistrationError::Busy => "REQUEST_IN_FLIGHT",
            RegistrationError::AlreadyCompleted => "ALREADY_COMPLETED",
            RegistrationError::RecordPending => "RECORD_PENDING",
            RegistrationError::Superseded => "SUPERSEDED",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_messages_are_distinct() {
        let all = [
            ValidationError::NameEmpty,
            ValidationError::NameTooShort,
            ValidationError::InvalidPhone,
            ValidationError::PasswordEmpty,
            ValidationError::PasswordTooShort,
            ValidationError::ConfirmPasswordEmpty,
            ValidationError::PasswordMismatch,
            ValidationError::InvalidNationalId,
            ValidationError::CodeEmpty,
        ];

        let mut messages: Vec<_> = all.iter().map(|e| e.user_message()).collect();
        messages.sort();
        messages.dedup();
        assert_eq!(messages.len(), all.len());
    }

    #[test]
    fn test_provider_message_passes_through() {
        let err = RegistrationError::from(ProviderError::RateLimited);
        assert_eq!(err.user_message(), "Muitas tentativas. Aguarde alguns minutos.");
        assert_eq!(err.code(), "PROVIDER_RATE_LIMITED");
    }

    #[test]
    fn test_persistence_error_is_distinct_from_success() {
        let err = RegistrationError::Persistence {
            subject_id: "U1".into(),
            source: StoreError::Encryption("disk".into()),
        };
        assert_eq!(err.code(), "VERIFIED_UNREGISTERED");
        assert!(err.to_string().contains("U1"));
    }
}
