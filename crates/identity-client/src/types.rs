//! Identity provider types.

use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque token correlating a code-verification attempt with the phone
/// number request that started it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VerificationHandle(String);

impl VerificationHandle {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for VerificationHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// An authenticated principal returned by a successful code exchange.
#[derive(Clone)]
pub struct ProviderSession {
    /// Stable subject id issued by the provider
    pub subject_id: String,
    /// Bearer token for the provider session
    pub id_token: SecretString,
}

impl ProviderSession {
    pub fn new(subject_id: impl Into<String>, id_token: impl Into<String>) -> Self {
        Self {
            subject_id: subject_id.into(),
            id_token: SecretString::new(id_token.into()),
        }
    }
}

impl fmt::Debug for ProviderSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderSession")
            .field("subject_id", &self.subject_id)
            .field("id_token", &"[REDACTED]")
            .finish()
    }
}

/// Request body for `accounts:sendVerificationCode`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct SendCodeRequest<'a> {
    pub phone_number: &'a str,
}

/// Response body for `accounts:sendVerificationCode`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct SendCodeResponse {
    pub session_info: String,
}

/// Request body for `accounts:signInWithPhoneNumber`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct SignInRequest<'a> {
    pub session_info: &'a str,
    pub code: &'a str,
}

/// Response body for `accounts:signInWithPhoneNumber`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct SignInResponse {
    pub local_id: String,
    #[serde(default)]
    pub id_token: String,
}

/// Error envelope returned by the provider.
#[derive(Debug, Deserialize)]
pub(crate) struct ErrorEnvelope {
    pub error: ErrorBody,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ErrorBody {
    #[serde(default)]
    pub message: String,
}
