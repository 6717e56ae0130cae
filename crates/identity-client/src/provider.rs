//! Identity provider contract.

use crate::error::ProviderError;
use crate::types::{ProviderSession, VerificationHandle};
use async_trait::async_trait;

/// Phone-number identity provider.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Send an SMS code to an E.164 phone number.
    async fn request_verification(
        &self,
        e164_phone: &str,
    ) -> Result<VerificationHandle, ProviderError>;

    /// Exchange a handle and the code the user received for a session.
    async fn confirm_verification(
        &self,
        handle: &VerificationHandle,
        code: &str,
    ) -> Result<ProviderSession, ProviderError>;
}
