//! REST client for an identity-toolkit style phone authentication API.

use crate::error::ProviderError;
use crate::provider::IdentityProvider;
use crate::types::*;
use async_trait::async_trait;
use reqwest::{Client, Response};
use secrecy::{ExposeSecret, SecretString};
use std::time::Duration;
use tracing::{debug, instrument, warn};
use urlencoding::encode;

/// HTTP identity provider client.
///
/// The API key is stored using `SecretString` so it never shows up in
/// logs or debug output.
#[derive(Clone)]
pub struct HttpIdentityClient {
    client: Client,
    base_url: String,
    api_key: SecretString,
}

impl HttpIdentityClient {
    /// Create a new identity client.
    pub fn new(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, ProviderError> {
        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: SecretString::new(api_key.into()),
        })
    }

    fn endpoint(&self, method: &str) -> String {
        format!(
            "{}/v1/accounts:{}?key={}",
            self.base_url,
            method,
            encode(self.api_key.expose_secret())
        )
    }

    /// Turn a non-success response into a tagged error.
    async fn error_from_response(response: Response) -> ProviderError {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        warn!(status = %status, "Identity provider request failed");

        match serde_json::from_str::<ErrorEnvelope>(&body) {
            Ok(envelope) => ProviderError::from_provider_message(&envelope.error.message),
            Err(_) if status.as_u16() == 429 => ProviderError::RateLimited,
            Err(_) => ProviderError::Unknown(format!("{} - {}", status, body)),
        }
    }
}

#[async_trait]
impl IdentityProvider for HttpIdentityClient {
    #[instrument(skip(self))]
    async fn request_verification(
        &self,
        e164_phone: &str,
    ) -> Result<VerificationHandle, ProviderError> {
        debug!("Requesting verification code");

        let response = self
            .client
            .post(self.endpoint("sendVerificationCode"))
            .json(&SendCodeRequest {
                phone_number: e164_phone,
            })
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Self::error_from_response(response).await);
        }

        let body: SendCodeResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::Unknown(format!("Failed to parse response: {}", e)))?;

        debug!("Verification code sent");
        Ok(VerificationHandle::new(body.session_info))
    }

    #[instrument(skip(self, handle, code))]
    async fn confirm_verification(
        &self,
        handle: &VerificationHandle,
        code: &str,
    ) -> Result<ProviderSession, ProviderError> {
        debug!("Confirming verification code");

        let response = self
            .client
            .post(self.endpoint("signInWithPhoneNumber"))
            .json(&SignInRequest {
                session_info: handle.as_str(),
                code,
            })
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Self::error_from_response(response).await);
        }

        let body: SignInResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::Unknown(format!("Failed to parse response: {}", e)))?;

        debug!(subject_id = %body.local_id, "Verification confirmed");
        Ok(ProviderSession::new(body.local_id, body.id_token))
    }
}
