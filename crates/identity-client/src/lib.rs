//! Phone-number identity provider client.
//!
//! Defines the [`IdentityProvider`] contract used by the registration
//! coordinator and a REST implementation of it.

mod client;
mod error;
mod provider;
mod types;

pub use client::HttpIdentityClient;
pub use error::ProviderError;
pub use provider::IdentityProvider;
pub use types::{ProviderSession, VerificationHandle};

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;
    use std::time::Duration;
    use wiremock::matchers::{body_json, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn create_test_client(mock_server: &MockServer) -> HttpIdentityClient {
        HttpIdentityClient::new(mock_server.uri(), "test-key", Duration::from_secs(5)).unwrap()
    }

    fn error_body(message: &str) -> serde_json::Value {
        serde_json::json!({
            "error": { "code": 400, "message": message }
        })
    }

    #[tokio::test]
    async fn test_request_verification_success() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1/accounts:sendVerificationCode"))
            .and(query_param("key", "test-key"))
            .and(body_json(serde_json::json!({ "phoneNumber": "+5511999999999" })))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({ "sessionInfo": "H1" })),
            )
            .mount(&mock_server)
            .await;

        let client = create_test_client(&mock_server);
        let handle = client.request_verification("+5511999999999").await.unwrap();

        assert_eq!(handle, VerificationHandle::new("H1"));
    }

    #[tokio::test]
    async fn test_request_verification_invalid_phone() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1/accounts:sendVerificationCode"))
            .respond_with(
                ResponseTemplate::new(400).set_body_json(error_body("INVALID_PHONE_NUMBER : TOO_SHORT")),
            )
            .mount(&mock_server)
            .await;

        let client = create_test_client(&mock_server);
        let result = client.request_verification("+55119").await;

        assert_eq!(result.unwrap_err(), ProviderError::InvalidPhoneNumber);
    }

    #[tokio::test]
    async fn test_request_verification_quota_exceeded() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1/accounts:sendVerificationCode"))
            .respond_with(ResponseTemplate::new(400).set_body_json(error_body("QUOTA_EXCEEDED")))
            .mount(&mock_server)
            .await;

        let client = create_test_client(&mock_server);
        let result = client.request_verification("+5511999999999").await;

        assert_eq!(result.unwrap_err(), ProviderError::QuotaExceeded);
    }

    #[tokio::test]
    async fn test_bare_429_is_rate_limited() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1/accounts:sendVerificationCode"))
            .respond_with(ResponseTemplate::new(429).set_body_string("slow down"))
            .mount(&mock_server)
            .await;

        let client = create_test_client(&mock_server);
        let result = client.request_verification("+5511999999999").await;

        assert_eq!(result.unwrap_err(), ProviderError::RateLimited);
    }

    #[tokio::test]
    async fn test_unparseable_error_is_unknown() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1/accounts:sendVerificationCode"))
            .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
            .mount(&mock_server)
            .await;

        let client = create_test_client(&mock_server);
        let result = client.request_verification("+5511999999999").await;

        assert!(matches!(result, Err(ProviderError::Unknown(_))));
    }

    #[tokio::test]
    async fn test_confirm_verification_success() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1/accounts:signInWithPhoneNumber"))
            .and(body_json(serde_json::json!({ "sessionInfo": "H1", "code": "123456" })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "localId": "U1",
                "idToken": "token-abc",
                "phoneNumber": "+5511999999999"
            })))
            .mount(&mock_server)
            .await;

        let client = create_test_client(&mock_server);
        let session = client
            .confirm_verification(&VerificationHandle::new("H1"), "123456")
            .await
            .unwrap();

        assert_eq!(session.subject_id, "U1");
        assert_eq!(session.id_token.expose_secret(), "token-abc");
    }

    #[tokio::test]
    async fn test_confirm_verification_invalid_code() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1/accounts:signInWithPhoneNumber"))
            .respond_with(ResponseTemplate::new(400).set_body_json(error_body("INVALID_CODE")))
            .mount(&mock_server)
            .await;

        let client = create_test_client(&mock_server);
        let result = client
            .confirm_verification(&VerificationHandle::new("H1"), "000000")
            .await;

        assert_eq!(result.unwrap_err(), ProviderError::InvalidVerificationCode);
    }

    #[tokio::test]
    async fn test_confirm_verification_expired_session() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1/accounts:signInWithPhoneNumber"))
            .respond_with(ResponseTemplate::new(400).set_body_json(error_body("SESSION_EXPIRED")))
            .mount(&mock_server)
            .await;

        let client = create_test_client(&mock_server);
        let err = client
            .confirm_verification(&VerificationHandle::new("H1"), "123456")
            .await
            .unwrap_err();

        assert_eq!(err, ProviderError::ExpiredSession);
        assert!(err.requires_resend());
    }

    #[tokio::test]
    async fn test_client_timeout_is_tagged() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1/accounts:sendVerificationCode"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({ "sessionInfo": "H1" }))
                    .set_delay(Duration::from_millis(500)),
            )
            .mount(&mock_server)
            .await;

        let client =
            HttpIdentityClient::new(mock_server.uri(), "test-key", Duration::from_millis(50)).unwrap();
        let result = client.request_verification("+5511999999999").await;

        assert_eq!(result.unwrap_err(), ProviderError::Timeout);
    }

    #[test]
    fn test_provider_session_debug_redacts_token() {
        let session = ProviderSession::new("U1", "very-secret-token");
        let debug = format!("{:?}", session);

        assert!(debug.contains("U1"));
        assert!(!debug.contains("very-secret-token"));
    }
}
