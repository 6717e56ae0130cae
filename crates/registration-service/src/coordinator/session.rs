//! Per-flow registration session state.

use super::error::RegistrationError;
use super::validation::RegistrationForm;
use br_format::{clean_name, normalize_national_id, to_e164};
use chrono::{DateTime, Utc};
use identity_client::{ProviderSession, VerificationHandle};
use secrecy::SecretString;
use serde::Serialize;
use user_store::{RegistrationData, User};

/// Success message once the SMS has been requested.
pub const CODE_SENT_MESSAGE: &str = "SMS enviado! Verifique seu telefone.";

/// Success message once the user record exists.
pub const REGISTERED_MESSAGE: &str = "Conta criada com sucesso!";

/// Success message for a login on an existing provider session.
pub const LOGGED_IN_MESSAGE: &str = "Login realizado com sucesso!";

/// Where a session is in the registration flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    /// Collecting the form; no code has been requested
    Idle,
    /// An SMS code was sent and can be entered
    AwaitingCode,
    /// The provider verified the phone but the user record was not stored
    VerifiedUnregistered,
    /// The user record exists
    Completed,
}

/// In-memory state of one registration flow.
///
/// Mutated only by the coordinator through these methods. `generation`
/// identifies the newest request; responses carrying an older generation
/// are dropped.
#[derive(Debug)]
pub struct RegistrationSession {
    phone_number: String,
    full_name: String,
    national_id: String,
    password: SecretString,
    confirm_password: SecretString,
    verification_handle: Option<VerificationHandle>,
    provider_session: Option<ProviderSession>,
    verified_user: Option<User>,
    is_loading: bool,
    error_message: Option<String>,
    success_message: Option<String>,
    phase: Phase,
    generation: u64,
    created_at: DateTime<Utc>,
}

impl Default for RegistrationSession {
    fn default() -> Self {
        Self::new()
    }
}

impl RegistrationSession {
    pub fn new() -> Self {
        Self {
            phone_number: String::new(),
            full_name: String::new(),
            national_id: String::new(),
            password: SecretString::new(String::new()),
            confirm_password: SecretString::new(String::new()),
            verification_handle: None,
            provider_session: None,
            verified_user: None,
            is_loading: false,
            error_message: None,
            success_message: None,
            phase: Phase::Idle,
            generation: 0,
            created_at: Utc::now(),
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_loading(&self) -> bool {
        self.is_loading
    }

    pub fn error_message(&self) -> Option<&str> {
        self.error_message.as_deref()
    }

    pub fn success_message(&self) -> Option<&str> {
        self.success_message.as_deref()
    }

    pub fn phone_number(&self) -> &str {
        &self.phone_number
    }

    pub fn full_name(&self) -> &str {
        &self.full_name
    }

    pub fn national_id(&self) -> &str {
        &self.national_id
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn verification_handle(&self) -> Option<&VerificationHandle> {
        self.verification_handle.as_ref()
    }

    /// Subject id of the active provider session, if any.
    pub fn provider_subject(&self) -> Option<&str> {
        self.provider_session.as_ref().map(|s| s.subject_id.as_str())
    }

    /// True only while a code from a still-valid request can be entered.
    pub fn ready_for_code_entry(&self) -> bool {
        self.phase == Phase::AwaitingCode && self.verification_handle.is_some()
    }

    pub(crate) fn generation(&self) -> u64 {
        self.generation
    }

    pub(crate) fn is_current(&self, generation: u64) -> bool {
        self.generation == generation
    }

    /// Clear error and success messages.
    pub(crate) fn clear_messages(&mut self) {
        self.error_message = None;
        self.success_message = None;
    }

    fn store_form(&mut self, form: RegistrationForm) {
        self.full_name = form.full_name;
        self.national_id = form.national_id.unwrap_or_default();
        self.phone_number = form.phone_number;
        self.password = form.password;
        self.confirm_password = form.confirm_password;
    }

    /// Mark a new request as in flight and return its generation.
    pub(crate) fn begin_request(&mut self) -> u64 {
        self.generation += 1;
        self.is_loading = true;
        self.generation
    }

    /// Record a failure. Clears any success message and the loading flag.
    pub(crate) fn record_error(&mut self, err: &RegistrationError) {
        self.is_loading = false;
        self.success_message = None;
        self.error_message = Some(err.user_message().to_string());
    }

    fn record_success(&mut self, message: &str) {
        self.is_loading = false;
        self.error_message = None;
        self.success_message = Some(message.to_string());
    }

    /// A new code was sent for `form`; the earlier handle and form are
    /// replaced together, so a handle always verifies the data it was
    /// requested for.
    pub(crate) fn code_sent(&mut self, handle: VerificationHandle, form: RegistrationForm) {
        self.store_form(form);
        self.verification_handle = Some(handle);
        self.phase = Phase::AwaitingCode;
        self.record_success(CODE_SENT_MESSAGE);
    }

    /// The provider rejected the code exchange.
    ///
    /// Errors that invalidate the handle drop the session back to `Idle`
    /// so a new code has to be requested.
    pub(crate) fn verification_rejected(&mut self, err: &RegistrationError) {
        if let RegistrationError::Provider(provider_err) = err {
            if provider_err.requires_resend()
                || *provider_err == identity_client::ProviderError::InvalidPhoneNumber
            {
                self.verification_handle = None;
                self.phase = Phase::Idle;
            }
        }
        self.record_error(err);
    }

    /// The provider accepted the code. The record to store is fixed here
    /// from the verified form; it is not written yet, so the session stays
    /// loading.
    pub(crate) fn verified(&mut self, provider_session: ProviderSession, country_code: &str) -> User {
        let user = User::new(
            &provider_session.subject_id,
            self.registration_data(country_code),
        );
        self.verification_handle = None;
        self.provider_session = Some(provider_session);
        self.verified_user = Some(user.clone());
        self.phase = Phase::VerifiedUnregistered;
        user
    }

    /// Record verified but not yet stored.
    pub(crate) fn verified_user(&self) -> Option<&User> {
        self.verified_user.as_ref()
    }

    pub(crate) fn registration_completed(&mut self) {
        self.verified_user = None;
        self.phase = Phase::Completed;
        self.record_success(REGISTERED_MESSAGE);
    }

    pub(crate) fn logged_in(&mut self) {
        self.record_success(LOGGED_IN_MESSAGE);
    }

    /// Build the user record input from the stored form.
    pub(crate) fn registration_data(&self, country_code: &str) -> RegistrationData {
        let national_id = if self.national_id.is_empty() {
            None
        } else {
            Some(normalize_national_id(&self.national_id))
        };

        RegistrationData {
            phone_number: to_e164(&self.phone_number, country_code),
            full_name: clean_name(&self.full_name),
            national_id,
        }
    }

    /// Clear messages, input fields and any pending verification.
    ///
    /// The provider session survives; see [`RegistrationSession::sign_out`].
    pub(crate) fn reset(&mut self) {
        self.phone_number.clear();
        self.full_name.clear();
        self.national_id.clear();
        self.password = SecretString::new(String::new());
        self.confirm_password = SecretString::new(String::new());
        self.verification_handle = None;
        self.verified_user = None;
        self.is_loading = false;
        self.clear_messages();
        self.phase = Phase::Idle;
        // Drop responses to anything still in flight
        self.generation += 1;
    }

    pub(crate) fn sign_out(&mut self) {
        self.provider_session = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use identity_client::ProviderError;

    fn form() -> RegistrationForm {
        RegistrationForm::new("Ana Silva", None, "11999999999", "senha123", "senha123")
    }

    #[test]
    fn test_new_session_is_idle() {
        let session = RegistrationSession::new();

        assert_eq!(session.phase(), Phase::Idle);
        assert!(!session.is_loading());
        assert!(!session.ready_for_code_entry());
        assert!(session.provider_subject().is_none());
    }

    #[test]
    fn test_error_and_success_are_exclusive() {
        let mut session = RegistrationSession::new();

        session.record_error(&RegistrationError::UserNotFound);
        assert!(session.error_message().is_some());

        session.code_sent(VerificationHandle::new("H1"), form());
        assert!(session.error_message().is_none());
        assert_eq!(session.success_message(), Some(CODE_SENT_MESSAGE));

        session.record_error(&RegistrationError::Busy);
        assert!(session.success_message().is_none());
    }

    #[test]
    fn test_invalid_code_keeps_handle() {
        let mut session = RegistrationSession::new();
        session.code_sent(VerificationHandle::new("H1"), form());

        session.verification_rejected(&ProviderError::InvalidVerificationCode.into());

        assert_eq!(session.phase(), Phase::AwaitingCode);
        assert!(session.ready_for_code_entry());
    }

    #[test]
    fn test_expired_session_clears_handle() {
        let mut session = RegistrationSession::new();
        session.code_sent(VerificationHandle::new("H1"), form());

        session.verification_rejected(&ProviderError::ExpiredSession.into());

        assert_eq!(session.phase(), Phase::Idle);
        assert!(!session.ready_for_code_entry());
        assert!(session.verification_handle().is_none());
    }

    #[test]
    fn test_verified_clears_handle() {
        let mut session = RegistrationSession::new();
        session.code_sent(VerificationHandle::new("H1"), form());

        session.verified(ProviderSession::new("U1", "token"), "55");

        assert_eq!(session.phase(), Phase::VerifiedUnregistered);
        assert!(!session.ready_for_code_entry());
        assert_eq!(session.provider_subject(), Some("U1"));

        let user = session.verified_user().unwrap();
        assert_eq!(user.id, "U1");
        assert_eq!(user.phone_number, "+5511999999999");

        session.registration_completed();
        assert!(session.verified_user().is_none());
    }

    #[test]
    fn test_registration_data_normalizes_fields() {
        let mut session = RegistrationSession::new();
        session.store_form(RegistrationForm::new(
            "  Ana  Silva ",
            Some("123.456.789-01"),
            "(11) 99999-9999",
            "senha123",
            "senha123",
        ));

        let data = session.registration_data("55");
        assert_eq!(data.phone_number, "+5511999999999");
        assert_eq!(data.full_name, "Ana  Silva");
        assert_eq!(data.national_id, Some("12345678901".into()));
    }

    #[test]
    fn test_registration_data_without_national_id() {
        let mut session = RegistrationSession::new();
        session.store_form(RegistrationForm::new("Ana", Some(""), "11999999999", "senha123", "senha123"));

        assert!(session.registration_data("55").national_id.is_none());
    }

    #[test]
    fn test_reset_clears_fields_and_bumps_generation() {
        let mut session = RegistrationSession::new();
        let generation = session.begin_request();
        session.code_sent(VerificationHandle::new("H1"), form());
        session.verified(ProviderSession::new("U1", "token"), "55");

        session.reset();
        assert!(session.verified_user().is_none());

        assert_eq!(session.phase(), Phase::Idle);
        assert!(session.full_name().is_empty());
        assert!(session.phone_number().is_empty());
        assert!(session.verification_handle().is_none());
        assert!(!session.is_current(generation));
        // Provider session survives a reset
        assert_eq!(session.provider_subject(), Some("U1"));

        session.sign_out();
        assert!(session.provider_subject().is_none());
    }
}
