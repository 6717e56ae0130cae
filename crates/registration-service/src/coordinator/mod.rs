//! Registration coordinator.
//!
//! Drives the two-step flow (phone submission, then SMS code) against the
//! identity provider and writes the user record once the phone is
//! verified. A session is locked only to read or apply state, never while
//! a provider or store call is pending; the generation counter decides
//! whether a late response still applies.

mod error;
mod session;
mod validation;

pub use error::{RegistrationError, ValidationError};
pub use session::{
    Phase, RegistrationSession, CODE_SENT_MESSAGE, LOGGED_IN_MESSAGE, REGISTERED_MESSAGE,
};
pub use validation::{RegistrationForm, MIN_NAME_LENGTH, MIN_PASSWORD_LENGTH};

use br_format::to_e164;
use identity_client::{IdentityProvider, ProviderError, VerificationHandle};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::{debug, info, instrument, warn};
use user_store::{StoreError, User, UserStore};

/// Shared handle to one session.
pub type SessionHandle = Arc<Mutex<RegistrationSession>>;

/// Registration coordinator.
pub struct RegistrationCoordinator {
    provider: Arc<dyn IdentityProvider>,
    store: Arc<dyn UserStore>,
    country_code: String,
    request_timeout: Duration,
}

impl RegistrationCoordinator {
    /// Create a new coordinator.
    pub fn new(
        provider: Arc<dyn IdentityProvider>,
        store: Arc<dyn UserStore>,
        country_code: impl Into<String>,
        request_timeout: Duration,
    ) -> Self {
        Self {
            provider,
            store,
            country_code: country_code.into(),
            request_timeout,
        }
    }

    /// Bound a provider call by the configured timeout.
    async fn with_timeout<T>(
        &self,
        call: impl Future<Output = Result<T, ProviderError>>,
    ) -> Result<T, ProviderError> {
        tokio::time::timeout(self.request_timeout, call)
            .await
            .unwrap_or(Err(ProviderError::Timeout))
    }

    /// Validate the form and request an SMS code.
    ///
    /// Calling again while awaiting a code resends it; the new handle
    /// replaces the old one.
    #[instrument(skip(self, session, form))]
    pub async fn start_registration(
        &self,
        session: &SessionHandle,
        form: RegistrationForm,
    ) -> Result<VerificationHandle, RegistrationError> {
        let (generation, e164) = {
            let mut s = session.lock().await;
            // The in-flight request owns the loading flag and messages
            if s.is_loading() {
                return Err(RegistrationError::Busy);
            }
            s.clear_messages();

            let admitted = match s.phase() {
                Phase::Completed => Err(RegistrationError::AlreadyCompleted),
                // The verified record must be stored before anything else
                Phase::VerifiedUnregistered => Err(RegistrationError::RecordPending),
                Phase::Idle | Phase::AwaitingCode => {
                    form.validate().map_err(RegistrationError::from)
                }
            };
            if let Err(err) = admitted {
                s.record_error(&err);
                return Err(err);
            }

            // The form is kept only once the provider accepts it
            let e164 = to_e164(&form.phone_number, &self.country_code);
            (s.begin_request(), e164)
        };

        info!(phone_number = %e164, generation, "Requesting verification code");
        let result = self
            .with_timeout(self.provider.request_verification(&e164))
            .await;

        let mut s = session.lock().await;
        if !s.is_current(generation) {
            debug!(generation, "Dropping stale verification response");
            return Err(RegistrationError::Superseded);
        }

        match result {
            Ok(handle) => {
                s.code_sent(handle.clone(), form);
                info!(phone_number = %e164, "Verification code sent");
                Ok(handle)
            }
            Err(e) => {
                warn!(phone_number = %e164, error = %e, "Verification request failed");
                let err = RegistrationError::Provider(e);
                s.record_error(&err);
                Err(err)
            }
        }
    }

    /// Exchange the SMS code and create the user record.
    #[instrument(skip(self, session, code))]
    pub async fn complete_registration(
        &self,
        session: &SessionHandle,
        code: &str,
    ) -> Result<User, RegistrationError> {
        let code = code.trim();

        let (generation, handle) = {
            let mut s = session.lock().await;
            if s.is_loading() {
                return Err(RegistrationError::Busy);
            }
            s.clear_messages();

            let admitted = if code.is_empty() {
                Err(ValidationError::CodeEmpty.into())
            } else if s.phase() == Phase::Completed {
                Err(RegistrationError::AlreadyCompleted)
            } else {
                s.verification_handle()
                    .cloned()
                    .ok_or(RegistrationError::NoPendingVerification)
            };
            let handle = match admitted {
                Ok(handle) => handle,
                Err(err) => {
                    s.record_error(&err);
                    return Err(err);
                }
            };

            (s.begin_request(), handle)
        };

        debug!(generation, "Confirming verification code");
        let result = self
            .with_timeout(self.provider.confirm_verification(&handle, code))
            .await;

        let user = {
            let mut s = session.lock().await;
            if !s.is_current(generation) {
                debug!(generation, "Dropping stale confirmation response");
                return Err(RegistrationError::Superseded);
            }

            match result {
                Ok(provider_session) => {
                    info!(subject_id = %provider_session.subject_id, "Phone number verified");
                    s.verified(provider_session, &self.country_code)
                }
                Err(e) => {
                    warn!(error = %e, "Verification code rejected");
                    let err = RegistrationError::Provider(e);
                    s.verification_rejected(&err);
                    return Err(err);
                }
            }
        };

        self.persist_user(session, generation, user).await
    }

    /// Retry writing the user record after a store failure.
    ///
    /// Does not contact the identity provider.
    #[instrument(skip(self, session))]
    pub async fn retry_user_record(&self, session: &SessionHandle) -> Result<User, RegistrationError> {
        let (generation, user) = {
            let mut s = session.lock().await;
            if s.is_loading() {
                return Err(RegistrationError::Busy);
            }
            s.clear_messages();

            let admitted = if s.phase() != Phase::VerifiedUnregistered {
                Err(RegistrationError::NotVerified)
            } else {
                s.verified_user()
                    .cloned()
                    .ok_or(RegistrationError::NotVerified)
            };
            let user = match admitted {
                Ok(user) => user,
                Err(err) => {
                    s.record_error(&err);
                    return Err(err);
                }
            };

            (s.begin_request(), user)
        };

        self.persist_user(session, generation, user).await
    }

    async fn persist_user(
        &self,
        session: &SessionHandle,
        generation: u64,
        user: User,
    ) -> Result<User, RegistrationError> {
        let subject_id = user.id.clone();
        let result = self.store_user(user).await;

        let mut s = session.lock().await;
        let current = s.is_current(generation);
        if !current {
            debug!(generation, "Session reset while storing user record");
        }

        match result {
            Ok(user) => {
                if current {
                    s.registration_completed();
                }
                info!(subject_id = %subject_id, "User registered");
                Ok(user)
            }
            Err(source) => {
                warn!(subject_id = %subject_id, error = %source, "Failed to store verified user");
                let err = RegistrationError::Persistence { subject_id, source };
                if current {
                    s.record_error(&err);
                }
                Err(err)
            }
        }
    }

    /// Write a new record, or refresh `updated_at` on the subject's
    /// existing one. An existing record is never replaced.
    async fn store_user(&self, user: User) -> Result<User, StoreError> {
        let user = match self.store.get(&user.id).await? {
            Some(mut existing) => {
                info!(subject_id = %existing.id, "Subject already registered, keeping its record");
                existing.touch();
                existing
            }
            None => user,
        };

        self.store.put(&user.id, &user).await?;
        Ok(user)
    }

    /// Load the user behind the session's active provider session.
    ///
    /// There is no credential check of its own: without a provider session
    /// the user is reported as not found.
    #[instrument(skip(self, session))]
    pub async fn login(
        &self,
        session: &SessionHandle,
        phone_number: &str,
    ) -> Result<User, RegistrationError> {
        let (generation, subject_id) = {
            let mut s = session.lock().await;
            if s.is_loading() {
                return Err(RegistrationError::Busy);
            }
            s.clear_messages();

            let subject_id = match s.provider_subject().map(String::from) {
                Some(subject_id) => subject_id,
                None => {
                    let err = RegistrationError::UserNotFound;
                    s.record_error(&err);
                    return Err(err);
                }
            };

            (s.begin_request(), subject_id)
        };

        let result = self.store.get(&subject_id).await;

        let mut s = session.lock().await;
        if !s.is_current(generation) {
            debug!(generation, "Dropping stale login response");
            return Err(RegistrationError::Superseded);
        }

        match result {
            Ok(Some(user)) => {
                let requested = to_e164(phone_number, &self.country_code);
                if user.phone_number != requested {
                    warn!(subject_id = %subject_id, "Login phone differs from the session's user");
                }
                s.logged_in();
                info!(subject_id = %subject_id, "User logged in");
                Ok(user)
            }
            Ok(None) => {
                warn!(subject_id = %subject_id, "No user record for provider session, signing out");
                s.sign_out();
                let err = RegistrationError::UserNotFound;
                s.record_error(&err);
                Err(err)
            }
            Err(e) => {
                warn!(subject_id = %subject_id, error = %e, "Failed to load user, signing out");
                s.sign_out();
                let err = RegistrationError::UserNotFound;
                s.record_error(&err);
                Err(err)
            }
        }
    }

    /// Return the session to `Idle`, dropping any in-flight response.
    pub async fn reset_session(&self, session: &SessionHandle) {
        let mut s = session.lock().await;
        s.reset();
        debug!(generation = s.generation(), "Session reset");
    }

    /// Drop the session's provider session.
    pub async fn sign_out(&self, session: &SessionHandle) {
        session.lock().await.sign_out();
        debug!("Signed out");
    }
}
