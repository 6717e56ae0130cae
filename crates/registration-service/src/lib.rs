//! Registration Service - phone-verified onboarding for Brazilian users.
//!
//! Collects the signup form, sends an SMS code through the identity
//! provider, and stores the user record once the code is confirmed:
//! - Validates name, phone, passwords and CPF locally before any provider call
//! - Keeps one single-flight session per client flow
//! - Exposes verified-but-unstored users so the record write can be retried

pub mod api;
pub mod config;
pub mod coordinator;
pub mod error;
pub mod sessions;

pub use config::Config;
pub use coordinator::{
    Phase, RegistrationCoordinator, RegistrationError, RegistrationForm, RegistrationSession,
    SessionHandle, ValidationError,
};
pub use error::ApiError;
pub use sessions::SessionTable;
