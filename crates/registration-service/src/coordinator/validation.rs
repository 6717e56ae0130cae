//! Registration form and its validation rules.

use super::error::ValidationError;
use br_format::{clean_name, is_national_id_valid, is_phone_valid};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;

/// Minimum length of the cleaned full name, in characters.
pub const MIN_NAME_LENGTH: usize = 2;

/// Minimum password length, in characters.
pub const MIN_PASSWORD_LENGTH: usize = 6;

/// Input submitted to start a registration.
///
/// Passwords are collected for parity with the signup form but are never
/// sent to the identity provider.
#[derive(Debug, Clone, Deserialize)]
pub struct RegistrationForm {
    pub full_name: String,

    #[serde(default)]
    pub national_id: Option<String>,

    pub phone_number: String,

    pub password: SecretString,

    pub confirm_password: SecretString,
}

impl RegistrationForm {
    pub fn new(
        full_name: impl Into<String>,
        national_id: Option<&str>,
        phone_number: impl Into<String>,
        password: impl Into<String>,
        confirm_password: impl Into<String>,
    ) -> Self {
        Self {
            full_name: full_name.into(),
            national_id: national_id.map(String::from),
            phone_number: phone_number.into(),
            password: SecretString::new(password.into()),
            confirm_password: SecretString::new(confirm_password.into()),
        }
    }

    /// Check the fields in a fixed order; the first failure wins.
    pub fn validate(&self) -> Result<(), ValidationError> {
        let name = clean_name(&self.full_name);
        if name.is_empty() {
            return Err(ValidationError::NameEmpty);
        }
        if name.chars().count() < MIN_NAME_LENGTH {
            return Err(ValidationError::NameTooShort);
        }

        if !is_phone_valid(&self.phone_number) {
            return Err(ValidationError::InvalidPhone);
        }

        let password = self.password.expose_secret();
        if password.is_empty() {
            return Err(ValidationError::PasswordEmpty);
        }
        if password.chars().count() < MIN_PASSWORD_LENGTH {
            return Err(ValidationError::PasswordTooShort);
        }

        let confirm = self.confirm_password.expose_secret();
        if confirm.is_empty() {
            return Err(ValidationError::ConfirmPasswordEmpty);
        }
        if password != confirm {
            return Err(ValidationError::PasswordMismatch);
        }

        if let Some(national_id) = self.national_id.as_deref() {
            if !national_id.is_empty() && !is_national_id_valid(national_id) {
                return Err(ValidationError::InvalidNationalId);
            }
        }

        Ok(())
    }
}
