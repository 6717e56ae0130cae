//! User record store.
//!
//! Records are keyed by the identity provider's subject id. The store is
//! either in-memory or an AES-256-GCM encrypted file, since records carry
//! phone numbers and CPFs.

mod encrypted;
mod error;
mod memory;
mod types;

pub use encrypted::{derive_key, EncryptedFileStore, Store};
pub use error::StoreError;
pub use memory::MemoryUserStore;
pub use types::{RegistrationData, User};

use async_trait::async_trait;

/// Persistence for user records.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Load the record for a subject, if one exists.
    async fn get(&self, subject_id: &str) -> Result<Option<User>, StoreError>;

    /// Create or replace the record for a subject.
    async fn put(&self, subject_id: &str, user: &User) -> Result<(), StoreError>;

    /// Number of stored records.
    async fn count(&self) -> usize;
}
