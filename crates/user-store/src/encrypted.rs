//! Encrypted file-backed user store.

use crate::error::StoreError;
use crate::memory::MemoryUserStore;
use crate::types::User;
use crate::UserStore;
use aes_gcm::{
    aead::{Aead, KeyInit},
    Aes256Gcm, Key, Nonce,
};
use async_trait::async_trait;
use rand::RngCore;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

/// Label mixed into the key derivation for the user file.
const KEY_DERIVATION_LABEL: &str = "registration-service/users";

/// Nonce size for AES-GCM (96 bits = 12 bytes).
const NONCE_SIZE: usize = 12;

/// Data version for schema migrations.
const DATA_VERSION: u32 = 1;

/// On-disk document holding every user record.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct StoreData {
    version: u32,
    users: HashMap<String, User>,
}

/// Derive a 32-byte key from a passphrase.
///
/// `SHA256(passphrase || label)`; the same passphrase always opens the
/// same file.
pub fn derive_key(passphrase: &SecretString) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(passphrase.expose_secret().as_bytes());
    hasher.update(KEY_DERIVATION_LABEL.as_bytes());

    let mut key = [0u8; 32];
    key.copy_from_slice(&hasher.finalize());
    key
}

/// Encrypt `plaintext` into `[12 bytes nonce][ciphertext with auth tag]`.
fn encrypt(plaintext: &[u8], key: &[u8; 32]) -> Result<Vec<u8>, StoreError> {
    let cipher = Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(key));

    let mut nonce_bytes = [0u8; NONCE_SIZE];
    rand::thread_rng().fill_bytes(&mut nonce_bytes);
    let nonce = Nonce::from_slice(&nonce_bytes);

    let ciphertext = cipher.encrypt(nonce, plaintext)?;

    let mut data = nonce_bytes.to_vec();
    data.extend(ciphertext);
    Ok(data)
}

fn decrypt(data: &[u8], key: &[u8; 32]) -> Result<Vec<u8>, StoreError> {
    if data.len() < NONCE_SIZE {
        return Err(StoreError::Encryption("User file too short".into()));
    }

    let cipher = Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(key));
    let nonce = Nonce::from_slice(&data[..NONCE_SIZE]);

    cipher.decrypt(nonce, &data[NONCE_SIZE..]).map_err(|_| {
        StoreError::Encryption(
            "Failed to decrypt user file. The passphrase may have changed.".to_string(),
        )
    })
}

/// User store persisted to an AES-256-GCM encrypted file.
///
/// All records are cached in memory; every write rewrites the whole file.
pub struct EncryptedFileStore {
    users: RwLock<HashMap<String, User>>,
    storage_path: PathBuf,
    key: [u8; 32],
}

impl EncryptedFileStore {
    /// Open a store, loading existing records if the file exists.
    pub async fn open(
        storage_path: impl Into<PathBuf>,
        passphrase: &SecretString,
    ) -> Result<Self, StoreError> {
        Self::with_key(storage_path, derive_key(passphrase)).await
    }

    /// Open a store with a pre-derived key.
    pub async fn with_key(
        storage_path: impl Into<PathBuf>,
        key: [u8; 32],
    ) -> Result<Self, StoreError> {
        let storage_path = storage_path.into();
        let users = Self::load(&storage_path, &key).await?;

        Ok(Self {
            users: RwLock::new(users),
            storage_path,
            key,
        })
    }

    async fn load(path: &Path, key: &[u8; 32]) -> Result<HashMap<String, User>, StoreError> {
        if !path.exists() {
            info!(
                "User file not found at {:?}, starting with empty store",
                path
            );
            return Ok(HashMap::new());
        }

        let data = fs::read(path).await?;
        let plaintext = decrypt(&data, key)?;
        let stored: StoreData = serde_json::from_slice(&plaintext)?;

        if stored.version != DATA_VERSION {
            warn!(
                version = stored.version,
                "User file has unexpected version, loading anyway"
            );
        }

        info!("Loaded {} user records from {:?}", stored.users.len(), path);
        Ok(stored.users)
    }

    async fn save(&self, users: &HashMap<String, User>) -> Result<(), StoreError> {
        let plaintext = serde_json::to_vec(&StoreData {
            version: DATA_VERSION,
            users: users.clone(),
        })?;
        let data = encrypt(&plaintext, &self.key)?;

        if let Some(parent) = self.storage_path.parent() {
            fs::create_dir_all(parent).await?;
        }

        // Write atomically using temp file + rename
        let temp_path = self.storage_path.with_extension("tmp");
        fs::write(&temp_path, &data).await?;
        fs::rename(&temp_path, &self.storage_path).await?;

        debug!(
            "Saved encrypted user file ({} bytes) to {:?}",
            data.len(),
            self.storage_path
        );
        Ok(())
    }
}

#[async_trait]
impl UserStore for EncryptedFileStore {
    async fn get(&self, subject_id: &str) -> Result<Option<User>, StoreError> {
        Ok(self.users.read().await.get(subject_id).cloned())
    }

    async fn put(&self, subject_id: &str, user: &User) -> Result<(), StoreError> {
        let mut users = self.users.write().await;

        // Only publish the record once it is on disk
        let mut next = users.clone();
        next.insert(subject_id.to_string(), user.clone());
        self.save(&next).await?;
        *users = next;

        debug!(subject_id = %subject_id, "Persisted user record");
        Ok(())
    }

    async fn count(&self) -> usize {
        self.users.read().await.len()
    }
}

/// Storage backend selected at startup.
pub enum Store {
    /// Encrypted file storage
    Encrypted(EncryptedFileStore),
    /// In-memory only (no persistence)
    Memory(MemoryUserStore),
}

impl Store {
    /// Open the encrypted file store.
    pub async fn encrypted(
        storage_path: impl Into<PathBuf>,
        passphrase: &SecretString,
    ) -> Result<Self, StoreError> {
        Ok(Store::Encrypted(
            EncryptedFileStore::open(storage_path, passphrase).await?,
        ))
    }

    /// Force memory store.
    pub fn memory() -> Self {
        Store::Memory(MemoryUserStore::new())
    }
}

#[async_trait]
impl UserStore for Store {
    async fn get(&self, subject_id: &str) -> Result<Option<User>, StoreError> {
        match self {
            Store::Encrypted(s) => s.get(subject_id).await,
            Store::Memory(s) => s.get(subject_id).await,
        }
    }

    async fn put(&self, subject_id: &str, user: &User) -> Result<(), StoreError> {
        match self {
            Store::Encrypted(s) => s.put(subject_id, user).await,
            Store::Memory(s) => s.put(subject_id, user).await,
        }
    }

    async fn count(&self) -> usize {
        match self {
            Store::Encrypted(s) => s.count().await,
            Store::Memory(s) => s.count().await,
        }
    }
}
