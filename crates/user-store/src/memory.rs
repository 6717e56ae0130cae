//! In-memory user store.

use crate::error::StoreError;
use crate::types::User;
use crate::UserStore;
use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;
use tracing::debug;

/// User records kept in process memory (lost on restart).
#[derive(Debug, Default)]
pub struct MemoryUserStore {
    users: RwLock<HashMap<String, User>>,
}

impl MemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn get(&self, subject_id: &str) -> Result<Option<User>, StoreError> {
        Ok(self.users.read().await.get(subject_id).cloned())
    }

    async fn put(&self, subject_id: &str, user: &User) -> Result<(), StoreError> {
        self.users
            .write()
            .await
            .insert(subject_id.to_string(), user.clone());
        debug!(subject_id = %subject_id, "Stored user record");
        Ok(())
    }

    async fn count(&self) -> usize {
        self.users.read().await.len()
    }
}
