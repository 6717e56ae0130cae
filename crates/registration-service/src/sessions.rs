//! Registration sessions with TTL expiration.

use crate::coordinator::{RegistrationSession, SessionHandle};
use rand::RngCore;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, info, instrument};

/// Random bytes in a session id.
const SESSION_ID_BYTES: usize = 16;

struct SessionEntry {
    session: SessionHandle,
    expires_at: Instant,
}

/// Table of live registration sessions.
///
/// Sessions expire after the configured TTL without activity; a background
/// task removes them.
#[derive(Clone)]
pub struct SessionTable {
    sessions: Arc<RwLock<HashMap<String, SessionEntry>>>,
    ttl: Duration,
}

impl SessionTable {
    /// Create the table and spawn its cleanup task.
    pub fn new(ttl: Duration) -> Self {
        let table = Self {
            sessions: Arc::new(RwLock::new(HashMap::new())),
            ttl,
        };

        let cleanup_table = table.clone();
        tokio::spawn(async move {
            cleanup_table.cleanup_loop().await;
        });

        info!("Session table initialized (ttl={:?})", ttl);

        table
    }

    async fn cleanup_loop(&self) {
        let cleanup_interval = self.ttl.min(Duration::from_secs(60));

        loop {
            tokio::time::sleep(cleanup_interval).await;
            let removed = self.remove_expired().await;
            if removed > 0 {
                debug!("Cleaned up {} expired sessions", removed);
            }
        }
    }

    async fn remove_expired(&self) -> usize {
        let now = Instant::now();
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|_, entry| entry.expires_at > now);
        before - sessions.len()
    }

    /// Create a fresh `Idle` session.
    #[instrument(skip(self))]
    pub async fn create(&self) -> (String, SessionHandle) {
        let mut bytes = [0u8; SESSION_ID_BYTES];
        rand::thread_rng().fill_bytes(&mut bytes);
        let id = hex::encode(bytes);

        let session: SessionHandle = Arc::new(Mutex::new(RegistrationSession::new()));
        self.sessions.write().await.insert(
            id.clone(),
            SessionEntry {
                session: session.clone(),
                expires_at: Instant::now() + self.ttl,
            },
        );

        debug!(session_id = %id, "Session created");
        (id, session)
    }

    /// Look up a live session and extend its expiry.
    pub async fn get(&self, id: &str) -> Option<SessionHandle> {
        let mut sessions = self.sessions.write().await;
        let now = Instant::now();

        let entry = sessions.get_mut(id).filter(|entry| entry.expires_at > now)?;
        entry.expires_at = now + self.ttl;
        Some(entry.session.clone())
    }

    pub async fn count(&self) -> usize {
        self.sessions.read().await.len()
    }
}
