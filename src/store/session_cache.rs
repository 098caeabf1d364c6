use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;

use crate::model::SessionId;
use crate::store::EditorSession;

/// A session shared between request handlers.
///
/// The mutex is held for the whole of one command and never across an
/// `.await`, so commands on a session run one after another to completion.
pub type SharedSession = Arc<Mutex<EditorSession>>;

/// Cache entry for an editor session
#[derive(Clone, Debug)]
struct CacheEntry {
    session: SharedSession,
    last_accessed: Instant,
}

/// In-memory session cache with TTL.
/// Sessions are not persisted; an expired session is simply gone.
#[derive(Debug)]
pub struct SessionCache {
    entries: Arc<RwLock<HashMap<SessionId, CacheEntry>>>,
    ttl: Duration,
}

impl SessionCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: Arc::new(RwLock::new(HashMap::new())),
            ttl,
        }
    }

    /// Get a session if present and not expired
    pub async fn get(&self, id: &SessionId) -> Option<SharedSession> {
        let mut entries = self.entries.write().await;

        if let Some(entry) = entries.get_mut(id) {
            if entry.last_accessed.elapsed() > self.ttl {
                entries.remove(id);
                log::info!("Session {} expired", id);
                return None;
            }

            entry.last_accessed = Instant::now();
            Some(entry.session.clone())
        } else {
            None
        }
    }

    pub async fn put(&self, session: EditorSession) -> SharedSession {
        let id = session.id.clone();
        let shared = Arc::new(Mutex::new(session));

        let mut entries = self.entries.write().await;
        entries.insert(
            id,
            CacheEntry {
                session: shared.clone(),
                last_accessed: Instant::now(),
            },
        );
        shared
    }

    pub async fn remove(&self, id: &SessionId) -> bool {
        let mut entries = self.entries.write().await;
        entries.remove(id).is_some()
    }

    pub async fn ids(&self) -> Vec<SessionId> {
        let entries = self.entries.read().await;
        let mut ids: Vec<SessionId> = entries.keys().cloned().collect();
        ids.sort();
        ids
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }

    /// Drop expired sessions, returning how many were removed
    pub async fn clear_expired(&self) -> usize {
        let mut entries = self.entries.write().await;
        let now = Instant::now();
        let ttl = self.ttl;

        let before = entries.len();
        entries.retain(|_, entry| now.duration_since(entry.last_accessed) <= ttl);
        before - entries.len()
    }

    pub async fn clear(&self) {
        let mut entries = self.entries.write().await;
        entries.clear();
    }
}

impl Default for SessionCache {
    fn default() -> Self {
        Self::new(Duration::from_secs(3600))
    }
}
