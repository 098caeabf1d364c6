use anyhow::Result;
use std::time::Duration;

use crate::model::{ComponentGraph, SessionId};
use crate::store::{EditorSession, SessionCache, SharedSession};

/// Where editor sessions live between requests
#[async_trait::async_trait]
pub trait SessionStore: Send + Sync {
    /// Open a new session seeded with `graph`
    async fn create_session(&self, graph: ComponentGraph) -> Result<SharedSession>;
    async fn get_session(&self, id: &SessionId) -> Result<Option<SharedSession>>;
    async fn list_sessions(&self) -> Result<Vec<SessionId>>;
    async fn delete_session(&self, id: &SessionId) -> Result<bool>;
}

/// Session store backed by the in-memory TTL cache
#[derive(Debug)]
pub struct MemorySessionStore {
    cache: SessionCache,
    history_limit: usize,
}

impl MemorySessionStore {
    pub fn new(session_ttl: Duration, history_limit: usize) -> Self {
        Self {
            cache: SessionCache::new(session_ttl),
            history_limit,
        }
    }

    pub async fn evict_expired(&self) -> usize {
        self.cache.clear_expired().await
    }
}

impl Default for MemorySessionStore {
    fn default() -> Self {
        Self::new(Duration::from_secs(3600), 100)
    }
}

#[async_trait::async_trait]
impl SessionStore for MemorySessionStore {
    async fn create_session(&self, graph: ComponentGraph) -> Result<SharedSession> {
        let session = EditorSession::with_graph(graph, self.history_limit);
        log::info!("Opened session {}", session.id);
        Ok(self.cache.put(session).await)
    }

    async fn get_session(&self, id: &SessionId) -> Result<Option<SharedSession>> {
        Ok(self.cache.get(id).await)
    }

    async fn list_sessions(&self) -> Result<Vec<SessionId>> {
        Ok(self.cache.ids().await)
    }

    async fn delete_session(&self, id: &SessionId) -> Result<bool> {
        let removed = self.cache.remove(id).await;
        if removed {
            log::info!("Closed session {}", id);
        }
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_store_session_lifecycle() {
        let store = MemorySessionStore::default();
        let shared = store.create_session(ComponentGraph::new()).await.unwrap();
        let id = shared.lock().id.clone();

        assert!(store.get_session(&id).await.unwrap().is_some());
        assert_eq!(store.list_sessions().await.unwrap(), vec![id.clone()]);
        assert!(store.delete_session(&id).await.unwrap());
        assert!(store.get_session(&id).await.unwrap().is_none());
    }
}
