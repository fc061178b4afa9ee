//! Process-wide map of active game sessions. A thin, infrastructure-only
//! layer: it owns no game logic, just session lifecycle and lookup.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::event_bus::EventBus;
use crate::history::History;
use crate::orchestrator::GameRunner;

#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    #[error("no session found with id {0}")]
    NotFound(Uuid),
}

pub struct Session {
    pub runner: Arc<GameRunner>,
    pub event_bus: Arc<EventBus>,
    pub history: Arc<History>,
    pub created_at: DateTime<Utc>,
}

/// Owns every session this process is currently simulating. Cheap to
/// clone: internally an `Arc` around the map.
#[derive(Clone, Default)]
pub struct SessionRegistry {
    sessions: Arc<RwLock<HashMap<Uuid, Arc<Session>>>>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert(&self, session_id: Uuid, session: Session) {
        self.sessions.write().await.insert(session_id, Arc::new(session));
    }

    pub async fn get(&self, session_id: Uuid) -> Result<Arc<Session>, RegistryError> {
        self.sessions
            .read()
            .await
            .get(&session_id)
            .cloned()
            .ok_or(RegistryError::NotFound(session_id))
    }

    pub async fn remove(&self, session_id: Uuid) -> Result<Arc<Session>, RegistryError> {
        self.sessions
            .write()
            .await
            .remove(&session_id)
            .ok_or(RegistryError::NotFound(session_id))
    }

    pub async fn session_ids(&self) -> Vec<Uuid> {
        self.sessions.read().await.keys().copied().collect()
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::FallbackAgent;

    fn four_fallback_agents() -> Vec<Arc<dyn crate::agent::Agent>> {
        (0..4).map(|id| Arc::new(FallbackAgent::new(id)) as Arc<dyn crate::agent::Agent>).collect()
    }

    #[tokio::test]
    async fn insert_then_get_round_trips() {
        let registry = SessionRegistry::new();
        let id = Uuid::new_v4();
        let runner = Arc::new(GameRunner::new(four_fallback_agents(), Some(1), 1.0).unwrap());
        registry
            .insert(
                id,
                Session { runner, event_bus: Arc::new(EventBus::new()), history: Arc::new(History::new()), created_at: Utc::now() },
            )
            .await;
        assert!(registry.get(id).await.is_ok());
        assert_eq!(registry.len().await, 1);
    }

    #[tokio::test]
    async fn get_on_unknown_id_errors() {
        let registry = SessionRegistry::new();
        assert!(matches!(registry.get(Uuid::new_v4()).await, Err(RegistryError::NotFound(_))));
    }

    #[tokio::test]
    async fn remove_drops_the_session() {
        let registry = SessionRegistry::new();
        let id = Uuid::new_v4();
        let runner = Arc::new(GameRunner::new(four_fallback_agents(), Some(1), 1.0).unwrap());
        registry
            .insert(
                id,
                Session { runner, event_bus: Arc::new(EventBus::new()), history: Arc::new(History::new()), created_at: Utc::now() },
            )
            .await;
        registry.remove(id).await.unwrap();
        assert!(registry.is_empty().await);
    }
}
