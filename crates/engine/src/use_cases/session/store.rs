//! In-memory registry of running games.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;
use uuid::Uuid;

use super::game_session::{GameSession, SessionDeps};
use super::SessionError;

/// All live sessions, keyed by id.
pub struct SessionStore {
    sessions: DashMap<Uuid, Arc<GameSession>>,
    deps: SessionDeps,
}

impl SessionStore {
    pub fn new(deps: SessionDeps) -> Self {
        Self {
            sessions: DashMap::new(),
            deps,
        }
    }

    /// Start a new game.
    pub fn create(&self) -> Arc<GameSession> {
        let id = Uuid::new_v4();
        let session = GameSession::new(id, self.deps.clone());
        self.sessions.insert(id, Arc::clone(&session));
        tracing::info!(session_id = %id, active = self.sessions.len(), "Session created");
        session
    }

    pub fn get(&self, id: Uuid) -> Result<Arc<GameSession>, SessionError> {
        self.sessions
            .get(&id)
            .map(|entry| Arc::clone(entry.value()))
            .ok_or(SessionError::NotFound(id))
    }

    /// Remove a session and stop its autonomous driver.
    pub fn remove(&self, id: Uuid) -> Result<(), SessionError> {
        let (_, session) = self.sessions.remove(&id).ok_or(SessionError::NotFound(id))?;
        session.shutdown();
        tracing::info!(session_id = %id, "Session removed");
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    /// Drop sessions idle for longer than `ttl` as of `now`.
    ///
    /// Returns the number of sessions removed.
    pub fn prune_idle(&self, now: DateTime<Utc>, ttl: Duration) -> usize {
        let cutoff = now - ttl;
        let before = self.sessions.len();

        self.sessions.retain(|id, session| {
            let keep = session.last_activity() >= cutoff;
            if !keep {
                session.shutdown();
                tracing::debug!(session_id = %id, "Pruning idle session");
            }
            keep
        });

        let pruned = before.saturating_sub(self.sessions.len());
        if pruned > 0 {
            tracing::info!(pruned, active = self.sessions.len(), "Pruned idle sessions");
        }
        pruned
    }
}
