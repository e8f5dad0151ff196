// =============================================================================
// Session Store — one score history per dashboard session
// =============================================================================
//
// Each session exclusively owns its ScoreHistory; the store only hands out
// mutable access for the duration of a single synchronous computation.
// =============================================================================

use std::collections::HashMap;

use chrono::{DateTime, Duration, Utc};
use parking_lot::RwLock;
use serde::Serialize;
use tracing::{debug, info};
use uuid::Uuid;

use crate::signals::ScoreHistory;

#[derive(Debug, Clone)]
pub struct Session {
    pub id: Uuid,
    pub history: ScoreHistory,
    pub created_at: DateTime<Utc>,
    pub last_active: DateTime<Utc>,
    pub computations: u64,
}

impl Session {
    fn new(at: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            history: ScoreHistory::Empty,
            created_at: at,
            last_active: at,
            computations: 0,
        }
    }

    pub fn info(&self) -> SessionInfo {
        SessionInfo {
            session_id: self.id,
            created_at: self.created_at.to_rfc3339(),
            last_active: self.last_active.to_rfc3339(),
            computations: self.computations,
            history: self.history,
        }
    }
}

/// Serialisable view of a session.
#[derive(Debug, Clone, Serialize)]
pub struct SessionInfo {
    pub session_id: Uuid,
    pub created_at: String,
    pub last_active: String,
    pub computations: u64,
    pub history: ScoreHistory,
}

#[derive(Default)]
pub struct SessionStore {
    sessions: RwLock<HashMap<Uuid, Session>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn create(&self) -> SessionInfo {
        let session = Session::new(Utc::now());
        let info = session.info();
        self.sessions.write().insert(session.id, session);
        debug!(session_id = %info.session_id, "session created");
        info
    }

    pub fn get(&self, id: &Uuid) -> Option<SessionInfo> {
        self.sessions.read().get(id).map(Session::info)
    }

    pub fn remove(&self, id: &Uuid) -> bool {
        let removed = self.sessions.write().remove(id).is_some();
        if removed {
            debug!(session_id = %id, "session removed");
        }
        removed
    }

    pub fn len(&self) -> usize {
        self.sessions.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.read().is_empty()
    }

    /// Run `f` against the session's history and record the activity.
    /// Returns `None` if the session does not exist.
    pub fn with_history<T>(&self, id: &Uuid, f: impl FnOnce(&mut ScoreHistory) -> T) -> Option<T> {
        let mut sessions = self.sessions.write();
        let session = sessions.get_mut(id)?;
        let out = f(&mut session.history);
        session.last_active = Utc::now();
        session.computations += 1;
        Some(out)
    }

    /// Drop sessions idle for longer than `max_idle`. Returns how many went.
    pub fn prune_idle(&self, max_idle: Duration) -> usize {
        self.prune_idle_at(max_idle, Utc::now())
    }

    fn prune_idle_at(&self, max_idle: Duration, now: DateTime<Utc>) -> usize {
        let mut sessions = self.sessions.write();
        let before = sessions.len();
        sessions.retain(|_, s| now - s.last_active <= max_idle);
        let pruned = before - sessions.len();
        if pruned > 0 {
            info!(pruned, remaining = sessions.len(), "idle sessions pruned");
        }
        pruned
    }
}
