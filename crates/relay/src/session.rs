//! Per-connection session state and the store that tracks live connections.

use realtychat_core::history::{History, Turn};
use realtychat_core::message::ConnectionId;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};
use tracing::debug;

/// Lifecycle of one connection's conversation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum SessionState {
    /// Not connected yet, or the session was ended.
    #[default]
    NoSession,
    /// Live conversation.
    Active(History),
}

/// The conversation state of a single connection.
///
/// Owned by the connection handler and passed explicitly to every relay call.
#[derive(Debug, Clone)]
pub struct ConnectionSession {
    id: ConnectionId,
    state: SessionState,
}

impl ConnectionSession {
    pub fn new(id: ConnectionId) -> Self {
        Self {
            id,
            state: SessionState::NoSession,
        }
    }

    pub fn id(&self) -> &ConnectionId {
        &self.id
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn is_active(&self) -> bool {
        matches!(self.state, SessionState::Active(_))
    }

    /// Begin a fresh conversation, discarding any previous one.
    pub fn start(&mut self) {
        self.state = SessionState::Active(History::new());
    }

    /// Drop the conversation. The session stays usable; the next message
    /// starts a new history.
    pub fn end(&mut self) {
        self.state = SessionState::NoSession;
    }

    pub fn history(&self) -> Option<&History> {
        match &self.state {
            SessionState::Active(history) => Some(history),
            SessionState::NoSession => None,
        }
    }

    /// Append a completed turn, starting a session first if there is none.
    pub fn record(&mut self, turn: Turn) {
        match &mut self.state {
            SessionState::Active(history) => history.push(turn),
            SessionState::NoSession => {
                let mut history = History::new();
                history.push(turn);
                self.state = SessionState::Active(history);
            }
        }
    }

    /// Number of recorded turns (0 when there is no session).
    pub fn turn_count(&self) -> usize {
        self.history().map_or(0, History::len)
    }
}

/// Shared handle to one connection's session.
///
/// The mutex serializes event handling for that connection.
pub type SessionHandle = Arc<Mutex<ConnectionSession>>;

/// In-memory registry of live connections, keyed by connection identity.
#[derive(Default)]
pub struct SessionStore {
    sessions: RwLock<HashMap<ConnectionId, SessionHandle>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a connection and return its session handle.
    ///
    /// Re-opening an id replaces the old session.
    pub async fn open(&self, id: ConnectionId) -> SessionHandle {
        let handle = Arc::new(Mutex::new(ConnectionSession::new(id.clone())));
        self.sessions.write().await.insert(id.clone(), handle.clone());
        debug!(connection_id = %id, "Session registered");
        handle
    }

    pub async fn get(&self, id: &ConnectionId) -> Option<SessionHandle> {
        self.sessions.read().await.get(id).cloned()
    }

    /// Forget a connection, returning its session if it was registered.
    pub async fn close(&self, id: &ConnectionId) -> Option<SessionHandle> {
        let removed = self.sessions.write().await.remove(id);
        if removed.is_some() {
            debug!(connection_id = %id, "Session removed");
        }
        removed
    }

    /// Number of live connections.
    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }
}
