//! Session Hub
//!
//! Registry of connected dashboard sessions. Holds each session's outbound
//! channel and active tab; the controller state itself stays with the
//! session's receive task.

use serde::Serialize;
use std::collections::HashMap;
use thiserror::Error;
use tokio::sync::{mpsc, RwLock};
use uuid::Uuid;

use super::messages::ServerMessage;
use crate::dashboard::Tab;

/// Unique identifier for a dashboard session
pub type SessionId = String;

/// Configuration for the session hub
#[derive(Debug, Clone)]
pub struct HubConfig {
    /// Maximum number of concurrent sessions
    pub max_sessions: usize,
}

impl Default for HubConfig {
    fn default() -> Self {
        Self {
            max_sessions: 1000,
        }
    }
}

/// Handle for sending messages to a specific session
pub struct SessionHandle {
    /// Channel sender for this session
    pub sender: mpsc::UnboundedSender<ServerMessage>,
    /// Tab the session currently shows
    pub tab: Tab,
}

/// Number of sessions per active tab
#[derive(Debug, Clone, Default, Serialize, PartialEq, Eq)]
pub struct TabCounts {
    pub state_positive: usize,
    pub us_state_map: usize,
}

/// Manages all dashboard sessions
pub struct SessionHub {
    sessions: RwLock<HashMap<SessionId, SessionHandle>>,
    config: HubConfig,
}

impl SessionHub {
    /// Create a new session hub
    pub fn new(config: HubConfig) -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            config,
        }
    }

    /// Register a new session
    ///
    /// Returns the session ID on success, or an error if the session limit
    /// has been reached. New sessions start on the line chart tab.
    pub async fn register(
        &self,
        sender: mpsc::UnboundedSender<ServerMessage>,
    ) -> Result<SessionId, HubError> {
        let mut sessions = self.sessions.write().await;
        if sessions.len() >= self.config.max_sessions {
            return Err(HubError::TooManySessions(self.config.max_sessions));
        }

        let id = Uuid::new_v4().to_string();
        sessions.insert(
            id.clone(),
            SessionHandle {
                sender,
                tab: Tab::StatePositive,
            },
        );

        tracing::info!(session_id = %id, sessions = sessions.len(), "Session connected");
        Ok(id)
    }

    /// Unregister a session
    pub async fn unregister(&self, id: &str) {
        let removed = self.sessions.write().await.remove(id);
        if removed.is_some() {
            tracing::info!(session_id = %id, "Session disconnected");
        }
    }

    /// Record the tab a session switched to
    pub async fn set_tab(&self, id: &str, tab: Tab) -> Result<(), HubError> {
        let mut sessions = self.sessions.write().await;
        let handle = sessions.get_mut(id).ok_or(HubError::SessionNotFound)?;
        handle.tab = tab;
        Ok(())
    }

    /// Send a message directly to a specific session
    pub async fn send_to(&self, id: &str, message: ServerMessage) -> Result<(), HubError> {
        let sessions = self.sessions.read().await;
        let handle = sessions.get(id).ok_or(HubError::SessionNotFound)?;

        handle
            .sender
            .send(message)
            .map_err(|_| HubError::SendFailed)
    }

    /// Get the current session count
    pub async fn session_count(&self) -> usize {
        self.sessions.read().await.len()
    }

    /// Count sessions by active tab
    pub async fn tab_counts(&self) -> TabCounts {
        let sessions = self.sessions.read().await;
        let mut counts = TabCounts::default();
        for handle in sessions.values() {
            match handle.tab {
                Tab::StatePositive => counts.state_positive += 1,
                Tab::UsStateMap => counts.us_state_map += 1,
            }
        }
        counts
    }
}

/// Errors that can occur in the session hub
#[derive(Debug, Error)]
pub enum HubError {
    #[error("Too many sessions (limit: {0})")]
    TooManySessions(usize),

    #[error("Session not found")]
    SessionNotFound,

    #[error("Failed to send message")]
    SendFailed,
}
