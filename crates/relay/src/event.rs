//! Wire events exchanged with the browser client.
//!
//! Frames are JSON objects tagged by event name with the payload under
//! `data`, e.g. `{"event":"user_message","data":{"message":"..."}}`.
//! Connect and disconnect are transport-level and have no frame of their own.

use serde::{Deserialize, Serialize};

/// Events sent by the client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "snake_case")]
pub enum ClientEvent {
    /// A query for the assistant. A missing `message` is treated as empty text.
    UserMessage {
        #[serde(default)]
        message: String,
    },

    /// Discard the conversation but keep the connection open.
    EndSession,
}

/// Events emitted by the server.
///
/// Rejections and failures travel as ordinary `agent_response` frames; there
/// is no separate error event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "snake_case")]
pub enum ServerEvent {
    /// Acknowledges a new connection.
    Connected { message: String },

    /// The reply to a `user_message`.
    AgentResponse { message: String },

    /// Acknowledges `end_session`.
    SessionEnded { message: String },
}

impl ServerEvent {
    /// Wire name of this event.
    pub fn event_type(&self) -> &'static str {
        match self {
            Self::Connected { .. } => "connected",
            Self::AgentResponse { .. } => "agent_response",
            Self::SessionEnded { .. } => "session_ended",
        }
    }

    pub fn message(&self) -> &str {
        match self {
            Self::Connected { message }
            | Self::AgentResponse { message }
            | Self::SessionEnded { message } => message,
        }
    }
}
