//! Conversation history for a single connection.
//!
//! A [`History`] is an append-only list of completed [`Turn`]s. Storage is
//! unbounded for the life of the connection, but prompts only ever read the
//! tail through [`History::recent_turns`].

use serde::{Deserialize, Serialize};

use crate::message::Message;

/// One completed exchange: the raw user text and the reply sent back.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Turn {
    user: String,
    agent: String,
}

impl Turn {
    pub fn new(user: impl Into<String>, agent: impl Into<String>) -> Self {
        Self {
            user: user.into(),
            agent: agent.into(),
        }
    }

    pub fn user(&self) -> &str {
        &self.user
    }

    pub fn agent(&self) -> &str {
        &self.agent
    }

    /// The two model messages this turn contributes, user first.
    pub fn to_messages(&self) -> [Message; 2] {
        [Message::user(&self.user), Message::assistant(&self.agent)]
    }
}

/// Ordered turns of one session. Insertion order is chronological order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct History {
    turns: Vec<Turn>,
}

impl History {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, turn: Turn) {
        self.turns.push(turn);
    }

    /// The last `limit` turns, oldest first. Shorter histories are returned whole.
    pub fn recent_turns(&self, limit: usize) -> &[Turn] {
        let start = self.turns.len().saturating_sub(limit);
        &self.turns[start..]
    }

    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }
}
