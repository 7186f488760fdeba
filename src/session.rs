//! Conversation session state.
//!
//! A [`Session`] owns the ordered, append-only history of turns for one user.
//! It is passed explicitly into every call to
//! [`Orchestrator::process_turn`](crate::orchestrator::Orchestrator::process_turn).

use crate::extract::find_flight_number_in_history;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One human input and the assistant reply produced for it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Turn {
    /// The raw text the user submitted.
    pub human: String,
    /// The generated reply.
    pub assistant: String,
    /// When the reply was recorded.
    pub created_at: DateTime<Utc>,
}

impl Turn {
    /// Create a new turn stamped with the current time.
    pub fn new(human: impl Into<String>, assistant: impl Into<String>) -> Self {
        Self {
            human: human.into(),
            assistant: assistant.into(),
            created_at: Utc::now(),
        }
    }
}

/// Per-user conversation state.
#[derive(Debug, Clone)]
pub struct Session {
    id: Uuid,
    started_at: DateTime<Utc>,
    turns: Vec<Turn>,
}

impl Session {
    /// Start an empty session.
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4(),
            started_at: Utc::now(),
            turns: Vec::new(),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    /// Turns recorded so far, oldest first.
    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    /// Append a completed turn.
    pub fn record(&mut self, turn: Turn) {
        self.turns.push(turn);
    }

    /// Recover a flight number mentioned earlier in the conversation.
    pub fn recall_flight_number(&self) -> Option<&str> {
        find_flight_number_in_history(&self.turns)
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}
