//! Conversation memory injected into prompts.

use crate::session::Turn;

/// Ordered buffer of human/assistant exchanges.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConversationMemory {
    exchanges: Vec<(String, String)>,
}

impl ConversationMemory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild memory from the authoritative turn history.
    pub fn from_turns(turns: &[Turn]) -> Self {
        let mut memory = Self::new();
        for turn in turns {
            memory.append(&turn.human, &turn.assistant);
        }
        memory
    }

    /// Record one exchange.
    pub fn append(&mut self, human: &str, assistant: &str) {
        self.exchanges.push((human.to_string(), assistant.to_string()));
    }

    pub fn len(&self) -> usize {
        self.exchanges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.exchanges.is_empty()
    }

    /// Render every exchange, oldest first, as `Human:`/`AI:` lines.
    pub fn render(&self) -> String {
        self.exchanges
            .iter()
            .map(|(human, assistant)| format!("Human: {}\nAI: {}", human, assistant))
            .collect::<Vec<_>>()
            .join("\n")
    }
}
