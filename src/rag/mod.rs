//! Retrieval-augmented generation over the current flight's facts.
//!
//! - [`KnowledgeBase`] embeds fact sentences into a named collection and
//!   retrieves the closest ones for a query.
//! - [`ConversationMemory`] renders prior turns for the prompt.
//! - [`ResponseGenerator`] fills the prompt template and calls the model.

pub mod context;
pub mod memory;
mod response;

pub use context::{KnowledgeBase, RebuildSummary, Retrieval, NO_RESULTS};
pub use memory::ConversationMemory;
pub use response::ResponseGenerator;
