//! FlyPal - Real-time flight updates at your fingertips
//!
//! A conversational assistant that answers questions about flights using live
//! ADS-B telemetry and retrieval-augmented generation.
//!
//! # Overview
//!
//! Each conversation turn:
//! - Detects a flight number in the user's message (or recalls one from earlier turns)
//! - Fetches live telemetry for that flight and turns it into fact sentences
//! - Embeds the facts into a single, replaceable vector collection
//! - Retrieves the fact closest to the question
//! - Asks a language model for a reply using the fact and the conversation so far
//!
//! # Architecture
//!
//! - `config` - Settings and prompt templates
//! - `extract` - Flight number detection
//! - `telemetry` - Flight telemetry sources
//! - `synthesis` - Telemetry to fact sentences
//! - `embedding` - Embedding generation
//! - `llm` - Language model backends
//! - `vector_store` - Vector database abstraction
//! - `rag` - Knowledge base, conversation memory and reply generation
//! - `session` - Conversation state
//! - `orchestrator` - Per-turn pipeline
//!
//! # Example
//!
//! ```rust,no_run
//! use flypal::config::Settings;
//! use flypal::orchestrator::Orchestrator;
//! use flypal::session::Session;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let settings = Settings::load()?;
//!     let orchestrator = Orchestrator::new(settings)?;
//!     let mut session = Session::new();
//!
//!     let outcome = orchestrator.process_turn(&mut session, "Where is AA123 now?").await?;
//!     println!("{}", outcome.reply);
//!
//!     Ok(())
//! }
//! ```

pub mod cli;
pub mod config;
pub mod embedding;
pub mod error;
pub mod extract;
pub mod llm;
pub mod ollama;
pub mod openai;
pub mod orchestrator;
pub mod rag;
pub mod session;
pub mod synthesis;
pub mod telemetry;
pub mod vector_store;

pub use error::{FlypalError, Result};
