//! Per-turn pipeline orchestrator for FlyPal.
//!
//! Coordinates a conversation turn from flight number detection through
//! telemetry refresh, retrieval and reply generation.

use crate::config::{Prompts, Settings};
use crate::embedding::{create_embedder, Embedder};
use crate::error::{FlypalError, Result};
use crate::extract::extract_flight_number;
use crate::llm::{create_language_model, LanguageModel};
use crate::rag::{ConversationMemory, KnowledgeBase, RebuildSummary, ResponseGenerator, Retrieval};
use crate::session::{Session, Turn};
use crate::synthesis::synthesize;
use crate::telemetry::{AdsbClient, FlightDataSource};
use crate::vector_store::{create_store, VectorStore};
use std::sync::Arc;
use tracing::{debug, info, instrument};

/// The main orchestrator for the FlyPal pipeline.
pub struct Orchestrator {
    telemetry: Arc<dyn FlightDataSource>,
    knowledge: KnowledgeBase,
    generator: ResponseGenerator,
}

impl Orchestrator {
    /// Create a new orchestrator from settings.
    pub fn new(settings: Settings) -> Result<Self> {
        let prompts = Prompts::load(
            settings.prompts.custom_dir.as_deref(),
            Some(&settings.prompts.variables),
        )?;

        let telemetry: Arc<dyn FlightDataSource> = Arc::new(AdsbClient::new(
            &settings.telemetry.base_url,
            settings.request_timeout(),
        )?);
        let embedder = create_embedder(&settings)?;
        let llm = create_language_model(&settings)?;
        let vector_store = create_store(&settings)?;

        info!(
            "Using {} embeddings ({}) and {} replies ({})",
            settings.embedding.provider, settings.embedding.model, settings.llm.provider, settings.llm.model
        );

        Ok(Self::with_components(
            &settings,
            prompts,
            telemetry,
            embedder,
            llm,
            vector_store,
        ))
    }

    /// Create an orchestrator with custom components.
    pub fn with_components(
        settings: &Settings,
        prompts: Prompts,
        telemetry: Arc<dyn FlightDataSource>,
        embedder: Arc<dyn Embedder>,
        llm: Arc<dyn LanguageModel>,
        vector_store: Arc<dyn VectorStore>,
    ) -> Self {
        let knowledge = KnowledgeBase::new(vector_store, embedder, &settings.vector_store.collection)
            .with_top_k(settings.vector_store.top_k);
        let generator = ResponseGenerator::new(llm).with_prompts(prompts);

        Self {
            telemetry,
            knowledge,
            generator,
        }
    }

    /// Fetch fresh telemetry for a callsign and replace the stored facts with it.
    #[instrument(skip(self))]
    pub async fn refresh_flight(&self, callsign: &str) -> Result<RefreshSummary> {
        info!("Fetching flight data...");
        let telemetry = self.telemetry.fetch(callsign).await?;

        let sentences = synthesize(&telemetry);
        debug!("Flight data: {:?}", sentences);

        let facts = self.knowledge.rebuild(&sentences).await?;

        Ok(RefreshSummary {
            callsign: callsign.to_string(),
            aircraft: telemetry.aircraft_count(),
            facts,
        })
    }

    /// Run one conversation turn and record it in the session.
    ///
    /// A failure at any step aborts the turn and leaves the session untouched.
    #[instrument(skip(self, session, input), fields(session = %session.id(), turn = session.turns().len() + 1))]
    pub async fn process_turn(&self, session: &mut Session, input: &str) -> Result<TurnOutcome> {
        if input.trim().is_empty() {
            return Err(FlypalError::InvalidInput("message is empty".to_string()));
        }

        let memory = ConversationMemory::from_turns(session.turns());

        let (flight, refresh) = match extract_flight_number(input) {
            Some(detected) => {
                info!("Flight number detected: {}", detected);
                let refresh = self.refresh_flight(detected).await?;
                (Some(FlightLookup::Detected(detected.to_string())), Some(refresh))
            }
            None => {
                let recalled = session
                    .recall_flight_number()
                    .map(|f| FlightLookup::Recalled(f.to_string()));
                if let Some(flight) = &recalled {
                    info!("Using flight number from history: {}", flight.flight_number());
                }
                (recalled, None)
            }
        };

        let retrieval = self
            .knowledge
            .query(input, flight.as_ref().map(FlightLookup::flight_number))
            .await?;
        debug!("Data retrieved: {:?}", retrieval);

        let prompt_input = match retrieval.facts() {
            Some(facts) => self.generator.with_context(&facts, input),
            None => input.to_string(),
        };

        let reply = self.generator.generate(&prompt_input, &memory).await?;
        session.record(Turn::new(input, reply.as_str()));

        Ok(TurnOutcome {
            reply,
            flight,
            refresh,
            retrieval,
            prompt_input,
        })
    }
}

/// How the flight number for a turn was obtained.
#[derive(Debug, Clone, PartialEq)]
pub enum FlightLookup {
    /// Found in the current message; telemetry was refreshed.
    Detected(String),
    /// Recovered from an earlier message in the session.
    Recalled(String),
}

impl FlightLookup {
    pub fn flight_number(&self) -> &str {
        match self {
            FlightLookup::Detected(f) | FlightLookup::Recalled(f) => f,
        }
    }
}

/// Result of refreshing a flight's facts.
#[derive(Debug, Clone, PartialEq)]
pub struct RefreshSummary {
    /// Callsign that was looked up.
    pub callsign: String,
    /// Aircraft entries in the telemetry response.
    pub aircraft: usize,
    /// What ended up in the knowledge base.
    pub facts: RebuildSummary,
}

/// Everything a surface needs to present a completed turn.
#[derive(Debug, Clone)]
pub struct TurnOutcome {
    /// The generated reply.
    pub reply: String,
    /// The flight number used for retrieval, if any.
    pub flight: Option<FlightLookup>,
    /// Present when this turn fetched new telemetry.
    pub refresh: Option<RefreshSummary>,
    /// What the knowledge base returned.
    pub retrieval: Retrieval,
    /// The text given to the generator, including any retrieved context.
    pub prompt_input: String,
}
