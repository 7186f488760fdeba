//! HTTP API server exposing a FlyPal chat session.
//!
//! The server holds one shared session, so turns are processed one at a time.

use crate::cli::{preflight, Output};
use crate::config::Settings;
use crate::error::FlypalError;
use crate::orchestrator::{Orchestrator, TurnOutcome};
use crate::session::{Session, Turn};
use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::Mutex;
use tower_http::cors::{Any, CorsLayer};
use tracing::error;

/// Shared application state.
struct AppState {
    orchestrator: Orchestrator,
    session: Mutex<Session>,
}

/// Run the HTTP API server.
pub async fn run_serve(host: &str, port: u16, settings: Settings) -> anyhow::Result<()> {
    if let Err(e) = preflight::check(&settings) {
        Output::error(&format!("{}", e));
        Output::info("Run 'flypal doctor' for detailed diagnostics.");
        return Err(e.into());
    }

    let state = Arc::new(AppState {
        orchestrator: Orchestrator::new(settings)?,
        session: Mutex::new(Session::new()),
    });

    let addr = format!("{}:{}", host, port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    Output::header("FlyPal API Server");
    println!();
    Output::success(&format!("Listening on http://{}", addr));
    println!();
    println!("Endpoints:");
    Output::kv("Health", "GET    /health");
    Output::kv("Chat", "POST   /chat");
    Output::kv("History", "GET    /history");
    Output::kv("Reset", "DELETE /history");
    println!();
    Output::info("Press Ctrl+C to stop the server.");

    axum::serve(listener, router(state)).await?;

    Ok(())
}

fn router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health))
        .route("/chat", post(chat))
        .route("/history", get(history).delete(reset_history))
        .layer(cors)
        .with_state(state)
}

// === Request/Response Types ===

#[derive(Deserialize)]
struct ChatRequest {
    message: String,
}

#[derive(Serialize)]
struct ChatResponse {
    reply: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    flight: Option<String>,
    /// The fact handed to the model, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    retrieved: Option<String>,
    /// Facts indexed by this turn; present only when telemetry was refreshed.
    #[serde(skip_serializing_if = "Option::is_none")]
    facts_indexed: Option<usize>,
}

impl From<TurnOutcome> for ChatResponse {
    fn from(outcome: TurnOutcome) -> Self {
        Self {
            flight: outcome.flight.as_ref().map(|f| f.flight_number().to_string()),
            retrieved: outcome.retrieval.facts(),
            facts_indexed: outcome.refresh.as_ref().map(|r| r.facts.indexed),
            reply: outcome.reply,
        }
    }
}

#[derive(Serialize)]
struct HistoryResponse {
    session_id: String,
    turns: Vec<Turn>,
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

// === Handlers ===

async fn health() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}

async fn chat(State(state): State<Arc<AppState>>, Json(req): Json<ChatRequest>) -> impl IntoResponse {
    let mut session = state.session.lock().await;

    match state.orchestrator.process_turn(&mut session, &req.message).await {
        Ok(outcome) => Json(ChatResponse::from(outcome)).into_response(),
        Err(e) => {
            let status = match e {
                FlypalError::InvalidInput(_) => StatusCode::BAD_REQUEST,
                _ => {
                    error!("Turn failed: {}", e);
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            };
            (status, Json(ErrorResponse { error: e.to_string() })).into_response()
        }
    }
}

async fn history(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let session = state.session.lock().await;
    Json(HistoryResponse {
        session_id: session.id().to_string(),
        turns: session.turns().to_vec(),
    })
}

async fn reset_history(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    *state.session.lock().await = Session::new();
    StatusCode::NO_CONTENT
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rag::{RebuildSummary, Retrieval};
    use crate::orchestrator::{FlightLookup, RefreshSummary};

    #[test]
    fn test_chat_response_from_refreshing_turn() {
        let outcome = TurnOutcome {
            reply: "AA123 is at 35000 feet.".to_string(),
            flight: Some(FlightLookup::Detected("AA123".to_string())),
            refresh: Some(RefreshSummary {
                callsign: "AA123".to_string(),
                aircraft: 1,
                facts: RebuildSummary {
                    sentences: 15,
                    indexed: 15,
                    skipped: 0,
                },
            }),
            retrieval: Retrieval::Found(vec!["The altitude of the aircraft is 35000 feet.".to_string()]),
            prompt_input: String::new(),
        };

        let response = ChatResponse::from(outcome);
        assert_eq!(response.flight.as_deref(), Some("AA123"));
        assert_eq!(response.facts_indexed, Some(15));
        assert_eq!(
            response.retrieved.as_deref(),
            Some("The altitude of the aircraft is 35000 feet.")
        );
    }

    #[test]
    fn test_chat_response_without_flight() {
        let outcome = TurnOutcome {
            reply: "Hello!".to_string(),
            flight: None,
            refresh: None,
            retrieval: Retrieval::Skipped,
            prompt_input: "hello".to_string(),
        };

        let json = serde_json::to_value(ChatResponse::from(outcome)).unwrap();
        assert_eq!(json, serde_json::json!({ "reply": "Hello!" }));
    }
}
