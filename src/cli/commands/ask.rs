//! Ask command implementation.

use crate::cli::{preflight, Output};
use crate::config::Settings;
use crate::orchestrator::Orchestrator;
use crate::session::Session;
use anyhow::Result;

/// Run the ask command.
pub async fn run_ask(question: &str, settings: Settings) -> Result<()> {
    if let Err(e) = preflight::check(&settings) {
        Output::error(&format!("{}", e));
        Output::info("Run 'flypal doctor' for detailed diagnostics.");
        return Err(e.into());
    }

    let orchestrator = Orchestrator::new(settings)?;
    let mut session = Session::new();

    let spinner = Output::spinner("Looking up flight data...");

    match orchestrator.process_turn(&mut session, question).await {
        Ok(outcome) => {
            spinner.finish_and_clear();
            Output::turn_status(&outcome);
            println!("\n{}\n", outcome.reply);

            if let Some(facts) = outcome.retrieval.facts() {
                Output::header("Flight data");
                Output::list_item(&facts);
            }
        }
        Err(e) => {
            spinner.finish_and_clear();
            Output::error(&format!("Failed to generate answer: {}", e));
            return Err(e.into());
        }
    }

    Ok(())
}
