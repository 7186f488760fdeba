//! Interactive chat command.

use crate::cli::{preflight, Output};
use crate::config::Settings;
use crate::error::Result;
use crate::orchestrator::{FlightLookup, Orchestrator};
use crate::session::Session;
use console::style;
use std::io::{self, BufRead, Write};
use tracing::debug;

/// Run the interactive chat command.
pub async fn run_chat(settings: Settings) -> Result<()> {
    if let Err(e) = preflight::check(&settings) {
        Output::error(&format!("{}", e));
        Output::info("Run 'flypal doctor' for detailed diagnostics.");
        return Err(e);
    }

    let orchestrator = Orchestrator::new(settings)?;
    let mut session = Session::new();

    println!("\n{}", style("FlyPal - Real time flight updates at your fingertips").bold().cyan());
    println!(
        "{}\n",
        style("Ask about a flight by its number, or 'exit' to quit. Use 'clear' to reset conversation.").dim()
    );

    let stdin = io::stdin();
    let mut stdout = io::stdout();

    loop {
        print!("{} ", style("You:").green().bold());
        stdout.flush()?;

        let mut input = String::new();
        if stdin.lock().read_line(&mut input)? == 0 {
            // EOF
            println!();
            break;
        }

        let input = input.trim();

        if input.is_empty() {
            continue;
        }

        if input.eq_ignore_ascii_case("exit") || input.eq_ignore_ascii_case("quit") {
            Output::info("Goodbye!");
            break;
        }

        if input.eq_ignore_ascii_case("clear") {
            session = Session::new();
            Output::info("Conversation history cleared.");
            continue;
        }

        if let Some(flight) = crate::extract::extract_flight_number(input) {
            Output::info(&format!("Flight number detected: {}", flight));
        }

        let spinner = Output::spinner("Thinking...");
        let result = orchestrator.process_turn(&mut session, input).await;
        spinner.finish_and_clear();

        match result {
            Ok(outcome) => {
                if let Some(FlightLookup::Recalled(flight)) = &outcome.flight {
                    debug!("Answering about {} from earlier in the conversation", flight);
                }
                Output::turn_status(&outcome);
                println!("\n{} {}\n", style("FlyPal:").cyan().bold(), outcome.reply);
            }
            Err(e) => {
                Output::error(&format!("Error: {}", e));
            }
        }
    }

    Ok(())
}
