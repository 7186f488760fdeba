//! Facts command - show the sentences FlyPal indexes for a flight.

use crate::cli::Output;
use crate::config::Settings;
use crate::telemetry::{AdsbClient, FlightDataSource};
use crate::synthesis::synthesize;
use anyhow::Result;

/// Fetch telemetry for a callsign and print the synthesized facts.
pub async fn run_facts(callsign: &str, raw: bool, settings: Settings) -> Result<()> {
    let client = AdsbClient::new(&settings.telemetry.base_url, settings.request_timeout())?;

    let spinner = Output::spinner(&format!("Fetching flight data for {}...", callsign));
    let telemetry = client.fetch(callsign).await;
    spinner.finish_and_clear();

    let telemetry = match telemetry {
        Ok(t) => t,
        Err(e) => {
            Output::error(&format!("Failed to fetch flight data: {}", e));
            return Err(e.into());
        }
    };

    if raw {
        Output::header("Telemetry");
        println!("{}", serde_json::to_string_pretty(telemetry.as_value())?);
    }

    let sentences = synthesize(&telemetry);

    Output::header(&format!("Flight data for {}", callsign));
    Output::kv("Aircraft reporting", &telemetry.aircraft_count().to_string());
    println!();

    if sentences.is_empty() {
        Output::warning("The telemetry response could not be read.");
        return Ok(());
    }

    if telemetry.aircraft_count() == 0 {
        Output::warning(&format!("No aircraft currently reporting as {}.", callsign));
    }

    for sentence in &sentences {
        Output::list_item(sentence);
    }

    Ok(())
}
