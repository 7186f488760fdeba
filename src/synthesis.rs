//! Conversion of flight telemetry into natural-language fact sentences.
//!
//! Every aircraft record produces the same fifteen sentences in the same
//! order. Missing values are written as `NA` so the count never varies.

use crate::telemetry::{MalformedTelemetry, TelemetryRecord, TelemetryResponse};
use tracing::{debug, warn};

/// Number of sentences produced for a well-formed response.
pub const FACT_COUNT: usize = 15;

/// Placeholder for fields the telemetry did not report.
pub const MISSING: &str = "NA";

/// Convert a telemetry response into fact sentences.
///
/// Never fails: a malformed response is logged and yields no sentences.
pub fn synthesize(response: &TelemetryResponse) -> Vec<String> {
    match try_synthesize(response) {
        Ok(sentences) => {
            debug!("Synthesized {} fact sentences", sentences.len());
            sentences
        }
        Err(e) => {
            warn!("An error occurred while converting data to sentences: {}", e);
            Vec::new()
        }
    }
}

fn try_synthesize(response: &TelemetryResponse) -> Result<Vec<String>, MalformedTelemetry> {
    let record = response.first_aircraft()?;
    Ok(sentences_for(&record))
}

fn sentences_for(record: &TelemetryRecord) -> Vec<String> {
    let get = |key: &str| record.field(key).unwrap_or_else(|| MISSING.to_string());
    let flight = record.callsign().unwrap_or_else(|| MISSING.to_string());

    vec![
        format!("The flight number {} has aircraft registration {}.", flight, get("r")),
        format!("The aircraft for flight number {} is a {}.", flight, get("desc")),
        format!("Flight number {} is operated by {}.", flight, get("ownOp")),
        format!("Flight number {} was manufactured in the year {}.", flight, get("year")),
        format!(
            "Flight number {} is currently at a barometric altitude of {} feet.",
            flight,
            get("alt_baro")
        ),
        format!(
            "Flight number {} is currently at a geometric altitude of {} feet.",
            flight,
            get("alt_geom")
        ),
        format!("Flight number {} has a ground speed of {} knots.", flight, get("gs")),
        format!("Flight number {} is heading {} degrees.", flight, get("track")),
        format!(
            "Flight number {} is descending at a rate of {} feet per minute.",
            flight,
            get("baro_rate")
        ),
        format!("Flight number {} has a squawk code of {}.", flight, get("squawk")),
        format!("Flight number {} has no emergency indications.", flight),
        format!("Flight number {} belongs to category {}.", flight, get("category")),
        format!(
            "The latitude and longitude coordinates for flight number {} are {} and {}, respectively.",
            flight,
            get("lat"),
            get("lon")
        ),
        format!("Flight number {} was last seen {} seconds ago.", flight, get("seen")),
        format!("The RSSI for flight number {} is {} dB.", flight, get("rssi")),
    ]
}
