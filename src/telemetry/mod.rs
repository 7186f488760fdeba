//! Live flight telemetry.
//!
//! Provides a trait-based interface for telemetry sources and the types used
//! to carry their responses through the pipeline.

mod adsb;

pub use adsb::AdsbClient;

use crate::error::Result;
use async_trait::async_trait;
use serde_json::{Map, Value};
use thiserror::Error;

/// Trait for flight telemetry sources.
#[async_trait]
pub trait FlightDataSource: Send + Sync {
    /// Fetch the current telemetry for a callsign.
    async fn fetch(&self, callsign: &str) -> Result<TelemetryResponse>;
}

/// Raised when a telemetry body does not have the expected shape.
#[derive(Error, Debug)]
#[error("Malformed telemetry: {0}")]
pub struct MalformedTelemetry(String);

/// Parsed body of a telemetry API response.
///
/// Kept as raw JSON; the expected shape is an object whose `ac` field is an
/// array of aircraft objects.
#[derive(Debug, Clone, PartialEq)]
pub struct TelemetryResponse(Value);

impl TelemetryResponse {
    pub fn new(body: Value) -> Self {
        Self(body)
    }

    /// The raw JSON body.
    pub fn as_value(&self) -> &Value {
        &self.0
    }

    /// Number of aircraft entries, or zero when `ac` is absent or not an array.
    pub fn aircraft_count(&self) -> usize {
        self.0
            .get("ac")
            .and_then(Value::as_array)
            .map_or(0, Vec::len)
    }

    /// The first aircraft entry, or an empty record when there is none.
    pub fn first_aircraft(&self) -> std::result::Result<TelemetryRecord, MalformedTelemetry> {
        let body = self
            .0
            .as_object()
            .ok_or_else(|| MalformedTelemetry("response body is not an object".to_string()))?;

        let aircraft = match body.get("ac") {
            None | Some(Value::Null) => return Ok(TelemetryRecord::default()),
            Some(Value::Array(entries)) => entries,
            Some(_) => return Err(MalformedTelemetry("`ac` is not an array".to_string())),
        };

        match aircraft.first() {
            None => Ok(TelemetryRecord::default()),
            Some(Value::Object(fields)) => Ok(TelemetryRecord {
                fields: fields.clone(),
            }),
            Some(_) => Err(MalformedTelemetry(
                "first aircraft entry is not an object".to_string(),
            )),
        }
    }
}

/// Field map for a single aircraft.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TelemetryRecord {
    fields: Map<String, Value>,
}

impl TelemetryRecord {
    /// Render a field for display. Absent and null fields yield None.
    pub fn field(&self, key: &str) -> Option<String> {
        match self.fields.get(key)? {
            Value::Null => None,
            Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }

    /// The aircraft's callsign with the API's padding removed.
    pub fn callsign(&self) -> Option<String> {
        self.field("flight").map(|f| f.trim().to_string())
    }
}
