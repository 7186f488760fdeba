//! ADS-B Exchange compatible telemetry client (opendata.adsb.fi).

use super::{FlightDataSource, TelemetryResponse};
use crate::error::{FlypalError, Result};
use async_trait::async_trait;
use std::time::Duration;
use tracing::{debug, info, instrument};
use url::Url;

/// HTTP client for the ADS-B callsign endpoint.
pub struct AdsbClient {
    http: reqwest::Client,
    base_url: Url,
}

impl AdsbClient {
    /// Create a client for the given API base URL.
    pub fn new(base_url: &str, timeout: Option<Duration>) -> Result<Self> {
        let base_url = Url::parse(base_url)
            .map_err(|e| FlypalError::Config(format!("Invalid telemetry URL '{}': {}", base_url, e)))?;

        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            http: builder.build()?,
            base_url,
        })
    }

    /// Build the lookup URL, appending the callsign as one encoded path segment.
    ///
    /// Anything from a `?` or `#` onward is dropped, so "AA123?" taken from
    /// "Where is AA123?" looks up `AA123`.
    fn callsign_url(&self, callsign: &str) -> Result<Url> {
        let callsign = callsign
            .split(|c| c == '?' || c == '#')
            .next()
            .unwrap_or_default();
        if callsign.is_empty() {
            return Err(FlypalError::Fetch("empty callsign".to_string()));
        }

        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| {
                FlypalError::Config(format!("Telemetry URL cannot be a base: {}", self.base_url))
            })?
            .pop_if_empty()
            .push("callsign")
            .push(callsign);
        Ok(url)
    }
}

#[async_trait]
impl FlightDataSource for AdsbClient {
    #[instrument(skip(self))]
    async fn fetch(&self, callsign: &str) -> Result<TelemetryResponse> {
        let url = self.callsign_url(callsign)?;
        debug!("GET {}", url);

        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| FlypalError::Fetch(e.to_string()))?
            .error_for_status()
            .map_err(|e| FlypalError::Fetch(e.to_string()))?;

        let body: serde_json::Value = response
            .json()
            .await
            .map_err(|e| FlypalError::Fetch(format!("Invalid response body: {}", e)))?;

        let telemetry = TelemetryResponse::new(body);
        info!(
            "Fetched telemetry for {} ({} aircraft)",
            callsign,
            telemetry.aircraft_count()
        );
        Ok(telemetry)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn test_callsign_url() {
        let client = AdsbClient::new("https://opendata.adsb.fi/api/v2/", None).unwrap();
        assert_eq!(
            client.callsign_url("AA123").unwrap().as_str(),
            "https://opendata.adsb.fi/api/v2/callsign/AA123"
        );
        assert_eq!(
            client.callsign_url("AA123?").unwrap().as_str(),
            "https://opendata.adsb.fi/api/v2/callsign/AA123"
        );
        assert_eq!(
            client.callsign_url("DL456#x").unwrap().as_str(),
            "https://opendata.adsb.fi/api/v2/callsign/DL456"
        );
        // Other punctuation stays part of the segment.
        assert_eq!(
            client.callsign_url("(KL1001),").unwrap().as_str(),
            "https://opendata.adsb.fi/api/v2/callsign/(KL1001),"
        );
        assert_eq!(
            client.callsign_url("BA2490/x").unwrap().as_str(),
            "https://opendata.adsb.fi/api/v2/callsign/BA2490%2Fx"
        );
        assert!(matches!(client.callsign_url("?AA123"), Err(FlypalError::Fetch(_))));
    }

    #[test]
    fn test_invalid_base_url() {
        assert!(matches!(
            AdsbClient::new("not a url", None),
            Err(FlypalError::Config(_))
        ));
    }

    #[tokio::test]
    async fn test_fetch_success() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/callsign/AA123"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "ac": [{"flight": "AA123   ", "alt_baro": 35000}],
                "msg": "No error",
                "total": 1
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = AdsbClient::new(&server.uri(), None).unwrap();
        let telemetry = client.fetch("AA123").await.unwrap();
        assert_eq!(telemetry.aircraft_count(), 1);
    }

    #[tokio::test]
    async fn test_fetch_question_mark_callsign() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/callsign/AA123"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ac": []})))
            .expect(1)
            .mount(&server)
            .await;

        let client = AdsbClient::new(&server.uri(), None).unwrap();
        let telemetry = client.fetch("AA123?").await.unwrap();
        assert_eq!(telemetry.aircraft_count(), 0);
    }

    #[tokio::test]
    async fn test_fetch_error_status() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503))
            .expect(1)
            .mount(&server)
            .await;

        let client = AdsbClient::new(&server.uri(), None).unwrap();
        let err = client.fetch("AA123").await.unwrap_err();
        assert!(matches!(err, FlypalError::Fetch(_)), "unexpected error: {err:?}");
    }

    #[tokio::test]
    async fn test_fetch_invalid_body() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
            .mount(&server)
            .await;

        let client = AdsbClient::new(&server.uri(), None).unwrap();
        assert!(matches!(
            client.fetch("AA123").await,
            Err(FlypalError::Fetch(_))
        ));
    }
}
