//! HTTP client for the Sky-Scrapper flight API.
//!
//! Two GET endpoints are consumed: `searchAirport` resolves free text
//! to airport identifiers and `searchFlights` lists itineraries between
//! two committed airports. Authentication travels in the RapidAPI
//! headers on every request.

use crate::config::ApiConfig;
use crate::{AirportSuggestion, FlightQuery, Itinerary};
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, error, info, instrument};

// Fixed search parameters; the UI never varies them.
const LOCALE: &str = "en-US";
const CABIN_CLASS: &str = "economy";
const ADULTS: &str = "1";
const SORT_BY: &str = "best";
const CURRENCY: &str = "USD";
const MARKET: &str = "en-US";
const COUNTRY_CODE: &str = "US";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Error types for Sky-Scrapper requests
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("unexpected HTTP status: {0}")]
    Status(StatusCode),
}

/// Typed client for the two Sky-Scrapper endpoints.
pub struct SkyClient {
    http_client: Client,
    config: ApiConfig,
}

/// Response envelope of `searchAirport`.
#[derive(Debug, Deserialize)]
struct AirportSearchResponse {
    #[serde(default)]
    data: Vec<AirportRecord>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AirportRecord {
    sky_id: String,
    entity_id: String,
    navigation: Navigation,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Navigation {
    localized_name: String,
}

/// Response envelope of `searchFlights`.
#[derive(Debug, Deserialize)]
struct FlightSearchResponse {
    #[serde(default)]
    data: FlightResults,
}

#[derive(Debug, Default, Deserialize)]
struct FlightResults {
    #[serde(default)]
    itineraries: Vec<Itinerary>,
}

impl SkyClient {
    /// Create a client for the configured endpoint.
    pub fn new(config: ApiConfig) -> Result<Self, ApiError> {
        debug!(host = %config.api_host, "Creating Sky-Scrapper client");
        let http_client = Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self {
            http_client,
            config,
        })
    }

    /// Look up airports matching a free-text query.
    #[instrument(level = "info", skip(self))]
    pub async fn search_airports(&self, query: &str) -> Result<Vec<AirportSuggestion>, ApiError> {
        let url = format!("{}/v1/flights/searchAirport", self.config.base_url);
        info!(url = %url, "Requesting airport suggestions");

        let start = std::time::Instant::now();
        let response = self
            .http_client
            .get(&url)
            .query(&[("query", query), ("locale", LOCALE)])
            .header("x-rapidapi-key", &self.config.api_key)
            .header("x-rapidapi-host", &self.config.api_host)
            .send()
            .await?;
        let status = response.status();
        info!(
            status = %status,
            duration_ms = start.elapsed().as_millis(),
            "Airport search completed"
        );

        if !status.is_success() {
            error!(status = %status, "Airport search returned an error status");
            return Err(ApiError::Status(status));
        }

        let envelope: AirportSearchResponse = response.json().await?;
        let suggestions: Vec<AirportSuggestion> = envelope
            .data
            .into_iter()
            .map(|record| AirportSuggestion {
                sky_id: record.sky_id,
                entity_id: record.entity_id,
                display_name: record.navigation.localized_name,
            })
            .collect();
        debug!(count = suggestions.len(), "Parsed airport suggestions");
        Ok(suggestions)
    }

    /// Search itineraries between two committed airports on a date.
    ///
    /// Cabin, passenger count, sort order, currency and market are fixed
    /// for every search.
    #[instrument(level = "info", skip(self, query))]
    pub async fn search_flights(&self, query: &FlightQuery) -> Result<Vec<Itinerary>, ApiError> {
        let url = format!("{}/v2/flights/searchFlights", self.config.base_url);
        let date = query.date.format("%Y-%m-%d").to_string();
        info!(
            url = %url,
            origin = %query.origin.sky_id,
            destination = %query.destination.sky_id,
            date = %date,
            "Requesting itineraries"
        );

        let start = std::time::Instant::now();
        let response = self
            .http_client
            .get(&url)
            .query(&[
                ("originSkyId", query.origin.sky_id.as_str()),
                ("destinationSkyId", query.destination.sky_id.as_str()),
                ("originEntityId", query.origin.entity_id.as_str()),
                ("destinationEntityId", query.destination.entity_id.as_str()),
                ("date", date.as_str()),
                ("cabinClass", CABIN_CLASS),
                ("adults", ADULTS),
                ("sortBy", SORT_BY),
                ("currency", CURRENCY),
                ("market", MARKET),
                ("countryCode", COUNTRY_CODE),
            ])
            .header("x-rapidapi-key", &self.config.api_key)
            .header("x-rapidapi-host", &self.config.api_host)
            .send()
            .await?;
        let status = response.status();
        info!(
            status = %status,
            duration_ms = start.elapsed().as_millis(),
            "Flight search completed"
        );

        if !status.is_success() {
            error!(status = %status, "Flight search returned an error status");
            return Err(ApiError::Status(status));
        }

        let envelope: FlightSearchResponse = response.json().await?;
        debug!(
            count = envelope.data.itineraries.len(),
            "Parsed itineraries"
        );
        Ok(envelope.data.itineraries)
    }
}
