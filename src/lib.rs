//! # skyscout
//!
//! An interactive flight finder built on the Sky-Scrapper API.
//!
//! The library half holds the moving parts: a debounced airport
//! [`Autocomplete`] state machine (one per trip endpoint), the
//! [`FlightSearch`] controller that gates and runs itinerary searches,
//! a typed HTTP [`SkyClient`] for the two API endpoints, and the
//! formatting helpers that turn itineraries into display rows. The
//! `skyscout` binary wires those into a terminal UI; see [`app`].
//!
//! Both controllers are synchronous: they take UI and completion events
//! and answer with command values describing the async work the runtime
//! must do. Timers and requests carry sequence numbers so slow
//! responses can never overwrite state derived from newer input.

pub mod app;
pub mod autocomplete;
pub mod client;
pub mod config;
pub mod format;
pub mod search;
pub mod ui;

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

// Re-export main types for convenience
pub use app::{App, AppEvent, Focus};
pub use autocomplete::{Autocomplete, AutocompleteCmd, DropdownContent, FieldKind};
pub use client::{ApiError, SkyClient};
pub use config::{ApiConfig, ConfigError};
pub use search::{FlightSearch, SearchCmd};

/// One airport as offered in the autocomplete dropdown.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AirportSuggestion {
    pub sky_id: String,
    pub entity_id: String,
    /// Human-readable name shown in the dropdown and, after selection,
    /// in the input field itself.
    pub display_name: String,
}

/// The identifier pair committed when the user picks a suggestion.
///
/// Searches are built from these, never from the visible text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectedAirport {
    pub sky_id: String,
    pub entity_id: String,
}

impl From<&AirportSuggestion> for SelectedAirport {
    fn from(suggestion: &AirportSuggestion) -> Self {
        Self {
            sky_id: suggestion.sky_id.clone(),
            entity_id: suggestion.entity_id.clone(),
        }
    }
}

/// Everything one itinerary search needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlightQuery {
    pub origin: SelectedAirport,
    pub destination: SelectedAirport,
    pub date: NaiveDate,
}

/// One bookable itinerary returned by the flight search.
///
/// Deserialized straight off the wire and never mutated locally;
/// fields the UI does not use are ignored.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Itinerary {
    pub legs: Vec<Leg>,
    pub price: Price,
}

/// A single flight leg.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Leg {
    pub origin: Place,
    pub destination: Place,
    pub departure: NaiveDateTime,
    pub arrival: NaiveDateTime,
    pub duration_in_minutes: u32,
}

/// Endpoint of a leg; the API reports airport codes in `id`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Place {
    pub id: String,
}

/// Price exactly as the API formatted it, e.g. `$316`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Price {
    pub formatted: String,
}
