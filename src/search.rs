//! Itinerary search with submission gating.
//!
//! [`FlightSearch`] follows the same command pattern as the
//! autocomplete controller: `submit` either raises a blocking notice or
//! hands the runtime a fully described search, and completions carry a
//! sequence number so a superseded search can never clobber the results
//! of a newer one.

use chrono::NaiveDate;
use tracing::{debug, warn};

use crate::{ApiError, FlightQuery, Itinerary, SelectedAirport};

/// Raised when a search is attempted before both endpoints have a
/// committed selection.
pub const MISSING_SELECTION_NOTICE: &str = "Please select your flight origin or destination";

/// Recorded when the search itself fails.
pub const SEARCH_ERROR_MESSAGE: &str = "Error fetching data";

/// Shown when a search succeeds but returns nothing.
pub const NO_FLIGHTS_MESSAGE: &str = "No flights found.";

/// Async work requested by the search controller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchCmd {
    /// Run the flight search; deliver the outcome with `seq`.
    Search { query: FlightQuery, seq: u64 },
    /// Surface a blocking notice to the user; nothing was submitted.
    Notice(&'static str),
}

/// State machine behind the Explore action and the results panel.
#[derive(Debug)]
pub struct FlightSearch {
    departure_date: NaiveDate,
    results: Vec<Itinerary>,
    loading: bool,
    error: Option<String>,
    search_seq: u64,
}

impl FlightSearch {
    /// Start idle with the departure date preset to `today`.
    pub fn new(today: NaiveDate) -> Self {
        Self {
            departure_date: today,
            results: Vec::new(),
            loading: false,
            error: None,
            search_seq: 0,
        }
    }

    pub fn departure_date(&self) -> NaiveDate {
        self.departure_date
    }

    pub fn results(&self) -> &[Itinerary] {
        &self.results
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Replace the departure date. Any calendar date is accepted,
    /// including dates in the past.
    pub fn set_departure_date(&mut self, date: NaiveDate) {
        self.departure_date = date;
    }

    /// Ask for a search. Without both committed selections this raises
    /// a notice instead; no partial search is ever issued. Re-submitting
    /// while a search is in flight supersedes it.
    pub fn submit(
        &mut self,
        origin: Option<&SelectedAirport>,
        destination: Option<&SelectedAirport>,
    ) -> SearchCmd {
        let (Some(origin), Some(destination)) = (origin, destination) else {
            warn!("Search blocked: origin or destination not selected");
            return SearchCmd::Notice(MISSING_SELECTION_NOTICE);
        };
        self.loading = true;
        self.error = None;
        self.search_seq += 1;
        debug!(
            origin = %origin.sky_id,
            destination = %destination.sky_id,
            date = %self.departure_date,
            seq = self.search_seq,
            "Submitting flight search"
        );
        SearchCmd::Search {
            query: FlightQuery {
                origin: origin.clone(),
                destination: destination.clone(),
                date: self.departure_date,
            },
            seq: self.search_seq,
        }
    }

    /// A search finished. Completions of superseded submissions are
    /// dropped so the latest submit always wins.
    pub fn on_search_done(&mut self, seq: u64, result: Result<Vec<Itinerary>, ApiError>) {
        if seq != self.search_seq {
            debug!(seq, current = self.search_seq, "Dropping stale search result");
            return;
        }
        self.loading = false;
        match result {
            Ok(results) => {
                debug!(count = results.len(), "Search succeeded");
                self.results = results;
            }
            Err(err) => {
                warn!(error = %err, "Search failed");
                self.results.clear();
                self.error = Some(SEARCH_ERROR_MESSAGE.to_string());
            }
        }
    }
}
