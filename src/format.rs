//! Presentation helpers for itinerary rows.

use crate::Itinerary;
use chrono::{NaiveDateTime, Timelike};

/// Render a duration in whole minutes as e.g. `2 hr 5 min`.
pub fn format_duration_minutes(minutes: u32) -> String {
    format!("{} hr {} min", minutes / 60, minutes % 60)
}

/// Render a timestamp's clock time in 12-hour form, e.g. `1:00 PM`.
///
/// Midnight and noon both display as 12; minutes are zero-padded.
pub fn format_time_ampm(time: &NaiveDateTime) -> String {
    let suffix = if time.hour() >= 12 { "PM" } else { "AM" };
    let display_hour = match time.hour() % 12 {
        0 => 12,
        hour => hour,
    };
    format!("{}:{:02} {}", display_hour, time.minute(), suffix)
}

/// A display row for one itinerary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItineraryLine {
    pub times: String,
    pub route: String,
    pub duration: String,
    pub price: String,
}

/// Summarize an itinerary by its first leg.
///
/// Returns `None` when the API hands back an itinerary with no legs;
/// such rows simply do not render.
pub fn itinerary_line(itinerary: &Itinerary) -> Option<ItineraryLine> {
    let leg = itinerary.legs.first()?;
    Some(ItineraryLine {
        times: format!(
            "{} - {}",
            format_time_ampm(&leg.departure),
            format_time_ampm(&leg.arrival)
        ),
        route: format!("{} - {}", leg.origin.id, leg.destination.id),
        duration: format_duration_minutes(leg.duration_in_minutes),
        price: itinerary.price.formatted.clone(),
    })
}
