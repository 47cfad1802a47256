//! Library-only flight search, no terminal UI.
//!
//! Needs SKYSCOUT_API_URL, SKYSCOUT_API_HOST and SKYSCOUT_API_KEY set.

use chrono::Local;
use skyscout::format::itinerary_line;
use skyscout::{ApiConfig, FlightQuery, SelectedAirport, SkyClient};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = ApiConfig::from_env()?;
    let client = SkyClient::new(config)?;

    let origins = client.search_airports("London").await?;
    let destinations = client.search_airports("New York").await?;
    let (Some(origin), Some(destination)) = (origins.first(), destinations.first()) else {
        eprintln!("No airport match for the demo cities");
        return Ok(());
    };
    println!("{} -> {}", origin.display_name, destination.display_name);

    let query = FlightQuery {
        origin: SelectedAirport::from(origin),
        destination: SelectedAirport::from(destination),
        date: Local::now().date_naive(),
    };

    match client.search_flights(&query).await {
        Ok(itineraries) => {
            println!("Found {} itineraries", itineraries.len());
            for itinerary in itineraries.iter().take(5) {
                if let Some(row) = itinerary_line(itinerary) {
                    println!(
                        "{:>10}  {}  {}  ({})",
                        row.price, row.times, row.route, row.duration
                    );
                }
            }
        }
        Err(e) => {
            eprintln!("Error searching for flights: {}", e);
            eprintln!("This is expected without a valid Sky-Scrapper API key.");
        }
    }

    Ok(())
}
