//! CLI interface for skyscout

use std::io;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{anyhow, Context, Result};
use chrono::{Local, NaiveDate};
use clap::{Parser, Subcommand};
use crossterm::event::{DisableMouseCapture, EnableMouseCapture};
use crossterm::execute;
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use skyscout::format::itinerary_line;
use skyscout::search::NO_FLIGHTS_MESSAGE;
use skyscout::{AirportSuggestion, ApiConfig, App, FlightQuery, SelectedAirport, SkyClient};

#[derive(Parser)]
#[command(name = "skyscout")]
#[command(about = "Flight search with airport autocomplete, in the terminal")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Search for flights once and print the results
    Search {
        /// Origin airport or city name
        #[arg(short, long)]
        from: String,
        /// Destination airport or city name
        #[arg(short, long)]
        to: String,
        /// Departure date (YYYY-MM-DD), defaults to today
        #[arg(short, long)]
        date: Option<String>,
        /// Print raw JSON instead of formatted rows
        #[arg(long)]
        json: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = ApiConfig::from_env().context(
        "set SKYSCOUT_API_URL, SKYSCOUT_API_HOST and SKYSCOUT_API_KEY to reach the flight API",
    )?;
    let client = Arc::new(SkyClient::new(config)?);

    match cli.command {
        Some(Commands::Search {
            from,
            to,
            date,
            json,
        }) => run_search(client, from, to, date, json).await,
        None => run_tui(client).await,
    }
}

/// Initialize logging to file. Raw mode owns the screen, so the UI
/// never logs to stdout.
fn init_file_logging() -> Result<()> {
    let log_dir = PathBuf::from("logs");
    std::fs::create_dir_all(&log_dir)?;

    let file_appender = tracing_appender::rolling::daily(&log_dir, "skyscout.log");

    tracing_subscriber::registry()
        .with(
            EnvFilter::new("info")
                .add_directive("skyscout=debug".parse()?)
                .add_directive("reqwest=info".parse()?),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(file_appender)
                .with_ansi(false)
                .with_target(true)
                .json(),
        )
        .init();

    info!("Logging initialized, writing to logs/skyscout.log.*");
    Ok(())
}

async fn run_tui(client: Arc<SkyClient>) -> Result<()> {
    init_file_logging()?;

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(client);
    let outcome = app.run(&mut terminal).await;

    // Restore the terminal before surfacing whatever run() returned.
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    outcome
}

async fn run_search(
    client: Arc<SkyClient>,
    from: String,
    to: String,
    date: Option<String>,
    json: bool,
) -> Result<()> {
    let date = match date {
        Some(text) => NaiveDate::parse_from_str(&text, "%Y-%m-%d")
            .with_context(|| format!("invalid departure date '{text}', expected YYYY-MM-DD"))?,
        None => Local::now().date_naive(),
    };

    let origin = resolve_airport(&client, &from).await?;
    let destination = resolve_airport(&client, &to).await?;
    println!(
        "Searching flights {} -> {} on {}...",
        origin.display_name, destination.display_name, date
    );

    let query = FlightQuery {
        origin: SelectedAirport::from(&origin),
        destination: SelectedAirport::from(&destination),
        date,
    };
    let itineraries = client.search_flights(&query).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&itineraries)?);
        return Ok(());
    }
    if itineraries.is_empty() {
        println!("{NO_FLIGHTS_MESSAGE}");
        return Ok(());
    }
    println!("Available Flights");
    for itinerary in &itineraries {
        if let Some(row) = itinerary_line(itinerary) {
            println!(
                "{:>10}  {}  {}  ({})",
                row.price, row.times, row.route, row.duration
            );
        }
    }
    Ok(())
}

/// Take the first airport the API offers for a free-text query.
async fn resolve_airport(client: &SkyClient, query: &str) -> Result<AirportSuggestion> {
    let mut matches = client.search_airports(query).await?;
    if matches.is_empty() {
        return Err(anyhow!("no airport matches '{query}'"));
    }
    Ok(matches.remove(0))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parsing() {
        let cli = Cli::try_parse_from([
            "skyscout",
            "search",
            "--from",
            "London",
            "--to",
            "New York",
            "--date",
            "2026-09-14",
        ]);

        assert!(cli.is_ok());

        if let Ok(Cli {
            command:
                Some(Commands::Search {
                    from,
                    to,
                    date,
                    json,
                }),
        }) = cli
        {
            assert_eq!(from, "London");
            assert_eq!(to, "New York");
            assert_eq!(date.as_deref(), Some("2026-09-14"));
            assert!(!json);
        }
    }

    #[test]
    fn test_bare_invocation_opens_the_ui() {
        let cli = Cli::try_parse_from(["skyscout"]).unwrap();
        assert!(cli.command.is_none());
    }
}
