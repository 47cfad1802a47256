//! Integration tests for skyscout
//!
//! These tests drive the real event loop against a local mock of the
//! Sky-Scrapper API: keyboard and mouse events go in, HTTP requests
//! come out. Debounce timers and request sequencing run for real.

use std::sync::Arc;
use std::time::Duration;

use crossterm::event::{Event, KeyCode, KeyEvent, KeyModifiers};
use serde_json::json;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use skyscout::autocomplete::LOOKUP_ERROR_MESSAGE;
use skyscout::search::{MISSING_SELECTION_NOTICE, SEARCH_ERROR_MESSAGE};
use skyscout::{
    AirportSuggestion, ApiConfig, App, AppEvent, FieldKind, Focus, SkyClient,
};

const AIRPORT_PATH: &str = "/v1/flights/searchAirport";
const FLIGHT_PATH: &str = "/v2/flights/searchFlights";

/// Helper to build an app wired to the mock server.
fn test_app(server: &MockServer) -> App {
    let config = ApiConfig::new(server.uri(), "sky-scrapper.test", "test-key");
    let client = SkyClient::new(config).expect("client should build");
    App::new(Arc::new(client))
}

fn key(app: &mut App, code: KeyCode) {
    app.handle_event(AppEvent::Input(Event::Key(KeyEvent::new(
        code,
        KeyModifiers::NONE,
    ))));
}

fn type_text(app: &mut App, text: &str) {
    for ch in text.chars() {
        key(app, KeyCode::Char(ch));
    }
}

fn options_of<'a>(app: &'a App, field: FieldKind) -> &'a [AirportSuggestion] {
    match field {
        FieldKind::Origin => app.origin.options(),
        FieldKind::Destination => app.destination.options(),
    }
}

/// Airport search response body in the wire format of the API.
fn airport_body(entries: &[(&str, &str, &str)]) -> serde_json::Value {
    let data: Vec<serde_json::Value> = entries
        .iter()
        .map(|(sky_id, entity_id, name)| {
            json!({
                "skyId": sky_id,
                "entityId": entity_id,
                "navigation": { "localizedName": name }
            })
        })
        .collect();
    json!({ "status": true, "data": data })
}

/// One London to New York itinerary at $316.
fn flight_body() -> serde_json::Value {
    json!({
        "status": true,
        "data": {
            "itineraries": [{
                "id": "it-1",
                "price": { "raw": 316.0, "formatted": "$316" },
                "legs": [{
                    "origin": { "id": "LHR" },
                    "destination": { "id": "JFK" },
                    "durationInMinutes": 485,
                    "departure": "2026-09-14T09:10:00",
                    "arrival": "2026-09-14T12:15:00"
                }]
            }]
        }
    })
}

/// Process queued events until the predicate holds or ten seconds pass.
async fn drive_until<F>(app: &mut App, what: &str, mut done: F)
where
    F: FnMut(&App) -> bool,
{
    let waited = tokio::time::timeout(Duration::from_secs(10), async {
        while !done(app) {
            let Some(event) = app.next_event().await else {
                panic!("event channel closed while waiting for {what}");
            };
            app.handle_event(event);
        }
    })
    .await;
    assert!(waited.is_ok(), "timed out waiting for {what}");
}

/// Keep processing events until the queue stays quiet for `window`.
async fn drain_for(app: &mut App, window: Duration) {
    loop {
        match tokio::time::timeout(window, app.next_event()).await {
            Ok(Some(event)) => app.handle_event(event),
            Ok(None) | Err(_) => break,
        }
    }
}

/// Type a query into the focused field and commit the first suggestion.
async fn select_first(app: &mut App, field: FieldKind, text: &str) {
    type_text(app, text);
    drive_until(app, "autocomplete options", |app| {
        !options_of(app, field).is_empty()
    })
    .await;
    key(app, KeyCode::Enter);
}

#[tokio::test]
async fn test_typing_burst_collapses_to_one_lookup() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(AIRPORT_PATH))
        .and(query_param("query", "Abc"))
        .and(query_param("locale", "en-US"))
        .and(header("x-rapidapi-key", "test-key"))
        .and(header("x-rapidapi-host", "sky-scrapper.test"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(airport_body(&[("ABC", "100", "Abc Airport")])),
        )
        .expect(1)
        .mount(&server)
        .await;

    let mut app = test_app(&server);
    type_text(&mut app, "A");
    tokio::time::sleep(Duration::from_millis(100)).await;
    type_text(&mut app, "b");
    tokio::time::sleep(Duration::from_millis(100)).await;
    type_text(&mut app, "c");

    drive_until(&mut app, "suggestions", |app| !app.origin.options().is_empty()).await;
    // Give any stray timer time to fire before counting requests.
    drain_for(&mut app, Duration::from_millis(700)).await;

    let requests = server.received_requests().await.expect("recording enabled");
    assert_eq!(requests.len(), 1, "the whole burst makes one request");
    assert_eq!(app.origin.options()[0].sky_id, "ABC");
}

#[tokio::test]
async fn test_cleared_input_issues_no_lookup() {
    let server = MockServer::start().await;

    let mut app = test_app(&server);
    type_text(&mut app, "Oslo");
    for _ in 0..4 {
        key(&mut app, KeyCode::Backspace);
    }
    assert_eq!(app.origin.input(), "");

    // Longer than the debounce delay; nothing may reach the server.
    drain_for(&mut app, Duration::from_millis(900)).await;

    let requests = server.received_requests().await.expect("recording enabled");
    assert!(requests.is_empty(), "cleared input must not fetch");
    assert!(app.origin.options().is_empty());
}

#[tokio::test]
async fn test_failed_lookup_shows_error_and_clears_options() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(AIRPORT_PATH))
        .and(query_param("query", "Lon"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(airport_body(&[("LHR", "27544008", "London Heathrow")])),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(AIRPORT_PATH))
        .and(query_param("query", "London"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let mut app = test_app(&server);
    type_text(&mut app, "Lon");
    drive_until(&mut app, "suggestions", |app| !app.origin.options().is_empty()).await;

    type_text(&mut app, "don");
    drive_until(&mut app, "lookup error", |app| app.origin.error().is_some()).await;

    assert_eq!(app.origin.error(), Some(LOOKUP_ERROR_MESSAGE));
    assert!(
        app.origin.options().is_empty(),
        "stale suggestions must not survive a failed lookup"
    );
}

#[tokio::test]
async fn test_slow_earlier_lookup_cannot_overwrite_newer_options() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(AIRPORT_PATH))
        .and(query_param("query", "Par"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(airport_body(&[("PAR1", "1", "Par Test Strip")]))
                .set_delay(Duration::from_secs(2)),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(AIRPORT_PATH))
        .and(query_param("query", "Paris"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(airport_body(&[("PARI", "27539733", "Paris Charles de Gaulle")])),
        )
        .mount(&server)
        .await;

    let mut app = test_app(&server);
    type_text(&mut app, "Par");
    drive_until(&mut app, "first lookup to start", |app| app.origin.is_loading()).await;

    type_text(&mut app, "is");
    drive_until(&mut app, "fresh suggestions", |app| {
        app.origin.options().iter().any(|s| s.sky_id == "PARI")
    })
    .await;

    // Let the delayed response for the old text arrive and be dropped.
    drain_for(&mut app, Duration::from_millis(2500)).await;

    let skys: Vec<&str> = app.origin.options().iter().map(|s| s.sky_id.as_str()).collect();
    assert_eq!(skys, ["PARI"], "the slow stale response must be discarded");
    assert!(!app.origin.is_loading());
}

#[tokio::test]
async fn test_search_without_selection_raises_notice_and_no_request() {
    let server = MockServer::start().await;

    let mut app = test_app(&server);
    key(&mut app, KeyCode::Tab);
    key(&mut app, KeyCode::Tab);
    key(&mut app, KeyCode::Tab);
    assert_eq!(app.focus, Focus::Explore);

    key(&mut app, KeyCode::Enter);
    assert_eq!(app.notice.as_deref(), Some(MISSING_SELECTION_NOTICE));
    assert!(!app.search.is_loading());

    let requests = server.received_requests().await.expect("recording enabled");
    assert!(requests.is_empty(), "gated submit must not reach the API");

    // The dismissing key is consumed, not applied.
    key(&mut app, KeyCode::Tab);
    assert!(app.notice.is_none());
    assert_eq!(app.focus, Focus::Explore);
}

#[tokio::test]
async fn test_search_with_missing_destination_is_blocked() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(AIRPORT_PATH))
        .and(query_param("query", "London"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(airport_body(&[("LHR", "27544008", "London Heathrow (LHR)")])),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(AIRPORT_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(airport_body(&[])))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(FLIGHT_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(flight_body()))
        .expect(0)
        .mount(&server)
        .await;

    let mut app = test_app(&server);
    select_first(&mut app, FieldKind::Origin, "London").await;
    assert!(app.origin.selected().is_some());

    key(&mut app, KeyCode::Tab);
    key(&mut app, KeyCode::Tab);
    key(&mut app, KeyCode::Tab);
    assert_eq!(app.focus, Focus::Explore);
    key(&mut app, KeyCode::Enter);

    assert_eq!(app.notice.as_deref(), Some(MISSING_SELECTION_NOTICE));
    assert!(!app.search.is_loading());
}

#[tokio::test]
async fn test_full_search_sends_committed_identifiers() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(AIRPORT_PATH))
        .and(query_param("query", "London"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(airport_body(&[("LHR", "27544008", "London Heathrow (LHR)")])),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(AIRPORT_PATH))
        .and(query_param("query", "New York"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(airport_body(&[("NYCA", "27537542", "New York (Any)")])),
        )
        .mount(&server)
        .await;
    // Lookups for committed display names fall through to this one.
    Mock::given(method("GET"))
        .and(path(AIRPORT_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(airport_body(&[])))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(FLIGHT_PATH))
        .and(query_param("originSkyId", "LHR"))
        .and(query_param("destinationSkyId", "NYCA"))
        .and(query_param("originEntityId", "27544008"))
        .and(query_param("destinationEntityId", "27537542"))
        .and(query_param("date", "2026-09-14"))
        .and(query_param("cabinClass", "economy"))
        .and(query_param("adults", "1"))
        .and(query_param("sortBy", "best"))
        .and(query_param("currency", "USD"))
        .and(query_param("market", "en-US"))
        .and(query_param("countryCode", "US"))
        .and(header("x-rapidapi-key", "test-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(flight_body()))
        .expect(1)
        .mount(&server)
        .await;

    let mut app = test_app(&server);
    select_first(&mut app, FieldKind::Origin, "London").await;

    key(&mut app, KeyCode::Tab);
    assert_eq!(app.focus, Focus::Destination);
    select_first(&mut app, FieldKind::Destination, "New York").await;

    key(&mut app, KeyCode::Tab);
    assert_eq!(app.focus, Focus::Date);
    for _ in 0..app.date_input.len() {
        key(&mut app, KeyCode::Backspace);
    }
    type_text(&mut app, "2026-09-14");

    key(&mut app, KeyCode::Tab);
    assert_eq!(app.focus, Focus::Explore);
    key(&mut app, KeyCode::Enter);
    assert!(app.search.is_loading());
    assert!(app.notice.is_none());

    drive_until(&mut app, "itineraries", |app| !app.search.results().is_empty()).await;

    let results = app.search.results();
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].price.formatted, "$316");
    assert_eq!(results[0].legs[0].origin.id, "LHR");
    assert!(!app.search.is_loading());
}

#[tokio::test]
async fn test_failed_search_sets_error_and_clears_results() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(AIRPORT_PATH))
        .and(query_param("query", "London"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(airport_body(&[("LHR", "27544008", "London Heathrow (LHR)")])),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(AIRPORT_PATH))
        .and(query_param("query", "New York"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(airport_body(&[("NYCA", "27537542", "New York (Any)")])),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(AIRPORT_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(airport_body(&[])))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(FLIGHT_PATH))
        .respond_with(ResponseTemplate::new(502))
        .mount(&server)
        .await;

    let mut app = test_app(&server);
    select_first(&mut app, FieldKind::Origin, "London").await;
    key(&mut app, KeyCode::Tab);
    select_first(&mut app, FieldKind::Destination, "New York").await;

    key(&mut app, KeyCode::Tab);
    key(&mut app, KeyCode::Tab);
    assert_eq!(app.focus, Focus::Explore);
    key(&mut app, KeyCode::Enter);

    drive_until(&mut app, "search error", |app| app.search.error().is_some()).await;

    assert_eq!(app.search.error(), Some(SEARCH_ERROR_MESSAGE));
    assert!(app.search.results().is_empty());
    assert!(!app.search.is_loading());
}
