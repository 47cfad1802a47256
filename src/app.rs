//! Event loop wiring the controllers to the terminal and the API.
//!
//! All input arrives on one mpsc channel: terminal events forwarded by
//! a blocking reader thread, ticks, debounce expirations and fetch
//! completions. State changes only inside [`App::handle_event`], so the
//! handling order is the arrival order. That serialization is what
//! makes dropdown clicks safe: the click is hit-tested against the
//! dropdown before any focus change, and no timer can run between the
//! two steps.

use std::sync::Arc;
use std::thread;
use std::time::Duration;

use anyhow::Result;
use chrono::{Local, NaiveDate};
use crossterm::event::{
    self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseButton, MouseEvent,
    MouseEventKind,
};
use ratatui::backend::Backend;
use ratatui::layout::Position;
use ratatui::Terminal;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, error, info};

use crate::autocomplete::{Autocomplete, AutocompleteCmd, FieldKind, DEBOUNCE_DELAY};
use crate::client::SkyClient;
use crate::search::{FlightSearch, SearchCmd};
use crate::ui::{self, LayoutMap};
use crate::{AirportSuggestion, ApiError, Itinerary};

const TICK_RATE: Duration = Duration::from_millis(250);

/// Everything that can wake the event loop.
#[derive(Debug)]
pub enum AppEvent {
    Input(Event),
    Tick,
    /// A debounce timer ran to completion.
    DebounceFired { field: FieldKind, seq: u64 },
    /// An airport lookup finished.
    AirportsFetched {
        field: FieldKind,
        seq: u64,
        result: Result<Vec<AirportSuggestion>, ApiError>,
    },
    /// A flight search finished.
    FlightsFetched {
        seq: u64,
        result: Result<Vec<Itinerary>, ApiError>,
    },
}

/// Traversal order of the interactive widgets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    Origin,
    Destination,
    Date,
    Explore,
}

/// Top-level state of the terminal UI.
pub struct App {
    pub origin: Autocomplete,
    pub destination: Autocomplete,
    pub search: FlightSearch,
    /// Raw text of the date field; committed to `search` once it parses.
    pub date_input: String,
    pub focus: Focus,
    /// Blocking notice; while set, the next key or click only dismisses it.
    pub notice: Option<String>,
    /// Dropdown row the keyboard highlight sits on.
    pub highlight: usize,
    pub spinner_frame: usize,
    pub should_quit: bool,
    /// Screen regions recorded during the last draw, for mouse hit-tests.
    pub layout: LayoutMap,
    client: Arc<SkyClient>,
    event_tx: mpsc::Sender<AppEvent>,
    event_rx: mpsc::Receiver<AppEvent>,
    origin_timer: Option<JoinHandle<()>>,
    destination_timer: Option<JoinHandle<()>>,
}

impl App {
    pub fn new(client: Arc<SkyClient>) -> Self {
        let (event_tx, event_rx) = mpsc::channel(128);
        let today = Local::now().date_naive();
        let mut app = Self {
            origin: Autocomplete::new(FieldKind::Origin),
            destination: Autocomplete::new(FieldKind::Destination),
            search: FlightSearch::new(today),
            date_input: today.format("%Y-%m-%d").to_string(),
            focus: Focus::Origin,
            notice: None,
            highlight: 0,
            spinner_frame: 0,
            should_quit: false,
            layout: LayoutMap::default(),
            client,
            event_tx,
            event_rx,
            origin_timer: None,
            destination_timer: None,
        };
        app.origin.on_focus();
        app
    }

    /// Drive the UI until the user quits.
    pub async fn run<B: Backend>(&mut self, terminal: &mut Terminal<B>) -> Result<()> {
        spawn_input_thread(self.event_tx.clone());
        info!("Event loop started");

        loop {
            terminal.draw(|frame| ui::draw(frame, self))?;
            if self.should_quit {
                break;
            }
            let Some(app_event) = self.event_rx.recv().await else {
                break;
            };
            self.handle_event(app_event);
            if self.should_quit {
                break;
            }
        }

        info!("Event loop stopped");
        Ok(())
    }

    /// Receive the next queued event. The run loop awaits this; tests
    /// that drive the app without a terminal do too.
    pub async fn next_event(&mut self) -> Option<AppEvent> {
        self.event_rx.recv().await
    }

    /// Apply one event to the application state.
    pub fn handle_event(&mut self, app_event: AppEvent) {
        match app_event {
            AppEvent::Input(input) => self.handle_input(input),
            AppEvent::Tick => self.handle_tick(),
            AppEvent::DebounceFired { field, seq } => {
                if let Some(cmd) = self.field_mut(field).on_debounce_fired(seq) {
                    self.run_autocomplete_cmd(field, cmd);
                }
            }
            AppEvent::AirportsFetched { field, seq, result } => {
                self.field_mut(field).on_lookup_done(seq, result);
            }
            AppEvent::FlightsFetched { seq, result } => {
                self.search.on_search_done(seq, result);
            }
        }
    }

    fn handle_input(&mut self, input: Event) {
        match input {
            Event::Key(key) if key.kind == KeyEventKind::Press => self.handle_key(key),
            Event::Mouse(mouse) => self.handle_mouse(mouse),
            _ => {}
        }
    }

    fn handle_tick(&mut self) {
        if self.origin.is_loading() || self.destination.is_loading() || self.search.is_loading() {
            self.spinner_frame = self.spinner_frame.wrapping_add(1);
        }
    }

    fn handle_key(&mut self, key: KeyEvent) {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            self.should_quit = true;
            return;
        }
        if self.notice.is_some() {
            self.notice = None;
            return;
        }
        match key.code {
            KeyCode::Esc => self.should_quit = true,
            KeyCode::Tab => self.cycle_focus(true),
            KeyCode::BackTab => self.cycle_focus(false),
            KeyCode::Enter => self.handle_enter(),
            KeyCode::Up => self.move_highlight(-1),
            KeyCode::Down => self.move_highlight(1),
            KeyCode::Backspace => self.edit_focused(|text| {
                text.pop();
            }),
            KeyCode::Char(ch)
                if key.modifiers.is_empty() || key.modifiers == KeyModifiers::SHIFT =>
            {
                self.edit_focused(|text| text.push(ch));
            }
            _ => {}
        }
    }

    fn handle_mouse(&mut self, mouse: MouseEvent) {
        if mouse.kind != MouseEventKind::Down(MouseButton::Left) {
            return;
        }
        if self.notice.is_some() {
            self.notice = None;
            return;
        }
        let position = Position::new(mouse.column, mouse.row);

        // The dropdown overlay wins over whatever sits underneath it, so
        // a click on an option can never be swallowed by a focus change.
        if let Some((field, index)) = self.layout.dropdown_row_at(position) {
            self.commit_option(field, index);
            return;
        }
        if self.layout.origin.contains(position) {
            self.set_focus(Focus::Origin);
        } else if self.layout.destination.contains(position) {
            self.set_focus(Focus::Destination);
        } else if self.layout.date.contains(position) {
            self.set_focus(Focus::Date);
        } else if self.layout.explore.contains(position) {
            self.set_focus(Focus::Explore);
            self.submit_search();
        }
    }

    fn handle_enter(&mut self) {
        match self.focus {
            Focus::Origin => self.select_highlighted(FieldKind::Origin),
            Focus::Destination => self.select_highlighted(FieldKind::Destination),
            Focus::Date => self.set_focus(Focus::Explore),
            Focus::Explore => self.submit_search(),
        }
    }

    /// Apply a text edit to whichever input currently has focus.
    fn edit_focused<F>(&mut self, edit: F)
    where
        F: FnOnce(&mut String),
    {
        match self.focus {
            Focus::Origin => self.edit_field(FieldKind::Origin, edit),
            Focus::Destination => self.edit_field(FieldKind::Destination, edit),
            Focus::Date => {
                edit(&mut self.date_input);
                if let Ok(date) = NaiveDate::parse_from_str(self.date_input.trim(), "%Y-%m-%d") {
                    self.search.set_departure_date(date);
                }
            }
            Focus::Explore => {}
        }
    }

    fn edit_field<F>(&mut self, field: FieldKind, edit: F)
    where
        F: FnOnce(&mut String),
    {
        let mut text = self.field(field).input().to_string();
        edit(&mut text);
        let cmd = self.field_mut(field).on_input_change(text);
        self.run_autocomplete_cmd(field, cmd);
        self.highlight = 0;
    }

    fn select_highlighted(&mut self, field: FieldKind) {
        let len = self.field(field).options().len();
        if len == 0 {
            return;
        }
        let index = self.highlight.min(len - 1);
        self.commit_option(field, index);
    }

    fn commit_option(&mut self, field: FieldKind, index: usize) {
        if let Some(cmd) = self.field_mut(field).select_option(index) {
            self.run_autocomplete_cmd(field, cmd);
        }
        self.highlight = 0;
    }

    fn move_highlight(&mut self, delta: isize) {
        let Some(field) = self.focused_field() else {
            return;
        };
        let len = self.field(field).options().len();
        if len == 0 {
            return;
        }
        let current = self.highlight.min(len - 1) as isize;
        self.highlight = (current + delta).clamp(0, len as isize - 1) as usize;
    }

    fn cycle_focus(&mut self, forward: bool) {
        let next = match (self.focus, forward) {
            (Focus::Origin, true) => Focus::Destination,
            (Focus::Destination, true) => Focus::Date,
            (Focus::Date, true) => Focus::Explore,
            (Focus::Explore, true) => Focus::Origin,
            (Focus::Origin, false) => Focus::Explore,
            (Focus::Destination, false) => Focus::Origin,
            (Focus::Date, false) => Focus::Destination,
            (Focus::Explore, false) => Focus::Date,
        };
        self.set_focus(next);
    }

    fn set_focus(&mut self, next: Focus) {
        if next == self.focus {
            return;
        }
        if let Some(field) = self.focused_field() {
            self.field_mut(field).on_blur();
        }
        self.focus = next;
        self.highlight = 0;
        if let Some(field) = self.focused_field() {
            self.field_mut(field).on_focus();
        }
        debug!(focus = ?self.focus, "Focus moved");
    }

    fn focused_field(&self) -> Option<FieldKind> {
        match self.focus {
            Focus::Origin => Some(FieldKind::Origin),
            Focus::Destination => Some(FieldKind::Destination),
            Focus::Date | Focus::Explore => None,
        }
    }

    fn field(&self, field: FieldKind) -> &Autocomplete {
        match field {
            FieldKind::Origin => &self.origin,
            FieldKind::Destination => &self.destination,
        }
    }

    fn field_mut(&mut self, field: FieldKind) -> &mut Autocomplete {
        match field {
            FieldKind::Origin => &mut self.origin,
            FieldKind::Destination => &mut self.destination,
        }
    }

    fn run_autocomplete_cmd(&mut self, field: FieldKind, cmd: AutocompleteCmd) {
        match cmd {
            AutocompleteCmd::RestartDebounce { seq } => self.restart_debounce(field, seq),
            AutocompleteCmd::Lookup { query, seq } => self.spawn_lookup(field, query, seq),
        }
    }

    /// Abort the field's previous timer and start a fresh one.
    fn restart_debounce(&mut self, field: FieldKind, seq: u64) {
        let sender = self.event_tx.clone();
        let handle = tokio::spawn(async move {
            tokio::time::sleep(DEBOUNCE_DELAY).await;
            let _ = sender.send(AppEvent::DebounceFired { field, seq }).await;
        });
        let slot = match field {
            FieldKind::Origin => &mut self.origin_timer,
            FieldKind::Destination => &mut self.destination_timer,
        };
        if let Some(previous) = slot.replace(handle) {
            previous.abort();
        }
    }

    fn spawn_lookup(&mut self, field: FieldKind, query: String, seq: u64) {
        let client = Arc::clone(&self.client);
        let sender = self.event_tx.clone();
        tokio::spawn(async move {
            let result = client.search_airports(&query).await;
            let _ = sender
                .send(AppEvent::AirportsFetched { field, seq, result })
                .await;
        });
    }

    fn submit_search(&mut self) {
        match self
            .search
            .submit(self.origin.selected(), self.destination.selected())
        {
            SearchCmd::Notice(message) => self.notice = Some(message.to_string()),
            SearchCmd::Search { query, seq } => {
                let client = Arc::clone(&self.client);
                let sender = self.event_tx.clone();
                tokio::spawn(async move {
                    let result = client.search_flights(&query).await;
                    let _ = sender.send(AppEvent::FlightsFetched { seq, result }).await;
                });
            }
        }
    }
}

/// Forward terminal events into the channel; quiet periods become ticks.
fn spawn_input_thread(sender: mpsc::Sender<AppEvent>) {
    thread::spawn(move || loop {
        let ready = match event::poll(TICK_RATE) {
            Ok(ready) => ready,
            Err(err) => {
                error!(?err, "Terminal event poll failed");
                break;
            }
        };
        let app_event = if ready {
            match event::read() {
                Ok(input) => AppEvent::Input(input),
                Err(err) => {
                    error!(?err, "Terminal event read failed");
                    break;
                }
            }
        } else {
            AppEvent::Tick
        };
        if sender.blocking_send(app_event).is_err() {
            break;
        }
    });
}
