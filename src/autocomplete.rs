//! Debounced airport autocomplete.
//!
//! [`Autocomplete`] is a synchronous state machine. The runtime feeds
//! it text edits plus timer and lookup completions, and it answers with
//! [`AutocompleteCmd`] values describing the async work to perform. Two
//! sequence counters keep the async world honest:
//!
//! * `debounce_seq` identifies the newest debounce timer. Re-arming
//!   bumps it, so an already expired timer that raced its cancellation
//!   is recognized as stale and ignored.
//! * `lookup_seq` identifies the newest issued lookup. A completion
//!   tagged with an older number is dropped outright; a slow response
//!   can therefore never overwrite suggestions that belong to newer
//!   input, and clearing the field invalidates whatever is in flight.

use std::fmt;
use std::time::Duration;

use tracing::{debug, warn};

use crate::{AirportSuggestion, ApiError, SelectedAirport};

/// Quiet period after the last keystroke before a lookup is issued.
pub const DEBOUNCE_DELAY: Duration = Duration::from_millis(500);

/// Recorded on a field when its lookup fails.
pub const LOOKUP_ERROR_MESSAGE: &str = "Error fetching data";

/// Shown in the dropdown when there are no options to list.
pub const NO_AIRPORTS_MESSAGE: &str = "No nearby airports found";

/// Which endpoint of the trip a field feeds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Origin,
    Destination,
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldKind::Origin => write!(f, "origin"),
            FieldKind::Destination => write!(f, "destination"),
        }
    }
}

/// Async work requested by the controller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AutocompleteCmd {
    /// Cancel the field's previous debounce timer and start a fresh one
    /// that reports back with `seq` after [`DEBOUNCE_DELAY`].
    RestartDebounce { seq: u64 },
    /// Fetch suggestions for `query`; deliver the outcome with `seq`.
    Lookup { query: String, seq: u64 },
}

/// What the dropdown should show for a field right now.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DropdownContent<'a> {
    Loading,
    Message(&'a str),
    Options(&'a [AirportSuggestion]),
}

/// State machine behind one airport input field.
#[derive(Debug)]
pub struct Autocomplete {
    kind: FieldKind,
    input: String,
    options: Vec<AirportSuggestion>,
    selected: Option<SelectedAirport>,
    focused: bool,
    loading: bool,
    error: Option<String>,
    debounce_seq: u64,
    lookup_seq: u64,
}

impl Autocomplete {
    pub fn new(kind: FieldKind) -> Self {
        Self {
            kind,
            input: String::new(),
            options: Vec::new(),
            selected: None,
            focused: false,
            loading: false,
            error: None,
            debounce_seq: 0,
            lookup_seq: 0,
        }
    }

    pub fn kind(&self) -> FieldKind {
        self.kind
    }

    /// The text currently in the field, exactly as typed.
    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn options(&self) -> &[AirportSuggestion] {
        &self.options
    }

    /// The committed selection, if any. Editing the text afterwards
    /// does not withdraw it; only a newer selection replaces it.
    pub fn selected(&self) -> Option<&SelectedAirport> {
        self.selected.as_ref()
    }

    pub fn is_focused(&self) -> bool {
        self.focused
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Record a new value of the input text. Never issues a network
    /// call itself; it always re-arms the debounce timer, empty input
    /// included.
    pub fn on_input_change(&mut self, text: impl Into<String>) -> AutocompleteCmd {
        self.input = text.into();
        if self.input.is_empty() {
            // Deleted text must not come back: drop the options now and
            // invalidate whatever lookup is still in flight.
            self.options.clear();
            self.error = None;
            self.invalidate_lookup();
        }
        self.debounce_seq += 1;
        debug!(field = %self.kind, seq = self.debounce_seq, "Debounce timer re-armed");
        AutocompleteCmd::RestartDebounce {
            seq: self.debounce_seq,
        }
    }

    /// The debounce timer carrying `seq` expired.
    ///
    /// Only the newest timer counts. With empty input the field is
    /// cleared and no request goes out.
    pub fn on_debounce_fired(&mut self, seq: u64) -> Option<AutocompleteCmd> {
        if seq != self.debounce_seq {
            return None;
        }
        if self.input.is_empty() {
            self.options.clear();
            self.error = None;
            self.invalidate_lookup();
            return None;
        }
        self.loading = true;
        self.error = None;
        self.lookup_seq += 1;
        debug!(
            field = %self.kind,
            seq = self.lookup_seq,
            query = %self.input,
            "Issuing airport lookup"
        );
        Some(AutocompleteCmd::Lookup {
            query: self.input.clone(),
            seq: self.lookup_seq,
        })
    }

    /// A lookup finished. Results tagged with an out-of-date sequence
    /// number are dropped without touching the field.
    pub fn on_lookup_done(
        &mut self,
        seq: u64,
        result: Result<Vec<AirportSuggestion>, ApiError>,
    ) {
        if seq != self.lookup_seq {
            debug!(
                field = %self.kind,
                seq,
                current = self.lookup_seq,
                "Dropping stale lookup result"
            );
            return;
        }
        self.loading = false;
        match result {
            Ok(options) => {
                debug!(field = %self.kind, count = options.len(), "Lookup succeeded");
                self.options = options;
            }
            Err(err) => {
                warn!(field = %self.kind, error = %err, "Lookup failed");
                self.options.clear();
                self.error = Some(LOOKUP_ERROR_MESSAGE.to_string());
            }
        }
    }

    pub fn on_focus(&mut self) {
        self.focused = true;
    }

    pub fn on_blur(&mut self) {
        self.focused = false;
    }

    /// Commit the option at `index`: remember its identifiers and show
    /// its name in the field. The text change re-arms the debounce
    /// timer exactly as typing the name by hand would.
    pub fn select_option(&mut self, index: usize) -> Option<AutocompleteCmd> {
        let option = self.options.get(index)?;
        self.selected = Some(SelectedAirport::from(option));
        let name = option.display_name.clone();
        debug!(field = %self.kind, sky_id = %option.sky_id, "Option selected");
        Some(self.on_input_change(name))
    }

    /// What the dropdown should render, or `None` while the field is
    /// unfocused. Loading takes priority, then the options; with
    /// neither present the dropdown falls back to
    /// [`NO_AIRPORTS_MESSAGE`].
    pub fn dropdown_content(&self) -> Option<DropdownContent<'_>> {
        if !self.focused {
            return None;
        }
        if self.loading {
            return Some(DropdownContent::Loading);
        }
        if !self.options.is_empty() {
            return Some(DropdownContent::Options(&self.options));
        }
        Some(DropdownContent::Message(NO_AIRPORTS_MESSAGE))
    }

    fn invalidate_lookup(&mut self) {
        self.lookup_seq += 1;
        self.loading = false;
    }
}
