//! Rendering for the flight search screen.
//!
//! Drawing also records where the interactive widgets landed into a
//! [`LayoutMap`], which the event loop uses to resolve mouse clicks.
//! The dropdown overlay paints last and registers its rows first in the
//! hit-test order, so an option click is always resolved before the
//! field underneath it.

use ratatui::layout::{Alignment, Constraint, Layout, Position, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Clear, List, ListItem, ListState, Paragraph, Wrap};
use ratatui::Frame;

use crate::app::{App, Focus};
use crate::autocomplete::{Autocomplete, DropdownContent, FieldKind};
use crate::format;
use crate::search::NO_FLIGHTS_MESSAGE;

const SPINNER_FRAMES: [&str; 4] = ["|", "/", "-", "\\"];

/// Screen regions recorded during the last draw.
#[derive(Debug, Default)]
pub struct LayoutMap {
    pub origin: Rect,
    pub destination: Rect,
    pub date: Rect,
    pub explore: Rect,
    /// Field whose dropdown is currently open, if any.
    pub dropdown_field: Option<FieldKind>,
    /// Option index shown in the first visible dropdown row.
    pub dropdown_offset: usize,
    /// One rect per visible option row, in display order.
    pub dropdown_rows: Vec<Rect>,
}

impl LayoutMap {
    /// Option under the cursor, if an open dropdown covers it. The
    /// returned index already includes the dropdown's scroll offset.
    pub fn dropdown_row_at(&self, position: Position) -> Option<(FieldKind, usize)> {
        let field = self.dropdown_field?;
        self.dropdown_rows
            .iter()
            .position(|row| row.contains(position))
            .map(|index| (field, self.dropdown_offset + index))
    }
}

pub fn draw(frame: &mut Frame, app: &mut App) {
    let [header_area, fields_area, results_area, footer_area] = Layout::vertical([
        Constraint::Length(1),
        Constraint::Length(3),
        Constraint::Min(5),
        Constraint::Length(1),
    ])
    .areas(frame.area());

    let [origin_area, destination_area, date_area, explore_area] = Layout::horizontal([
        Constraint::Percentage(30),
        Constraint::Percentage(30),
        Constraint::Percentage(22),
        Constraint::Percentage(18),
    ])
    .areas(fields_area);

    app.layout.origin = origin_area;
    app.layout.destination = destination_area;
    app.layout.date = date_area;
    app.layout.explore = explore_area;
    app.layout.dropdown_field = None;
    app.layout.dropdown_offset = 0;
    app.layout.dropdown_rows.clear();

    draw_header(frame, header_area);
    draw_input(
        frame,
        origin_area,
        "Origin",
        app.origin.input(),
        app.focus == Focus::Origin,
    );
    draw_input(
        frame,
        destination_area,
        "Destination",
        app.destination.input(),
        app.focus == Focus::Destination,
    );
    draw_input(
        frame,
        date_area,
        "Date (YYYY-MM-DD)",
        &app.date_input,
        app.focus == Focus::Date,
    );
    draw_explore(frame, explore_area, app.focus == Focus::Explore);
    draw_results(frame, results_area, app);
    draw_footer(frame, footer_area);

    // Overlays paint last so they sit on top of the base layer.
    match app.focus {
        Focus::Origin => draw_dropdown(
            frame,
            origin_area,
            &app.origin,
            app.highlight,
            &mut app.layout,
        ),
        Focus::Destination => draw_dropdown(
            frame,
            destination_area,
            &app.destination,
            app.highlight,
            &mut app.layout,
        ),
        Focus::Date | Focus::Explore => {}
    }
    if let Some(notice) = &app.notice {
        draw_notice(frame, notice);
    }
}

fn draw_header(frame: &mut Frame, area: Rect) {
    let line = Line::from(vec![
        Span::styled(
            "SKYSCOUT",
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        ),
        Span::raw("   Trip: One way   Cabin: Economy"),
    ]);
    frame.render_widget(Paragraph::new(line), area);
}

fn draw_input(frame: &mut Frame, area: Rect, title: &str, value: &str, focused: bool) {
    let border_style = if focused {
        Style::default().fg(Color::Cyan)
    } else {
        Style::default()
    };
    let block = Block::bordered().title(title).border_style(border_style);
    let inner = block.inner(area);
    frame.render_widget(Paragraph::new(value).block(block), area);
    if focused && inner.width > 0 {
        let offset = (value.chars().count() as u16).min(inner.width.saturating_sub(1));
        frame.set_cursor_position(Position::new(inner.x + offset, inner.y));
    }
}

fn draw_explore(frame: &mut Frame, area: Rect, focused: bool) {
    let style = if focused {
        Style::default()
            .fg(Color::Black)
            .bg(Color::Cyan)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().add_modifier(Modifier::BOLD)
    };
    let button = Paragraph::new("Explore")
        .style(style)
        .alignment(Alignment::Center)
        .block(Block::bordered());
    frame.render_widget(button, area);
}

fn draw_results(frame: &mut Frame, area: Rect, app: &App) {
    let block = Block::bordered().title("Available Flights");
    let inner = block.inner(area);
    frame.render_widget(block, area);

    if app.search.is_loading() {
        let spinner = SPINNER_FRAMES[app.spinner_frame % SPINNER_FRAMES.len()];
        frame.render_widget(
            Paragraph::new(format!("{spinner} Searching flights...")),
            inner,
        );
        return;
    }
    if app.search.results().is_empty() {
        frame.render_widget(Paragraph::new(NO_FLIGHTS_MESSAGE), inner);
        return;
    }

    let rows: Vec<ListItem> = app
        .search
        .results()
        .iter()
        .filter_map(format::itinerary_line)
        .map(|row| {
            ListItem::new(Line::from(vec![
                Span::styled(
                    format!("{:>10}", row.price),
                    Style::default()
                        .fg(Color::Green)
                        .add_modifier(Modifier::BOLD),
                ),
                Span::raw(format!("  {}  {}  ({})", row.times, row.route, row.duration)),
            ]))
        })
        .collect();
    frame.render_widget(List::new(rows), inner);
}

fn draw_footer(frame: &mut Frame, area: Rect) {
    let hints = "Tab: next field | Enter: select / search | Esc: quit";
    frame.render_widget(
        Paragraph::new(hints).style(Style::default().fg(Color::DarkGray)),
        area,
    );
}

/// Paint the autocomplete dropdown under its field and register the
/// visible option rows for mouse hit-testing.
fn draw_dropdown(
    frame: &mut Frame,
    anchor: Rect,
    field: &Autocomplete,
    highlight: usize,
    layout: &mut LayoutMap,
) {
    let Some(content) = field.dropdown_content() else {
        return;
    };
    let screen = frame.area();
    if anchor.bottom() >= screen.bottom() {
        return;
    }
    let rows = match &content {
        DropdownContent::Options(options) => options.len() as u16,
        DropdownContent::Loading | DropdownContent::Message(_) => 1,
    };
    let width = anchor
        .width
        .max(24)
        .min(screen.width.saturating_sub(anchor.x));
    let height = (rows + 2).min(screen.bottom() - anchor.bottom());
    if height < 3 || width < 3 {
        return;
    }
    let popup = Rect::new(anchor.x, anchor.bottom(), width, height);

    frame.render_widget(Clear, popup);
    let block = Block::bordered().title(format!("{} airports", field.kind()));
    let inner = block.inner(popup);
    frame.render_widget(block, popup);

    match content {
        DropdownContent::Loading => {
            frame.render_widget(Paragraph::new("Loading..."), inner);
        }
        DropdownContent::Message(message) => {
            frame.render_widget(
                Paragraph::new(message).style(Style::default().fg(Color::DarkGray)),
                inner,
            );
        }
        DropdownContent::Options(options) => {
            let items: Vec<ListItem> = options
                .iter()
                .map(|option| ListItem::new(option.display_name.as_str()))
                .collect();
            let mut state = ListState::default();
            state.select(Some(highlight.min(options.len().saturating_sub(1))));
            let list = List::new(items)
                .highlight_style(Style::default().add_modifier(Modifier::REVERSED));
            frame.render_stateful_widget(list, inner, &mut state);

            // The render scrolls the list to keep the highlight visible;
            // the rows on screen show the options starting at that offset.
            let offset = state.offset();
            let visible = options
                .len()
                .saturating_sub(offset)
                .min(inner.height as usize);
            layout.dropdown_field = Some(field.kind());
            layout.dropdown_offset = offset;
            layout.dropdown_rows = (0..visible)
                .map(|row| Rect::new(inner.x, inner.y + row as u16, inner.width, 1))
                .collect();
        }
    }
}

fn draw_notice(frame: &mut Frame, notice: &str) {
    let area = centered_rect(frame.area(), 50, 20);
    frame.render_widget(Clear, area);
    let block = Block::bordered()
        .title("Notice")
        .border_style(Style::default().fg(Color::Yellow));
    let text = format!("{notice}\n\nPress any key to continue.");
    let paragraph = Paragraph::new(text)
        .block(block)
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true });
    frame.render_widget(paragraph, area);
}

fn centered_rect(area: Rect, percent_x: u16, percent_y: u16) -> Rect {
    let [_, vertical, _] = Layout::vertical([
        Constraint::Percentage((100 - percent_y) / 2),
        Constraint::Percentage(percent_y),
        Constraint::Percentage((100 - percent_y) / 2),
    ])
    .areas(area);
    let [_, centered, _] = Layout::horizontal([
        Constraint::Percentage((100 - percent_x) / 2),
        Constraint::Percentage(percent_x),
        Constraint::Percentage((100 - percent_x) / 2),
    ])
    .areas(vertical);
    centered
}
