//! UI rendering helpers for the terminal user interface.
//!
//! [`draw`] renders one frame with `ratatui` and returns the screen regions
//! the event loop needs to map mouse input back onto rows and ratios.

use std::str::FromStr;

use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Position, Rect},
    style::{Color, Modifier, Style, Stylize},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Padding, Paragraph},
};

use crate::app::App;
use crate::config::{ControlsSettings, WaveformSettings};
use crate::library::PlaylistId;
use crate::playback::PlayerState;
use crate::waveform::pointer_ratio;

mod waveform;

pub use waveform::WaveformWidget;

const CONTROLS: &[(&str, &str)] = &[
    ("space", "play/pause"),
    ("j/k", "playlist"),
    ("←/→", "library"),
    ("o", "play library"),
    ("h/l", "prev/next"),
    ("enter", "add"),
    ("J/K", "move"),
    ("del", "remove"),
    ("tab", "playlist"),
    ("N/D", "new/delete playlist"),
    ("a", "add files"),
    ("m", "memo"),
    ("X", "delete track"),
    ("I/E", "import/export"),
    ("+/-", "volume"),
    ("q", "quit"),
];

/// Render the controls help text, incorporating scrub seconds.
fn controls_text(scrub_seconds: u64) -> String {
    let mut parts: Vec<String> = CONTROLS
        .iter()
        .map(|(k, v)| format!("[{k}] {v}"))
        .collect();
    parts.insert(5, format!("[H/L] scrub -/+{scrub_seconds}s"));
    parts.join(" | ")
}

/// Parse a configured color, falling back when it is not understood.
pub fn parse_color(s: &str, fallback: Color) -> Color {
    Color::from_str(s.trim()).unwrap_or(fallback)
}

/// A single-line text input shown in place of the status line.
pub struct Prompt<'a> {
    pub label: &'a str,
    pub input: &'a str,
}

/// Screen regions from the last frame, used for mouse hit testing.
#[derive(Debug, Clone, Default)]
pub struct Hitboxes {
    /// Inner area of the waveform panel.
    pub waveform: Rect,
    /// Inner area of the playlist list.
    pub playlist: Rect,
    /// Ordering index shown on each visible playlist row, top first.
    pub playlist_rows: Vec<usize>,
    pub library: Rect,
    pub library_rows: Vec<usize>,
    pub tabs: Vec<(Rect, PlaylistId)>,
}

fn row_at(area: Rect, rows: &[usize], column: u16, row: u16) -> Option<usize> {
    if !area.contains(Position::new(column, row)) {
        return None;
    }
    rows.get(usize::from(row - area.y)).copied()
}

impl Hitboxes {
    pub fn playlist_row_at(&self, column: u16, row: u16) -> Option<usize> {
        row_at(self.playlist, &self.playlist_rows, column, row)
    }

    pub fn library_row_at(&self, column: u16, row: u16) -> Option<usize> {
        row_at(self.library, &self.library_rows, column, row)
    }

    pub fn tab_at(&self, column: u16, row: u16) -> Option<&PlaylistId> {
        self.tabs
            .iter()
            .find(|(r, _)| r.contains(Position::new(column, row)))
            .map(|(_, id)| id)
    }

    pub fn over_waveform(&self, column: u16, row: u16) -> bool {
        self.waveform.contains(Position::new(column, row))
    }

    /// Progress ratio for a pointer at `column`, clamped to the panel so
    /// drags past either edge still land on 0 or 1.
    pub fn waveform_ratio(&self, column: u16) -> f64 {
        let x = f64::from(column) - f64::from(self.waveform.x) + 0.5;
        pointer_ratio(x, f64::from(self.waveform.width))
    }
}

fn bordered(title: &str) -> Block<'_> {
    Block::default()
        .borders(Borders::ALL)
        .title(title)
        .padding(Padding {
            left: 1,
            right: 0,
            top: 0,
            bottom: 0,
        })
}

fn header(frame: &mut Frame, app: &App, area: Rect, hit: &mut Hitboxes) {
    let block = Block::default()
        .borders(Borders::ALL)
        .title(app.settings().ui.header_text.as_str())
        .title_alignment(Alignment::Center);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    if app.playlists().is_empty() {
        frame.render_widget(
            Paragraph::new("no playlists yet, press N to create one").dim(),
            inner,
        );
        return;
    }

    let active = app.active_playlist_id();
    let mut spans = Vec::new();
    let mut x = inner.x;
    for playlist in app.playlists() {
        let label = format!(" {} ", playlist.name);
        let width = u16::try_from(label.chars().count()).unwrap_or(u16::MAX);
        let style = if Some(&playlist.id) == active {
            Style::default().add_modifier(Modifier::REVERSED | Modifier::BOLD)
        } else {
            Style::default()
        };
        hit.tabs.push((
            Rect {
                x,
                y: inner.y,
                width: width.min(inner.right().saturating_sub(x)),
                height: 1,
            },
            playlist.id.clone(),
        ));
        spans.push(Span::styled(label, style));
        spans.push(Span::raw(" "));
        x = x.saturating_add(width + 1);
    }
    frame.render_widget(Paragraph::new(Line::from(spans)), inner);
}

fn now_playing(frame: &mut Frame, app: &App, area: Rect) {
    let placeholder = app.settings().ui.memo_placeholder.as_str();
    let (title, subtitle) = match app.now_playing() {
        Some(t) => (t.name.clone(), t.subtitle(placeholder).to_string()),
        None => ("nothing playing".to_string(), String::new()),
    };
    let state = match app.player_state() {
        PlayerState::Idle => "Stopped",
        PlayerState::Paused => "Paused",
        PlayerState::Playing => "Playing",
    };
    let time = format!(
        "{} / {} • {} • vol {:.0}%",
        app.elapsed_text(),
        app.duration_text(),
        state,
        app.volume() * 100.0
    );

    let lines = vec![
        Line::from(title.bold()),
        Line::from(subtitle.italic().dim()),
        Line::from(time),
    ];
    frame.render_widget(Paragraph::new(lines).block(bordered(" now playing ")), area);
}

fn waveform_panel(frame: &mut Frame, app: &App, area: Rect, hit: &mut Hitboxes) {
    let title = if app.waveform_pending() {
        " waveform (decoding) "
    } else {
        " waveform "
    };
    let block = Block::default().borders(Borders::ALL).title(title);
    let inner = block.inner(area);
    frame.render_widget(block, area);
    hit.waveform = inner;

    let settings: &WaveformSettings = &app.settings().waveform;
    let widget = WaveformWidget::new(app.peaks(), app.progress(), settings.bar_fill)
        .played(parse_color(&settings.played_color, Color::LightRed))
        .unplayed(parse_color(&settings.unplayed_color, Color::DarkGray));
    frame.render_widget(widget, inner);
}

fn marked(text: &str, playing: bool) -> ListItem<'static> {
    if playing {
        ListItem::new(format!("♪ {text}")).bold()
    } else {
        ListItem::new(format!("  {text}"))
    }
}

fn lists(frame: &mut Frame, app: &mut App, area: Rect, hit: &mut Hitboxes) {
    let halves = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
        .split(area);

    let playlist_title = app
        .active_playlist()
        .map(|p| format!(" {} ", p.name))
        .unwrap_or_else(|| " playlist ".to_string());
    let playing_index = app.playing_index();
    let playing_library = app.playing_library_index();

    // Rows are built before the cursors are borrowed mutably.
    let entries: Vec<(usize, ListItem<'static>)> = app
        .playlist_entries()
        .into_iter()
        .map(|(i, t)| (i, marked(&t.name, Some(i) == playing_index)))
        .collect();
    let library: Vec<ListItem<'static>> = app
        .library()
        .iter()
        .enumerate()
        .map(|(i, t)| marked(&t.name, Some(i) == playing_library))
        .collect();
    let library_len = library.len();

    let (library_cursor, playlist_cursor) = app.cursors_mut();

    let playlist_block = Block::default().borders(Borders::ALL).title(playlist_title);
    let playlist_inner = playlist_block.inner(halves[0]);
    let visible = usize::from(playlist_inner.height);
    let selected_row = playlist_cursor
        .index()
        .and_then(|sel| entries.iter().position(|(i, _)| *i == sel));
    let offset = playlist_cursor.scroll_to_row(selected_row, visible);
    hit.playlist = playlist_inner;
    hit.playlist_rows = entries
        .iter()
        .skip(offset)
        .take(visible)
        .map(|(i, _)| *i)
        .collect();

    let mut state = ListState::default()
        .with_offset(offset)
        .with_selected(selected_row);
    let list = List::new(entries.into_iter().map(|(_, item)| item))
        .block(playlist_block)
        .highlight_style(Style::default().add_modifier(Modifier::REVERSED));
    frame.render_stateful_widget(list, halves[0], &mut state);

    let library_block = Block::default().borders(Borders::ALL).title(" library ");
    let library_inner = library_block.inner(halves[1]);
    let visible = usize::from(library_inner.height);
    let offset = library_cursor.scroll_for(visible);
    hit.library = library_inner;
    hit.library_rows = (offset..library_len).take(visible).collect();

    let mut state = ListState::default()
        .with_offset(offset)
        .with_selected(library_cursor.index());
    let list = List::new(library)
        .block(library_block)
        .highlight_style(Style::default().add_modifier(Modifier::REVERSED));
    frame.render_stateful_widget(list, halves[1], &mut state);
}

/// Render the entire UI into `frame` and report where things ended up.
pub fn draw(
    frame: &mut Frame,
    app: &mut App,
    prompt: Option<&Prompt<'_>>,
    controls: &ControlsSettings,
) -> Hitboxes {
    let mut hit = Hitboxes::default();
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(5),
            Constraint::Length(8),
            Constraint::Min(3),
            Constraint::Length(1),
            Constraint::Length(1),
        ])
        .split(frame.area());

    header(frame, app, chunks[0], &mut hit);
    now_playing(frame, app, chunks[1]);
    waveform_panel(frame, app, chunks[2], &mut hit);
    lists(frame, app, chunks[3], &mut hit);

    let status = match prompt {
        Some(p) => Paragraph::new(Line::from(vec![
            Span::styled(format!("{}: ", p.label), Style::default().bold()),
            Span::raw(format!("{}█", p.input)),
        ])),
        None => Paragraph::new(app.status().unwrap_or_default().to_string()).yellow(),
    };
    frame.render_widget(status, chunks[4]);

    let footer = Paragraph::new(controls_text(controls.scrub_seconds)).dim();
    frame.render_widget(footer, chunks[5]);

    hit
}
