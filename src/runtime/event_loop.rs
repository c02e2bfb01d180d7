use std::path::PathBuf;
use std::sync::mpsc;
use std::time::Duration;

use crossterm::event::{
    self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseButton, MouseEvent,
    MouseEventKind,
};
use ratatui::{Terminal, backend::CrosstermBackend};
use tracing::{debug, info};

use crate::app::{App, Msg, VOLUME_STEP};
use crate::config;
use crate::library::TrackId;
use crate::mpris::{ControlCmd, MprisHandle};
use crate::playback::Direction;
use crate::runtime::mpris_sync::apply_events;
use crate::ui::{self, Hitboxes, Prompt};
use crate::waveform::WaveformLoader;

/// What a line of typed text will be used for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PromptKind {
    AddPaths,
    Import,
    Export,
    NewPlaylist,
    Memo(TrackId),
}

impl PromptKind {
    fn label(&self) -> &'static str {
        match self {
            PromptKind::AddPaths => "add file or folder",
            PromptKind::Import => "import from",
            PromptKind::Export => "export to",
            PromptKind::NewPlaylist => "new playlist",
            PromptKind::Memo(_) => "memo",
        }
    }
}

/// Destructive actions wait for `y`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Confirm {
    DeletePlaylist(String),
    DeleteTrack(TrackId, String),
    Import(PathBuf),
}

impl Confirm {
    fn question(&self) -> String {
        match self {
            Confirm::DeletePlaylist(name) => format!("delete playlist \"{name}\"? (y/n)"),
            Confirm::DeleteTrack(_, name) => format!("delete \"{name}\" from the library? (y/n)"),
            Confirm::Import(path) => {
                format!("replace the whole library with {}? (y/n)", path.display())
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Mode {
    #[default]
    Normal,
    Prompt { kind: PromptKind, input: String },
    Confirm(Confirm),
}

/// A mouse gesture in progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Drag {
    Seek,
    /// Pressed on the playlist row holding ordering index `from`.
    Row { from: usize },
}

/// State tracked by the runtime event loop across iterations.
#[derive(Debug, Default)]
pub struct EventLoopState {
    pub mode: Mode,
    /// Screen regions of the last drawn frame.
    pub hit: Hitboxes,
    pub drag: Option<Drag>,
    confirm_text: String,
}

impl EventLoopState {
    pub fn new() -> Self {
        Self::default()
    }

    fn prompt(&mut self) -> Option<Prompt<'_>> {
        match &self.mode {
            Mode::Normal => None,
            Mode::Prompt { kind, input } => Some(Prompt {
                label: kind.label(),
                input,
            }),
            Mode::Confirm(c) => {
                self.confirm_text = c.question();
                Some(Prompt {
                    label: &self.confirm_text,
                    input: "",
                })
            }
        }
    }
}

/// Hand queued decode jobs to the worker and feed finished ones back.
fn pump_waveforms(app: &mut App, loader: &WaveformLoader) {
    for job in app.take_decode_jobs() {
        let (track_id, generation) = (job.track_id.clone(), job.generation);
        if !loader.submit(job) {
            app.update(Msg::WaveformDecoded {
                track_id,
                generation,
                peaks: None,
            });
        }
    }
    for done in loader.drain() {
        app.update(Msg::WaveformDecoded {
            track_id: done.track_id,
            generation: done.generation,
            peaks: done.result.ok(),
        });
    }
}

/// Main terminal event loop: input, drawing, the waveform worker and MPRIS.
/// Returns `Ok(())` when shutdown is requested.
pub fn run(
    terminal: &mut Terminal<CrosstermBackend<std::io::Stdout>>,
    settings: &config::Settings,
    app: &mut App,
    loader: &WaveformLoader,
    mpris: &MprisHandle,
    control_rx: &mpsc::Receiver<ControlCmd>,
    state: &mut EventLoopState,
) -> anyhow::Result<()> {
    let tick = Duration::from_millis(settings.audio.tick_ms.max(1));
    loop {
        app.update(Msg::Tick);
        pump_waveforms(app, loader);

        let events = app.take_events();
        if !events.is_empty() {
            debug!(?events, "core events");
        }
        apply_events(mpris, app, &events);

        let prompt = state.prompt();
        let mut hit = Hitboxes::default();
        terminal.draw(|f| hit = ui::draw(f, app, prompt.as_ref(), &settings.controls))?;
        state.hit = hit;

        while let Ok(cmd) = control_rx.try_recv() {
            if handle_control_cmd(cmd, app) {
                info!("quit requested over MPRIS");
                return Ok(());
            }
        }

        if event::poll(tick)? {
            let quit = match event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => {
                    handle_key_event(key, settings, app, state)
                }
                Event::Mouse(mouse) => {
                    handle_mouse_event(mouse, app, state);
                    false
                }
                Event::FocusLost => {
                    cancel_drag(app, state);
                    false
                }
                _ => false,
            };
            if quit {
                return Ok(());
            }
        }
    }
}

/// Map an MPRIS command onto the session. Returns `true` to quit.
pub fn handle_control_cmd(cmd: ControlCmd, app: &mut App) -> bool {
    debug!(?cmd, "control command");
    let msg = match cmd {
        ControlCmd::Quit => return true,
        ControlCmd::Play => Msg::Play,
        ControlCmd::Pause => Msg::Pause,
        ControlCmd::PlayPause => Msg::TogglePlay,
        ControlCmd::Stop => Msg::Stop,
        ControlCmd::Next => Msg::Advance(Direction::Next),
        ControlCmd::Previous => Msg::Advance(Direction::Prev),
        ControlCmd::Seek(offset) => {
            let delta = Duration::from_micros(offset.unsigned_abs());
            let position = app.position();
            let to = if offset < 0 {
                position.saturating_sub(delta)
            } else {
                position.saturating_add(delta)
            };
            Msg::SeekTo(to)
        }
        ControlCmd::SetPosition(to) => Msg::SeekTo(to),
        ControlCmd::SetVolume(v) => Msg::SetVolume(v),
    };
    app.update(msg);
    false
}

/// Track the memo prompt edits: the playlist selection, else the library
/// selection.
fn memo_target(app: &App) -> Option<(TrackId, String)> {
    let from_playlist = app.playlist_cursor().index().and_then(|i| {
        app.active_playlist()
            .and_then(|p| p.track_ids.get(i))
            .and_then(|id| app.track(id))
    });
    let from_library = || {
        app.library_cursor()
            .index()
            .and_then(|i| app.library().get(i))
    };
    from_playlist
        .or_else(from_library)
        .map(|t| (t.id.clone(), t.memo.clone()))
}

fn open_prompt(state: &mut EventLoopState, kind: PromptKind, input: String) {
    state.mode = Mode::Prompt { kind, input };
}

fn submit_prompt(kind: PromptKind, input: String, app: &mut App, state: &mut EventLoopState) {
    let text = input.trim();
    match kind {
        PromptKind::Memo(track_id) => app.update(Msg::SetMemo {
            track_id,
            memo: input.trim_end().to_string(),
        }),
        _ if text.is_empty() => {}
        PromptKind::AddPaths => app.update(Msg::Ingest(vec![PathBuf::from(text)])),
        PromptKind::Import => {
            state.mode = Mode::Confirm(Confirm::Import(PathBuf::from(text)));
        }
        PromptKind::Export => app.update(Msg::Export(PathBuf::from(text))),
        PromptKind::NewPlaylist => app.update(Msg::CreatePlaylist(text.to_string())),
    }
}

fn handle_prompt_key(key: KeyEvent, app: &mut App, state: &mut EventLoopState) {
    let Mode::Prompt { input, .. } = &mut state.mode else {
        return;
    };
    match key.code {
        KeyCode::Esc => state.mode = Mode::Normal,
        KeyCode::Backspace => {
            input.pop();
        }
        KeyCode::Char('u') if key.modifiers.contains(KeyModifiers::CONTROL) => input.clear(),
        KeyCode::Char(c) if !c.is_control() => input.push(c),
        KeyCode::Enter => {
            if let Mode::Prompt { kind, input } = std::mem::take(&mut state.mode) {
                submit_prompt(kind, input, app, state);
            }
        }
        _ => {}
    }
}

fn handle_confirm_key(key: KeyEvent, app: &mut App, state: &mut EventLoopState) {
    let Mode::Confirm(confirm) = std::mem::take(&mut state.mode) else {
        return;
    };
    if !matches!(key.code, KeyCode::Char('y') | KeyCode::Char('Y')) {
        return;
    }
    match confirm {
        Confirm::DeletePlaylist(_) => app.update(Msg::DeleteActivePlaylist),
        Confirm::DeleteTrack(id, _) => app.update(Msg::DeleteTrack(id)),
        Confirm::Import(path) => app.update(Msg::Import(path)),
    }
}

/// Handle one key press. Returns `true` to quit.
pub fn handle_key_event(
    key: KeyEvent,
    settings: &config::Settings,
    app: &mut App,
    state: &mut EventLoopState,
) -> bool {
    match state.mode {
        Mode::Prompt { .. } => {
            handle_prompt_key(key, app, state);
            return false;
        }
        Mode::Confirm(_) => {
            handle_confirm_key(key, app, state);
            return false;
        }
        Mode::Normal => {}
    }

    let scrub = i64::try_from(settings.controls.scrub_seconds).unwrap_or(i64::MAX);
    let msg = match key.code {
        KeyCode::Char('q') => return true,
        KeyCode::Char(' ') => Msg::PlaySelected,
        KeyCode::Up | KeyCode::Char('k') => Msg::MovePlaylistCursor(-1),
        KeyCode::Down | KeyCode::Char('j') => Msg::MovePlaylistCursor(1),
        KeyCode::Left => Msg::MoveLibraryCursor(-1),
        KeyCode::Right => Msg::MoveLibraryCursor(1),
        KeyCode::Char('o') => match app.library_cursor().index() {
            Some(i) => Msg::PlayLibrary(i),
            None => return false,
        },
        KeyCode::Enter => Msg::AddSelectedToPlaylist,
        KeyCode::Char('l') => Msg::Advance(Direction::Next),
        KeyCode::Char('h') => Msg::Advance(Direction::Prev),
        KeyCode::Char('L') => Msg::ScrubBy(scrub),
        KeyCode::Char('H') => Msg::ScrubBy(-scrub),
        KeyCode::Char('J') => Msg::MoveSelected(1),
        KeyCode::Char('K') => Msg::MoveSelected(-1),
        KeyCode::Char('+') | KeyCode::Char('=') => Msg::AdjustVolume(VOLUME_STEP),
        KeyCode::Char('-') => Msg::AdjustVolume(-VOLUME_STEP),
        KeyCode::Backspace | KeyCode::Delete => Msg::RemoveSelectedFromPlaylist,
        KeyCode::Tab => Msg::CyclePlaylist(1),
        KeyCode::BackTab => Msg::CyclePlaylist(-1),
        KeyCode::Char('s') => Msg::Stop,
        KeyCode::Esc => {
            app.clear_status();
            return false;
        }
        KeyCode::Char('N') => {
            open_prompt(state, PromptKind::NewPlaylist, String::new());
            return false;
        }
        KeyCode::Char('D') => {
            if let Some(p) = app.active_playlist() {
                state.mode = Mode::Confirm(Confirm::DeletePlaylist(p.name.clone()));
            }
            return false;
        }
        KeyCode::Char('a') => {
            open_prompt(state, PromptKind::AddPaths, String::new());
            return false;
        }
        KeyCode::Char('m') => {
            if let Some((id, memo)) = memo_target(app) {
                open_prompt(state, PromptKind::Memo(id), memo);
            }
            return false;
        }
        KeyCode::Char('X') => {
            let target = app
                .library_cursor()
                .index()
                .and_then(|i| app.library().get(i))
                .map(|t| (t.id.clone(), t.name.clone()));
            if let Some((id, name)) = target {
                state.mode = Mode::Confirm(Confirm::DeleteTrack(id, name));
            }
            return false;
        }
        KeyCode::Char('I') => {
            open_prompt(state, PromptKind::Import, String::new());
            return false;
        }
        KeyCode::Char('E') => {
            open_prompt(state, PromptKind::Export, "sonata-export.json".to_string());
            return false;
        }
        _ => return false,
    };
    app.update(msg);
    false
}

/// A lost pointer ends the gesture where it was.
fn cancel_drag(app: &mut App, state: &mut EventLoopState) {
    if state.drag.take() == Some(Drag::Seek) {
        app.update(Msg::SeekCancel);
    }
}

pub fn handle_mouse_event(mouse: MouseEvent, app: &mut App, state: &mut EventLoopState) {
    if state.mode != Mode::Normal {
        return;
    }
    let (column, row) = (mouse.column, mouse.row);
    match mouse.kind {
        MouseEventKind::Down(MouseButton::Left) => {
            cancel_drag(app, state);
            if state.hit.over_waveform(column, row) {
                app.update(Msg::SeekBegin(state.hit.waveform_ratio(column)));
                if app.is_seeking() {
                    state.drag = Some(Drag::Seek);
                }
            } else if let Some(index) = state.hit.playlist_row_at(column, row) {
                app.update(Msg::SelectPlaylistRow(index));
                state.drag = Some(Drag::Row { from: index });
            } else if let Some(index) = state.hit.library_row_at(column, row) {
                app.update(Msg::PlayLibrary(index));
            } else if let Some(id) = state.hit.tab_at(column, row).cloned() {
                app.update(Msg::ActivatePlaylist(id));
            }
        }
        MouseEventKind::Drag(MouseButton::Left) => {
            if state.drag == Some(Drag::Seek) {
                app.update(Msg::SeekUpdate(state.hit.waveform_ratio(column)));
            }
        }
        MouseEventKind::Up(MouseButton::Left) => match state.drag.take() {
            Some(Drag::Seek) => {
                app.update(Msg::SeekUpdate(state.hit.waveform_ratio(column)));
                app.update(Msg::SeekCommit);
            }
            Some(Drag::Row { from }) => match state.hit.playlist_row_at(column, row) {
                Some(to) if to != from => app.update(Msg::Reorder { from, to }),
                Some(_) => app.update(Msg::PlayPlaylist(from)),
                None => {}
            },
            None => {}
        },
        _ => {}
    }
}
