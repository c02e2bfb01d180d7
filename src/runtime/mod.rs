use std::sync::mpsc;

use anyhow::Context;
use crossterm::event::{DisableFocusChange, DisableMouseCapture, EnableFocusChange, EnableMouseCapture};
use crossterm::execute;
use crossterm::terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode};
use ratatui::{Terminal, backend::CrosstermBackend};
use tracing::info;

use crate::config::Settings;
use crate::mpris::ControlCmd;
use crate::waveform::WaveformLoader;

mod commands;
mod event_loop;
mod logging;
mod mpris_sync;
mod settings;
mod startup;

pub use commands::{Command, parse_args, run_command};
pub use logging::init_logging;
pub use settings::load_settings;

/// Run the interactive player until the user quits.
pub fn run(settings: &Settings) -> anyhow::Result<()> {
    let mut app = startup::build_app(settings)?;
    let loader = WaveformLoader::spawn();

    let (control_tx, control_rx) = mpsc::channel::<ControlCmd>();
    let mpris = crate::mpris::spawn_mpris(control_tx);
    mpris_sync::update_mpris(&mpris, &app);

    enable_raw_mode().context("cannot enable raw mode")?;
    let mut stdout = std::io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture, EnableFocusChange)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;
    info!("terminal ready");

    let mut state = event_loop::EventLoopState::new();
    let run_result = event_loop::run(
        &mut terminal,
        settings,
        &mut app,
        &loader,
        &mpris,
        &control_rx,
        &mut state,
    );

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        DisableFocusChange,
        DisableMouseCapture,
        LeaveAlternateScreen
    )?;
    terminal.show_cursor()?;

    run_result
}
