mod app;
mod audio;
mod config;
mod library;
mod mpris;
mod playback;
mod runtime;
mod seek;
mod selection;
mod store;
mod transfer;
mod ui;
mod waveform;

fn main() -> anyhow::Result<()> {
    let settings = runtime::load_settings();
    runtime::init_logging(&settings.data_dir());

    let command = runtime::parse_args(std::env::args().skip(1))?;
    runtime::run_command(command, &settings)
}
