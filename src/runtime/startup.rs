use anyhow::Context;
use tracing::info;

use crate::app::App;
use crate::audio::AudioPlayer;
use crate::config::Settings;
use crate::store::{FileStore, PrefsFile};

/// Records and payloads live under `<data_dir>/library`.
pub fn open_store(settings: &Settings) -> anyhow::Result<FileStore> {
    let root = settings.data_dir().join("library");
    FileStore::open(&root).with_context(|| format!("cannot open library at {}", root.display()))
}

pub fn prefs_file(settings: &Settings) -> PrefsFile {
    PrefsFile::new(&settings.data_dir())
}

/// Open storage, start the audio thread and load the library into a new
/// session.
pub fn build_app(settings: &Settings) -> anyhow::Result<App> {
    let store = open_store(settings)?;
    let player = AudioPlayer::new(settings.audio.default_volume);

    let mut app = App::new(
        Box::new(store),
        prefs_file(settings),
        Box::new(player),
        settings.clone(),
    );
    info!(
        tracks = app.library().len(),
        playlists = app.playlists().len(),
        "library loaded"
    );
    if app.status().is_none() && app.library().is_empty() {
        app.set_status("library is empty, press a to add files");
    }
    Ok(app)
}
