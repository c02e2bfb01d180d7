use crate::app::{App, CoreEvent};
use crate::mpris::MprisHandle;

pub fn update_mpris(mpris: &MprisHandle, app: &App) {
    mpris.set_track(app.now_playing(), app.duration());
    mpris.set_playback(app.player_state());
    mpris.set_volume(app.volume());
    mpris.set_position(app.position());
}

/// Refresh the MPRIS snapshot after `events`. Drag updates only move the
/// position; everything else can change metadata.
pub fn apply_events(mpris: &MprisHandle, app: &App, events: &[CoreEvent]) {
    let metadata_changed = events
        .iter()
        .any(|e| !matches!(e, CoreEvent::SeekBegan(_) | CoreEvent::SeekUpdated(_)));
    if metadata_changed {
        update_mpris(mpris, app);
    } else {
        mpris.set_position(app.position());
    }
}
