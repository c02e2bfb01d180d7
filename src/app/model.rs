//! The application session: every controller and view-facing piece of state
//! in one struct, with read accessors for the UI and runtime.

use std::collections::HashMap;
use std::time::Duration;

use tracing::warn;

use crate::config::Settings;
use crate::library::{Playlist, PlaylistId, Track, TrackId};
use crate::playback::{Origin, PlaybackController, PlaybackSink, PlayerState};
use crate::seek::SeekController;
use crate::selection::ListCursor;
use crate::store::{Prefs, PrefsFile, RecordStore};
use crate::waveform::{DecodeJob, Peaks, WaveformCache};

use super::msg::CoreEvent;

/// What the waveform panel shows and which track it is waiting for.
#[derive(Debug, Default)]
pub struct WaveformView {
    pub cache: WaveformCache,
    /// Track whose peaks should be displayed. Results for any other id are
    /// cached but not shown.
    pub target: Option<TrackId>,
    pub peaks: Option<Peaks>,
}

pub struct App {
    pub(super) store: Box<dyn RecordStore>,
    pub(super) prefs_file: PrefsFile,
    pub(super) prefs: Prefs,
    pub(super) settings: Settings,

    /// Library tracks, oldest first.
    pub(super) library: Vec<Track>,
    pub(super) library_index: HashMap<TrackId, usize>,
    /// Playlists, oldest first.
    pub(super) playlists: Vec<Playlist>,
    pub(super) active_playlist: Option<PlaylistId>,

    pub(super) library_cursor: ListCursor,
    pub(super) playlist_cursor: ListCursor,

    pub(super) playback: PlaybackController,
    pub(super) seek: SeekController,
    pub(super) waveform: WaveformView,
    pub(super) decode_outbox: Vec<DecodeJob>,

    pub(super) volume: f32,
    pub(super) events: Vec<CoreEvent>,
    pub(super) status: Option<String>,
}

impl App {
    /// Build the session and load the library from `store`.
    ///
    /// Preferences are read once here: the last active playlist and the last
    /// volume (clamped, ignored when not finite).
    pub fn new(
        store: Box<dyn RecordStore>,
        prefs_file: PrefsFile,
        sink: Box<dyn PlaybackSink>,
        settings: Settings,
    ) -> Self {
        let prefs = prefs_file.load();
        let volume = prefs
            .volume
            .filter(|v| v.is_finite())
            .map(|v| v.clamp(0.0, 1.0))
            .unwrap_or(settings.audio.default_volume);

        let mut playback = PlaybackController::new(sink);
        playback.set_volume(volume);

        let mut app = Self {
            store,
            prefs_file,
            active_playlist: prefs.active_playlist_id.clone(),
            prefs,
            settings,
            library: Vec::new(),
            library_index: HashMap::new(),
            playlists: Vec::new(),
            library_cursor: ListCursor::default(),
            playlist_cursor: ListCursor::default(),
            playback,
            seek: SeekController::new(),
            waveform: WaveformView::default(),
            decode_outbox: Vec::new(),
            volume,
            events: Vec::new(),
            status: None,
        };
        app.reload();
        app.events.clear();
        app
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn library(&self) -> &[Track] {
        &self.library
    }

    pub fn playlists(&self) -> &[Playlist] {
        &self.playlists
    }

    pub fn active_playlist_id(&self) -> Option<&PlaylistId> {
        self.active_playlist.as_ref()
    }

    pub fn active_playlist(&self) -> Option<&Playlist> {
        let id = self.active_playlist.as_ref()?;
        self.playlists.iter().find(|p| &p.id == id)
    }

    pub fn track(&self, id: &TrackId) -> Option<&Track> {
        self.library_index.get(id).and_then(|i| self.library.get(*i))
    }

    /// Entries of the active playlist that resolve to a track, with their
    /// index in the ordering. Dangling ids are skipped.
    pub fn playlist_entries(&self) -> Vec<(usize, &Track)> {
        self.active_playlist()
            .map(|p| {
                p.track_ids
                    .iter()
                    .enumerate()
                    .filter_map(|(i, id)| self.track(id).map(|t| (i, t)))
                    .collect()
            })
            .unwrap_or_default()
    }

    pub(super) fn active_len(&self) -> usize {
        self.active_playlist().map_or(0, |p| p.track_ids.len())
    }

    pub(super) fn entry_playable(&self, index: usize) -> bool {
        self.active_playlist()
            .and_then(|p| p.track_ids.get(index))
            .is_some_and(|id| self.track(id).is_some())
    }

    pub fn library_cursor(&self) -> &ListCursor {
        &self.library_cursor
    }

    pub fn playlist_cursor(&self) -> &ListCursor {
        &self.playlist_cursor
    }

    /// Mutable cursors for the renderer, which owns scrolling.
    pub fn cursors_mut(&mut self) -> (&mut ListCursor, &mut ListCursor) {
        (&mut self.library_cursor, &mut self.playlist_cursor)
    }

    /// Index of the playing entry in the active playlist, if playback came
    /// from it.
    pub fn playing_index(&self) -> Option<usize> {
        let active = self.active_playlist.as_ref()?;
        self.playback.session().index_in(active)
    }

    pub fn playing_library_index(&self) -> Option<usize> {
        self.playback.session().library_index()
    }

    pub fn current_track_id(&self) -> Option<&TrackId> {
        self.playback.current_track()
    }

    pub fn now_playing(&self) -> Option<&Track> {
        self.current_track_id().and_then(|id| self.track(id))
    }

    pub fn player_state(&self) -> PlayerState {
        self.playback.state()
    }

    /// Ratio the waveform should be split at.
    pub fn progress(&self) -> f64 {
        self.seek.display_ratio()
    }

    pub fn is_seeking(&self) -> bool {
        self.seek.is_seeking()
    }

    pub fn elapsed_text(&self) -> String {
        self.seek.elapsed_text()
    }

    pub fn duration_text(&self) -> String {
        self.seek.duration_text()
    }

    pub fn position(&self) -> Duration {
        self.playback.position()
    }

    pub fn duration(&self) -> Option<Duration> {
        self.seek.duration()
    }

    pub fn peaks(&self) -> Option<&[f32]> {
        self.waveform.peaks.as_deref()
    }

    /// Whether the displayed track's peaks are still being decoded.
    pub fn waveform_pending(&self) -> bool {
        self.waveform
            .target
            .as_ref()
            .is_some_and(|id| self.waveform.cache.is_pending(id))
    }

    pub fn waveform_cache(&self) -> &WaveformCache {
        &self.waveform.cache
    }

    pub fn volume(&self) -> f32 {
        self.volume
    }

    pub fn status(&self) -> Option<&str> {
        self.status.as_deref()
    }

    pub fn set_status(&mut self, status: impl Into<String>) {
        self.status = Some(status.into());
    }

    pub fn clear_status(&mut self) {
        self.status = None;
    }

    /// Events produced since the last call.
    pub fn take_events(&mut self) -> Vec<CoreEvent> {
        std::mem::take(&mut self.events)
    }

    /// Decode jobs the runtime should hand to the waveform worker.
    pub fn take_decode_jobs(&mut self) -> Vec<DecodeJob> {
        std::mem::take(&mut self.decode_outbox)
    }

    pub(super) fn save_prefs(&mut self) {
        self.prefs.active_playlist_id = self.active_playlist.clone();
        self.prefs.volume = Some(self.volume);
        if let Err(e) = self.prefs_file.save(&self.prefs) {
            warn!(error = %e, "cannot save preferences");
        }
    }

    /// Re-read playlists and tracks from the store and re-validate the
    /// active playlist and both cursors. Storage failures leave the
    /// affected list empty.
    pub fn reload(&mut self) {
        let mut playlists = self.store.get_all_playlists().unwrap_or_else(|e| {
            warn!(error = %e, "cannot read playlists");
            self.status = Some(format!("storage unavailable: {e}"));
            Vec::new()
        });
        playlists.sort_by_key(|p| p.created_at);

        let mut library = self.store.get_all_tracks().unwrap_or_else(|e| {
            warn!(error = %e, "cannot read tracks");
            self.status = Some(format!("storage unavailable: {e}"));
            Vec::new()
        });
        library.sort_by_key(|t| t.created_at);

        self.library_index = library
            .iter()
            .enumerate()
            .map(|(i, t)| (t.id.clone(), i))
            .collect();
        self.library = library;
        self.playlists = playlists;

        let active_exists = self
            .active_playlist
            .as_ref()
            .is_some_and(|id| self.playlists.iter().any(|p| &p.id == id));
        if !active_exists {
            let fallback = self.playlists.first().map(|p| p.id.clone());
            if fallback != self.active_playlist {
                self.active_playlist = fallback;
                self.save_prefs();
            }
        }

        self.library_cursor.reconcile(self.library.len(), None);
        self.refresh_playlist_view();
        self.events.push(CoreEvent::LibraryReloaded);
    }

    /// Re-resolve the playing entry against the active playlist and
    /// re-validate the playlist cursor.
    pub(super) fn refresh_playlist_view(&mut self) {
        let located = match (&self.active_playlist, self.playback.current_track()) {
            (Some(active), Some(current)) => self
                .playlists
                .iter()
                .find(|p| &p.id == active)
                .and_then(|p| p.position_of(current))
                .map(|i| (active.clone(), i)),
            _ => None,
        };

        let from_playlist = matches!(
            self.playback.session().origin,
            Some(Origin::Playlist { .. })
        );
        if from_playlist {
            match located {
                Some((playlist, index)) => self.playback.retarget(playlist, index),
                None => {
                    let stale = self
                        .active_playlist
                        .as_ref()
                        .is_some_and(|a| self.playback.session().index_in(a).is_some());
                    if stale {
                        self.playback.detach_origin();
                    }
                }
            }
        }

        let len = self.active_len();
        let fallback = self.playing_index();
        self.playlist_cursor.reconcile(len, fallback);
    }
}
