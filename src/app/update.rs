//! The single state-transition function and its handlers.

use std::path::{Path, PathBuf};
use std::time::Duration;

use tracing::{debug, info, warn};

use crate::library::{self, Playlist, PlaylistId, TrackId};
use crate::playback::{Advance, Direction, Origin, PlayerState, Toggle, plan_advance};
use crate::selection::{follow_index, reorder};
use crate::transfer::{apply_import, read_import, write_export};
use crate::waveform::{DecodeJob, Finish, Lookup};

use super::model::App;
use super::msg::{CoreEvent, Msg};

/// Step used by the `+` / `-` keys.
pub const VOLUME_STEP: f32 = 0.05;

impl App {
    /// Apply one message. Expected failures (storage, decode, bad gestures)
    /// end in a fallback state and a status line, never an error.
    pub fn update(&mut self, msg: Msg) {
        match msg {
            Msg::Tick => self.tick(),

            Msg::PlayLibrary(index) => self.play_library_index(index),
            Msg::PlayPlaylist(index) => {
                self.play_playlist_index(index);
            }
            Msg::PlaySelected => self.play_selected(),
            Msg::TogglePlay => self.toggle_play(),
            Msg::Play => {
                if self.playback.state() == PlayerState::Idle {
                    self.advance(Direction::Next);
                } else {
                    self.playback.play();
                    self.state_changed();
                }
            }
            Msg::Pause => {
                self.playback.pause();
                self.state_changed();
            }
            Msg::Stop => self.clear_playback(),
            Msg::Advance(dir) => self.advance(dir),

            Msg::SeekBegin(ratio) => {
                self.seek.begin_seek(ratio);
                if self.seek.is_seeking() {
                    self.events.push(CoreEvent::SeekBegan(self.seek.seek_ratio()));
                }
            }
            Msg::SeekUpdate(ratio) => {
                if self.seek.is_seeking() {
                    self.seek.update_seek(ratio);
                    self.events
                        .push(CoreEvent::SeekUpdated(self.seek.seek_ratio()));
                }
            }
            Msg::SeekCommit => self.commit_seek(false),
            Msg::SeekCancel => self.commit_seek(true),
            Msg::SeekTo(to) => self.seek_to(to),
            Msg::ScrubBy(secs) => self.scrub_by(secs),

            Msg::MovePlaylistCursor(delta) => self.move_playlist_cursor(delta),
            Msg::MoveLibraryCursor(delta) => {
                self.library_cursor.move_by(delta, self.library.len(), None);
            }
            Msg::SelectPlaylistRow(index) => {
                let len = self.active_len();
                self.playlist_cursor.set_selected(index, len, false);
            }
            Msg::SelectLibraryRow(index) => {
                self.library_cursor
                    .set_selected(index, self.library.len(), false);
            }
            Msg::Reorder { from, to } => self.reorder(from, to),
            Msg::MoveSelected(delta) => self.move_selected(delta),

            Msg::WaveformDecoded {
                track_id,
                generation,
                peaks,
            } => self.waveform_decoded(track_id, generation, peaks),

            Msg::AddSelectedToPlaylist => self.add_selected_to_playlist(),
            Msg::RemoveSelectedFromPlaylist => self.remove_selected_from_playlist(),
            Msg::SetMemo { track_id, memo } => self.set_memo(&track_id, memo),
            Msg::DeleteTrack(id) => self.delete_track(&id),
            Msg::Ingest(paths) => self.ingest(&paths),

            Msg::CreatePlaylist(name) => self.create_playlist(&name),
            Msg::DeleteActivePlaylist => self.delete_active_playlist(),
            Msg::ActivatePlaylist(id) => self.activate_playlist(id),
            Msg::CyclePlaylist(delta) => self.cycle_playlist(delta),

            Msg::Import(path) => self.import(&path),
            Msg::Export(path) => self.export(&path),

            Msg::SetVolume(v) => self.set_volume(v),
            Msg::AdjustVolume(d) => self.set_volume(self.volume + d),
            Msg::Reload => self.reload(),
        }
    }

    fn state_changed(&mut self) {
        self.events
            .push(CoreEvent::PlaybackStateChanged(self.playback.state()));
    }

    fn tick(&mut self) {
        if let Some(err) = self.playback.take_error() {
            warn!(error = %err, "playback failed");
            self.status = Some(format!("cannot play: {err}"));
            self.state_changed();
        }
        if self.playback.take_finished() {
            self.track_ended();
        }
        let position = self.playback.position();
        let duration = self.playback.duration();
        self.seek.on_tick(position, duration);
    }

    fn track_ended(&mut self) {
        debug!("track ended");
        let before = self.playback.session().handle;
        self.advance(Direction::Next);
        // Nothing new was loaded: show the finished track as paused.
        if self.playback.session().handle == before
            && self.playback.state() == PlayerState::Playing
        {
            self.playback.stop_at_end();
            self.state_changed();
        }
    }

    fn load_payload(&mut self, id: &TrackId) -> Option<Vec<u8>> {
        match self.store.load_payload(id) {
            Ok(Some(payload)) => Some(payload),
            Ok(None) => {
                warn!(track = %id, "track has no stored audio");
                self.status = Some("this track has no stored audio".to_string());
                None
            }
            Err(e) => {
                warn!(track = %id, error = %e, "cannot read audio");
                self.status = Some(format!("storage unavailable: {e}"));
                None
            }
        }
    }

    /// Bind `id` to the sink and reset progress and waveform for it.
    fn start_track(&mut self, id: TrackId, origin: Origin) -> bool {
        let Some(hint) = self.track(&id).map(|t| t.duration_hint()) else {
            return false;
        };
        let Some(payload) = self.load_payload(&id) else {
            return false;
        };

        self.seek.reset();
        self.request_waveform(&id, &payload);
        self.playback
            .load_and_play(id.clone(), payload, hint, origin.clone());
        self.seek.on_tick(Duration::ZERO, self.playback.duration());

        info!(track = %id, "playing");
        self.events.push(CoreEvent::TrackSelected {
            track_id: id,
            origin,
        });
        self.state_changed();
        true
    }

    /// Show cached peaks for `id`, or queue a decode unless one is already
    /// running for it.
    fn request_waveform(&mut self, id: &TrackId, payload: &[u8]) {
        self.waveform.target = Some(id.clone());
        match self.waveform.cache.request(id) {
            Lookup::Hit(peaks) => self.waveform.peaks = Some(peaks),
            Lookup::Started => {
                self.waveform.peaks = None;
                self.decode_outbox.push(DecodeJob {
                    track_id: id.clone(),
                    generation: self.waveform.cache.generation(),
                    payload: payload.to_vec(),
                    peak_count: self.settings.waveform.peak_count,
                });
            }
            Lookup::Pending => self.waveform.peaks = None,
        }
    }

    fn waveform_decoded(&mut self, id: TrackId, generation: u64, peaks: Option<Vec<f32>>) {
        let shown = match self.waveform.cache.finish(&id, generation, peaks) {
            Finish::Stored(peaks) => Some(peaks),
            Finish::Failed => None,
            Finish::Stale => {
                debug!(track = %id, generation, "waveform from replaced data dropped");
                return;
            }
        };
        if self.waveform.target.as_ref() == Some(&id) {
            self.waveform.peaks = shown;
        } else {
            debug!(track = %id, "stale waveform kept in cache only");
        }
    }

    fn play_library_index(&mut self, index: usize) {
        let Some(id) = self.library.get(index).map(|t| t.id.clone()) else {
            return;
        };
        if self.start_track(id, Origin::Library { index }) {
            self.playlist_cursor.clear();
            self.library_cursor
                .set_selected(index, self.library.len(), true);
        }
    }

    fn play_playlist_index(&mut self, index: usize) -> bool {
        let Some(playlist) = self.active_playlist().map(|p| p.id.clone()) else {
            return false;
        };
        let Some(id) = self
            .active_playlist()
            .and_then(|p| p.track_ids.get(index))
            .cloned()
        else {
            return false;
        };
        if !self.start_track(id, Origin::Playlist { playlist, index }) {
            return false;
        }
        self.library_cursor.clear();
        let len = self.active_len();
        self.playlist_cursor.set_selected(index, len, true);
        true
    }

    fn play_selected(&mut self) {
        if self.active_len() > 0 {
            if let Some(selected) = self.playlist_cursor.index() {
                if self.playing_index() != Some(selected) {
                    self.play_playlist_index(selected);
                    return;
                }
            }
        }
        self.toggle_play();
    }

    fn toggle_play(&mut self) {
        match self.playback.toggle() {
            Toggle::NeedsAdvance => self.advance(Direction::Next),
            Toggle::Now(_) => self.state_changed(),
        }
    }

    fn advance(&mut self, dir: Direction) {
        let len = self.active_len();
        let current = self.playing_index();
        let plan = plan_advance(len, current, dir, |i| self.entry_playable(i));
        debug!(?dir, ?current, ?plan, "advance");
        match plan {
            Advance::Play(index) => {
                if !self.play_playlist_index(index) && dir == Direction::Next {
                    self.playback.stop_at_end();
                    self.state_changed();
                }
            }
            Advance::Stop => {
                self.playback.stop_at_end();
                self.state_changed();
            }
            Advance::Stay => {}
        }
    }

    /// Release the gesture. Cancel and release both apply the dragged ratio.
    fn commit_seek(&mut self, cancelled: bool) {
        let target = if cancelled {
            self.seek.cancel_seek()
        } else {
            self.seek.commit_seek()
        };
        if let Some(to) = target {
            self.playback.seek(to);
            self.events.push(CoreEvent::SeekCommitted(to));
        }
    }

    fn seek_to(&mut self, to: Duration) {
        if self.playback.state() == PlayerState::Idle || self.seek.is_seeking() {
            return;
        }
        let to = match self.seek.duration() {
            Some(d) => to.min(d),
            None => to,
        };
        self.playback.seek(to);
        self.seek.on_tick(to, self.playback.duration());
        self.events.push(CoreEvent::SeekCommitted(to));
    }

    fn scrub_by(&mut self, secs: i64) {
        let delta = Duration::from_secs(secs.unsigned_abs());
        let position = self.playback.position();
        let target = if secs < 0 {
            position.saturating_sub(delta)
        } else {
            position.saturating_add(delta)
        };
        self.seek_to(target);
    }

    fn move_playlist_cursor(&mut self, delta: isize) {
        let len = self.active_len();
        if len == 0 {
            return;
        }
        let before = self.playlist_cursor.index();
        let fallback = self.playing_index();
        self.playlist_cursor.move_by(delta, len, fallback);

        // Entries that do not resolve to a track are not shown; step over them.
        let step = delta.signum();
        while let Some(i) = self.playlist_cursor.index() {
            if self.entry_playable(i) || step == 0 {
                break;
            }
            self.playlist_cursor.move_by(step, len, None);
            if self.playlist_cursor.index() == Some(i) {
                match before {
                    Some(b) => self.playlist_cursor.set_selected(b, len, true),
                    None => self.playlist_cursor.clear(),
                }
                break;
            }
        }
    }

    /// Move the selected entry past `delta` visible neighbours. Entries that
    /// do not resolve to a track are hidden, so they are stepped over.
    fn move_selected(&mut self, delta: isize) {
        let Some(from) = self.playlist_cursor.index() else {
            return;
        };
        let len = self.active_len();
        let step = delta.signum();
        let mut remaining = delta.unsigned_abs();
        let mut at = from;
        let mut to = from;
        while remaining > 0 {
            let Some(next) = at.checked_add_signed(step).filter(|i| *i < len) else {
                break;
            };
            at = next;
            if self.entry_playable(next) {
                to = next;
                remaining -= 1;
            }
        }
        if to != from {
            self.reorder(from, to);
        }
    }

    fn persist_playlist(&mut self, playlist: &Playlist) -> bool {
        match self.store.put_playlist(playlist) {
            Ok(()) => true,
            Err(e) => {
                warn!(playlist = %playlist.id, error = %e, "cannot save playlist");
                self.status = Some(format!("storage unavailable: {e}"));
                false
            }
        }
    }

    fn reorder(&mut self, from: usize, to: usize) {
        let Some(active) = self.active_playlist.clone() else {
            return;
        };
        let Some(playlist) = self.playlists.iter_mut().find(|p| p.id == active) else {
            return;
        };
        if !reorder(&mut playlist.track_ids, from, to, &mut self.playlist_cursor) {
            return;
        }
        let snapshot = playlist.clone();

        if let Some(playing) = self.playback.session().index_in(&active) {
            self.playback
                .retarget(active.clone(), follow_index(playing, from, to));
        }

        if !self.persist_playlist(&snapshot) {
            // Show what the store actually holds.
            self.reload();
            return;
        }
        self.events.push(CoreEvent::PlaylistReordered {
            playlist: active,
            from,
            to,
        });
    }

    fn add_selected_to_playlist(&mut self) {
        let Some(track_id) = self
            .library_cursor
            .index()
            .and_then(|i| self.library.get(i))
            .map(|t| t.id.clone())
        else {
            return;
        };
        let Some(mut playlist) = self.active_playlist().cloned() else {
            self.status = Some("create a playlist first (N)".to_string());
            return;
        };
        if !playlist.add_track(track_id) {
            return;
        }
        if self.persist_playlist(&playlist) {
            self.reload();
        }
    }

    fn remove_selected_from_playlist(&mut self) {
        let Some(index) = self.playlist_cursor.index() else {
            return;
        };
        let Some(mut playlist) = self.active_playlist().cloned() else {
            return;
        };
        if playlist.remove_at(index).is_none() {
            return;
        }
        if self.persist_playlist(&playlist) {
            self.reload();
        }
    }

    /// Edit the stored record rather than the in-memory copy, so the write
    /// never resurrects a track deleted behind our back.
    fn set_memo(&mut self, id: &TrackId, memo: String) {
        let mut track = match self.store.get_track_by_id(id) {
            Ok(Some(track)) => track,
            Ok(None) => {
                warn!(track = %id, "memo for a track that no longer exists");
                self.reload();
                return;
            }
            Err(e) => {
                warn!(track = %id, error = %e, "cannot read track");
                self.status = Some(format!("storage unavailable: {e}"));
                return;
            }
        };
        track.memo = memo;
        if let Err(e) = self.store.put_track(&track) {
            warn!(track = %id, error = %e, "cannot save memo");
            self.status = Some(format!("storage unavailable: {e}"));
            return;
        }
        if let Some(slot) = self
            .library_index
            .get(id)
            .and_then(|&index| self.library.get_mut(index))
        {
            *slot = track;
        }
    }

    fn delete_track(&mut self, id: &TrackId) {
        if self.playback.current_track() == Some(id) {
            self.clear_playback();
        }
        if let Err(e) = self.store.delete_track(id) {
            warn!(track = %id, error = %e, "cannot delete track");
            self.status = Some(format!("storage unavailable: {e}"));
            return;
        }
        let affected: Vec<Playlist> = self
            .playlists
            .iter()
            .filter(|p| p.contains(id))
            .cloned()
            .collect();
        for mut playlist in affected {
            playlist.purge(id);
            self.persist_playlist(&playlist);
        }
        info!(track = %id, "track deleted");
        self.reload();
    }

    fn ingest(&mut self, paths: &[PathBuf]) {
        let found = library::ingest(paths, &self.settings.library);
        let mut added = 0usize;
        let mut failed = 0usize;
        for item in found {
            let stored = self
                .store
                .put_payload(&item.track.id, &item.payload)
                .and_then(|()| self.store.put_track(&item.track));
            match stored {
                Ok(()) => added += 1,
                Err(e) => {
                    warn!(track = %item.track.name, error = %e, "cannot store track");
                    failed += 1;
                }
            }
        }
        info!(added, failed, "ingested");
        self.status = Some(if failed > 0 {
            format!("added {added} track(s), {failed} could not be stored")
        } else {
            format!("added {added} track(s)")
        });
        self.reload();
    }

    fn create_playlist(&mut self, name: &str) {
        let name = name.trim();
        if name.is_empty() {
            return;
        }
        let playlist = Playlist::new(name);
        if !self.persist_playlist(&playlist) {
            return;
        }
        self.active_playlist = Some(playlist.id);
        self.save_prefs();
        self.reload();
    }

    fn delete_active_playlist(&mut self) {
        let Some(playlist) = self.active_playlist().cloned() else {
            return;
        };
        // Stop first so nothing keeps pointing into the deleted ordering.
        if self
            .playback
            .current_track()
            .is_some_and(|id| playlist.contains(id))
        {
            self.clear_playback();
        }
        if let Err(e) = self.store.delete_playlist(&playlist.id) {
            warn!(playlist = %playlist.id, error = %e, "cannot delete playlist");
            self.status = Some(format!("storage unavailable: {e}"));
            return;
        }
        info!(playlist = %playlist.id, "playlist deleted");
        self.active_playlist = None;
        self.reload();
    }

    fn activate_playlist(&mut self, id: PlaylistId) {
        if !self.playlists.iter().any(|p| p.id == id) {
            return;
        }
        if self.active_playlist.as_ref() == Some(&id) {
            return;
        }
        self.active_playlist = Some(id);
        self.save_prefs();
        self.refresh_playlist_view();
    }

    fn cycle_playlist(&mut self, delta: isize) {
        let len = self.playlists.len();
        if len == 0 {
            return;
        }
        let current = self
            .active_playlist
            .as_ref()
            .and_then(|id| self.playlists.iter().position(|p| &p.id == id))
            .unwrap_or(0) as isize;
        let next = (current + delta).rem_euclid(len as isize) as usize;
        let id = self.playlists[next].id.clone();
        self.activate_playlist(id);
    }

    /// Unload the current track and reset everything that described it.
    fn clear_playback(&mut self) {
        let was_idle = self.playback.state() == PlayerState::Idle;
        self.playback.clear();
        self.seek.reset();
        self.waveform.target = None;
        self.waveform.peaks = None;
        self.playlist_cursor.clear();
        self.library_cursor.clear();
        if !was_idle {
            self.state_changed();
        }
    }

    fn import(&mut self, path: &Path) {
        // Validate before touching anything.
        let plan = match read_import(path) {
            Ok(plan) => plan,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "import rejected");
                self.status = Some(format!("import failed: {e}"));
                return;
            }
        };

        self.clear_playback();
        self.waveform.cache.clear();
        self.decode_outbox.clear();

        match apply_import(self.store.as_ref(), plan) {
            Ok(summary) => {
                self.active_playlist = summary.active_playlist_id;
                self.save_prefs();
                self.status = Some(format!(
                    "imported {} track(s), {} playlist(s)",
                    summary.tracks, summary.playlists
                ));
            }
            Err(e) => {
                warn!(error = %e, "import failed");
                self.status = Some(format!("import failed: {e}"));
            }
        }
        self.reload();
    }

    fn export(&mut self, path: &Path) {
        match write_export(self.store.as_ref(), self.active_playlist.as_ref(), path) {
            Ok(file) => {
                self.status = Some(format!(
                    "exported {} track(s) to {}",
                    file.tracks.len(),
                    path.display()
                ));
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "export failed");
                self.status = Some(format!("export failed: {e}"));
            }
        }
    }

    fn set_volume(&mut self, volume: f32) {
        if !volume.is_finite() {
            return;
        }
        let volume = volume.clamp(0.0, 1.0);
        self.volume = volume;
        self.playback.set_volume(volume);
        self.save_prefs();
        self.events.push(CoreEvent::VolumeChanged(volume));
    }
}
