use std::time::Duration;

use tracing::debug;

use crate::library::{PlaylistId, TrackId};

use super::sink::{HandleId, PlaybackSink};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlayerState {
    /// Nothing loaded.
    #[default]
    Idle,
    Paused,
    Playing,
}

/// Where the current track was started from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Origin {
    /// Entry `index` of a playlist; enables next/prev.
    Playlist { playlist: PlaylistId, index: usize },
    /// Ad hoc from the library list, no playlist position.
    Library { index: usize },
}

/// Ephemeral playback session. Only the controller writes it.
#[derive(Debug, Clone, Default)]
pub struct Session {
    pub track_id: Option<TrackId>,
    pub origin: Option<Origin>,
    pub handle: Option<HandleId>,
    pub state: PlayerState,
}

impl Session {
    /// Playlist index of the playing entry, if it came from `playlist`.
    pub fn index_in(&self, playlist: &PlaylistId) -> Option<usize> {
        match &self.origin {
            Some(Origin::Playlist { playlist: p, index }) if p == playlist => Some(*index),
            _ => None,
        }
    }

    pub fn library_index(&self) -> Option<usize> {
        match self.origin {
            Some(Origin::Library { index }) => Some(index),
            _ => None,
        }
    }
}

/// Result of a play/pause toggle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Toggle {
    /// Nothing was loaded; the caller should advance into the playlist.
    NeedsAdvance,
    Now(PlayerState),
}

pub struct PlaybackController {
    sink: Box<dyn PlaybackSink>,
    session: Session,
    next_handle: u64,
}

impl PlaybackController {
    pub fn new(sink: Box<dyn PlaybackSink>) -> Self {
        Self {
            sink,
            session: Session::default(),
            next_handle: 1,
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn state(&self) -> PlayerState {
        self.session.state
    }

    pub fn current_track(&self) -> Option<&TrackId> {
        self.session.track_id.as_ref()
    }

    fn release_current(&mut self) {
        if let Some(handle) = self.session.handle.take() {
            self.sink.release(handle);
        }
    }

    /// Release the previous asset, bind `payload` under a new handle and
    /// start playing it.
    pub fn load_and_play(
        &mut self,
        track: TrackId,
        payload: Vec<u8>,
        duration_hint: Option<Duration>,
        origin: Origin,
    ) -> HandleId {
        self.release_current();

        let handle = HandleId(self.next_handle);
        self.next_handle += 1;

        self.sink.bind(handle, &track, payload, duration_hint);
        self.sink.play();
        debug!(track = %track, handle = handle.0, ?origin, "loaded");

        self.session = Session {
            track_id: Some(track),
            origin: Some(origin),
            handle: Some(handle),
            state: PlayerState::Playing,
        };
        handle
    }

    pub fn toggle(&mut self) -> Toggle {
        match self.session.state {
            PlayerState::Idle => Toggle::NeedsAdvance,
            PlayerState::Playing => {
                self.sink.pause();
                self.session.state = PlayerState::Paused;
                Toggle::Now(PlayerState::Paused)
            }
            PlayerState::Paused => {
                self.sink.play();
                self.session.state = PlayerState::Playing;
                Toggle::Now(PlayerState::Playing)
            }
        }
    }

    pub fn play(&mut self) {
        if self.session.state == PlayerState::Paused {
            self.toggle();
        }
    }

    pub fn pause(&mut self) {
        if self.session.state == PlayerState::Playing {
            self.toggle();
        }
    }

    /// Ran past the last entry: keep the track loaded but paused.
    pub fn stop_at_end(&mut self) {
        if self.session.state != PlayerState::Idle {
            self.sink.pause();
            self.session.state = PlayerState::Paused;
        }
    }

    /// Unload everything and return to `Idle`.
    pub fn clear(&mut self) {
        self.sink.pause();
        self.release_current();
        self.session = Session::default();
    }

    pub fn seek(&mut self, to: Duration) {
        if self.session.state != PlayerState::Idle {
            self.sink.seek(to);
        }
    }

    pub fn set_volume(&mut self, volume: f32) {
        self.sink.set_volume(volume.clamp(0.0, 1.0));
    }

    /// The playing entry now lives at `index` of `playlist`. Only applies
    /// when playback came from a playlist.
    pub fn retarget(&mut self, playlist: PlaylistId, index: usize) {
        if let Some(Origin::Playlist { .. }) = self.session.origin {
            self.session.origin = Some(Origin::Playlist { playlist, index });
        }
    }

    /// Forget the playlist position while the track keeps playing.
    pub fn detach_origin(&mut self) {
        self.session.origin = None;
    }

    pub fn position(&self) -> Duration {
        if self.session.state == PlayerState::Idle {
            Duration::ZERO
        } else {
            self.sink.position()
        }
    }

    pub fn duration(&self) -> Option<Duration> {
        if self.session.state == PlayerState::Idle {
            None
        } else {
            self.sink.duration()
        }
    }

    pub fn take_finished(&mut self) -> bool {
        self.session.state == PlayerState::Playing && self.sink.take_finished()
    }

    /// A failed load leaves the track selected but paused.
    pub fn take_error(&mut self) -> Option<String> {
        let err = self.sink.take_error()?;
        if self.session.state == PlayerState::Playing {
            self.session.state = PlayerState::Paused;
        }
        Some(err)
    }
}
