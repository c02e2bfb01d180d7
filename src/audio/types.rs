//! Commands and shared state of the audio thread.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::playback::HandleId;

#[derive(Debug)]
pub enum AudioCmd {
    /// Replace whatever is loaded with `payload`, paused at zero.
    Load {
        handle: HandleId,
        payload: Arc<[u8]>,
        duration_hint: Option<Duration>,
    },
    /// Drop the sink if `handle` is still the loaded one.
    Release(HandleId),
    Play,
    Pause,
    /// Jump to an absolute position in the loaded track.
    SeekTo(Duration),
    SetVolume(f32),
    /// Stop and end the audio thread.
    Quit,
}

#[derive(Debug, Clone, Default)]
/// Runtime playback information shared with the event loop.
pub struct PlaybackInfo {
    /// Handle the remaining fields describe.
    pub handle: Option<HandleId>,
    pub position: Duration,
    pub duration: Option<Duration>,
    pub playing: bool,
    /// Set when `handle` played to its end; cleared by the reader.
    pub finished: bool,
    pub error: Option<String>,
}

pub type PlaybackHandle = Arc<Mutex<PlaybackInfo>>;
