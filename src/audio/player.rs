use std::sync::mpsc::{self, Sender};
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;
use std::time::Duration;

use tracing::warn;

use crate::library::TrackId;
use crate::playback::{HandleId, PlaybackSink};

use super::thread::spawn_audio_thread;
use super::types::{AudioCmd, PlaybackHandle, PlaybackInfo};

/// The rodio-backed [`PlaybackSink`]. Commands go to the audio thread;
/// position and end-of-track come back through shared [`PlaybackInfo`].
pub struct AudioPlayer {
    tx: Sender<AudioCmd>,
    playback: PlaybackHandle,
    current: Option<HandleId>,
    hint: Option<Duration>,
    join: Mutex<Option<JoinHandle<()>>>,
}

impl AudioPlayer {
    pub fn new(volume: f32) -> Self {
        let (tx, rx) = mpsc::channel::<AudioCmd>();
        let playback_info: PlaybackHandle = Arc::new(Mutex::new(PlaybackInfo::default()));

        let audio_handle = spawn_audio_thread(rx, playback_info.clone(), volume);

        Self {
            tx,
            playback: playback_info,
            current: None,
            hint: None,
            join: Mutex::new(Some(audio_handle)),
        }
    }

    fn send(&self, cmd: AudioCmd) -> Result<(), mpsc::SendError<AudioCmd>> {
        self.tx.send(cmd)
    }

    fn send_or_warn(&self, cmd: AudioCmd) {
        if self.send(cmd).is_err() {
            warn!("audio thread is gone");
        }
    }

    /// Read the shared info if it describes the handle we have bound.
    fn with_current<T>(&self, read: impl FnOnce(&PlaybackInfo) -> T) -> Option<T> {
        let current = self.current?;
        let info = self.playback.lock().ok()?;
        (info.handle == Some(current)).then(|| read(&info))
    }

    fn shutdown(&self) {
        let _ = self.send(AudioCmd::Quit);

        if let Ok(mut j) = self.join.lock() {
            if let Some(h) = j.take() {
                let _ = h.join();
            }
        }
    }
}

impl PlaybackSink for AudioPlayer {
    fn bind(
        &mut self,
        handle: HandleId,
        _track: &TrackId,
        payload: Vec<u8>,
        duration_hint: Option<Duration>,
    ) {
        self.current = Some(handle);
        self.hint = duration_hint;
        self.send_or_warn(AudioCmd::Load {
            handle,
            payload: payload.into(),
            duration_hint,
        });
    }

    fn release(&mut self, handle: HandleId) {
        if self.current == Some(handle) {
            self.current = None;
            self.hint = None;
        }
        self.send_or_warn(AudioCmd::Release(handle));
    }

    fn play(&mut self) {
        self.send_or_warn(AudioCmd::Play);
    }

    fn pause(&mut self) {
        self.send_or_warn(AudioCmd::Pause);
    }

    fn seek(&mut self, to: Duration) {
        // Show the target right away; the thread confirms it on its next tick.
        if let Ok(mut info) = self.playback.lock() {
            if info.handle.is_some() && info.handle == self.current {
                info.position = to;
            }
        }
        self.send_or_warn(AudioCmd::SeekTo(to));
    }

    fn set_volume(&mut self, volume: f32) {
        self.send_or_warn(AudioCmd::SetVolume(volume));
    }

    fn position(&self) -> Duration {
        self.with_current(|info| info.position)
            .unwrap_or(Duration::ZERO)
    }

    fn duration(&self) -> Option<Duration> {
        self.with_current(|info| info.duration)
            .flatten()
            .or(self.hint)
    }

    fn take_finished(&mut self) -> bool {
        let Some(current) = self.current else {
            return false;
        };
        match self.playback.lock() {
            Ok(mut info) if info.handle == Some(current) => std::mem::take(&mut info.finished),
            _ => false,
        }
    }

    fn take_error(&mut self) -> Option<String> {
        let current = self.current?;
        let mut info = self.playback.lock().ok()?;
        if info.handle == Some(current) {
            info.error.take()
        } else {
            None
        }
    }
}

impl Drop for AudioPlayer {
    fn drop(&mut self) {
        self.shutdown();
    }
}
