use std::sync::Arc;
use std::sync::mpsc::{Receiver, RecvTimeoutError};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use rodio::{OutputStream, OutputStreamBuilder, Sink};
use tracing::{debug, warn};

use crate::playback::HandleId;

use super::sink::create_sink_at;
use super::types::{AudioCmd, PlaybackHandle, PlaybackInfo};

/// How often the thread refreshes the shared position and checks for the
/// end of the track when no command arrives.
const TICK: Duration = Duration::from_millis(50);

/// The asset currently owned by the thread.
struct Loaded {
    handle: HandleId,
    payload: Arc<[u8]>,
    sink: Option<Sink>,
    /// Where the current sink started inside the track.
    offset: Duration,
    duration: Option<Duration>,
    paused: bool,
    ended: bool,
}

struct Engine {
    stream: Option<OutputStream>,
    loaded: Option<Loaded>,
    volume: f32,
    info: PlaybackHandle,
}

impl Engine {
    fn publish(&self, update: impl FnOnce(&mut PlaybackInfo)) {
        if let Ok(mut info) = self.info.lock() {
            update(&mut info);
        }
    }

    fn fail(&self, handle: HandleId, message: String) {
        warn!(handle = handle.0, error = %message, "audio load failed");
        self.publish(|info| {
            info.handle = Some(handle);
            info.playing = false;
            info.error = Some(message);
        });
    }

    /// Build a fresh sink for the loaded payload starting at `at`.
    fn rebuild(&mut self, at: Duration) {
        let Some(loaded) = self.loaded.as_mut() else {
            return;
        };
        if let Some(old) = loaded.sink.take() {
            old.stop();
        }
        let Some(stream) = self.stream.as_ref() else {
            return;
        };
        match create_sink_at(stream, &loaded.payload, at, self.volume) {
            Ok((sink, total)) => {
                if !loaded.paused {
                    sink.play();
                }
                if total.is_some() {
                    loaded.duration = total;
                }
                loaded.sink = Some(sink);
                loaded.offset = at;
                loaded.ended = false;
            }
            Err(e) => {
                let handle = loaded.handle;
                loaded.paused = true;
                self.fail(handle, e.to_string());
            }
        }
    }

    fn load(&mut self, handle: HandleId, payload: Arc<[u8]>, duration_hint: Option<Duration>) {
        self.release_any();
        if self.stream.is_none() {
            self.fail(handle, "no audio output device".to_string());
            return;
        }
        self.loaded = Some(Loaded {
            handle,
            payload,
            sink: None,
            offset: Duration::ZERO,
            duration: duration_hint,
            paused: true,
            ended: false,
        });
        self.publish(|info| {
            *info = PlaybackInfo {
                handle: Some(handle),
                duration: duration_hint,
                ..PlaybackInfo::default()
            };
        });
        self.rebuild(Duration::ZERO);
        debug!(handle = handle.0, "audio loaded");
    }

    fn release_any(&mut self) {
        if let Some(loaded) = self.loaded.take() {
            if let Some(sink) = loaded.sink {
                sink.stop();
            }
        }
    }

    fn release(&mut self, handle: HandleId) {
        if self.loaded.as_ref().is_some_and(|l| l.handle == handle) {
            self.release_any();
            self.publish(|info| *info = PlaybackInfo::default());
        }
    }

    fn play(&mut self) {
        let restart = match self.loaded.as_mut() {
            Some(loaded) => {
                loaded.paused = false;
                loaded.ended || loaded.sink.is_none()
            }
            None => return,
        };
        // A track that played out has an empty sink; start it over.
        if restart {
            self.rebuild(Duration::ZERO);
        } else if let Some(sink) = self.loaded.as_ref().and_then(|l| l.sink.as_ref()) {
            sink.play();
        }
        self.publish(|info| {
            info.playing = true;
            info.finished = false;
        });
    }

    fn pause(&mut self) {
        if let Some(loaded) = self.loaded.as_mut() {
            loaded.paused = true;
            if let Some(sink) = loaded.sink.as_ref() {
                sink.pause();
            }
        }
        self.publish(|info| info.playing = false);
    }

    fn seek(&mut self, to: Duration) {
        let to = match self.loaded.as_ref() {
            Some(loaded) => loaded.duration.map_or(to, |d| to.min(d)),
            None => return,
        };
        self.rebuild(to);
        self.publish(|info| info.position = to);
    }

    fn set_volume(&mut self, volume: f32) {
        self.volume = volume;
        if let Some(sink) = self.loaded.as_ref().and_then(|l| l.sink.as_ref()) {
            sink.set_volume(volume);
        }
    }

    /// Refresh position and detect the natural end of the track.
    fn tick(&mut self) {
        let Some(loaded) = self.loaded.as_mut() else {
            return;
        };
        let Some(sink) = loaded.sink.as_ref() else {
            return;
        };

        let mut position = loaded.offset + sink.get_pos();
        if let Some(d) = loaded.duration {
            position = position.min(d);
        }

        let just_ended = !loaded.paused && !loaded.ended && sink.empty();
        if just_ended {
            loaded.ended = true;
            loaded.paused = true;
            if let Some(d) = loaded.duration {
                position = d;
            }
        }

        let duration = loaded.duration;
        self.publish(|info| {
            info.position = position;
            info.duration = duration;
            if just_ended {
                info.playing = false;
                info.finished = true;
            }
        });
    }

    fn quit(&mut self) {
        self.release_any();
        self.publish(|info| info.playing = false);
    }
}

pub(super) fn spawn_audio_thread(
    rx: Receiver<AudioCmd>,
    playback_info: PlaybackHandle,
    volume: f32,
) -> JoinHandle<()> {
    thread::spawn(move || {
        let stream = match OutputStreamBuilder::open_default_stream() {
            Ok(mut stream) => {
                // rodio logs to stderr when OutputStream is dropped. That's useful in debugging,
                // but noisy for a TUI app.
                stream.log_on_drop(false);
                Some(stream)
            }
            Err(e) => {
                warn!(error = %e, "no audio output device");
                None
            }
        };

        let mut engine = Engine {
            stream,
            loaded: None,
            volume,
            info: playback_info,
        };

        loop {
            match rx.recv_timeout(TICK) {
                Ok(cmd) => match cmd {
                    AudioCmd::Load {
                        handle,
                        payload,
                        duration_hint,
                    } => engine.load(handle, payload, duration_hint),
                    AudioCmd::Release(handle) => engine.release(handle),
                    AudioCmd::Play => engine.play(),
                    AudioCmd::Pause => engine.pause(),
                    AudioCmd::SeekTo(to) => engine.seek(to),
                    AudioCmd::SetVolume(v) => engine.set_volume(v),
                    AudioCmd::Quit => {
                        engine.quit();
                        break;
                    }
                },
                Err(RecvTimeoutError::Timeout) => engine.tick(),
                Err(RecvTimeoutError::Disconnected) => break,
            }
        }
    })
}
