//! MPRIS control surface on the D-Bus session bus.
//!
//! Method calls become [`ControlCmd`]s for the event loop; properties are
//! served from a snapshot the runtime refreshes through [`MprisHandle`].

use std::collections::HashMap;
use std::sync::{Arc, Mutex, mpsc::Sender};
use std::time::Duration;

use async_io::{Timer, block_on};
use tracing::{info, warn};
use zbus::{Connection, interface};
use zvariant::{ObjectPath, OwnedObjectPath, OwnedValue, Value};

use crate::library::{Track, TrackId};
use crate::playback::PlayerState;

const OBJECT_PATH: &str = "/org/mpris/MediaPlayer2";
const BUS_NAME: &str = "org.mpris.MediaPlayer2.sonata";

#[derive(Clone, Debug, PartialEq)]
pub enum ControlCmd {
    Quit,
    Play,
    Pause,
    PlayPause,
    Stop,
    Next,
    Previous,
    /// Relative seek in microseconds.
    Seek(i64),
    /// Absolute position for the current track.
    SetPosition(Duration),
    SetVolume(f32),
}

#[derive(Debug, Default)]
struct SharedState {
    playback: PlayerState,
    track_id: Option<OwnedObjectPath>,
    title: Option<String>,
    memo: Option<String>,
    length_micros: Option<i64>,
    position_micros: i64,
    volume: f64,
}

/// Object path advertised as `mpris:trackid`. Object paths only allow
/// `[A-Za-z0-9_]` per element, so anything else becomes `_`.
pub fn track_object_path(id: &TrackId) -> Option<OwnedObjectPath> {
    let element: String = id
        .as_str()
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect();
    if element.is_empty() {
        return None;
    }
    ObjectPath::try_from(format!("{OBJECT_PATH}/track/{element}"))
        .ok()
        .map(OwnedObjectPath::from)
}

fn micros(d: Duration) -> i64 {
    i64::try_from(d.as_micros()).unwrap_or(i64::MAX)
}

pub struct MprisHandle {
    state: Arc<Mutex<SharedState>>,
}

impl MprisHandle {
    pub fn set_playback(&self, playback: PlayerState) {
        if let Ok(mut s) = self.state.lock() {
            s.playback = playback;
        }
    }

    /// Describe the loaded track, or clear the metadata with `None`.
    pub fn set_track(&self, track: Option<&Track>, length: Option<Duration>) {
        let Ok(mut s) = self.state.lock() else {
            return;
        };
        match track {
            Some(t) => {
                s.track_id = track_object_path(&t.id);
                s.title = Some(t.name.clone());
                s.memo = (!t.memo.trim().is_empty()).then(|| t.memo.clone());
                s.length_micros = length.map(micros);
            }
            None => {
                s.track_id = None;
                s.title = None;
                s.memo = None;
                s.length_micros = None;
                s.position_micros = 0;
            }
        }
    }

    pub fn set_position(&self, position: Duration) {
        if let Ok(mut s) = self.state.lock() {
            s.position_micros = micros(position);
        }
    }

    pub fn set_volume(&self, volume: f32) {
        if let Ok(mut s) = self.state.lock() {
            s.volume = f64::from(volume);
        }
    }
}

struct RootIface {
    tx: Sender<ControlCmd>,
}

#[interface(name = "org.mpris.MediaPlayer2")]
impl RootIface {
    fn raise(&self) {
        // No window to raise.
    }

    fn quit(&self) {
        let _ = self.tx.send(ControlCmd::Quit);
    }

    #[zbus(property)]
    fn can_quit(&self) -> bool {
        true
    }

    #[zbus(property)]
    fn can_raise(&self) -> bool {
        false
    }

    #[zbus(property)]
    fn has_track_list(&self) -> bool {
        false
    }

    #[zbus(property)]
    fn identity(&self) -> &str {
        "sonata"
    }

    #[zbus(property)]
    fn supported_uri_schemes(&self) -> Vec<String> {
        vec![]
    }

    #[zbus(property)]
    fn supported_mime_types(&self) -> Vec<String> {
        vec![]
    }
}

struct PlayerIface {
    tx: Sender<ControlCmd>,
    state: Arc<Mutex<SharedState>>,
}

fn insert<'a>(map: &mut HashMap<String, OwnedValue>, key: &str, value: impl Into<Value<'a>>) {
    if let Ok(v) = OwnedValue::try_from(value.into()) {
        map.insert(key.to_string(), v);
    }
}

#[interface(name = "org.mpris.MediaPlayer2.Player")]
impl PlayerIface {
    fn next(&self) {
        let _ = self.tx.send(ControlCmd::Next);
    }

    fn previous(&self) {
        let _ = self.tx.send(ControlCmd::Previous);
    }

    fn play(&self) {
        let _ = self.tx.send(ControlCmd::Play);
    }

    fn pause(&self) {
        let _ = self.tx.send(ControlCmd::Pause);
    }

    fn play_pause(&self) {
        let _ = self.tx.send(ControlCmd::PlayPause);
    }

    fn stop(&self) {
        let _ = self.tx.send(ControlCmd::Stop);
    }

    fn seek(&self, offset: i64) {
        let _ = self.tx.send(ControlCmd::Seek(offset));
    }

    /// Ignored unless `track_id` names the loaded track and `position` is
    /// not negative.
    fn set_position(&self, track_id: ObjectPath<'_>, position: i64) {
        let current = self
            .state
            .lock()
            .ok()
            .and_then(|s| s.track_id.clone());
        let Some(current) = current else {
            return;
        };
        if current.as_str() != track_id.as_str() || position < 0 {
            return;
        }
        let _ = self
            .tx
            .send(ControlCmd::SetPosition(Duration::from_micros(position as u64)));
    }

    #[zbus(property)]
    fn playback_status(&self) -> &str {
        let Ok(s) = self.state.lock() else {
            return "Stopped";
        };
        match s.playback {
            PlayerState::Idle => "Stopped",
            PlayerState::Playing => "Playing",
            PlayerState::Paused => "Paused",
        }
    }

    #[zbus(property)]
    fn can_control(&self) -> bool {
        true
    }

    #[zbus(property)]
    fn can_play(&self) -> bool {
        true
    }

    #[zbus(property)]
    fn can_pause(&self) -> bool {
        true
    }

    #[zbus(property)]
    fn can_go_next(&self) -> bool {
        true
    }

    #[zbus(property)]
    fn can_go_previous(&self) -> bool {
        true
    }

    #[zbus(property)]
    fn can_seek(&self) -> bool {
        self.state
            .lock()
            .map(|s| s.length_micros.is_some())
            .unwrap_or(false)
    }

    #[zbus(property)]
    fn position(&self) -> i64 {
        self.state.lock().map(|s| s.position_micros).unwrap_or(0)
    }

    #[zbus(property)]
    fn volume(&self) -> f64 {
        self.state.lock().map(|s| s.volume).unwrap_or(0.0)
    }

    #[zbus(property)]
    fn set_volume(&mut self, value: f64) {
        if !value.is_finite() {
            return;
        }
        let value = value.clamp(0.0, 1.0);
        if let Ok(mut s) = self.state.lock() {
            s.volume = value;
        }
        let _ = self.tx.send(ControlCmd::SetVolume(value as f32));
    }

    #[zbus(property)]
    fn metadata(&self) -> HashMap<String, OwnedValue> {
        let mut map = HashMap::new();
        let Ok(s) = self.state.lock() else {
            return map;
        };

        if let Some(id) = &s.track_id {
            insert(&mut map, "mpris:trackid", id.clone().into_inner());
        }
        if let Some(title) = &s.title {
            insert(&mut map, "xesam:title", title.as_str());
        }
        if let Some(memo) = &s.memo {
            insert(&mut map, "xesam:comment", vec![memo.clone()]);
        }
        if let Some(length) = s.length_micros {
            insert(&mut map, "mpris:length", length);
        }
        map
    }
}

/// Register the MPRIS service on a background thread. Failing to reach the
/// bus is logged and leaves the player without MPRIS.
pub fn spawn_mpris(tx: Sender<ControlCmd>) -> MprisHandle {
    let state = Arc::new(Mutex::new(SharedState::default()));

    let state_for_thread = state.clone();
    let spawned = std::thread::Builder::new()
        .name("mpris".into())
        .spawn(move || {
            block_on(async move {
                let connection = match Connection::session().await {
                    Ok(c) => c,
                    Err(e) => {
                        warn!(error = %e, "MPRIS: cannot connect to session bus");
                        return;
                    }
                };

                if let Err(e) = connection.request_name(BUS_NAME).await {
                    warn!(error = %e, "MPRIS: cannot acquire name");
                    return;
                }

                let object_server = connection.object_server();

                if let Err(e) = object_server
                    .at(OBJECT_PATH, RootIface { tx: tx.clone() })
                    .await
                {
                    warn!(error = %e, "MPRIS: cannot register root interface");
                    return;
                }

                if let Err(e) = object_server
                    .at(
                        OBJECT_PATH,
                        PlayerIface {
                            tx,
                            state: state_for_thread,
                        },
                    )
                    .await
                {
                    warn!(error = %e, "MPRIS: cannot register player interface");
                    return;
                }
                info!(name = BUS_NAME, "MPRIS registered");

                // Keep the service alive.
                loop {
                    Timer::after(Duration::from_secs(3600)).await;
                }
            });
        });
    if let Err(e) = spawned {
        warn!(error = %e, "MPRIS: cannot start thread");
    }

    MprisHandle { state }
}
