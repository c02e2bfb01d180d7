use std::time::Duration;

use crate::library::TrackId;

/// Identity of one bound asset. Never reused within a process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HandleId(pub u64);

/// The audio output the controller drives.
///
/// `bind` makes `handle` the live asset (paused at zero); `release` drops it.
/// The remaining calls act on whatever is currently bound and do nothing
/// when nothing is.
pub trait PlaybackSink {
    fn bind(
        &mut self,
        handle: HandleId,
        track: &TrackId,
        payload: Vec<u8>,
        duration_hint: Option<Duration>,
    );
    fn release(&mut self, handle: HandleId);
    fn play(&mut self);
    fn pause(&mut self);
    fn seek(&mut self, to: Duration);
    fn set_volume(&mut self, volume: f32);

    fn position(&self) -> Duration;
    /// Total length, once the decoder (or the hint) knows it.
    fn duration(&self) -> Option<Duration>;
    /// Whether the bound asset reached its end since the last call.
    fn take_finished(&mut self) -> bool;
    /// A load or output failure since the last call.
    fn take_error(&mut self) -> Option<String>;
}
